//! Container build, tag, and push operations for unifier.
//!
//! Commands go through the [`DockerExecutor`] trait so callers can be
//! tested against a mock instead of a real `docker` binary.

pub mod client;
pub mod docker;
pub mod executor;

pub use client::DockerClient;
pub use docker::DockerError;
pub use executor::{DockerExecutor, Invocation, RealExecutor};
