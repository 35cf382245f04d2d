//! Final-directory patching for unifier.
//!
//! # Update flow
//!
//! ```text
//! update_final_files(cfg)
//!   1. Read       ── {final}/Dockerfile, {final}/docker-compose.yml
//!   2. Transform  ── patch_dockerfile()  first `FROM ` line
//!                    patch_compose()     first `image:` line
//!   3. Write      ── both files, atomic replace (skipped in dry run)
//! ```
//!
//! Both transforms are pure string functions. A missing anchor in either
//! file aborts before anything is written.

pub mod compose;
pub mod dockerfile;
pub mod error;
pub mod update;

pub use compose::patch_compose;
pub use dockerfile::patch_dockerfile;
pub use error::PatchError;
pub use update::{FileUpdate, update_final_files};
