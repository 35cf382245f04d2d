//! Command-line surface and pipeline orchestration for unifier.
//!
//! ```text
//! unifier
//!   1. Tool check  ── docker on PATH (also in dry run)
//!   2. Structure   ── project/Dockerfile, final/Dockerfile, final/docker-compose.yml
//!   3. Build       ── one image per component dir, then {project}_unificado:{tag}
//!   4. Update      ── final Dockerfile FROM + compose image: (--skip-update-files)
//!   5. Publish     ── tag + push {registry}/{project}:{tag}  (--no-push)
//! ```

pub mod args;
pub mod pipeline;

pub use args::Args;
pub use pipeline::{PipelineError, PipelineOutcome, Stage, run_pipeline};
