use std::path::PathBuf;

use crate::config::Config;
use crate::discovery::{COMPOSE_FILE, DOCKERFILE};

/// Check the directory pair and its descriptor files.
///
/// Every missing path is collected before failing, so one run shows the
/// whole picture. A missing directory is reported alongside the files it
/// would have held.
///
/// # Errors
///
/// [`Error::MissingFiles`](crate::Error::MissingFiles) listing each absent path.
pub fn validate_structure(cfg: &Config) -> crate::Result<()> {
    let dirs = [&cfg.project_dir, &cfg.final_dir];
    let files = [
        cfg.project_dir.join(DOCKERFILE),
        cfg.final_dir.join(DOCKERFILE),
        cfg.final_dir.join(COMPOSE_FILE),
    ];

    let missing: Vec<PathBuf> = dirs
        .into_iter()
        .filter(|d| !d.is_dir())
        .cloned()
        .chain(files.into_iter().filter(|f| !f.is_file()))
        .collect();

    if missing.is_empty() {
        tracing::debug!(
            project_dir = %cfg.project_dir.display(),
            final_dir = %cfg.final_dir.display(),
            "structure validated"
        );
        Ok(())
    } else {
        Err(crate::Error::MissingFiles { paths: missing })
    }
}
