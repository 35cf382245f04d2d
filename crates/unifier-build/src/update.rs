use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use unifier_core::Config;
use unifier_core::discovery::{COMPOSE_FILE, DOCKERFILE};

use crate::compose::patch_compose;
use crate::dockerfile::patch_dockerfile;
use crate::error::PatchError;

/// What [`update_final_files`] did (or would do, in dry-run mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    pub dockerfile: PathBuf,
    pub compose: PathBuf,
    /// New `FROM` line of the final Dockerfile
    pub from_line: String,
    /// New `image:` value of the compose file
    pub image: String,
    /// `false` in dry-run mode
    pub written: bool,
}

/// Point the final directory's Dockerfile and compose file at the unified image.
///
/// Both new contents are computed before either file is written, so an
/// anchor missing from the second file leaves both untouched. Each write is
/// an atomic replace within the final directory. Nothing is written in
/// dry-run mode.
///
/// # Errors
///
/// - [`PatchError::Read`] / [`PatchError::Write`] on I/O failures
/// - [`PatchError::NoFromLine`] / [`PatchError::NoImageLine`] on missing anchors
pub fn update_final_files(cfg: &Config) -> Result<FileUpdate, PatchError> {
    let dockerfile = cfg.final_dir.join(DOCKERFILE);
    let compose = cfg.final_dir.join(COMPOSE_FILE);

    let image = cfg.unified_ref();
    let from_line = format!("FROM {image}");

    let dockerfile_text = read(&dockerfile)?;
    let patched_dockerfile = patch_dockerfile(&dockerfile_text, &from_line)?;

    let compose_text = read(&compose)?;
    let patched_compose = patch_compose(&compose_text, &image)?;

    if cfg.dry_run {
        tracing::debug!(
            dockerfile = %dockerfile.display(),
            compose = %compose.display(),
            "dry run; final files left untouched"
        );
    } else {
        write_atomic(&cfg.final_dir, &dockerfile, &patched_dockerfile)?;
        write_atomic(&cfg.final_dir, &compose, &patched_compose)?;
        tracing::debug!(
            dockerfile = %dockerfile.display(),
            compose = %compose.display(),
            image = %image,
            "final files updated"
        );
    }

    Ok(FileUpdate {
        dockerfile,
        compose,
        from_line,
        image,
        written: !cfg.dry_run,
    })
}

fn read(path: &Path) -> Result<String, PatchError> {
    std::fs::read_to_string(path).map_err(|e| PatchError::Read {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Replace `path` with `content` through a temp file in `dir` and a rename.
///
/// `dir` must be on the same filesystem as `path`. The original file's
/// permissions are carried over.
fn write_atomic(dir: &Path, path: &Path, content: &str) -> Result<(), PatchError> {
    let write_err = |e: std::io::Error| PatchError::Write {
        path: path.to_path_buf(),
        source: e,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    let permissions = std::fs::metadata(path).map_err(write_err)?.permissions();
    tmp.as_file().set_permissions(permissions).map_err(write_err)?;

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
