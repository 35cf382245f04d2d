//! Directory-pair resolution and build-context discovery.
//!
//! A base directory is expected to hold a project directory `X` and its
//! deployment counterpart `X_final`:
//!
//! ```text
//! base/
//!   demo/                 project: unified Dockerfile + component contexts
//!     Dockerfile
//!     api/Dockerfile      -> build unit "api"
//!     worker/Dockerfile   -> build unit "worker"
//!   demo_final/           final: Dockerfile + docker-compose.yml
//! ```

use std::path::{Path, PathBuf};

/// Suffix that marks the final (deployment) directory.
pub const FINAL_SUFFIX: &str = "_final";

/// Build descriptor expected in every build context.
pub const DOCKERFILE: &str = "Dockerfile";

/// Compose descriptor expected in the final directory.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// A per-component image built from a subdirectory of the project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BuildUnit {
    /// Subdirectory holding the component's Dockerfile
    pub context_path: PathBuf,
    /// Image name; equal to the subdirectory name
    pub image_name: String,
}

/// Determine the `(project_dir, final_dir)` pair.
///
/// Rules, first match wins:
/// 1. Both given: returned unchanged, without existence checks.
/// 2. Only the project given: `base_dir/{project}_final` must be a directory.
/// 3. Only the final given: its name must be `{stem}_final` and
///    `base_dir/{stem}` must be a directory.
/// 4. Neither given: `base_dir` must hold exactly one non-hidden `*_final`
///    directory and at least one other non-hidden directory. The one named
///    like the final's stem wins; a lone other directory is used otherwise.
///
/// # Errors
///
/// - [`Error::CannotDeduceFinal`](crate::Error::CannotDeduceFinal) for rule 2
/// - [`Error::CannotDeduceProject`](crate::Error::CannotDeduceProject) for rule 3
/// - [`Error::AmbiguousDetection`](crate::Error::AmbiguousDetection) for rule 4
/// - [`Error::ReadDir`](crate::Error::ReadDir) if `base_dir` cannot be listed
pub fn resolve_dirs(
    base_dir: &Path,
    project_dir: Option<&Path>,
    final_dir: Option<&Path>,
) -> crate::Result<(PathBuf, PathBuf)> {
    match (project_dir, final_dir) {
        (Some(project), Some(final_)) => Ok((project.to_path_buf(), final_.to_path_buf())),
        (Some(project), None) => {
            let candidate = base_dir.join(format!("{}{FINAL_SUFFIX}", file_name(project)));
            if candidate.is_dir() {
                Ok((project.to_path_buf(), candidate))
            } else {
                Err(crate::Error::CannotDeduceFinal {
                    expected: candidate,
                })
            }
        }
        (None, Some(final_)) => {
            let name = file_name(final_);
            let stem = match name.strip_suffix(FINAL_SUFFIX) {
                Some(stem) if !stem.is_empty() => stem,
                _ => {
                    return Err(crate::Error::CannotDeduceProject {
                        final_dir: final_.to_path_buf(),
                        reason: format!("name does not follow {{project}}{FINAL_SUFFIX}"),
                    });
                }
            };
            let candidate = base_dir.join(stem);
            if candidate.is_dir() {
                Ok((candidate, final_.to_path_buf()))
            } else {
                Err(crate::Error::CannotDeduceProject {
                    final_dir: final_.to_path_buf(),
                    reason: format!("{} is not a directory", candidate.display()),
                })
            }
        }
        (None, None) => detect_pair(base_dir),
    }
}

fn detect_pair(base_dir: &Path) -> crate::Result<(PathBuf, PathBuf)> {
    let (finals, bases): (Vec<PathBuf>, Vec<PathBuf>) = visible_subdirs(base_dir)?
        .into_iter()
        .partition(|d| file_name(d).ends_with(FINAL_SUFFIX));

    tracing::debug!(
        base_dir = %base_dir.display(),
        finals = finals.len(),
        bases = bases.len(),
        "detecting project/final pair"
    );

    let ambiguous = || crate::Error::AmbiguousDetection {
        base_dir: base_dir.to_path_buf(),
        finals: finals.len(),
        bases: bases.len(),
    };

    let [final_dir] = finals.as_slice() else {
        return Err(ambiguous());
    };

    let final_name = file_name(final_dir);
    let stem = &final_name[..final_name.len() - FINAL_SUFFIX.len()];

    if let Some(project) = bases.iter().find(|b| file_name(b) == stem) {
        return Ok((project.clone(), final_dir.clone()));
    }

    match bases.as_slice() {
        [only] => Ok((only.clone(), final_dir.clone())),
        _ => Err(ambiguous()),
    }
}

/// Discover the per-component build contexts of a project.
///
/// Returns every immediate, non-hidden subdirectory of `project_dir` that
/// directly contains a `Dockerfile`, sorted by path. An empty list is a
/// valid result.
///
/// # Errors
///
/// [`Error::ReadDir`](crate::Error::ReadDir) if `project_dir` cannot be listed.
pub fn discover_build_units(project_dir: &Path) -> crate::Result<Vec<BuildUnit>> {
    let units: Vec<BuildUnit> = visible_subdirs(project_dir)?
        .into_iter()
        .filter(|d| d.join(DOCKERFILE).is_file())
        .map(|d| BuildUnit {
            image_name: file_name(&d),
            context_path: d,
        })
        .collect();

    tracing::debug!(
        project_dir = %project_dir.display(),
        units = units.len(),
        "build units discovered"
    );

    Ok(units)
}

/// Immediate subdirectories not starting with `.`, sorted by path.
fn visible_subdirs(dir: &Path) -> crate::Result<Vec<PathBuf>> {
    let read_err = |e: std::io::Error| crate::Error::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_dir() && !file_name(&path).starts_with('.') {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn file_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => String::new(),
    }
}
