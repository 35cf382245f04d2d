use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Directory resolution ──
    #[error("failed to list directory {path}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "ambiguous directory detection in {base_dir} ({finals} *_final, {bases} other); \
         pass --project-dir and --final-dir, or keep the {{X}} and {{X}}_final layout"
    )]
    AmbiguousDetection {
        base_dir: PathBuf,
        finals: usize,
        bases: usize,
    },

    #[error("cannot deduce final directory: expected {expected} (the {{project}}_final convention)")]
    CannotDeduceFinal { expected: PathBuf },

    #[error("cannot deduce project directory from final directory {final_dir}: {reason}")]
    CannotDeduceProject {
        final_dir: PathBuf,
        reason: String,
    },

    // ── Configuration values ──
    #[error("project name is empty; pass --project-name or rename {0}")]
    EmptyProjectName(PathBuf),

    #[error("invalid date tag '{0}': expected YY-MM-DD")]
    InvalidDateTag(String),

    // ── Structure validation ──
    #[error("missing required files:\n{}", format_paths(paths))]
    MissingFiles { paths: Vec<PathBuf> },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("- {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}
