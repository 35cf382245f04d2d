use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("no 'FROM' line found in Dockerfile")]
    NoFromLine,

    #[error("no 'image:' line found in docker-compose.yml")]
    NoImageLine,

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
