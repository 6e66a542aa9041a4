//! Error type shared by the timeline, engine, config and source loaders.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A timeline needs at least one transition to define a state.
    #[error("timeline has no transitions")]
    EmptyTimeline,
    /// Bit index outside `0..width`.
    #[error("bit index {index} out of range for a {width}-bit bus")]
    IndexOutOfRange { index: usize, width: usize },
    /// Bus values are stored in a `u64`.
    #[error("bus width {0} is not supported (maximum is 64 bits)")]
    UnsupportedWidth(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("signal `{0}` not found in trace")]
    SignalNotFound(String),
    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
