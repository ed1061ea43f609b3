use std::path::PathBuf;
use webex_api::data_processing::FileError;

/// Problems with the invocation itself, detected before any call to Webex.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid input file {}: {source}", .path.display())]
    InputFile {
        path: PathBuf,
        #[source]
        source: FileError,
    },

    #[error("no users found in {}", .0.display())]
    NoUsers(PathBuf),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
