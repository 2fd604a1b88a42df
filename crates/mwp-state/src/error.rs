/// An error resulting from operations on a key-value store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// An internal unspecified error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Reading or writing the backing file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
