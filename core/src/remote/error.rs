use thiserror::Error;

/// An error that happened while retrieving or decoding a remote archive
#[derive(Error, Debug)]
pub enum FetchError {
    /// The archive could not be downloaded
    #[error("Unable to download `{url}': {message}")]
    Http { url: String, message: String },

    /// The archive could not be read from or written to the local cache
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The archive is not a valid ZIP file
    #[error("Unable to open archive `{archive}'")]
    Archive {
        archive: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// The archive does not contain a readable shapefile
    #[error("Archive `{archive}' does not contain a valid shapefile")]
    Malformed {
        archive: String,
        #[source]
        source: anyhow::Error,
    },
}
