use crate::dataset::RawDataset;

pub use self::error::FetchError;
pub use self::shapefile_archive::ShapefileArchiveReader;

pub mod error;
pub mod shapefile_archive;

/// Retrieves named remote archives and decodes them into datasets
pub trait RemoteResourceReader {
    /// The kind of dataset this reader produces
    type Dataset: RawDataset;

    /// Retrieves the archive with the given name and decodes it
    fn fetch(&self, archive: &str) -> Result<Self::Dataset, FetchError>;
}
