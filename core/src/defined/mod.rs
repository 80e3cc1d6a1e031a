//! Ready-to-use region collections

use std::sync::OnceLock;

use crate::{
    collection::{CollectionDefinition, RegionCollection},
    regions::DatasetRegionBuilder,
    remote::ShapefileArchiveReader,
};

/// IPCC AR6 WGI reference regions (Iturbide et al., 2020)
pub const AR6: CollectionDefinition = CollectionDefinition {
    archive: "IPCC-WGI-reference-regions-v4.zip",
    name_column: "Name",
    abbrev_column: "Acronym",
    type_column: "Type",
    name: "AR6 reference regions",
    source: "Iturbide et al., 2020 (ESSD)",
    land_marker: "Land",
    ocean_marker: "Ocean",
    land_suffix: " (land only)",
    ocean_suffix: " (ocean only)",
    overlap: false,
    reference: "https://doi.org/10.5194/essd-12-2959-2020",
};

/// A collection backed by a shapefile archive from the region repository
pub type ShapefileCollection = RegionCollection<ShapefileArchiveReader, DatasetRegionBuilder>;

static AR6_COLLECTION: OnceLock<ShapefileCollection> = OnceLock::new();

/// Returns the process-wide AR6 collection.
///
/// The instance is created on first use and lives until the process exits.
/// Creating it does not touch the network; the archive is downloaded (or
/// read from the cache) when the first view is requested.
///
/// ```no_run
/// let land = georegions_core::defined::ar6().land()?;
/// println!("{land}");
/// # Ok::<(), georegions_core::collection::Error>(())
/// ```
pub fn ar6() -> &'static ShapefileCollection {
    AR6_COLLECTION.get_or_init(|| {
        RegionCollection::new(AR6, ShapefileArchiveReader::default(), DatasetRegionBuilder)
    })
}
