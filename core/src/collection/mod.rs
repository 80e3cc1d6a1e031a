use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    dataset::RawDataset,
    regions::{BuildError, RegionSetBuilder, Regions},
    remote::{FetchError, RemoteResourceReader},
    util::materialize::MaterializeOnce,
};

pub use self::error::Error;

pub mod error;

/// Constant data describing a region collection: where its archive comes
/// from, which columns hold what, and how its views are labeled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionDefinition {
    /// Name of the remote archive
    pub archive: &'static str,

    /// Column containing region names
    pub name_column: &'static str,

    /// Column containing region abbreviations
    pub abbrev_column: &'static str,

    /// Column containing the free-text type classification
    pub type_column: &'static str,

    /// Display name of the collection and of its `all` view
    pub name: &'static str,

    /// Source citation
    pub source: &'static str,

    /// Substring in the type column that marks land regions
    pub land_marker: &'static str,

    /// Substring in the type column that marks ocean regions
    pub ocean_marker: &'static str,

    /// Appended to the display name of the land view
    pub land_suffix: &'static str,

    /// Appended to the display name of the ocean view
    pub ocean_suffix: &'static str,

    /// Whether regions may overlap each other
    pub overlap: bool,

    /// Where to read more about the regions
    pub reference: &'static str,
}

/// One of the derived subsets of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Every region
    All,

    /// Regions whose type contains the land marker
    Land,

    /// Regions whose type contains the ocean marker
    Ocean,
}

impl View {
    /// Every view, in display order
    pub const ALL: [View; 3] = [View::All, View::Land, View::Ocean];

    /// Short identifier of the view
    pub fn key(&self) -> &'static str {
        match self {
            View::All => "all",
            View::Land => "land",
            View::Ocean => "ocean",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            View::All => "All regions (land + ocean)",
            View::Land => "Land regions only",
            View::Ocean => "Ocean regions only",
        }
    }
}

/// A lazily computed field of a [`RegionCollection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Dataset,
    View(View),
}

/// A named collection of reference regions backed by one remote archive.
///
/// Construction does no I/O. The archive is fetched the first time any
/// accessor needs it and never again afterwards. Each view is built from
/// the fetched dataset on first access and kept for the lifetime of the
/// collection. Failed fetches and builds are not remembered, so a later
/// call tries again.
pub struct RegionCollection<R: RemoteResourceReader, B> {
    definition: CollectionDefinition,
    reader: R,
    builder: B,
    dataset: MaterializeOnce<R::Dataset>,
    all: MaterializeOnce<Regions>,
    land: MaterializeOnce<Regions>,
    ocean: MaterializeOnce<Regions>,
}

impl<R, B> RegionCollection<R, B>
where
    R: RemoteResourceReader,
    B: RegionSetBuilder<R::Dataset>,
{
    /// Creates a new collection. Nothing is fetched until an accessor is
    /// called.
    pub fn new(definition: CollectionDefinition, reader: R, builder: B) -> Self {
        Self {
            definition,
            reader,
            builder,
            dataset: MaterializeOnce::new(),
            all: MaterializeOnce::new(),
            land: MaterializeOnce::new(),
            ocean: MaterializeOnce::new(),
        }
    }

    /// The constant data this collection was created from
    pub fn definition(&self) -> &CollectionDefinition {
        &self.definition
    }

    /// The collection's display name
    pub fn name(&self) -> &str {
        self.definition.name
    }

    /// The collection's source citation
    pub fn source(&self) -> &str {
        self.definition.source
    }

    /// Returns the display name the given view has (or will have once it
    /// is built)
    pub fn view_name(&self, view: View) -> String {
        let d = &self.definition;
        match view {
            View::All => d.name.to_string(),
            View::Land => format!("{}{}", d.name, d.land_suffix),
            View::Ocean => format!("{}{}", d.name, d.ocean_suffix),
        }
    }

    /// Returns the dataset decoded from the remote archive. Fetches it on
    /// the first call.
    pub fn raw_dataset(&self) -> Result<Arc<R::Dataset>, FetchError> {
        self.dataset.get_or_try_init(|| {
            debug!(archive = self.definition.archive, "Fetching region archive");
            self.reader.fetch(self.definition.archive)
        })
    }

    /// All regions
    pub fn all(&self) -> Result<Arc<Regions>, Error> {
        self.view(View::All)
    }

    /// Regions classified as land. Regions of mixed type are included.
    pub fn land(&self) -> Result<Arc<Regions>, Error> {
        self.view(View::Land)
    }

    /// Regions classified as ocean. Regions of mixed type are included.
    pub fn ocean(&self) -> Result<Arc<Regions>, Error> {
        self.view(View::Ocean)
    }

    /// Returns the given view, building it on the first call
    pub fn view(&self, view: View) -> Result<Arc<Regions>, Error> {
        self.slot(view).get_or_try_init(|| self.build_view(view))
    }

    /// Checks if the given field has been computed already
    pub fn is_materialized(&self, field: Field) -> bool {
        match field {
            Field::Dataset => self.dataset.is_materialized(),
            Field::View(v) => self.slot(v).is_materialized(),
        }
    }

    fn slot(&self, view: View) -> &MaterializeOnce<Regions> {
        match view {
            View::All => &self.all,
            View::Land => &self.land,
            View::Ocean => &self.ocean,
        }
    }

    fn build_view(&self, view: View) -> Result<Regions, Error> {
        let dataset = self.raw_dataset()?;
        let d = &self.definition;
        debug!(collection = d.name, view = view.key(), "Building region view");

        // land and ocean are filtered from the raw dataset, never from `all`
        let regions = match view {
            View::All => self.build(&dataset, &self.view_name(view))?,
            View::Land => self.build_filtered(&dataset, d.land_marker, &self.view_name(view))?,
            View::Ocean => self.build_filtered(&dataset, d.ocean_marker, &self.view_name(view))?,
        };
        Ok(regions)
    }

    fn build(&self, dataset: &R::Dataset, name: &str) -> Result<Regions, BuildError> {
        let d = &self.definition;
        self.builder.build(
            dataset,
            d.name_column,
            d.abbrev_column,
            name,
            d.source,
            d.overlap,
        )
    }

    fn build_filtered(
        &self,
        dataset: &R::Dataset,
        marker: &str,
        name: &str,
    ) -> Result<Regions, BuildError> {
        let subset =
            dataset.filter_rows_where_column_contains(self.definition.type_column, marker)?;
        self.build(&subset, name)
    }
}

impl<R, B> fmt::Display for RegionCollection<R, B>
where
    R: RemoteResourceReader,
    B: RegionSetBuilder<R::Dataset>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - {}", self.name(), self.source())?;
        writeln!(f)?;
        writeln!(f, "Views:")?;
        for v in View::ALL {
            writeln!(
                f,
                "  {:<5}  {}: {}",
                v.key(),
                self.view_name(v),
                v.description()
            )?;
        }
        if !self.definition.reference.is_empty() {
            writeln!(f)?;
            writeln!(f, "See {}", self.definition.reference)?;
        }
        Ok(())
    }
}
