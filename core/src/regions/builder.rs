use itertools::Itertools;

use crate::dataset::RawDataset;

use super::{BuildError, Regions};

/// Converts a dataset into [`Regions`]
pub trait RegionSetBuilder<D: RawDataset> {
    /// Builds a region set from all rows of `dataset`, taking region names
    /// and abbreviations from the given columns. Must not modify `dataset`.
    fn build(
        &self,
        dataset: &D,
        name_column: &str,
        abbrev_column: &str,
        name: &str,
        source: &str,
        overlap: bool,
    ) -> Result<Regions, BuildError>;
}

/// The default [`RegionSetBuilder`]. Region numbers are the dataset's row
/// IDs. Names and abbreviations must be unique within one region set.
#[derive(Debug, Default, Clone, Copy)]
pub struct DatasetRegionBuilder;

fn check_unique(column: &str, values: &[String]) -> Result<(), BuildError> {
    match values.iter().duplicates().next() {
        Some(d) => Err(BuildError::Duplicate {
            column: column.to_string(),
            value: d.clone(),
        }),
        None => Ok(()),
    }
}

impl<D: RawDataset> RegionSetBuilder<D> for DatasetRegionBuilder {
    fn build(
        &self,
        dataset: &D,
        name_column: &str,
        abbrev_column: &str,
        name: &str,
        source: &str,
        overlap: bool,
    ) -> Result<Regions, BuildError> {
        let names = dataset.column_as_strings(name_column)?;
        let abbrevs = dataset.column_as_strings(abbrev_column)?;
        check_unique(name_column, &names)?;
        check_unique(abbrev_column, &abbrevs)?;

        Regions::new(
            dataset.row_ids(),
            dataset.geometries(),
            names,
            abbrevs,
            name,
            source,
            overlap,
        )
    }
}
