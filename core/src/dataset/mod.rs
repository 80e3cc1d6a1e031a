use geo::MultiPolygon;

use crate::regions::BuildError;

pub use self::feature_table::{FeatureTable, FeatureTableBuilder};
pub use self::value::Value;

pub mod feature_table;
pub mod value;

/// A tabular dataset whose rows carry one geometry and a set of named
/// attribute columns.
///
/// This is the only capability set the region collection and the region
/// builder need from a dataset. Implementations must be immutable: filtering
/// returns a new dataset and leaves `self` untouched.
pub trait RawDataset: Sized {
    /// Returns the number of rows
    fn len(&self) -> usize;

    /// Checks if the dataset has no rows
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the names of all attribute columns in their original order
    fn column_names(&self) -> Vec<&str>;

    /// Returns a new dataset that only contains the rows whose value in
    /// `column` contains `substring`. The test is case-sensitive. Null
    /// values never match.
    fn filter_rows_where_column_contains(
        &self,
        column: &str,
        substring: &str,
    ) -> Result<Self, BuildError>;

    /// Returns the text form of every value in the given column, in row
    /// order
    fn column_as_strings(&self, column: &str) -> Result<Vec<String>, BuildError>;

    /// Returns the geometries of all rows, in row order
    fn geometries(&self) -> Vec<MultiPolygon>;

    /// Returns the position each row had in the original, unfiltered
    /// dataset
    fn row_ids(&self) -> Vec<u32>;
}
