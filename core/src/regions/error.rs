use thiserror::Error;

/// An error that happened while turning a dataset into [`Regions`](super::Regions)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The dataset does not have the requested column
    #[error("Column `{column}' not found in dataset")]
    MissingColumn { column: String },

    /// A text column contains a null value
    #[error("Column `{column}' has no value in row {row}")]
    NullValue { column: String, row: u32 },

    /// A row was added with the wrong number of values
    #[error("Row {row} has {actual} values but the dataset has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// The parallel sequences of a region set differ in length
    #[error(
        "Region set is inconsistent: {numbers} numbers, {geometries} geometries, \
        {names} names, {abbrevs} abbreviations"
    )]
    ShapeMismatch {
        numbers: usize,
        geometries: usize,
        names: usize,
        abbrevs: usize,
    },

    /// A name or abbreviation occurs more than once in a region set
    #[error("Duplicate value `{value}' in column `{column}'")]
    Duplicate { column: String, value: String },
}
