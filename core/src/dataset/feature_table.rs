use std::sync::Arc;

use geo::MultiPolygon;
use rustc_hash::FxHashMap;

use crate::regions::BuildError;

use super::{RawDataset, Value};

/// A single row of a [`FeatureTable`]
#[derive(Debug)]
struct Row {
    /// The row's position in the table it was originally built as
    id: u32,
    geometry: MultiPolygon,
    values: Vec<Value>,
}

/// An immutable in-memory [`RawDataset`]. Filtering shares rows with the
/// source table, so clones and filtered tables are cheap.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    columns: Arc<[String]>,
    column_index: Arc<FxHashMap<String, usize>>,
    rows: Vec<Arc<Row>>,
}

/// Incrementally builds a [`FeatureTable`]
#[derive(Debug)]
pub struct FeatureTableBuilder {
    columns: Vec<String>,
    rows: Vec<Arc<Row>>,
}

impl FeatureTableBuilder {
    /// Appends a row. `values` must contain exactly one value per column.
    pub fn push_row(
        &mut self,
        geometry: MultiPolygon,
        values: Vec<Value>,
    ) -> Result<&mut Self, BuildError> {
        if values.len() != self.columns.len() {
            return Err(BuildError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        self.rows.push(Arc::new(Row {
            id: self.rows.len() as u32,
            geometry,
            values,
        }));
        Ok(self)
    }

    pub fn build(self) -> FeatureTable {
        let column_index = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        FeatureTable {
            columns: self.columns.into(),
            column_index: Arc::new(column_index),
            rows: self.rows,
        }
    }
}

impl FeatureTable {
    /// Starts building a table with the given attribute columns
    pub fn builder<I, S>(columns: I) -> FeatureTableBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FeatureTableBuilder {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn column_position(&self, column: &str) -> Result<usize, BuildError> {
        self.column_index
            .get(column)
            .copied()
            .ok_or_else(|| BuildError::MissingColumn {
                column: column.to_string(),
            })
    }

    /// Returns the value of the given column in the row at position `row`
    pub fn value(&self, row: usize, column: &str) -> Result<Option<&Value>, BuildError> {
        let pos = self.column_position(column)?;
        Ok(self.rows.get(row).map(|r| &r.values[pos]))
    }
}

impl RawDataset for FeatureTable {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }

    fn filter_rows_where_column_contains(
        &self,
        column: &str,
        substring: &str,
    ) -> Result<Self, BuildError> {
        let pos = self.column_position(column)?;
        let rows = self
            .rows
            .iter()
            .filter(|r| {
                r.values[pos]
                    .as_text()
                    .is_some_and(|t| t.contains(substring))
            })
            .cloned()
            .collect();
        Ok(Self {
            columns: Arc::clone(&self.columns),
            column_index: Arc::clone(&self.column_index),
            rows,
        })
    }

    fn column_as_strings(&self, column: &str) -> Result<Vec<String>, BuildError> {
        let pos = self.column_position(column)?;
        self.rows
            .iter()
            .map(|r| match r.values[pos].as_text() {
                Some(t) => Ok(t.into_owned()),
                None => Err(BuildError::NullValue {
                    column: column.to_string(),
                    row: r.id,
                }),
            })
            .collect()
    }

    fn geometries(&self) -> Vec<MultiPolygon> {
        self.rows.iter().map(|r| r.geometry.clone()).collect()
    }

    fn row_ids(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use assertor::{assert_that, EqualityAssertion, ResultAssertion};
    use geo::MultiPolygon;
    use pretty_assertions::assert_eq;

    use crate::{
        dataset::{RawDataset, Value},
        regions::BuildError,
    };

    use super::FeatureTable;

    fn table() -> FeatureTable {
        let mut b = FeatureTable::builder(["Name", "Type", "Id"]);
        for (name, ty, id) in [
            ("Greenland/Iceland", Value::from("Land"), 0i64),
            ("Arctic-Ocean", Value::from("Ocean"), 1),
            ("Mediterranean", Value::from("Land-Ocean"), 2),
            ("Unknown", Value::Null, 3),
        ] {
            b.push_row(
                MultiPolygon::new(vec![]),
                vec![name.into(), ty, id.into()],
            )
            .unwrap();
        }
        b.build()
    }

    #[test]
    fn filter_by_substring() {
        let t = table();

        let land = t.filter_rows_where_column_contains("Type", "Land").unwrap();
        assert_eq!(land.row_ids(), vec![0, 2]);
        assert_eq!(
            land.column_as_strings("Name").unwrap(),
            vec!["Greenland/Iceland", "Mediterranean"]
        );

        let ocean = t.filter_rows_where_column_contains("Type", "Ocean").unwrap();
        assert_eq!(ocean.row_ids(), vec![1, 2]);

        // matching is case-sensitive
        let none = t.filter_rows_where_column_contains("Type", "land").unwrap();
        assert!(none.is_empty());

        // the source table is untouched
        assert_that!(t.len()).is_equal_to(4);
    }

    #[test]
    fn filtered_table_keeps_original_ids() {
        let t = table();
        let ocean = t.filter_rows_where_column_contains("Type", "Ocean").unwrap();
        let mixed = ocean
            .filter_rows_where_column_contains("Type", "Land")
            .unwrap();
        assert_eq!(mixed.row_ids(), vec![2]);
    }

    #[test]
    fn non_string_columns() {
        let t = table();
        assert_eq!(
            t.column_as_strings("Id").unwrap(),
            vec!["0", "1", "2", "3"]
        );
    }

    #[test]
    fn missing_column() {
        let t = table();
        assert_that!(t.column_as_strings("Acronym")).has_err(BuildError::MissingColumn {
            column: "Acronym".to_string(),
        });
        assert_that!(t.filter_rows_where_column_contains("Kind", "Land")).is_err();
    }

    #[test]
    fn null_value() {
        let t = table();
        assert_that!(t.column_as_strings("Type")).has_err(BuildError::NullValue {
            column: "Type".to_string(),
            row: 3,
        });
    }

    #[test]
    fn row_width() {
        let mut b = FeatureTable::builder(["Name", "Type"]);
        assert_that!(b
            .push_row(MultiPolygon::new(vec![]), vec!["x".into()])
            .map(|_| ()))
        .has_err(BuildError::RowWidth {
            row: 0,
            expected: 2,
            actual: 1,
        });
    }

    #[test]
    fn column_names_and_values() {
        let t = table();
        assert_eq!(t.column_names(), vec!["Name", "Type", "Id"]);
        assert_that!(t.value(1, "Type").unwrap()).is_equal_to(Some(&Value::from("Ocean")));
        assert_that!(t.value(9, "Type").unwrap()).is_equal_to(None);
    }
}
