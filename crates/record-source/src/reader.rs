//! Row selection policies over a shared record table.

use crate::{RecordTable, SourceError};
use rand::Rng;
use std::sync::Arc;

/// A cursor over a shared [`RecordTable`], selecting rows by policy.
///
/// All variants share the same immutable table; only cursor state is
/// per-reader, so `clone()` yields an independent cursor over the same data.
#[derive(Debug, Clone)]
pub enum RecordReader {
    /// Rows in file order; fails hard once all rows are consumed.
    Sequential {
        table: Arc<RecordTable>,
        cursor: usize,
    },

    /// Rows in file order, wrapping back to row 0 after the last row.
    Circular {
        table: Arc<RecordTable>,
        cursor: usize,
    },

    /// A uniformly random row each call; may repeat.
    Random { table: Arc<RecordTable> },

    /// A random row with probability proportional to a numeric column.
    Weighted {
        table: Arc<RecordTable>,
        /// Running sums of the weight column, one entry per row.
        cumulative: Vec<f64>,
        total: f64,
    },
}

impl RecordReader {
    /// A sequential reader starting at row 0.
    pub fn sequential(table: Arc<RecordTable>) -> Self {
        Self::Sequential { table, cursor: 0 }
    }

    /// A circular reader starting at row 0.
    pub fn circular(table: Arc<RecordTable>) -> Result<Self, SourceError> {
        if table.is_empty() {
            return Err(SourceError::EmptyTable);
        }
        Ok(Self::Circular { table, cursor: 0 })
    }

    /// A uniform-random reader.
    pub fn random(table: Arc<RecordTable>) -> Result<Self, SourceError> {
        if table.is_empty() {
            return Err(SourceError::EmptyTable);
        }
        Ok(Self::Random { table })
    }

    /// A weighted-random reader over the named numeric column.
    ///
    /// Fails eagerly when the column is missing, any cell is not a
    /// non-negative number, or the column sums to zero.
    pub fn weighted(table: Arc<RecordTable>, column: &str) -> Result<Self, SourceError> {
        if table.is_empty() {
            return Err(SourceError::EmptyTable);
        }
        let col = table
            .column_index(column)
            .ok_or_else(|| SourceError::MissingColumn(column.to_string()))?;

        let mut cumulative = Vec::with_capacity(table.len());
        let mut total = 0.0;
        for row in 0..table.len() {
            let cell = &table.row(row)[col];
            let weight: f64 = cell.parse().map_err(|_| SourceError::BadWeight {
                row,
                column: column.to_string(),
                value: cell.clone(),
            })?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(SourceError::BadWeight {
                    row,
                    column: column.to_string(),
                    value: cell.clone(),
                });
            }
            total += weight;
            cumulative.push(total);
        }
        if total <= 0.0 {
            return Err(SourceError::ZeroWeightSum(column.to_string()));
        }

        Ok(Self::Weighted {
            table,
            cumulative,
            total,
        })
    }

    /// The shared table backing this reader.
    pub fn table(&self) -> &Arc<RecordTable> {
        match self {
            Self::Sequential { table, .. }
            | Self::Circular { table, .. }
            | Self::Random { table }
            | Self::Weighted { table, .. } => table,
        }
    }

    /// Select the next row index according to this reader's policy.
    ///
    /// Sequential readers fail with [`SourceError::Exhausted`] once every
    /// row has been returned; no other policy exhausts.
    pub fn next_index<R: Rng>(&mut self, rng: &mut R) -> Result<usize, SourceError> {
        match self {
            Self::Sequential { table, cursor } => {
                if *cursor >= table.len() {
                    return Err(SourceError::Exhausted { rows: table.len() });
                }
                let index = *cursor;
                *cursor += 1;
                Ok(index)
            }
            Self::Circular { table, cursor } => {
                let index = *cursor;
                *cursor = (*cursor + 1) % table.len();
                Ok(index)
            }
            Self::Random { table } => Ok(rng.gen_range(0..table.len())),
            Self::Weighted {
                cumulative, total, ..
            } => {
                let draw = rng.gen_range(0.0..*total);
                let index = cumulative.partition_point(|&sum| sum <= draw);
                Ok(index.min(cumulative.len() - 1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CsvSettings;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn three_rows() -> Arc<RecordTable> {
        let data = "name,weight\na,1\nb,2\nc,7\n";
        Arc::new(RecordTable::from_reader(data.as_bytes(), &CsvSettings::default()).unwrap())
    }

    #[test]
    fn test_sequential_exhausts_on_fourth_read() {
        let mut reader = RecordReader::sequential(three_rows());
        let mut rng = StdRng::seed_from_u64(42);

        assert_eq!(reader.next_index(&mut rng).unwrap(), 0);
        assert_eq!(reader.next_index(&mut rng).unwrap(), 1);
        assert_eq!(reader.next_index(&mut rng).unwrap(), 2);
        assert!(matches!(
            reader.next_index(&mut rng),
            Err(SourceError::Exhausted { rows: 3 })
        ));
    }

    #[test]
    fn test_circular_wraps_to_row_zero() {
        let mut reader = RecordReader::circular(three_rows()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let indices: Vec<_> = (0..7).map(|_| reader.next_index(&mut rng).unwrap()).collect();
        assert_eq!(indices, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_random_stays_in_bounds() {
        let mut reader = RecordReader::random(three_rows()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let index = reader.next_index(&mut rng).unwrap();
            assert!(index < 3);
        }
    }

    #[test]
    fn test_weighted_prefers_heavy_rows() {
        let mut reader = RecordReader::weighted(three_rows(), "weight").unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let mut counts = [0usize; 3];
        for _ in 0..10_000 {
            counts[reader.next_index(&mut rng).unwrap()] += 1;
        }

        // Weights 1:2:7 - row 2 must dominate and every row must appear
        assert!(counts.iter().all(|&c| c > 0));
        assert!(counts[2] > counts[1]);
        assert!(counts[1] > counts[0]);
    }

    #[test]
    fn test_weighted_missing_column() {
        let result = RecordReader::weighted(three_rows(), "missing");
        assert!(matches!(result, Err(SourceError::MissingColumn(_))));
    }

    #[test]
    fn test_weighted_non_numeric_column() {
        let result = RecordReader::weighted(three_rows(), "name");
        assert!(matches!(result, Err(SourceError::BadWeight { row: 0, .. })));
    }

    #[test]
    fn test_weighted_zero_sum() {
        let data = "v,w\nx,0\ny,0\n";
        let table =
            Arc::new(RecordTable::from_reader(data.as_bytes(), &CsvSettings::default()).unwrap());
        let result = RecordReader::weighted(table, "w");
        assert!(matches!(result, Err(SourceError::ZeroWeightSum(_))));
    }

    #[test]
    fn test_clone_duplicates_cursor_only() {
        let mut reader = RecordReader::sequential(three_rows());
        let mut rng = StdRng::seed_from_u64(42);

        reader.next_index(&mut rng).unwrap();
        let mut cloned = reader.clone();

        // Both continue from row 1, independently
        assert_eq!(reader.next_index(&mut rng).unwrap(), 1);
        assert_eq!(reader.next_index(&mut rng).unwrap(), 2);
        assert_eq!(cloned.next_index(&mut rng).unwrap(), 1);

        // The table itself is shared, not copied
        assert!(Arc::ptr_eq(reader.table(), cloned.table()));
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = Arc::new(
            RecordTable::from_reader("a,b\n".as_bytes(), &CsvSettings::default()).unwrap(),
        );
        assert!(matches!(
            RecordReader::circular(table.clone()),
            Err(SourceError::EmptyTable)
        ));
        assert!(matches!(
            RecordReader::random(table.clone()),
            Err(SourceError::EmptyTable)
        ));
        assert!(matches!(
            RecordReader::weighted(table, "a"),
            Err(SourceError::EmptyTable)
        ));
    }
}
