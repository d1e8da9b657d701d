use arrow_schema::DataType;
use clap::ValueEnum;
use enum_iterator::Sequence;

/// Column selection strategy.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, ValueEnum, Sequence)]
pub enum ColumnSelection {
    All,
    Alternate,
    FirstHalf,
    SecondHalf,
}

/// Row selection strategy.
///
/// Shared vocabulary for benchmark drivers. Not all readers honor all values;
/// applicability is the reader's concern, not this crate's.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, ValueEnum, Sequence)]
pub enum RowSelection {
    All,
    ByteRange,
    RowCount,
    SkipFooter,
    Stripes,
    RowGroups,
}

/// Selects a subset of column indexes based on the input strategy.
///
/// Halves split at `num_cols / 2`; for odd column counts the extra column
/// belongs to the second half.
pub fn select_column_indexes(num_cols: usize, col_sel: ColumnSelection) -> Vec<usize> {
    match col_sel {
        ColumnSelection::All => (0..num_cols).collect(),
        ColumnSelection::Alternate => (0..num_cols).step_by(2).collect(),
        ColumnSelection::FirstHalf => (0..num_cols / 2).collect(),
        ColumnSelection::SecondHalf => (num_cols / 2..num_cols).collect(),
    }
}

/// Selects a subset of columns from the array of names, applying the same
/// partitioning as [`select_column_indexes`] positionally.
pub fn select_column_names(col_names: &[String], col_sel: ColumnSelection) -> Vec<String> {
    select_column_indexes(col_names.len(), col_sel)
        .into_iter()
        .map(|idx| col_names[idx].clone())
        .collect()
}

/// Rearranges `ids` so that the columns later picked with `col_sel` add up to
/// a fixed fraction of the total table size, regardless of the data types.
///
/// All, FirstHalf and SecondHalf get the list concatenated with itself, so
/// either half is one full copy of the input schema. Alternate duplicates
/// each entry in place, so every second column again covers one full copy.
/// Selected columns therefore always account for half the total size (all of
/// it for All), and the output length is exactly twice the input length.
pub fn dtypes_for_column_selection(ids: &[DataType], col_sel: ColumnSelection) -> Vec<DataType> {
    let mut out_dtypes = Vec::with_capacity(2 * ids.len());
    match col_sel {
        ColumnSelection::All | ColumnSelection::FirstHalf | ColumnSelection::SecondHalf => {
            out_dtypes.extend_from_slice(ids);
            out_dtypes.extend_from_slice(ids);
        }
        ColumnSelection::Alternate => {
            for id in ids {
                out_dtypes.push(id.clone());
                out_dtypes.push(id.clone());
            }
        }
    }
    out_dtypes
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ColumnSelection::All, vec![0, 1, 2, 3, 4, 5, 6])]
    #[case(ColumnSelection::Alternate, vec![0, 2, 4, 6])]
    #[case(ColumnSelection::FirstHalf, vec![0, 1, 2])]
    #[case(ColumnSelection::SecondHalf, vec![3, 4, 5, 6])]
    fn indexes_for_odd_column_count(#[case] col_sel: ColumnSelection, #[case] expected: Vec<usize>) {
        assert_eq!(select_column_indexes(7, col_sel), expected);
    }

    #[rstest]
    #[case(ColumnSelection::FirstHalf, vec![0, 1])]
    #[case(ColumnSelection::SecondHalf, vec![2, 3])]
    fn even_column_counts_split_evenly(#[case] col_sel: ColumnSelection, #[case] expected: Vec<usize>) {
        assert_eq!(select_column_indexes(4, col_sel), expected);
    }

    #[test]
    fn names_follow_positional_split() {
        let names: Vec<String> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            select_column_names(&names, ColumnSelection::Alternate),
            vec!["a", "c", "e"]
        );
        assert_eq!(
            select_column_names(&names, ColumnSelection::SecondHalf),
            vec!["c", "d", "e"]
        );
    }

    #[test]
    fn selected_dtypes_cover_one_input_copy() {
        let ids = vec![DataType::Int64, DataType::Utf8, DataType::Float32];
        for col_sel in enum_iterator::all::<ColumnSelection>() {
            let out = dtypes_for_column_selection(&ids, col_sel);
            assert_eq!(out.len(), 2 * ids.len());

            let selected: Vec<DataType> = select_column_indexes(out.len(), col_sel)
                .into_iter()
                .map(|idx| out[idx].clone())
                .collect();
            match col_sel {
                // All picks both copies of the schema
                ColumnSelection::All => assert_eq!(selected.len(), 2 * ids.len()),
                // every other strategy picks exactly one full copy
                _ => assert_eq!(selected, ids),
            }
        }
    }

    #[test]
    fn output_length_is_independent_of_concrete_types() {
        let narrow = vec![DataType::Int8, DataType::Boolean];
        let wide = vec![DataType::Utf8, DataType::Decimal128(38, 10)];
        for col_sel in enum_iterator::all::<ColumnSelection>() {
            assert_eq!(
                dtypes_for_column_selection(&narrow, col_sel).len(),
                dtypes_for_column_selection(&wide, col_sel).len(),
            );
        }
    }
}
