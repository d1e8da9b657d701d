use std::ops::Range;

/// Returns the half-open range of segment indexes that belong to `chunk`
/// when `num_segments` file segments (Parquet row groups, ORC stripes) are
/// split into `num_chunks` contiguous pieces.
///
/// Chunk sizes differ by at most one segment and the remainder goes to the
/// earliest chunks, so 10 segments over 3 chunks yields `[0, 4)`, `[4, 7)`,
/// `[7, 10)`.
///
/// # Panics
///
/// If `num_chunks` is zero or `chunk` is out of range. Both are caller
/// contract violations, not recoverable errors.
pub fn segments_in_chunk(num_segments: usize, num_chunks: usize, chunk: usize) -> Range<usize> {
    assert!(
        num_chunks > 0,
        "cannot split {num_segments} segments into zero chunks"
    );
    assert!(
        chunk < num_chunks,
        "chunk index {chunk} out of range for {num_chunks} chunks"
    );
    let base = num_segments / num_chunks;
    let remainder = num_segments % num_chunks;
    let start = chunk * base + chunk.min(remainder);
    let end = start + base + usize::from(chunk < remainder);
    start..end
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0..4)]
    #[case(1, 4..7)]
    #[case(2, 7..10)]
    fn remainder_goes_to_earliest_chunks(#[case] chunk: usize, #[case] expected: Range<usize>) {
        assert_eq!(segments_in_chunk(10, 3, chunk), expected);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(5, 3)]
    #[case(17, 4)]
    #[case(3, 8)]
    fn chunks_partition_all_segments_exactly_once(
        #[case] num_segments: usize,
        #[case] num_chunks: usize,
    ) {
        let mut covered = Vec::new();
        let mut next_start = 0;
        for chunk in 0..num_chunks {
            let range = segments_in_chunk(num_segments, num_chunks, chunk);
            assert_eq!(range.start, next_start, "chunks must be gap-free");
            next_start = range.end;
            covered.extend(range);
        }
        assert_eq!(covered, (0..num_segments).collect::<Vec<_>>());
    }

    #[test]
    fn chunk_sizes_differ_by_at_most_one() {
        let sizes: Vec<usize> = (0..7).map(|c| segments_in_chunk(23, 7, c).len()).collect();
        let (min, max) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
        assert!(max - min <= 1);
    }

    #[test]
    #[should_panic(expected = "zero chunks")]
    fn zero_chunks_is_a_contract_violation() {
        segments_in_chunk(10, 0, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn chunk_index_out_of_range_is_a_contract_violation() {
        segments_in_chunk(10, 3, 3);
    }
}
