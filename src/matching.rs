//! Nearest-neighbour matching of timestamp sequences.
//!
//! Given `K` sorted timestamp sequences, one sequence acts
//! as the reference. For every reference timestamp, the
//! closest timestamp of each other sequence is selected.
//! The result is one index list per sequence, all of the
//! reference's length, which can be fed to
//! [`resample_arrays`][crate::resample::resample_arrays].
//!
//! ```rust
//! # fn main() -> htpa_sync::Result<()> {
//! use htpa_sync::matching::match_timestamps;
//!
//! let reference = [1., 2., 3., 4., 5.];
//! let other = [1.1, 2.1, 2.9, 3.6, 5.1, 6., 6.1];
//! let third = [0.9, 1.2, 2., 3., 4.1, 4.2, 4.3, 4.9];
//! let indices = match_timestamps(&[&reference[..], &other[..], &third[..]])?;
//! assert_eq!(indices[2], vec![0, 2, 3, 4, 7]);
//! # Ok(())
//! # }
//! ```
use serde_derive::*;

use crate::error::{Error, Result};

/// Selects which sequence drives the matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reference {
    /// The first sequence passed in.
    First,
    /// The shortest sequence (the first one on ties).
    Shortest,
}

impl Default for Reference {
    fn default() -> Self {
        Reference::First
    }
}

impl Reference {
    /// Position of the driving sequence.
    pub fn position(self, sequences: &[&[f64]]) -> usize {
        match self {
            Reference::First => 0,
            Reference::Shortest => sequences
                .iter()
                .enumerate()
                .min_by_key(|(_, seq)| seq.len())
                .map(|(idx, _)| idx)
                .unwrap_or(0),
        }
    }
}

/// Match timestamp sequences against the first one.
///
/// Equivalent to [`match_timestamps_with`] using
/// [`Reference::First`].
pub fn match_timestamps(sequences: &[&[f64]]) -> Result<Vec<Vec<usize>>> {
    match_timestamps_with(sequences, Reference::First)
}

/// Match timestamp sequences against a reference.
///
/// Returns one index list per input sequence, in input
/// order. The reference's own list is the identity. Two
/// reference timestamps may select the same index of
/// another sequence; no deduplication is done, and no
/// tolerance is enforced.
pub fn match_timestamps_with(
    sequences: &[&[f64]],
    reference: Reference,
) -> Result<Vec<Vec<usize>>> {
    if let Some(idx) = sequences.iter().position(|seq| seq.is_empty()) {
        return Err(Error::alignment(format!(
            "timestamp sequence #{} is empty",
            idx
        )));
    }
    if sequences.is_empty() {
        return Ok(vec![]);
    }

    let ref_idx = reference.position(sequences);
    let ref_seq = sequences[ref_idx];

    Ok(sequences
        .iter()
        .enumerate()
        .map(|(idx, seq)| {
            if idx == ref_idx {
                (0..ref_seq.len()).collect()
            } else {
                ref_seq.iter().map(|&t| nearest_index(seq, t)).collect()
            }
        })
        .collect())
}

/// Index of the element of a sorted, non-empty `seq`
/// closest to `t`. Ties go to the earliest index.
pub fn nearest_index(seq: &[f64], t: f64) -> usize {
    debug_assert!(!seq.is_empty());

    // first index with seq[i] >= t
    let right = seq.partition_point(|&x| x < t);
    if right == 0 {
        return 0;
    }
    let left = first_of_value(seq, right - 1);
    if right == seq.len() {
        return left;
    }

    if (t - seq[left]).abs() <= (seq[right] - t).abs() {
        left
    } else {
        right
    }
}

// Walk back over equal values so repeated timestamps
// resolve to their first occurrence.
fn first_of_value(seq: &[f64], idx: usize) -> usize {
    let val = seq[idx];
    seq[..idx].partition_point(|&x| x < val)
}

/// Mean absolute difference between `reference` and the
/// timestamps of `other` matched to it.
pub fn mean_match_error(reference: &[f64], other: &[f64]) -> Result<f64> {
    let indices = match_timestamps(&[reference, other])?;
    let total: f64 = reference
        .iter()
        .zip(indices[1].iter())
        .map(|(t, &idx)| (t - other[idx]).abs())
        .sum();
    Ok(total / reference.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS1: [f64; 5] = [1., 2., 3., 4., 5.];
    const TS2: [f64; 7] = [1.1, 2.1, 2.9, 3.6, 5.1, 6., 6.1];
    const TS3: [f64; 8] = [0.9, 1.2, 2., 3., 4.1, 4.2, 4.3, 4.9];

    #[test]
    fn three_sequences() -> Result<()> {
        let result = match_timestamps(&[&TS1[..], &TS2[..], &TS3[..]])?;
        assert_eq!(
            result,
            vec![
                vec![0, 1, 2, 3, 4],
                vec![0, 1, 2, 3, 4],
                vec![0, 2, 3, 4, 7],
            ]
        );
        Ok(())
    }

    #[test]
    fn first_sequence_drives() -> Result<()> {
        let result = match_timestamps(&[&TS2[..], &TS1[..]])?;
        assert_eq!(result[0], (0..7).collect::<Vec<_>>());
        assert_eq!(result[1], vec![0, 1, 2, 3, 4, 4, 4]);
        Ok(())
    }

    #[test]
    fn shortest_sequence_drives() -> Result<()> {
        let seqs = [&TS3[..], &TS1[..], &TS2[..], &TS3[..], &TS2[..]];
        let result = match_timestamps_with(&seqs, Reference::Shortest)?;
        assert_eq!(
            result,
            vec![
                vec![0, 2, 3, 4, 7],
                vec![0, 1, 2, 3, 4],
                vec![0, 1, 2, 3, 4],
                vec![0, 2, 3, 4, 7],
                vec![0, 1, 2, 3, 4],
            ]
        );
        Ok(())
    }

    #[test]
    fn identical_sequences_are_identity() -> Result<()> {
        let result = match_timestamps(&[&TS3[..], &TS3[..], &TS3[..]])?;
        for indices in result {
            assert_eq!(indices, (0..TS3.len()).collect::<Vec<_>>());
        }
        Ok(())
    }

    #[test]
    fn deterministic() -> Result<()> {
        let seqs = [&TS2[..], &TS3[..], &TS1[..]];
        assert_eq!(match_timestamps(&seqs)?, match_timestamps(&seqs)?);
        Ok(())
    }

    #[test]
    fn duplicates_are_kept() -> Result<()> {
        let reference = [1.0, 1.1, 1.2, 3.0];
        let other = [1.1, 3.0];
        let result = match_timestamps(&[&reference[..], &other[..]])?;
        assert_eq!(result[1], vec![0, 0, 0, 1]);
        Ok(())
    }

    #[test]
    fn ties_prefer_earlier_index() {
        assert_eq!(nearest_index(&[1., 2., 3.], 2.5), 1);
        assert_eq!(nearest_index(&[1., 2., 2., 2., 3.], 2.2), 1);
        assert_eq!(nearest_index(&[1., 2., 2., 3.], 2.), 1);
        assert_eq!(nearest_index(&[1., 1., 1.], 5.), 0);
        assert_eq!(nearest_index(&[1., 2.], -3.), 0);
        assert_eq!(nearest_index(&[1., 2.], 9.), 1);
    }

    #[test]
    fn empty_sequence_fails() {
        let empty: [f64; 0] = [];
        let err = match_timestamps(&[&TS1[..], &empty[..]]).unwrap_err();
        assert!(matches!(err, Error::AlignmentImpossible(_)));
    }

    #[test]
    fn mean_error() -> Result<()> {
        let err = mean_match_error(&TS1, &TS2)?;
        // |1-1.1| + |2-2.1| + |3-2.9| + |4-3.6| + |5-5.1|
        assert!((err - 0.8 / 5.).abs() < 1e-9);
        Ok(())
    }
}
