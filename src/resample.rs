//! Resampling of parallel sequences by stride or by index
//! lists.
use ndarray::{Array3, Axis};

use crate::error::{Error, Result};

/// How to resample a collection of sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sampling {
    /// Return every sequence unchanged.
    Identity,
    /// Keep every `n`-th element, starting at index 0.
    Step(usize),
    /// Gather the given indices, one list per sequence.
    Indices(Vec<Vec<usize>>),
}

impl Default for Sampling {
    fn default() -> Self {
        Sampling::Identity
    }
}

impl Sampling {
    /// Build from the optional `indices` / `step` pair.
    ///
    /// When both are given, `indices` wins and `step` is
    /// ignored.
    pub fn from_options(indices: Option<Vec<Vec<usize>>>, step: Option<usize>) -> Self {
        match (indices, step) {
            (Some(indices), _) => Sampling::Indices(indices),
            (None, Some(step)) => Sampling::Step(step),
            (None, None) => Sampling::Identity,
        }
    }
}

/// A sequence indexable along its first axis.
pub trait Gather: Sized {
    fn seq_len(&self) -> usize;

    /// New sequence made of the elements at `indices`, in
    /// that order. Indices are bounds-checked by the caller.
    fn gather(&self, indices: &[usize]) -> Self;

    fn every_nth(&self, step: usize) -> Self {
        let indices: Vec<usize> = (0..self.seq_len()).step_by(step).collect();
        self.gather(&indices)
    }
}

impl<T: Clone> Gather for Vec<T> {
    fn seq_len(&self) -> usize {
        self.len()
    }

    fn gather(&self, indices: &[usize]) -> Self {
        indices.iter().map(|&idx| self[idx].clone()).collect()
    }
}

impl<T: Clone> Gather for Array3<T> {
    fn seq_len(&self) -> usize {
        self.len_of(Axis(0))
    }

    fn gather(&self, indices: &[usize]) -> Self {
        self.select(Axis(0), indices)
    }
}

/// Gather `indices` from a single sequence, checking
/// bounds first.
pub fn gather_checked<S: Gather>(seq: &S, indices: &[usize]) -> Result<S> {
    let len = seq.seq_len();
    if let Some(&idx) = indices.iter().find(|&&idx| idx >= len) {
        return Err(Error::alignment(format!(
            "index {} out of bounds for sequence of length {}",
            idx, len
        )));
    }
    Ok(seq.gather(indices))
}

/// Resample a collection of sequences.
///
/// The output has one sequence per input. With
/// [`Sampling::Indices`] the number of index lists must
/// match the number of sequences.
pub fn resample_arrays<S: Gather + Clone>(seqs: &[S], sampling: &Sampling) -> Result<Vec<S>> {
    match sampling {
        Sampling::Identity => Ok(seqs.to_vec()),
        Sampling::Step(0) => Err(Error::alignment("resampling step must be positive")),
        Sampling::Step(step) => Ok(seqs.iter().map(|s| s.every_nth(*step)).collect()),
        Sampling::Indices(indices) => {
            if indices.len() != seqs.len() {
                return Err(Error::alignment(format!(
                    "got {} index lists for {} sequences",
                    indices.len(),
                    seqs.len()
                )));
            }
            seqs.iter()
                .zip(indices.iter())
                .map(|(seq, idx)| gather_checked(seq, idx))
                .collect()
        }
    }
}

/// Resample timestamp lists; see [`resample_arrays`].
pub fn resample_timestamps(timestamps: &[Vec<f64>], sampling: &Sampling) -> Result<Vec<Vec<f64>>> {
    resample_arrays(timestamps, sampling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr3, Array};

    fn arange(frames: usize) -> Array3<i64> {
        Array::from_iter(0..(frames * 4) as i64)
            .into_shape((frames, 2, 2))
            .unwrap()
    }

    #[test]
    fn indices() -> Result<()> {
        let a1 = arange(10);
        let a2 = arange(10);
        let a3 = arange(10) * 5;
        let sampling = Sampling::Indices(vec![vec![0, 2, 5], vec![0, 1, 3], vec![0, 1, 3]]);
        let result = resample_arrays(&[a1, a2, a3], &sampling)?;

        let expected1 = arr3(&[[[0, 1], [2, 3]], [[8, 9], [10, 11]], [[20, 21], [22, 23]]]);
        let expected2 = arr3(&[[[0, 1], [2, 3]], [[4, 5], [6, 7]], [[12, 13], [14, 15]]]);
        let expected3 = &expected2 * 5;
        assert_eq!(result, vec![expected1, expected2, expected3]);
        Ok(())
    }

    #[test]
    fn step() -> Result<()> {
        let a1 = arange(4);
        let a2 = arange(8);
        let result = resample_arrays(&[a1, a2], &Sampling::Step(2))?;

        assert_eq!(result[0], arr3(&[[[0, 1], [2, 3]], [[8, 9], [10, 11]]]));
        assert_eq!(
            result[1],
            arr3(&[
                [[0, 1], [2, 3]],
                [[8, 9], [10, 11]],
                [[16, 17], [18, 19]],
                [[24, 25], [26, 27]]
            ])
        );
        Ok(())
    }

    #[test]
    fn identity() -> Result<()> {
        let input = vec![arange(4), arange(8), arange(8) * 5];
        assert_eq!(resample_arrays(&input, &Sampling::Identity)?, input);
        assert_eq!(resample_arrays(&input, &Sampling::Step(1))?, input);

        let all = Sampling::Indices(vec![(0..4).collect(), (0..8).collect(), (0..8).collect()]);
        assert_eq!(resample_arrays(&input, &all)?, input);
        Ok(())
    }

    #[test]
    fn stride_of_short_sequence() -> Result<()> {
        let result = resample_arrays(&[vec!['a', 'b', 'c', 'd']], &Sampling::Step(2))?;
        assert_eq!(result, vec![vec!['a', 'c']]);
        let result = resample_arrays(&[vec![1, 2, 3, 4, 5]], &Sampling::Step(2))?;
        assert_eq!(result[0].len(), 3);
        Ok(())
    }

    #[test]
    fn timestamps_by_indices() -> Result<()> {
        let ts1 = vec![1., 2., 3., 4., 5.];
        let ts2 = vec![1.1, 2.1, 2.9, 3.6, 5.1, 6., 6.1];
        let ts3 = vec![0.9, 1.2, 2., 3., 4.1, 4.2, 4.3, 4.9];
        let sampling = Sampling::Indices(vec![
            vec![0, 1, 2, 3, 4],
            vec![0, 1, 2, 3, 4],
            vec![0, 2, 3, 4, 7],
        ]);
        let result = resample_timestamps(&[ts1.clone(), ts2.clone(), ts3], &sampling)?;
        assert_eq!(
            result,
            vec![ts1, ts2[..5].to_vec(), vec![0.9, 2.0, 3.0, 4.1, 4.9]]
        );
        Ok(())
    }

    #[test]
    fn timestamps_by_step() -> Result<()> {
        let ts1 = vec![1., 2., 3., 4., 5.];
        let ts2 = vec![1.1, 2.1, 2.9, 3.6, 5.1, 6., 6.1];
        let ts3 = vec![0.9, 1.2, 2., 3., 4.1, 4.2, 4.3, 4.9];
        let result = resample_timestamps(&[ts1, ts2, ts3], &Sampling::Step(2))?;
        assert_eq!(
            result,
            vec![
                vec![1., 3., 5.],
                vec![1.1, 2.9, 5.1, 6.1],
                vec![0.9, 2., 4.1, 4.3]
            ]
        );
        Ok(())
    }

    #[test]
    fn indices_take_precedence() {
        let sampling = Sampling::from_options(Some(vec![vec![1]]), Some(3));
        assert_eq!(sampling, Sampling::Indices(vec![vec![1]]));
        assert_eq!(Sampling::from_options(None, Some(3)), Sampling::Step(3));
        assert_eq!(Sampling::from_options(None, None), Sampling::Identity);
    }

    #[test]
    fn rejects_bad_input() {
        let seqs = vec![vec![1., 2.]];
        assert!(resample_timestamps(&seqs, &Sampling::Step(0)).is_err());
        assert!(resample_timestamps(&seqs, &Sampling::Indices(vec![vec![2]])).is_err());
        assert!(resample_timestamps(&seqs, &Sampling::Indices(vec![])).is_err());
    }
}
