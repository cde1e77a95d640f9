//! Shape helpers for frame sequences shaped `[frames,
//! height, width]`.
use ndarray::{s, Array2, Array3, ArrayView3, Axis};

use crate::error::{Error, Result};

/// Flatten `[frames, height, width]` to `[frames, height *
/// width]` (row-major within a frame).
pub fn flatten_frames(frames: ArrayView3<f32>) -> Array2<f32> {
    let (n, height, width) = frames.dim();
    Array2::from_shape_fn((n, height * width), |(idx, k)| {
        frames[(idx, k / width, k % width)]
    })
}

/// Inverse of [`flatten_frames`] for square frames.
pub fn reshape_flattened_frames(flat: Array2<f32>) -> Result<Array3<f32>> {
    let (n, elements) = flat.dim();
    let side = (elements as f64).sqrt().round() as usize;
    if side * side != elements {
        return Err(Error::alignment(format!(
            "{} values per frame do not form a square frame",
            elements
        )));
    }
    flat.as_standard_layout()
        .into_owned()
        .into_shape((n, side, side))
        .map_err(|e| Error::alignment(e.to_string()))
}

/// Crop the center of every frame.
///
/// A `None` dimension keeps the full extent. Odd margins
/// put the extra pixel at the end.
pub fn crop_center(
    frames: ArrayView3<f32>,
    height: Option<usize>,
    width: Option<usize>,
) -> Result<Array3<f32>> {
    let (_, full_h, full_w) = frames.dim();
    let height = height.unwrap_or(full_h);
    let width = width.unwrap_or(full_w);
    if height > full_h || width > full_w {
        return Err(Error::alignment(format!(
            "crop {}x{} exceeds frame {}x{}",
            height, width, full_h, full_w
        )));
    }
    let top = (full_h - height) / 2;
    let left = (full_w - width) / 2;
    Ok(frames
        .slice(s![.., top..top + height, left..left + width])
        .to_owned())
}

/// Frame durations derived from timestamps.
///
/// `N` timestamps give `N - 1` durations; the last frame
/// gets `last` or, if `None`, the previous duration.
pub fn timestamps_to_frame_durations(timestamps: &[f64], last: Option<f64>) -> Vec<f64> {
    let mut durations: Vec<f64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
    if let Some(last) = last.or_else(|| durations.last().copied()) {
        durations.push(last);
    }
    durations
}

/// Number of frames of a sequence.
pub fn frame_count(frames: &Array3<f32>) -> usize {
    frames.len_of(Axis(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn sequence(n: usize, h: usize, w: usize) -> Array3<f32> {
        Array::from_iter((0..n * h * w).map(|v| v as f32))
            .into_shape((n, h, w))
            .unwrap()
    }

    #[test]
    fn flatten_and_reshape() -> Result<()> {
        let frames = sequence(3, 32, 32);
        let flat = flatten_frames(frames.view());
        assert_eq!(flat.dim(), (3, 32 * 32));
        let first: Vec<f32> = frames.slice(s![0, .., ..]).iter().copied().collect();
        assert_eq!(flat.row(0).to_vec(), first);
        assert_eq!(reshape_flattened_frames(flat)?, frames);
        Ok(())
    }

    #[test]
    fn reshape_rejects_non_square() {
        let flat = Array2::<f32>::zeros((2, 10));
        assert!(reshape_flattened_frames(flat).is_err());
    }

    #[test]
    fn crop() -> Result<()> {
        let frames = sequence(2, 6, 8);
        let cropped = crop_center(frames.view(), Some(2), Some(4))?;
        assert_eq!(cropped.dim(), (2, 2, 4));
        assert_eq!(cropped[(0, 0, 0)], frames[(0, 2, 2)]);
        assert_eq!(cropped[(1, 1, 3)], frames[(1, 3, 5)]);

        assert_eq!(crop_center(frames.view(), None, None)?, frames);
        assert_eq!(crop_center(frames.view(), None, Some(2))?.dim(), (2, 6, 2));
        assert!(crop_center(frames.view(), Some(7), None).is_err());
        Ok(())
    }

    #[test]
    fn frame_durations() {
        assert_eq!(timestamps_to_frame_durations(&[1., 2., 4.], None), vec![1., 2., 2.]);
        assert_eq!(timestamps_to_frame_durations(&[1., 2., 4.], Some(0.5)), vec![1., 2., 0.5]);
        assert!(timestamps_to_frame_durations(&[], None).is_empty());
    }
}
