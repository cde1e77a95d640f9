//! Pseudocoloring of temperature sequences and export as
//! still frames or animated GIFs.
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, DynamicImage, Frame, Rgb, RgbImage,
};
use ndarray::ArrayView3;

use crate::error::{Error, Result};

/// Approximate frame rate of the HTPA sensors.
pub const DEFAULT_FPS: f64 = 10.;

/// Map `0..=255` onto a blue-cyan-yellow-red scale.
pub fn jet(level: u8) -> Rgb<u8> {
    let x = level as f32 / 255.;
    let channel = |center: f32| {
        let v = 1.5 - (4. * x - center).abs();
        (v.max(0.).min(1.) * 255.).round() as u8
    };
    Rgb([channel(3.), channel(2.), channel(1.)])
}

/// Pseudocolor a sequence `[frames, height, width]`.
///
/// Levels are normalized by the minimum and maximum of the
/// whole sequence, so colors are comparable across frames.
pub fn apply_heatmap(frames: ArrayView3<f32>) -> Vec<RgbImage> {
    let (min, max) = frames
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    let level = |v: f32| {
        if range > 0. {
            (255. * (v - min) / range) as u8
        } else {
            0
        }
    };

    frames
        .outer_iter()
        .map(|frame| {
            let (height, width) = frame.dim();
            RgbImage::from_fn(width as u32, height as u32, |x, y| {
                jet(level(frame[(y as usize, x as usize)]))
            })
        })
        .collect()
}

/// Save every image as `dir/{idx}.{ext}`.
pub fn save_frames(images: &[RgbImage], dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    images
        .iter()
        .enumerate()
        .map(|(idx, img)| {
            let path = dir.join(format!("{}.{}", idx, ext));
            img.save(&path)?;
            Ok(path)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct GifOptions {
    /// Seconds per frame; one value per frame. When `None`,
    /// every frame lasts `1 / fps`.
    pub durations: Option<Vec<f64>>,
    pub fps: f64,
    /// Number of loops, `0` loops forever.
    pub loops: u16,
}

impl Default for GifOptions {
    fn default() -> Self {
        GifOptions {
            durations: None,
            fps: DEFAULT_FPS,
            loops: 0,
        }
    }
}

impl GifOptions {
    pub fn with_durations(durations: Vec<f64>) -> Self {
        GifOptions {
            durations: Some(durations),
            ..Default::default()
        }
    }

    fn delays(&self, frames: usize) -> Result<Vec<Delay>> {
        let seconds = match &self.durations {
            Some(d) if d.len() != frames => {
                return Err(Error::alignment(format!(
                    "{} durations for {} frames",
                    d.len(),
                    frames
                )))
            }
            Some(d) => d.clone(),
            None => vec![1. / self.fps; frames],
        };
        Ok(seconds
            .into_iter()
            .map(|s| Delay::from_numer_denom_ms((s.max(0.) * 1000.).round() as u32, 1))
            .collect())
    }
}

/// Encode pseudocolored frames as an animated GIF.
pub fn write_gif(images: &[RgbImage], path: &Path, opts: &GifOptions) -> Result<()> {
    let delays = opts.delays(images.len())?;

    let mut encoder = GifEncoder::new(BufWriter::new(File::create(path)?));
    encoder.set_repeat(match opts.loops {
        0 => Repeat::Infinite,
        n => Repeat::Finite(n),
    })?;
    for (img, delay) in images.iter().zip(delays) {
        let rgba = DynamicImage::ImageRgb8(img.clone()).to_rgba8();
        encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, frames::timestamps_to_frame_durations};
    use anyhow::Result;
    use ndarray::Array3;

    #[test]
    fn colormap_ends() {
        assert_eq!(jet(0), Rgb([0, 0, 128]));
        assert_eq!(jet(255), Rgb([128, 0, 0]));
    }

    #[test]
    fn heatmap_shape_and_range() {
        let frames = fixtures::frames(3, 4);
        let images = apply_heatmap(frames.view());
        assert_eq!(images.len(), 3);
        assert_eq!(images[0].dimensions(), (4, 4));

        let flat = Array3::<f32>::from_elem((2, 3, 5), 21.5);
        let images = apply_heatmap(flat.view());
        assert_eq!(images[1].dimensions(), (5, 3));
        assert!(images.iter().all(|img| img.pixels().all(|p| *p == jet(0))));
    }

    #[test]
    fn frames_are_saved() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let images = apply_heatmap(fixtures::frames(2, 4).view());
        let paths = save_frames(&images, dir.path(), "bmp")?;
        assert_eq!(paths, vec![dir.path().join("0.bmp"), dir.path().join("1.bmp")]);
        assert!(paths.iter().all(|p| p.is_file()));
        Ok(())
    }

    #[test]
    fn gif_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tmp.gif");
        let images = apply_heatmap(fixtures::frames(3, 32).view());
        write_gif(&images, &path, &GifOptions::default())?;
        assert!(path.is_file());
        Ok(())
    }

    #[test]
    fn gif_durations_and_loop() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tmp.gif");
        let colors = [Rgb([0, 0, 255]), Rgb([0, 255, 0]), Rgb([255, 0, 0])];
        let images: Vec<_> = colors
            .iter()
            .map(|&c| RgbImage::from_pixel(100, 100, c))
            .collect();
        let durations = timestamps_to_frame_durations(&[1.424, 2.453453, 3.5345], None);
        let opts = GifOptions {
            loops: 1,
            ..GifOptions::with_durations(durations)
        };
        write_gif(&images, &path, &opts)?;
        assert!(path.is_file());

        let bad = GifOptions::with_durations(vec![0.1]);
        assert!(write_gif(&images, &path, &bad).is_err());
        Ok(())
    }
}
