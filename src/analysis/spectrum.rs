//! Centered 2D magnitude spectrum of an image's luminance.

use anyhow::{bail, Context, Result};
use image::{DynamicImage, GrayImage, Luma};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Sample frequencies (cycles per sample) of an `n`-point DFT, in DFT order:
/// non-negative frequencies first, then the negative ones.
pub fn fftfreq(n: usize) -> Vec<f64> {
    let non_negative = (n + 1) / 2;
    (0..n)
        .map(|i| {
            let k = if i < non_negative {
                i as f64
            } else {
                i as f64 - n as f64
            };
            k / n as f64
        })
        .collect()
}

/// Move the zero-frequency entry to the middle (index `n / 2`).
pub fn fftshift<T: Clone>(values: &[T]) -> Vec<T> {
    let mut shifted = values.to_vec();
    shifted.rotate_right(values.len() / 2);
    shifted
}

/// 8-bit luminance using the ITU-R 601-2 weights. Alpha is ignored and
/// grayscale input comes back unchanged.
pub fn luminance(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let l = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        Luma([l as u8])
    })
}

#[derive(Debug, Clone)]
pub struct MagnitudeSpectrum {
    width: usize,
    height: usize,
    /// Row-major, zero frequency at (height / 2, width / 2)
    values: Vec<f64>,
    freq_x: Vec<f64>,
    freq_y: Vec<f64>,
}

impl MagnitudeSpectrum {
    /// Spectrum of a row-major `height x width` intensity array.
    ///
    /// Each bin holds `20 * ln(|F| + 1)`; the `+ 1` keeps empty bins at zero.
    pub fn from_intensity(width: usize, height: usize, samples: &[f64]) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("Cannot transform an empty {}x{} image", width, height);
        }
        if samples.len() != width * height {
            bail!(
                "Expected {} samples for a {}x{} image, got {}",
                width * height,
                width,
                height,
                samples.len()
            );
        }

        let mut planner = FftPlanner::<f64>::new();

        // Rows are contiguous, so one pass over the buffer transforms each row
        let mut rows: Vec<Complex<f64>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        planner.plan_fft_forward(width).process(&mut rows);

        let mut columns = vec![Complex::new(0.0, 0.0); rows.len()];
        for r in 0..height {
            for c in 0..width {
                columns[c * height + r] = rows[r * width + c];
            }
        }
        planner.plan_fft_forward(height).process(&mut columns);

        let (row_shift, col_shift) = (height / 2, width / 2);
        let mut values = vec![0.0; rows.len()];
        for c in 0..width {
            for r in 0..height {
                let magnitude = columns[c * height + r].norm();
                let row = (r + row_shift) % height;
                let col = (c + col_shift) % width;
                values[row * width + col] = 20.0 * (magnitude + 1.0).ln();
            }
        }

        Ok(Self {
            width,
            height,
            values,
            freq_x: fftshift(&fftfreq(width)),
            freq_y: fftshift(&fftfreq(height)),
        })
    }

    pub fn from_gray(image: &GrayImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        let samples: Vec<f64> = image.pixels().map(|p| p.0[0] as f64).collect();
        Self::from_intensity(width as usize, height as usize, &samples)
    }

    /// Decode an encoded image (PNG, JPEG, ...) and transform its luminance.
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes).context("Failed to decode image")?;
        Self::from_gray(&luminance(&image))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.width + col]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn freq_x(&self) -> &[f64] {
        &self.freq_x
    }

    pub fn freq_y(&self) -> &[f64] {
        &self.freq_y
    }

    /// `(x_min, x_max, y_min, y_max)` in normalized frequency, matching the
    /// shifted pixel grid.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        (
            self.freq_x[0],
            self.freq_x[self.width - 1],
            self.freq_y[0],
            self.freq_y[self.height - 1],
        )
    }

    pub fn range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// `(row, col)` of the strongest bin; the first one wins on ties.
    pub fn peak(&self) -> (usize, usize) {
        let mut best = 0;
        for (i, &v) in self.values.iter().enumerate() {
            if v > self.values[best] {
                best = i;
            }
        }
        (best / self.width, best % self.width)
    }
}
