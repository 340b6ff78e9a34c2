// Spectrum rendering: grayscale heatmap with frequency axes and a colorbar

use std::io::Cursor;
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use plotters::style::register_font;

use super::spectrum::MagnitudeSpectrum;

/// Family every text element is drawn with
const FONT_FAMILY: &str = "sans-serif";

// DejaVu Sans, bundled so rendering works in containers without fonts
static FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static FONT_REGISTERED: OnceLock<bool> = OnceLock::new();

/// Register the bundled font with plotters. Safe to call repeatedly.
pub fn register_fonts() -> Result<()> {
    let registered = *FONT_REGISTERED
        .get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_DATA).is_ok());
    if !registered {
        bail!("Bundled plot font could not be loaded");
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct FigureOptions {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub colorbar_label: String,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            width_in: 6.0,
            height_in: 6.0,
            dpi: 300,
            title: "2D FFT Magnitude Spectrum".to_string(),
            x_label: "Normalized Frequency (X)".to_string(),
            y_label: "Normalized Frequency (Y)".to_string(),
            colorbar_label: "Magnitude (dB)".to_string(),
        }
    }
}

impl FigureOptions {
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Typographic points to pixels at the figure resolution.
    fn px(&self, points: f64) -> f64 {
        points * self.dpi as f64 / 72.0
    }
}

/// Axis ranges must not be empty; a single-sample axis gets a unit span.
fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if hi - lo > f64::EPSILON {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

/// Map `value` in `[lo, hi]` to a gray level, `lo` black and `hi` white.
pub fn gray_level(value: f64, lo: f64, hi: f64) -> u8 {
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    (t * 255.0).round() as u8
}

/// Render `spectrum` and return the figure as PNG bytes.
pub fn render_png(spectrum: &MagnitudeSpectrum, options: &FigureOptions) -> Result<Vec<u8>> {
    register_fonts()?;
    let (width, height) = options.pixel_size();
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    draw_figure(&mut buffer, (width, height), spectrum, options)?;

    let img = RgbImage::from_raw(width, height, buffer).context("Plot buffer has the wrong size")?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .context("Failed to encode plot as PNG")?;
    Ok(png)
}

fn draw_figure(
    buffer: &mut [u8],
    size: (u32, u32),
    spectrum: &MagnitudeSpectrum,
    options: &FigureOptions,
) -> Result<()> {
    let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(&options.title, (FONT_FAMILY, options.px(12.0)))?;

    let margin = options.px(4.0) as u32;
    let x_label_area = options.px(30.0) as u32;
    let y_label_area = options.px(40.0) as u32;
    let bar_width = size.0 / 6;
    let (plot_area, bar_area) = body.split_horizontally(size.0 - bar_width);

    let (x0, x1, y0, y1) = spectrum.extent();
    let (x0, x1) = widen(x0, x1);
    let (y0, y1) = widen(y0, y1);
    let (lo, hi) = spectrum.range();
    let (lo, hi) = widen(lo, hi);

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(margin)
        .x_label_area_size(x_label_area)
        .y_label_area_size(y_label_area)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(options.x_label.as_str())
        .y_desc(options.y_label.as_str())
        .label_style((FONT_FAMILY, options.px(8.0)))
        .axis_desc_style((FONT_FAMILY, options.px(10.0)))
        .x_label_formatter(&|v| format!("{:.2}", v))
        .y_label_formatter(&|v| format!("{:.2}", v))
        .draw()?;

    // Nearest-sample fill of the plotting area; row 0 sits at the bottom
    let area = chart.plotting_area().strip_coord_spec();
    let (pw, ph) = area.dim_in_pixel();
    for py in 0..ph {
        let row = spectrum.height() - 1 - (py as usize * spectrum.height() / ph as usize);
        for px in 0..pw {
            let col = px as usize * spectrum.width() / pw as usize;
            let shade = gray_level(spectrum.at(row, col), lo, hi);
            area.draw_pixel((px as i32, py as i32), &RGBColor(shade, shade, shade))?;
        }
    }

    let mut bar = ChartBuilder::on(&bar_area)
        .margin_top(margin)
        .margin_right(margin)
        .margin_bottom(margin + x_label_area)
        .y_label_area_size(y_label_area)
        .build_cartesian_2d(0f64..1f64, lo..hi)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc(options.colorbar_label.as_str())
        .label_style((FONT_FAMILY, options.px(8.0)))
        .axis_desc_style((FONT_FAMILY, options.px(10.0)))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    let strip = bar.plotting_area().strip_coord_spec();
    let (bw, bh) = strip.dim_in_pixel();
    for py in 0..bh {
        let t = 1.0 - py as f64 / (bh.max(2) - 1) as f64;
        let shade = gray_level(lo + t * (hi - lo), lo, hi);
        for px in 0..bw {
            strip.draw_pixel((px as i32, py as i32), &RGBColor(shade, shade, shade))?;
        }
    }

    root.present()?;
    Ok(())
}
