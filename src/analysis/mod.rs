//! Analyzer stage
//!
//! Reads an image from the store, renders its centered magnitude spectrum
//! and writes the plot next to it under `outputs/`.

use anyhow::{Context, Result};
use tracing::info;

use crate::keys::plot_key;
use crate::storage::ObjectStore;
use crate::types::ObjectRef;

pub mod plot;
pub mod spectrum;

pub use plot::{render_png, FigureOptions};
pub use spectrum::{fftfreq, fftshift, luminance, MagnitudeSpectrum};

pub const PLOT_CONTENT_TYPE: &str = "image/png";

/// Fetch `input`, plot its spectrum, and upload the plot. Returns where the
/// plot was written.
pub async fn generate_fft_plot(
    store: &dyn ObjectStore,
    input: &ObjectRef,
    options: &FigureOptions,
) -> Result<ObjectRef> {
    info!("Reading image from {}", input);
    let bytes = store.get_object(input).await?;

    let options = options.clone();
    let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let spectrum = MagnitudeSpectrum::from_image_bytes(&bytes)?;
        render_png(&spectrum, &options)
    })
    .await
    .context("Spectrum task panicked")?
    .with_context(|| format!("Failed to plot spectrum of {}", input))?;

    publish_plot(store, input, &png).await
}

/// Upload rendered plot bytes for `input` at its derived key.
pub async fn publish_plot(
    store: &dyn ObjectStore,
    input: &ObjectRef,
    png: &[u8],
) -> Result<ObjectRef> {
    let output = input.sibling(plot_key(&input.key));
    store.put_object(&output, png, PLOT_CONTENT_TYPE).await?;
    info!("FFT plot saved to {}", output);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use image::{ImageFormat, Luma, GrayImage};
    use std::io::Cursor;

    fn sample_png() -> Vec<u8> {
        let img = GrayImage::from_fn(24, 16, |x, _| Luma([if x % 4 < 2 { 200 } else { 40 }]));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).unwrap();
        png
    }

    #[tokio::test]
    async fn test_publish_plot_uses_derived_key_and_content_type() {
        let store = MemoryStore::new();
        let input = ObjectRef::new("images", "inputs/photo_20240102T030405.jpg");

        let output = publish_plot(&store, &input, b"plot").await.unwrap();

        assert_eq!(
            output,
            ObjectRef::new("images", "outputs/photo_20240102T030405-fft-plot.png")
        );
        let stored = store.get(&output).await.unwrap();
        assert_eq!(stored.data, b"plot");
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_publish_plot_overwrites_previous_artifact() {
        let store = MemoryStore::new();
        let input = ObjectRef::new("images", "inputs/photo.jpg");

        publish_plot(&store, &input, b"first").await.unwrap();
        let output = publish_plot(&store, &input, b"second").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(&output).await.unwrap().data, b"second");
    }

    #[tokio::test]
    async fn test_missing_input_propagates() {
        let store = MemoryStore::new();
        let input = ObjectRef::new("images", "inputs/absent.png");

        let result = generate_fft_plot(&store, &input, &FigureOptions::default()).await;

        assert!(result.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_undecodable_input_propagates() {
        let store = MemoryStore::new();
        let input = ObjectRef::new("images", "inputs/broken.png");
        store.insert(input.clone(), b"not a png".to_vec(), "image/png").await;

        let err = generate_fft_plot(&store, &input, &FigureOptions::default())
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("decode"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_generate_fft_plot_end_to_end() {
        let store = MemoryStore::new();
        let input = ObjectRef::new("images", "inputs/stripes_20240102T030405.png");
        store.insert(input.clone(), sample_png(), "image/png").await;

        let output = generate_fft_plot(&store, &input, &FigureOptions::default())
            .await
            .unwrap();

        assert_eq!(output.key, "outputs/stripes_20240102T030405-fft-plot.png");
        let stored = store.get(&output).await.unwrap();
        assert_eq!(stored.content_type, "image/png");
        let plot = image::load_from_memory(&stored.data).unwrap();
        assert_eq!((plot.width(), plot.height()), (1800, 1800));
    }
}
