//! Object key conventions
//!
//! Uploaded inputs land at `<prefix>/<name>_<YYYYMMDDTHHMMSS><ext>` and
//! rendered plots at `outputs/<stem>-fft-plot.png`.

use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

pub const DEFAULT_INPUT_PREFIX: &str = "inputs";
pub const OUTPUT_PREFIX: &str = "outputs";
pub const PLOT_SUFFIX: &str = "-fft-plot.png";

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Split a file name into stem and extension at the last dot.
///
/// The extension keeps its leading dot, so `photo.` splits into `photo`
/// and `.`. A run of leading dots belongs to the stem (`.env`, `..hidden`).
fn split_name(name: &str) -> (&str, &str) {
    let lead = name.len() - name.trim_start_matches('.').len();
    match name[lead..].rfind('.') {
        Some(dot) => name.split_at(lead + dot),
        None => (name, ""),
    }
}

/// Stem of a key's last segment, dropping the final suffix.
///
/// A dot at either end of the name does not start a suffix.
fn key_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot < name.len() - 1 => &name[..dot],
        _ => name,
    }
}

/// Build the upload key for a local file, stamped with `now`.
pub fn timestamped_key(local_path: &Path, prefix: &str, now: DateTime<Utc>) -> Result<String> {
    let name = local_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("{} has no usable file name", local_path.display()))?;
    let (stem, ext) = split_name(name);

    Ok(format!(
        "{}/{}_{}{}",
        prefix,
        stem,
        now.format(TIMESTAMP_FORMAT),
        ext
    ))
}

/// Output key for the spectrum plot of `input_key`.
///
/// Only the last segment of the input key is used; directories and a
/// trailing `/` are dropped.
pub fn plot_key(input_key: &str) -> String {
    let trimmed = input_key.trim_end_matches('/');
    let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
    format!("{}/{}{}", OUTPUT_PREFIX, key_stem(name), PLOT_SUFFIX)
}
