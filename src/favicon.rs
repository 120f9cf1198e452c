//! Inline favicon compression.
//!
//! Tabs frequently carry their favicon as a base64 `data:` URL; at 16x16 a
//! favicon does not need the full-size image the page shipped. Re-encoding
//! a downscaled PNG keeps stored sessions small. Callers treat failure as
//! advisory and keep the original URL.

use std::io::Cursor;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;

const MAX_EDGE: u32 = 32;

/// Re-encodes a `data:image/...;base64,` URL as a downscaled PNG data URL.
/// Returns the input unchanged when the re-encoding would not be smaller.
pub fn compress_data_url(data_url: &str) -> Result<String> {
    let (header, payload) = data_url
        .split_once(',')
        .context("data url has no payload")?;
    if !header.starts_with("data:image/") || !header.ends_with(";base64") {
        bail!("not a base64 image data url");
    }

    let bytes = STANDARD
        .decode(payload)
        .context("invalid base64 payload")?;
    let decoded = image::load_from_memory(&bytes).context("failed to decode favicon image")?;

    let scaled = if decoded.width() > MAX_EDGE || decoded.height() > MAX_EDGE {
        decoded.thumbnail(MAX_EDGE, MAX_EDGE)
    } else {
        decoded
    };

    let mut encoded = Vec::new();
    scaled
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .context("failed to encode favicon")?;

    if encoded.len() >= bytes.len() {
        return Ok(data_url.to_string());
    }

    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(&encoded)
    ))
}
