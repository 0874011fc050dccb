use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use crate::core::bitmap::Bitmap;
use crate::error::{Error, Result};

fn flatten_over_white(c: u8, a: u8) -> u8 {
    ((c as u32 * a as u32 + 255 * (255 - a as u32) + 127) / 255) as u8
}

/// Write `bitmap` as a baseline RGB JPEG. Translucent pixels are flattened
/// onto white since JPEG has no alpha channel.
pub fn write_rgb_jpeg(output: &Path, bitmap: &Bitmap, quality: u8) -> Result<()> {
    let (cols, rows) = (bitmap.width(), bitmap.height());
    if cols > u16::MAX as u32 || rows > u16::MAX as u32 {
        return Err(Error::Encode(format!(
            "{}x{} exceeds the JPEG limit of {} pixels per side",
            cols,
            rows,
            u16::MAX
        )));
    }

    let mut rgb_data = Vec::with_capacity(cols as usize * rows as usize * 3);
    for [r, g, b, a] in bitmap.rgba_pixels() {
        rgb_data.extend_from_slice(&[
            flatten_over_white(r, a),
            flatten_over_white(g, a),
            flatten_over_white(b, a),
        ]);
    }

    let file = File::create(output).map_err(|e| Error::write(output, e))?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, quality.clamp(1, 100));
    encoder
        .encode(&rgb_data, cols as u16, rows as u16, ColorType::Rgb)
        .map_err(|e| Error::Encode(e.to_string()))?;
    info!("Saved JPEG {:?} ({}x{}, quality {})", output, cols, rows, quality);
    Ok(())
}
