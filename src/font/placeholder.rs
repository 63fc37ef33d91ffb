//! Substitute bitmap for code points the face cannot render.

use super::GlyphBitmap;

/// Hollow box drawn for missing glyphs (the usual `.notdef` look).
///
/// Depends only on the tile size and ascender, so every call for the same
/// font returns the same bitmap.
pub fn missing_glyph(tile_width: u32, tile_height: u32, ascender: f32) -> GlyphBitmap {
    let tile_width = tile_width.max(1);
    let tile_height = tile_height.max(1);
    let width = (tile_width * 3 / 5).clamp(1, tile_width);
    let height = (ascender.round().max(0.0) as u32).clamp(1, tile_height);
    let left = i32::from(width < tile_width);

    let mut data = vec![0u8; width as usize * height as usize];
    for y in 0..height {
        for x in 0..width {
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                data[(y * width + x) as usize] = 0xFF;
            }
        }
    }

    GlyphBitmap {
        width,
        height,
        left,
        top: height as i32,
        data,
    }
}

#[cfg(test)]
mod tests;
