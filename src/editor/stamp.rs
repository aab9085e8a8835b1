//! Offline substitute for the remote edit service: stamps the iteration
//! number onto the bottom-right corner of the image. Rendering is pure
//! integer math over the pixel buffer, so the same input bytes and the same
//! iteration always produce byte-identical PNG output.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StampError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
}

const YELLOW: Rgba<u8> = Rgba([255, 255, 0, 255]);

// 3x5 cell glyphs for '0'..'9'.
const DIGITS: [[u8; 15]; 10] = [
    [1, 1, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 1, 1], // 0
    [0, 1, 0, 1, 1, 0, 0, 1, 0, 0, 1, 0, 1, 1, 1], // 1
    [1, 1, 1, 0, 0, 1, 1, 1, 1, 1, 0, 0, 1, 1, 1], // 2
    [1, 1, 1, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 1, 1], // 3
    [1, 0, 1, 1, 0, 1, 1, 1, 1, 0, 0, 1, 0, 0, 1], // 4
    [1, 1, 1, 1, 0, 0, 1, 1, 1, 0, 0, 1, 1, 1, 1], // 5
    [1, 1, 1, 1, 0, 0, 1, 1, 1, 1, 0, 1, 1, 1, 1], // 6
    [1, 1, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 1, 0], // 7
    [1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1], // 8
    [1, 1, 1, 1, 0, 1, 1, 1, 1, 0, 0, 1, 1, 1, 1], // 9
];

/// Decodes `bytes`, draws `iteration` bottom-right, re-encodes as PNG.
pub fn overlay_iteration_number(bytes: &[u8], iteration: u32) -> Result<Vec<u8>, StampError> {
    let decoded = image::load_from_memory(bytes).map_err(StampError::Decode)?;
    let mut img = decoded.to_rgba8();
    draw_iteration(&mut img, iteration);

    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(StampError::Encode)?;
    Ok(out)
}

fn draw_iteration(img: &mut RgbaImage, iteration: u32) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }

    // Font size relative to image width, clamped so tiny images stay valid.
    let font_size = (w / 10).max(24).min(h).max(5);
    let cell = (font_size / 5).max(1);
    let glyph_w = cell * 3;
    let glyph_h = cell * 5;
    let gap = cell;
    let padding = (w / 50).max(10).min(w / 4 + 1);

    let digits: Vec<usize> = iteration
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();
    let text_w = glyph_w * digits.len() as u32 + gap * (digits.len() as u32 - 1);

    let x0 = w.saturating_sub(padding + text_w);
    let y0 = h.saturating_sub(padding + glyph_h);

    // Darken a backing box so the digits stay readable on bright images.
    let bg_pad = (padding * 3 / 5).max(1);
    let bx0 = x0.saturating_sub(bg_pad);
    let by0 = y0.saturating_sub(bg_pad);
    let bx1 = (x0 + text_w + bg_pad).min(w);
    let by1 = (y0 + glyph_h + bg_pad).min(h);
    for y in by0..by1 {
        for x in bx0..bx1 {
            let px = img.get_pixel_mut(x, y);
            px.0[0] /= 2;
            px.0[1] /= 2;
            px.0[2] /= 2;
        }
    }

    for (i, &digit) in digits.iter().enumerate() {
        let gx = x0 + (glyph_w + gap) * i as u32;
        for row in 0..5u32 {
            for col in 0..3u32 {
                if DIGITS[digit][(row * 3 + col) as usize] == 0 {
                    continue;
                }
                let cx = gx + col * cell;
                let cy = y0 + row * cell;
                if cx >= w || cy >= h {
                    continue;
                }
                let cw = cell.min(w - cx);
                let ch = cell.min(h - cy);
                draw_filled_rect_mut(
                    img,
                    Rect::at(cx as i32, cy as i32).of_size(cw, ch),
                    YELLOW,
                );
            }
        }
    }
}
