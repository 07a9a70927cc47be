use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::consts::{LABEL_GLYPH_SCALE, LABEL_MARGIN};

const GLYPH_SIZE: u32 = 8;
const TEXT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const BACKING_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Burn `text` into the top-left corner of `frame` over a dark backing box.
///
/// Characters outside basic Latin render as blanks. Text running past the
/// frame edge is clipped.
pub fn annotate_label(frame: &mut RgbImage, text: &str) {
    let cell = GLYPH_SIZE * LABEL_GLYPH_SCALE;
    let pad = LABEL_GLYPH_SCALE * 2;
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return;
    }

    let box_w = chars * cell + 2 * pad;
    let box_h = cell + 2 * pad;
    draw_filled_rect_mut(
        frame,
        Rect::at(LABEL_MARGIN as i32, LABEL_MARGIN as i32).of_size(box_w, box_h),
        BACKING_COLOR,
    );

    let origin_x = LABEL_MARGIN + pad;
    let origin_y = LABEL_MARGIN + pad;
    for (i, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS.get(ch).unwrap_or([0; 8]);
        draw_glyph(frame, &glyph, origin_x + i as u32 * cell, origin_y);
    }
}

fn draw_glyph(frame: &mut RgbImage, glyph: &[u8; 8], x: u32, y: u32) {
    let (w, h) = frame.dimensions();
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..GLYPH_SIZE {
            // Bit 0 is the leftmost pixel of the row.
            if bits & (1 << col) == 0 {
                continue;
            }
            let px = x + col * LABEL_GLYPH_SCALE;
            let py = y + row as u32 * LABEL_GLYPH_SCALE;
            for dy in 0..LABEL_GLYPH_SCALE {
                for dx in 0..LABEL_GLYPH_SCALE {
                    if px + dx < w && py + dy < h {
                        frame.put_pixel(px + dx, py + dy, TEXT_COLOR);
                    }
                }
            }
        }
    }
}
