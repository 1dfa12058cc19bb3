//! Color space conversion between decoded pictures.
//!
//! Conversions go through a per-pixel YUV sample using BT.601 fixed-point
//! coefficients. Chroma is point-sampled when subsampling and replicated when
//! upsampling. NV12 only converts to itself.

use crate::error::{Error, Result};
use crate::frame::{ColorSpace, PixelBuffer};

/// Check whether a picture in `from` can be converted to `to`.
pub fn can_convert(from: ColorSpace, to: ColorSpace) -> bool {
    from == to || (is_convertible(from) && is_convertible(to))
}

fn is_convertible(color_space: ColorSpace) -> bool {
    matches!(
        color_space,
        ColorSpace::Yuv420p
            | ColorSpace::Yuv422p
            | ColorSpace::Yuv444p
            | ColorSpace::Gray8
            | ColorSpace::Rgb24
    )
}

/// Convert `src` into `dst`.
///
/// `dst` must already have the logical dimensions of `src` and the target
/// color space.
pub fn convert(src: &PixelBuffer, dst: &mut PixelBuffer) -> Result<()> {
    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(Error::invalid_param(format!(
            "conversion target is {}x{}, source is {}x{}",
            dst.width(),
            dst.height(),
            src.width(),
            src.height()
        )));
    }
    if !can_convert(src.color_space(), dst.color_space()) {
        return Err(Error::CapabilityMismatch(format!(
            "no conversion from {} to {}",
            src.color_space(),
            dst.color_space()
        )));
    }
    if src.color_space() == dst.color_space() {
        return dst.copy_from(src);
    }

    let (width, height) = (dst.width() as usize, dst.height() as usize);
    match dst.color_space() {
        ColorSpace::Rgb24 => {
            let stride = dst.stride(0);
            let mut rgb = vec![0u8; stride * height];
            for y in 0..height {
                for x in 0..width {
                    let (luma, u, v) = sample_yuv(src, x, y);
                    let (r, g, b) = yuv_to_rgb(luma, u, v);
                    let offset = y * stride + x * 3;
                    rgb[offset] = r;
                    rgb[offset + 1] = g;
                    rgb[offset + 2] = b;
                }
            }
            write_plane(dst, 0, &rgb)
        }
        ColorSpace::Gray8 => {
            let luma = luma_plane(src, width, height);
            write_plane(dst, 0, &luma)
        }
        target => {
            let luma = luma_plane(src, width, height);
            write_plane(dst, 0, &luma)?;

            let (hsub, vsub) = target.chroma_subsampling();
            let (row, rows) = target.plane_dimensions(1, dst.width(), dst.height());
            let mut cb = vec![0u8; row * rows];
            let mut cr = vec![0u8; row * rows];
            for cy in 0..rows {
                for cx in 0..row {
                    let (_, u, v) = sample_yuv(src, cx * hsub as usize, cy * vsub as usize);
                    cb[cy * row + cx] = u;
                    cr[cy * row + cx] = v;
                }
            }
            write_plane(dst, 1, &cb)?;
            write_plane(dst, 2, &cr)
        }
    }
}

fn luma_plane(src: &PixelBuffer, width: usize, height: usize) -> Vec<u8> {
    let mut luma = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            luma[y * width + x] = sample_yuv(src, x, y).0;
        }
    }
    luma
}

fn write_plane(dst: &mut PixelBuffer, index: usize, data: &[u8]) -> Result<()> {
    let plane = dst
        .plane_mut(index)
        .ok_or_else(|| Error::invalid_param(format!("missing plane {index}")))?;
    plane.copy_from_slice(data);
    Ok(())
}

/// Read the YUV triple of pixel `(x, y)` from any convertible layout.
fn sample_yuv(src: &PixelBuffer, x: usize, y: usize) -> (u8, u8, u8) {
    let read = |plane: usize, index: usize| -> u8 {
        src.plane(plane)
            .and_then(|p| p.get(index).copied())
            .unwrap_or(128)
    };

    let color_space = src.color_space();
    match color_space {
        ColorSpace::Gray8 => (read(0, y * src.stride(0) + x), 128, 128),
        ColorSpace::Rgb24 => {
            let offset = y * src.stride(0) + x * 3;
            rgb_to_yuv(read(0, offset), read(0, offset + 1), read(0, offset + 2))
        }
        _ => {
            let (hsub, vsub) = color_space.chroma_subsampling();
            let chroma = (y / vsub as usize) * src.stride(1) + x / hsub as usize;
            (
                read(0, y * src.stride(0) + x),
                read(1, chroma),
                read(2, chroma),
            )
        }
    }
}

// BT.601 coefficients (scaled by 1024)
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as i32;
    let u = u as i32 - 128;
    let v = v as i32 - 128;

    let r = y + ((1436 * v) >> 10);
    let g = y - ((352 * u + 731 * v) >> 10);
    let b = y + ((1815 * u) >> 10);

    (
        r.clamp(0, 255) as u8,
        g.clamp(0, 255) as u8,
        b.clamp(0, 255) as u8,
    )
}

fn rgb_to_yuv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = r as i32;
    let g = g as i32;
    let b = b as i32;

    let y = ((306 * r + 601 * g + 117 * b) >> 10).clamp(0, 255);
    let u = (((-173 * r - 339 * g + 512 * b) >> 10) + 128).clamp(0, 255);
    let v = (((512 * r - 429 * g - 83 * b) >> 10) + 128).clamp(0, 255);

    (y as u8, u as u8, v as u8)
}
