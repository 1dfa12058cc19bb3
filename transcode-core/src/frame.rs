//! Raw decoded picture storage.
//!
//! A [`PixelBuffer`] is the unit that travels between decoder, filters and
//! encoder. Its plane sizes follow directly from `(width, height, color space)`.

use crate::error::{Error, Result};
use std::fmt;

/// Pixel layout of a decoded picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ColorSpace {
    /// Planar YUV 4:2:0, 12bpp (1 Cr & Cb sample per 2x2 Y samples).
    Yuv420p,
    /// Planar YUV 4:2:2, 16bpp (1 Cr & Cb sample per 2x1 Y samples).
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp (no subsampling).
    Yuv444p,
    /// Grayscale, 8bpp.
    Gray8,
    /// Packed RGB24, 24bpp.
    Rgb24,
    /// Semi-planar NV12 (Y plane, interleaved UV plane).
    Nv12,
}

impl ColorSpace {
    /// Get the number of planes for this color space.
    pub fn num_planes(&self) -> usize {
        match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p => 3,
            Self::Nv12 => 2,
            Self::Gray8 | Self::Rgb24 => 1,
        }
    }

    /// Get chroma subsampling factors (horizontal, vertical).
    pub fn chroma_subsampling(&self) -> (u32, u32) {
        match self {
            Self::Yuv420p | Self::Nv12 => (2, 2),
            Self::Yuv422p => (2, 1),
            _ => (1, 1),
        }
    }

    /// Check if this is a fully planar YUV layout.
    pub fn is_planar_yuv(&self) -> bool {
        matches!(self, Self::Yuv420p | Self::Yuv422p | Self::Yuv444p)
    }

    /// Bytes per sample in `plane` (interleaved planes hold several).
    pub fn bytes_per_sample(&self, plane: usize) -> usize {
        match self {
            Self::Rgb24 => 3,
            Self::Nv12 if plane == 1 => 2,
            _ => 1,
        }
    }

    /// Row width in bytes and row count of `plane` for the given picture size.
    ///
    /// Chroma dimensions round up for odd picture sizes.
    pub fn plane_dimensions(&self, plane: usize, width: u32, height: u32) -> (usize, usize) {
        let (w, h) = (width as usize, height as usize);
        if plane >= self.num_planes() {
            return (0, 0);
        }
        match self {
            Self::Rgb24 => (w * 3, h),
            Self::Gray8 => (w, h),
            Self::Nv12 if plane == 1 => (w.div_ceil(2) * 2, h.div_ceil(2)),
            Self::Nv12 => (w, h),
            _ if plane == 0 => (w, h),
            _ => {
                let (hsub, vsub) = self.chroma_subsampling();
                (w.div_ceil(hsub as usize), h.div_ceil(vsub as usize))
            }
        }
    }

    /// Calculate the size of a plane for given dimensions.
    pub fn plane_size(&self, plane: usize, width: u32, height: u32) -> usize {
        let (row, rows) = self.plane_dimensions(plane, width, height);
        row * rows
    }

    /// Total bytes of all planes for given dimensions.
    pub fn frame_size(&self, width: u32, height: u32) -> usize {
        (0..self.num_planes())
            .map(|plane| self.plane_size(plane, width, height))
            .sum()
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yuv420p => write!(f, "yuv420p"),
            Self::Yuv422p => write!(f, "yuv422p"),
            Self::Yuv444p => write!(f, "yuv444p"),
            Self::Gray8 => write!(f, "gray8"),
            Self::Rgb24 => write!(f, "rgb24"),
            Self::Nv12 => write!(f, "nv12"),
        }
    }
}

/// A decoded picture.
///
/// The buffer remembers the shape it was allocated with. A decoder that
/// produces a smaller picture (thumbnail variants) may [`shrink_to`] the
/// logical shape; planes are then viewed with the smaller layout while the
/// storage is kept for reuse by the pool.
///
/// [`shrink_to`]: PixelBuffer::shrink_to
#[derive(Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    allocated_width: u32,
    allocated_height: u32,
    color_space: ColorSpace,
    planes: Vec<Vec<u8>>,
}

impl PixelBuffer {
    /// Allocate a zeroed buffer.
    pub fn new(width: u32, height: u32, color_space: ColorSpace) -> Self {
        let planes = (0..color_space.num_planes())
            .map(|plane| vec![0u8; color_space.plane_size(plane, width, height)])
            .collect();

        Self {
            width,
            height,
            allocated_width: width,
            allocated_height: height,
            color_space,
            planes,
        }
    }

    /// Picture width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Picture height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The color space; fixed for the lifetime of the buffer.
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Dimensions the storage was allocated for.
    pub fn allocated_dimensions(&self) -> (u32, u32) {
        (self.allocated_width, self.allocated_height)
    }

    /// Get the number of planes.
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    /// Get a plane's data.
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        let len = self.color_space.plane_size(index, self.width, self.height);
        self.planes.get(index).map(|p| &p[..len])
    }

    /// Get a mutable reference to a plane's data.
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let len = self.color_space.plane_size(index, self.width, self.height);
        self.planes.get_mut(index).map(|p| &mut p[..len])
    }

    /// Get the stride (bytes per row) for a plane.
    pub fn stride(&self, plane: usize) -> usize {
        self.color_space.plane_dimensions(plane, self.width, self.height).0
    }

    /// Get the total size of all planes in bytes.
    pub fn total_size(&self) -> usize {
        self.color_space.frame_size(self.width, self.height)
    }

    /// Shrink the logical picture within the allocated storage.
    pub fn shrink_to(&mut self, width: u32, height: u32) -> Result<()> {
        if width > self.allocated_width || height > self.allocated_height {
            return Err(Error::BufferTooSmall {
                needed: self.color_space.frame_size(width, height),
                available: self
                    .color_space
                    .frame_size(self.allocated_width, self.allocated_height),
            });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Restore the logical picture to the allocated shape.
    pub fn reset_shape(&mut self) {
        self.width = self.allocated_width;
        self.height = self.allocated_height;
    }

    /// Fill all planes with a value.
    pub fn fill(&mut self, value: u8) {
        for plane in &mut self.planes {
            plane.fill(value);
        }
    }

    /// Copy pixels from a buffer of identical logical shape.
    pub fn copy_from(&mut self, other: &PixelBuffer) -> Result<()> {
        if self.width != other.width
            || self.height != other.height
            || self.color_space != other.color_space
        {
            return Err(Error::invalid_param(format!(
                "cannot copy {}x{} {} into {}x{} {}",
                other.width,
                other.height,
                other.color_space,
                self.width,
                self.height,
                self.color_space
            )));
        }

        for index in 0..self.planes.len() {
            let len = self.color_space.plane_size(index, self.width, self.height);
            self.planes[index][..len].copy_from_slice(&other.planes[index][..len]);
        }
        Ok(())
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color_space", &self.color_space)
            .field("planes", &self.planes.len())
            .finish()
    }
}
