//! Filter abstractions for decoded pictures.
//!
//! A filter takes ownership of a [`PixelBuffer`] and returns the buffer to
//! hand on. Filters producing a new picture allocate it from the pool and
//! release their input back to it; they never keep buffers they did not
//! allocate.

use tracing::trace;
use transcode_core::error::{Error, Result};
use transcode_core::{ColorSpace, PixelBuffer, PixelBufferPool};

/// Picture filter.
pub trait Filter: Send {
    /// Get filter name.
    fn name(&self) -> &str;

    /// Check if filter is enabled.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Process one picture.
    ///
    /// A filter that fails releases the buffer it was given back to `pool`.
    fn apply(&mut self, buffer: PixelBuffer, pool: &mut PixelBufferPool) -> Result<PixelBuffer>;

    /// Color space produced for an input in `input`.
    fn output_color_space(&self, input: ColorSpace) -> ColorSpace {
        input
    }

    /// Picture size produced for an input of the given size.
    fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (width, height)
    }
}

/// Chain of filters applied left to right.
///
/// An empty chain passes pictures through untouched.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    /// Create a new empty filter chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter to the end of the chain.
    pub fn add(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, filter: impl Filter + 'static) -> Self {
        self.add(Box::new(filter));
        self
    }

    /// Get number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if chain is empty.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of the enabled filters, in order.
    pub fn names(&self) -> Vec<&str> {
        self.enabled().map(|f| f.name()).collect()
    }

    fn enabled(&self) -> impl Iterator<Item = &dyn Filter> {
        self.filters
            .iter()
            .map(|f| f.as_ref())
            .filter(|f| f.is_enabled())
    }

    /// Run a picture through every enabled filter.
    pub fn apply(&mut self, mut buffer: PixelBuffer, pool: &mut PixelBufferPool) -> Result<PixelBuffer> {
        for filter in &mut self.filters {
            if filter.is_enabled() {
                trace!(filter = filter.name(), "applying filter");
                buffer = filter.apply(buffer, pool)?;
            }
        }
        Ok(buffer)
    }

    /// Color space leaving the chain for an input in `input`.
    pub fn output_color_space(&self, input: ColorSpace) -> ColorSpace {
        self.enabled()
            .fold(input, |space, filter| filter.output_color_space(space))
    }

    /// Picture size leaving the chain for an input of the given size.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        self.enabled()
            .fold((width, height), |(w, h), filter| filter.output_dimensions(w, h))
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|filter| filter.name()))
            .finish()
    }
}

/// Pass-through filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFilter;

impl Filter for IdentityFilter {
    fn name(&self) -> &str {
        "identity"
    }

    fn apply(&mut self, buffer: PixelBuffer, _pool: &mut PixelBufferPool) -> Result<PixelBuffer> {
        Ok(buffer)
    }
}

/// Nearest-neighbour resize to a fixed picture size.
#[derive(Debug, Clone)]
pub struct ScaleFilter {
    name: String,
    target_width: u32,
    target_height: u32,
    enabled: bool,
}

impl ScaleFilter {
    /// Create a new scale filter. Both target dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_param(format!(
                "cannot scale to {width}x{height}"
            )));
        }
        Ok(Self {
            name: format!("scale_{}x{}", width, height),
            target_width: width,
            target_height: height,
            enabled: true,
        })
    }

    /// Enable or disable the filter.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Filter for ScaleFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn apply(&mut self, frame: PixelBuffer, pool: &mut PixelBufferPool) -> Result<PixelBuffer> {
        if frame.width() == self.target_width && frame.height() == self.target_height {
            return Ok(frame);
        }

        let color_space = frame.color_space();
        let mut scaled = pool.acquire(self.target_width, self.target_height, color_space);

        for plane in 0..color_space.num_planes() {
            let sample = color_space.bytes_per_sample(plane);
            let (src_row, src_rows) = color_space.plane_dimensions(plane, frame.width(), frame.height());
            let (dst_row, dst_rows) =
                color_space.plane_dimensions(plane, self.target_width, self.target_height);
            let (src_cols, dst_cols) = (src_row / sample, dst_row / sample);

            let (Some(src), Some(dst)) = (frame.plane(plane), scaled.plane_mut(plane)) else {
                continue;
            };
            if src_cols == 0 || src_rows == 0 {
                continue;
            }

            for y in 0..dst_rows {
                let sy = y * src_rows / dst_rows;
                for x in 0..dst_cols {
                    let sx = x * src_cols / dst_cols;
                    let d = y * dst_row + x * sample;
                    let s = sy * src_row + sx * sample;
                    dst[d..d + sample].copy_from_slice(&src[s..s + sample]);
                }
            }
        }

        pool.release(frame);
        Ok(scaled)
    }

    fn output_dimensions(&self, _width: u32, _height: u32) -> (u32, u32) {
        (self.target_width, self.target_height)
    }
}
