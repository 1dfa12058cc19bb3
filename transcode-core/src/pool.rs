//! Pixel buffer recycling.
//!
//! Long streams decode thousands of identically shaped pictures; the pool
//! hands the same allocations back out instead of allocating per frame.

use crate::frame::{ColorSpace, PixelBuffer};
use std::collections::HashMap;
use tracing::trace;

/// Default number of idle buffers kept per shape.
pub const DEFAULT_MAX_IDLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PoolKey {
    width: u32,
    height: u32,
    color_space: ColorSpace,
}

/// A pool of reusable pixel buffers keyed by allocated shape.
///
/// The pool is owned by a single pump and is not synchronized.
#[derive(Debug)]
pub struct PixelBufferPool {
    idle: HashMap<PoolKey, Vec<PixelBuffer>>,
    max_idle: usize,
    total_allocated: usize,
}

impl Default for PixelBufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

impl PixelBufferPool {
    /// Create a pool keeping at most `max_idle` buffers per shape.
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: HashMap::new(),
            max_idle,
            total_allocated: 0,
        }
    }

    /// Acquire a buffer of the given shape.
    ///
    /// Returns an idle buffer if one matches, otherwise allocates a new one.
    /// Reused buffers keep their previous pixel contents.
    pub fn acquire(&mut self, width: u32, height: u32, color_space: ColorSpace) -> PixelBuffer {
        let key = PoolKey {
            width,
            height,
            color_space,
        };

        if let Some(buffer) = self.idle.get_mut(&key).and_then(Vec::pop) {
            return buffer;
        }

        self.total_allocated += 1;
        trace!(
            width,
            height,
            %color_space,
            total = self.total_allocated,
            "allocating pixel buffer"
        );
        PixelBuffer::new(width, height, color_space)
    }

    /// Return a buffer to the idle set.
    pub fn release(&mut self, mut buffer: PixelBuffer) {
        let (width, height) = buffer.allocated_dimensions();
        let key = PoolKey {
            width,
            height,
            color_space: buffer.color_space(),
        };

        let idle = self.idle.entry(key).or_default();
        if idle.len() < self.max_idle {
            buffer.reset_shape();
            idle.push(buffer);
        }
        // Otherwise, the buffer is dropped
    }

    /// Number of idle buffers across all shapes.
    pub fn idle(&self) -> usize {
        self.idle.values().map(Vec::len).sum()
    }

    /// Total number of buffers this pool has allocated.
    pub fn total_allocated(&self) -> usize {
        self.total_allocated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_reuse() {
        let mut pool = PixelBufferPool::new(4);

        let buf1 = pool.acquire(1920, 1080, ColorSpace::Yuv420p);
        assert_eq!(pool.total_allocated(), 1);
        assert_eq!(pool.idle(), 0);

        pool.release(buf1);
        assert_eq!(pool.idle(), 1);

        let _buf2 = pool.acquire(1920, 1080, ColorSpace::Yuv420p);
        assert_eq!(pool.total_allocated(), 1); // Reused
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_pool_keys_on_shape() {
        let mut pool = PixelBufferPool::new(4);
        let buf = pool.acquire(64, 64, ColorSpace::Yuv420p);
        pool.release(buf);

        let other = pool.acquire(64, 64, ColorSpace::Yuv444p);
        assert_eq!(other.color_space(), ColorSpace::Yuv444p);
        assert_eq!(pool.total_allocated(), 2);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_pool_max_idle() {
        let mut pool = PixelBufferPool::new(2);

        let buf1 = pool.acquire(16, 16, ColorSpace::Gray8);
        let buf2 = pool.acquire(16, 16, ColorSpace::Gray8);
        let buf3 = pool.acquire(16, 16, ColorSpace::Gray8);

        pool.release(buf1);
        pool.release(buf2);
        pool.release(buf3); // This one should be dropped

        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn test_release_restores_shape() {
        let mut pool = PixelBufferPool::new(2);
        let mut buf = pool.acquire(64, 64, ColorSpace::Yuv420p);
        buf.shrink_to(32, 32).unwrap();
        pool.release(buf);

        let again = pool.acquire(64, 64, ColorSpace::Yuv420p);
        assert_eq!((again.width(), again.height()), (64, 64));
        assert_eq!(pool.total_allocated(), 1);
    }

    #[test]
    fn test_bounded_allocations_over_many_frames() {
        let mut pool = PixelBufferPool::default();
        for _ in 0..1000 {
            let decoded = pool.acquire(64, 64, ColorSpace::Yuv420p);
            let converted = pool.acquire(64, 64, ColorSpace::Yuv444p);
            pool.release(decoded);
            pool.release(converted);
        }
        assert_eq!(pool.total_allocated(), 2);
    }
}
