//! Per-pump frame position.

/// Frame index of a pump plus its end-of-stream latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCursor {
    index: u64,
    end_of_stream: bool,
}

impl FrameCursor {
    /// Cursor at frame 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the next frame.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Whether the input has been exhausted.
    pub fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }

    /// Move past a completed frame.
    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// Latch end of stream. Irreversible.
    pub fn mark_end_of_stream(&mut self) {
        self.end_of_stream = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor() {
        let mut cursor = FrameCursor::new();
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.index(), 2);
        assert!(!cursor.is_end_of_stream());

        cursor.mark_end_of_stream();
        assert!(cursor.is_end_of_stream());
        assert_eq!(cursor.index(), 2);
    }
}
