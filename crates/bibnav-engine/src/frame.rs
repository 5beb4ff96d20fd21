use crate::buffer::TextBuffer;

/// The buffer currently shown in the viewport, plus the unwrapped rows it was
/// derived from while line wrapping is active.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    buffer: TextBuffer,
    unwrapped: Option<TextBuffer>,
}

impl Frame {
    pub fn new(buffer: TextBuffer) -> Self {
        Self {
            buffer,
            unwrapped: None,
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Show new content; any wrapping of the old content is discarded.
    pub fn replace(&mut self, buffer: TextBuffer) {
        self.buffer = buffer;
        self.unwrapped = None;
    }

    pub fn is_wrapped(&self) -> bool {
        self.unwrapped.is_some()
    }

    /// Wrap the unwrapped rows at `width`.
    pub fn wrap(&mut self, width: usize) {
        let source = self
            .unwrapped
            .take()
            .unwrap_or_else(|| self.buffer.clone());
        let mut wrapped = source.clone();
        wrapped.wrap(width);
        self.buffer = wrapped;
        self.unwrapped = Some(source);
    }

    /// Go back to the unwrapped rows.
    pub fn restore(&mut self) {
        if let Some(source) = self.unwrapped.take() {
            self.buffer = source;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrap_starts_from_unwrapped_rows() {
        let mut frame = Frame::new(TextBuffer::from_lines(["alpha beta gamma delta"]));

        frame.wrap(8);
        let narrow = frame.buffer().height();
        frame.wrap(30);

        assert!(narrow > 1);
        assert_eq!(frame.buffer().height(), 1);
        assert!(frame.is_wrapped());
    }

    #[test]
    fn test_restore_returns_original_rows() {
        let original = TextBuffer::from_lines(["alpha beta gamma delta"]);
        let mut frame = Frame::new(original.clone());

        frame.wrap(8);
        frame.restore();

        assert_eq!(frame.buffer(), &original);
        assert!(!frame.is_wrapped());
    }

    #[test]
    fn test_replace_drops_wrap_state() {
        let mut frame = Frame::new(TextBuffer::from_lines(["alpha beta gamma delta"]));
        frame.wrap(8);
        frame.replace(TextBuffer::from_lines(["fresh"]));

        assert!(!frame.is_wrapped());
        assert_eq!(frame.buffer().lines(), &["fresh"]);
    }
}
