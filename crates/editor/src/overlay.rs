//! Overlay Layers
//! 
//! The editor is a transparent input layer stacked on a highlighted
//! overlay. Both must show the same scroll offset, and the gutter shows
//! one number per line of content.

/// Scroll offset of one layer, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub top: f64,
    pub left: f64,
}

impl ScrollOffset {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }
}

/// Input layer and overlay layer kept in lockstep
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerPair {
    input: ScrollOffset,
    overlay: ScrollOffset,
}

impl LayerPair {
    pub fn new() -> Self {
        Self::default()
    }

    /// The input layer scrolled; mirror the offset onto the overlay
    pub fn sync_scroll(&mut self, scroll_top: f64, scroll_left: f64) -> ScrollOffset {
        self.input = ScrollOffset::new(scroll_top, scroll_left);
        self.overlay = self.input;
        self.overlay
    }

    pub fn input(&self) -> ScrollOffset {
        self.input
    }

    pub fn overlay(&self) -> ScrollOffset {
        self.overlay
    }

    pub fn is_aligned(&self) -> bool {
        self.input == self.overlay
    }
}

/// Line numbers for the gutter, one per `\n`-separated line
pub fn gutter_lines(content: &str) -> Vec<usize> {
    (1..=content.split('\n').count()).collect()
}
