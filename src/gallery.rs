//! Cyclic carousel over the character catalog.

/// Active card index into a catalog of `len` characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    active: usize,
    len: usize,
}

impl Carousel {
    /// Carousel positioned on the first card
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { active: 0, len }
    }

    /// Index of the card exposing "start chat"
    #[must_use]
    pub const fn active(&self) -> usize {
        self.active
    }

    /// Number of cards
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when there are no cards
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Advance one card, wrapping to the first
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.active = (self.active + 1) % self.len;
        }
        self.active
    }

    /// Step back one card, wrapping to the last
    pub fn prev(&mut self) -> usize {
        if self.len > 0 {
            self.active = (self.active + self.len - 1) % self.len;
        }
        self.active
    }

    /// Jump straight to a card; out-of-range indices are ignored
    pub fn jump(&mut self, index: usize) -> bool {
        if index < self.len {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Back to the first card, as on a fresh mount
    pub fn reset(&mut self) {
        self.active = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prev_from_zero_wraps_to_last() {
        let mut carousel = Carousel::new(4);
        assert_eq!(carousel.prev(), 3);
    }

    #[test]
    fn test_jump_out_of_range_is_ignored() {
        let mut carousel = Carousel::new(4);
        carousel.jump(2);
        assert!(!carousel.jump(4));
        assert_eq!(carousel.active(), 2);
    }

    #[test]
    fn test_empty_carousel_stays_put() {
        let mut carousel = Carousel::new(0);
        assert_eq!(carousel.next(), 0);
        assert_eq!(carousel.prev(), 0);
    }
}
