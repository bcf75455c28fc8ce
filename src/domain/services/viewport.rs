#[cfg(test)]
#[path = "viewport_test.rs"]
mod tests;

use crate::domain::models::Region;

/// Scroll position of a page, in whatever unit the page is laid out in.
pub struct Viewport {
    content_length: u32,
    viewport_length: u32,
    pub position: u32,
}

impl Viewport {
    pub fn new(content_length: u32, viewport_length: u32) -> Viewport {
        let mut viewport = Viewport {
            content_length: 0,
            viewport_length: 0,
            position: 0,
        };
        viewport.set_state(content_length, viewport_length);

        return viewport;
    }

    fn max_position(&self) -> u32 {
        return self.content_length.saturating_sub(self.viewport_length);
    }

    pub fn scroll_to(&mut self, position: u32) {
        self.position = position.clamp(0, self.max_position());
    }

    pub fn set_state(&mut self, content_length: u32, viewport_length: u32) {
        self.content_length = content_length;
        self.viewport_length = viewport_length;
        self.position = self.position.clamp(0, self.max_position());
    }

    /// Absolute page offset of the line `percent` down the visible area.
    pub fn line(&self, percent: f64) -> f64 {
        return f64::from(self.position) + f64::from(self.viewport_length) * percent / 100.0;
    }

    pub fn is_visible(&self, region: &Region) -> bool {
        let top = self.position;
        let bottom = self.position.saturating_add(self.viewport_length);
        return region.top < bottom && region.top.saturating_add(region.height) > top;
    }
}
