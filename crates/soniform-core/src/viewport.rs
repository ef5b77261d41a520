//! Viewport pan/zoom transforms between screen and canvas coordinates.

use crate::scene::Scene;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom clamp range.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// The view transform over the canvas: a pan offset in screen pixels and a
/// uniform zoom factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset, in screen pixels.
    pub offset: Vec2,
    /// Current zoom level; 1.0 is canvas-unit-per-pixel.
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-canvas transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// A screen-pixel delta expressed in canvas units.
    pub fn canvas_delta(&self, screen_delta: Vec2) -> Vec2 {
        screen_delta / self.zoom
    }

    /// A screen-pixel delta expressed as a normalized scene offset. Degrades
    /// to zero for a degenerate scene size.
    pub fn normalized_delta(&self, screen_delta: Vec2, scene: &Scene) -> Vec2 {
        if scene.width <= 0.0 || scene.height <= 0.0 {
            return Vec2::ZERO;
        }
        let canvas = self.canvas_delta(screen_delta);
        Vec2::new(canvas.x / scene.width, canvas.y / scene.height)
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.screen_to_canvas(screen_point);
        self.zoom = new_zoom;

        // Keep the anchor under the cursor.
        let moved = self.canvas_to_screen(anchor);
        self.offset += Vec2::new(screen_point.x - moved.x, screen_point.y - moved.y);
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Fit the whole canvas into the given screen area with padding.
    pub fn fit_canvas(&mut self, scene: &Scene, screen: Size, padding: f64) {
        let canvas = Rect::new(0.0, 0.0, scene.width, scene.height);
        if canvas.is_zero_area() {
            self.reset();
            return;
        }

        let inner = Size::new(
            (screen.width - padding * 2.0).max(1.0),
            (screen.height - padding * 2.0).max(1.0),
        );
        let scale_x = inner.width / canvas.width();
        let scale_y = inner.height / canvas.height();
        self.zoom = scale_x.min(scale_y).clamp(MIN_ZOOM, MAX_ZOOM);

        let center = canvas.center();
        self.offset = Vec2::new(
            screen.width / 2.0 - center.x * self.zoom,
            screen.height / 2.0 - center.y * self.zoom,
        );
    }
}
