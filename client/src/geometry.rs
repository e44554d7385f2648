use rectviz_shared::{BoundingBox, Point, Rect};

/// Uniform scale plus offset from problem space into surface pixels.
///
/// Always rebuilt from scratch with [`ViewportTransform::fit`]; never nudged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Screen-space rectangle, origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportTransform {
    /// Fits `bbox` into a `width` x `height` surface, centred, leaving
    /// `padding` pixels on the tighter axis.
    pub fn fit(bbox: &BoundingBox, width: f64, height: f64, padding: f64) -> Self {
        let span_x = bbox.width();
        let span_y = bbox.height();
        let scale_x = axis_scale(width - 2.0 * padding, span_x);
        let scale_y = axis_scale(height - 2.0 * padding, span_y);
        let scale = match (scale_x, scale_y) {
            (Some(x), Some(y)) => x.min(y),
            (Some(x), None) => x,
            (None, Some(y)) => y,
            (None, None) => 1.0,
        };
        Self {
            scale,
            offset_x: (width - span_x * scale) / 2.0 - bbox.min_x * scale,
            offset_y: (height - span_y * scale) / 2.0 - bbox.min_y * scale,
        }
    }

    pub fn world_to_screen(&self, point: Point) -> (f64, f64) {
        (
            point.x * self.scale + self.offset_x,
            point.y * self.scale + self.offset_y,
        )
    }

    pub fn rect_to_screen(&self, rect: &Rect) -> ScreenRect {
        let rect = rect.normalized();
        let (left, top) = self.world_to_screen(rect.p1);
        let (right, bottom) = self.world_to_screen(rect.p2);
        ScreenRect {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }
}

// A zero-extent axis places no constraint on the scale.
fn axis_scale(available: f64, span: f64) -> Option<f64> {
    if span > 0.0 && span.is_finite() {
        Some(available / span)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;
