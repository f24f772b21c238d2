//! Brush stamping: one rotated, centered copy of the brush per call.

use super::Surface;

/// Brush width in surface pixels. Zero means "use the brush image's natural size".
///
/// Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct BrushSize(f64);

impl BrushSize {
    pub const NATURAL: BrushSize = BrushSize(0.0);

    /// Returns `None` for negative or non-finite sizes.
    pub fn new(size: f64) -> Option<Self> {
        if size.is_finite() && size >= 0.0 {
            Some(Self(size))
        } else {
            None
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    pub fn is_natural(self) -> bool {
        self.0 <= 0.0
    }
}

/// Cursor-tracking brush.
///
/// The stamp is rotated by the angle of the vector from the surface origin to
/// the cursor, not by the drag direction, which gives scratches their radial
/// look.
#[derive(Debug, Clone, Copy, Default)]
pub struct Brush {
    x: f64,
    y: f64,
}

impl Brush {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn update_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Stamps the brush at the current cursor position.
    pub fn stamp<S: Surface>(&self, surface: &mut S, image: Option<&S::Image>, size: BrushSize) {
        stamp(surface, image, self.x, self.y, size.get());
    }
}

/// Rotation applied to a stamp at `(x, y)`.
pub fn stamp_angle(x: f64, y: f64) -> f64 {
    y.atan2(x)
}

/// Draws one copy of `image` centered on `(x, y)`.
///
/// With `size > 0` the stamp is `size` wide and keeps the image's aspect
/// ratio; otherwise the natural image size is used. The caller picks the
/// composite mode. The surface transform is restored before returning.
pub fn stamp<S: Surface>(surface: &mut S, image: Option<&S::Image>, x: f64, y: f64, size: f64) {
    let Some(image) = image else {
        return;
    };

    let (natural_w, natural_h) = surface.image_size(image);
    if natural_w == 0 || natural_h == 0 {
        return;
    }
    let (natural_w, natural_h) = (natural_w as f64, natural_h as f64);

    let (width, height) = if size > 0.0 {
        (size, size * (natural_h / natural_w))
    } else {
        (natural_w, natural_h)
    };

    surface.save();
    surface.translate(x, y);
    surface.rotate(stamp_angle(x, y));
    surface.draw_image(image, -(width / 2.0), -(height / 2.0), width, height);
    surface.restore();
}
