//! Backend-neutral drawing surface used by the reveal controller.

use thiserror::Error;

use super::Raster;

/// How drawn pixels combine with the pixels already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Regular painting: source over destination.
    #[default]
    SourceOver,
    /// Erasing: destination alpha is reduced by source alpha.
    DestinationOut,
}

/// 2D affine transform in cairo's `(xx, yx, xy, yy, x0, y0)` layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        xx: 1.0,
        yx: 0.0,
        xy: 0.0,
        yy: 1.0,
        x0: 0.0,
        y0: 0.0,
    };
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Errors raised by a drawing backend.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("Surface pixels are not accessible: {0}")]
    Borrow(#[from] cairo::BorrowError),

    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// A 2D raster with an alpha channel plus the drawing primitives the reveal
/// controller needs.
///
/// Resizing discards the contents and resets the composite mode, matching how
/// an HTML canvas behaves when its dimensions change.
pub trait Surface {
    /// Backend representation of an uploaded [`Raster`].
    type Image;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Reallocates the surface. Contents become fully transparent and the
    /// composite mode returns to [`CompositeMode::SourceOver`].
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;

    /// Converts a decoded raster into something this backend can draw.
    fn upload(&self, raster: &Raster) -> Result<Self::Image, SurfaceError>;

    /// Natural pixel size of an uploaded image.
    fn image_size(&self, image: &Self::Image) -> (u32, u32);

    fn set_composite(&mut self, mode: CompositeMode);
    fn composite(&self) -> CompositeMode;

    /// Pushes the transform (and composite mode) onto the state stack.
    fn save(&mut self);
    /// Pops the state pushed by the matching [`Surface::save`].
    fn restore(&mut self);

    fn translate(&mut self, dx: f64, dy: f64);
    fn rotate(&mut self, angle: f64);
    fn transform(&self) -> Transform;

    /// Draws `image` scaled into the rectangle `(x, y, width, height)` in the
    /// current user space using the current composite mode.
    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64, width: f64, height: f64);

    /// Wipes every pixel to fully transparent, ignoring composite mode and transform.
    fn clear(&mut self);

    /// One alpha byte per pixel, row-major, `width * height` entries.
    fn alpha_channel(&self) -> Result<Vec<u8>, SurfaceError>;
}
