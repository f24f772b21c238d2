//! Cairo-backed implementation of [`Surface`].

use cairo::{Context, Extend, Format, ImageSurface, Operator, SurfacePattern};

use super::surface::{CompositeMode, Surface, SurfaceError, Transform};
use super::Raster;

/// Scratch layer backed by an ARGB32 `cairo::ImageSurface`.
pub struct CairoSurface {
    surface: ImageSurface,
    ctx: Context,
}

impl std::fmt::Debug for CairoSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CairoSurface")
            .field("width", &self.surface.width())
            .field("height", &self.surface.height())
            .finish()
    }
}

impl CairoSurface {
    /// Creates a fully transparent surface of the given pixel size.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let (surface, ctx) = allocate(width, height)?;
        Ok(Self { surface, ctx })
    }

    /// The underlying image surface, e.g. for presenting or PNG export.
    pub fn image_surface(&self) -> &ImageSurface {
        &self.surface
    }
}

fn allocate(width: u32, height: u32) -> Result<(ImageSurface, Context), SurfaceError> {
    if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(SurfaceError::InvalidSize { width, height });
    }
    let surface = ImageSurface::create(Format::ARgb32, width as i32, height as i32)?;
    let ctx = Context::new(&surface)?;
    Ok((surface, ctx))
}

fn operator_for(mode: CompositeMode) -> Operator {
    match mode {
        CompositeMode::SourceOver => Operator::Over,
        CompositeMode::DestinationOut => Operator::DestOut,
    }
}

impl Surface for CairoSurface {
    type Image = ImageSurface;

    fn width(&self) -> u32 {
        self.surface.width() as u32
    }

    fn height(&self) -> u32 {
        self.surface.height() as u32
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        let (surface, ctx) = allocate(width, height)?;
        self.surface = surface;
        self.ctx = ctx;
        Ok(())
    }

    fn upload(&self, raster: &Raster) -> Result<ImageSurface, SurfaceError> {
        let image = ImageSurface::create_for_data(
            raster.data().to_vec(),
            Format::ARgb32,
            raster.width() as i32,
            raster.height() as i32,
            raster.stride() as i32,
        )?;
        Ok(image)
    }

    fn image_size(&self, image: &ImageSurface) -> (u32, u32) {
        (image.width().max(0) as u32, image.height().max(0) as u32)
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.ctx.set_operator(operator_for(mode));
    }

    fn composite(&self) -> CompositeMode {
        match self.ctx.operator() {
            Operator::DestOut => CompositeMode::DestinationOut,
            _ => CompositeMode::SourceOver,
        }
    }

    fn save(&mut self) {
        let _ = self.ctx.save();
    }

    fn restore(&mut self) {
        let _ = self.ctx.restore();
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.ctx.translate(dx, dy);
    }

    fn rotate(&mut self, angle: f64) {
        self.ctx.rotate(angle);
    }

    fn transform(&self) -> Transform {
        let m = self.ctx.matrix();
        Transform {
            xx: m.xx(),
            yx: m.yx(),
            xy: m.xy(),
            yy: m.yy(),
            x0: m.x0(),
            y0: m.y0(),
        }
    }

    fn draw_image(&mut self, image: &ImageSurface, x: f64, y: f64, width: f64, height: f64) {
        let (natural_w, natural_h) = (image.width() as f64, image.height() as f64);
        if natural_w <= 0.0 || natural_h <= 0.0 || width <= 0.0 || height <= 0.0 {
            return;
        }

        let _ = self.ctx.save();
        self.ctx.translate(x, y);
        self.ctx.scale(width / natural_w, height / natural_h);
        // Pad so scaled edges sample the image border instead of transparency.
        let pattern = SurfacePattern::create(image);
        pattern.set_extend(Extend::Pad);
        if self.ctx.set_source(&pattern).is_ok() {
            self.ctx.rectangle(0.0, 0.0, natural_w, natural_h);
            let _ = self.ctx.fill();
        }
        let _ = self.ctx.restore();
    }

    fn clear(&mut self) {
        let _ = self.ctx.save();
        self.ctx.identity_matrix();
        self.ctx.set_operator(Operator::Clear);
        let _ = self.ctx.paint();
        let _ = self.ctx.restore();
    }

    fn alpha_channel(&self) -> Result<Vec<u8>, SurfaceError> {
        let width = self.surface.width() as usize;
        let height = self.surface.height() as usize;
        let stride = self.surface.stride() as usize;
        let mut alpha = Vec::with_capacity(width * height);

        self.surface.flush();
        self.surface.with_data(|data| {
            for row in data.chunks(stride).take(height) {
                for px in row[..width * 4].chunks_exact(4) {
                    let value = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                    alpha.push((value >> 24) as u8);
                }
            }
        })?;

        Ok(alpha)
    }
}
