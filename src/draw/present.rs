//! Scene composition: background behind the scratch layer.

use cairo::{Context, Extend, ImageSurface, SurfacePattern};

use super::CairoSurface;

/// Paints `background` stretched over the layer's size, then the scratch
/// layer on top at `opacity`.
///
/// Drawing starts at the context's current origin, so callers position the
/// widget by translating beforehand.
pub fn render_scene(
    ctx: &Context,
    background: Option<&ImageSurface>,
    layer: &CairoSurface,
    opacity: f64,
) -> Result<(), cairo::Error> {
    let layer_surface = layer.image_surface();
    let width = layer_surface.width() as f64;
    let height = layer_surface.height() as f64;

    ctx.save()?;

    if let Some(background) = background {
        let (bg_w, bg_h) = (background.width() as f64, background.height() as f64);
        if bg_w > 0.0 && bg_h > 0.0 {
            ctx.save()?;
            ctx.scale(width / bg_w, height / bg_h);
            let pattern = SurfacePattern::create(background);
            pattern.set_extend(Extend::Pad);
            ctx.set_source(&pattern)?;
            ctx.rectangle(0.0, 0.0, bg_w, bg_h);
            ctx.fill()?;
            ctx.restore()?;
        }
    }

    let opacity = opacity.clamp(0.0, 1.0);
    if opacity > 0.0 {
        layer_surface.flush();
        ctx.set_source_surface(layer_surface, 0.0, 0.0)?;
        ctx.paint_with_alpha(opacity)?;
    }

    ctx.restore()
}
