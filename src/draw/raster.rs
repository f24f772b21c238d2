//! Decoded raster images shared by the stamper and the mask/background routines.

use std::io::Cursor;
use std::sync::Arc;

use cairo::{Context, Format, ImageSurface};

use crate::assets::AssetError;

/// An immutable decoded image in premultiplied ARGB32 (native-endian) layout.
///
/// Rasters are backend-neutral and `Send + Sync`, so asset loaders can decode
/// them off the UI thread. Surfaces turn them into their own image type via
/// [`Surface::upload`](super::Surface::upload).
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    stride: usize,
    data: Arc<[u8]>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish()
    }
}

impl Raster {
    /// Wraps premultiplied ARGB32 pixel data.
    ///
    /// Returns `None` when the buffer is too small for `stride * height` or the
    /// stride cannot hold `width` pixels.
    pub fn from_argb32(width: u32, height: u32, stride: usize, data: Vec<u8>) -> Option<Self> {
        if stride < width as usize * 4 || data.len() < stride * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            stride,
            data: data.into(),
        })
    }

    /// Creates a raster filled with a single colour (straight alpha, 0.0-1.0).
    pub fn solid(width: u32, height: u32, rgba: [f64; 4]) -> Self {
        let a = rgba[3].clamp(0.0, 1.0);
        let channel = |c: f64| (c.clamp(0.0, 1.0) * a * 255.0).round() as u32;
        let pixel = ((a * 255.0).round() as u32) << 24
            | channel(rgba[0]) << 16
            | channel(rgba[1]) << 8
            | channel(rgba[2]);

        let stride = width as usize * 4;
        let mut data = Vec::with_capacity(stride * height as usize);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&pixel.to_ne_bytes());
        }

        Self {
            width,
            height,
            stride,
            data: data.into(),
        }
    }

    /// Decodes PNG bytes into an ARGB32 raster.
    ///
    /// RGB24 and A8 inputs are normalised by painting them onto an ARGB32
    /// surface, so every raster has the same layout regardless of source.
    pub fn decode_png(bytes: &[u8]) -> Result<Self, AssetError> {
        let decoded = ImageSurface::create_from_png(&mut Cursor::new(bytes))
            .map_err(|e| AssetError::Decode(e.to_string()))?;

        let width = decoded.width();
        let height = decoded.height();
        if width <= 0 || height <= 0 {
            return Err(AssetError::Decode("image has no pixels".to_string()));
        }

        let target = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|e| AssetError::Decode(e.to_string()))?;
        {
            let ctx = Context::new(&target).map_err(|e| AssetError::Decode(e.to_string()))?;
            ctx.set_source_surface(&decoded, 0.0, 0.0)
                .map_err(|e| AssetError::Decode(e.to_string()))?;
            ctx.paint().map_err(|e| AssetError::Decode(e.to_string()))?;
        }
        target.flush();

        let stride = target.stride() as usize;
        let mut data = Vec::new();
        target
            .with_data(|bytes| data.extend_from_slice(bytes))
            .map_err(|e| AssetError::Decode(e.to_string()))?;

        Self::from_argb32(width as u32, height as u32, stride, data)
            .ok_or_else(|| AssetError::Decode("decoded buffer is truncated".to_string()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Alpha value (0-255) of the pixel at `(x, y)`, or `None` outside the image.
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride + x as usize * 4;
        let px = self.data.get(offset..offset + 4)?;
        Some((u32::from_ne_bytes([px[0], px[1], px[2], px[3]]) >> 24) as u8)
    }
}
