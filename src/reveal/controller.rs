//! Reveal controller: owns the scratch surface and drives the scratch loop.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use super::error::RevealError;
use super::events::{PointerEvent, PointerId};
use super::fade::FadeTransition;
use super::host::{DetachedHost, RevealHost, Zone};
use super::lifecycle::{DestroyHandle, Phase};
use super::options::RevealOptions;
use super::schedule::{FrameThrottle, ProgressThrottle};
use crate::assets::{AssetKind, AssetLoader};
use crate::draw::{
    Brush, BrushSize, CairoSurface, CompositeMode, Raster, Surface, SurfaceError,
    estimate_cleared_percent, render_scene,
};

struct Assets<I> {
    mask: I,
    background: I,
    brush: I,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// Emit regardless of the progress interval
    Always,
    /// Subject to the progress interval (completion samples still go through)
    Throttled,
}

/// Scratch-off reveal widget core.
///
/// Pointer handlers run synchronously. Moves are coalesced and applied by
/// [`ScratchReveal::frame`], which the host calls once per rendered frame.
/// Once destroyed, every operation except [`ScratchReveal::clear`] is a no-op.
pub struct ScratchReveal<S: Surface = CairoSurface> {
    options: RevealOptions,
    surface: S,
    host: Box<dyn RevealHost>,
    loader: Arc<dyn AssetLoader>,
    assets: Option<Assets<S::Image>>,
    brush: Brush,
    brush_size: BrushSize,
    percent: f64,
    phase: Phase,
    lifecycle: DestroyHandle,
    zone: Zone,
    /// Pointer listeners are bound (between a successful init and destroy)
    listening: bool,
    /// Pointer that is scratching and holds capture, if any
    active_pointer: Option<PointerId>,
    moves: FrameThrottle<PointerEvent>,
    progress: ProgressThrottle,
    fade: FadeTransition,
    on_progress: Option<Box<dyn FnMut(f64)>>,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl<S: Surface> ScratchReveal<S> {
    /// Creates a controller around `surface`, resizing it to the configured size.
    ///
    /// # Errors
    /// Fails fast on configuration problems: zero dimensions, a missing asset
    /// source, a non-finite threshold or an invalid brush size.
    pub fn new(
        options: RevealOptions,
        mut surface: S,
        loader: Arc<dyn AssetLoader>,
    ) -> Result<Self, RevealError> {
        validate_options(&options)?;
        let brush_size = BrushSize::new(options.brush_size)
            .ok_or(RevealError::InvalidBrushSize(options.brush_size))?;

        if surface.width() != options.width || surface.height() != options.height {
            surface.resize(options.width, options.height)?;
        }

        let progress = ProgressThrottle::new(options.progress_interval);
        let fade = FadeTransition::new(options.fade_duration);

        Ok(Self {
            options,
            surface,
            host: Box::new(DetachedHost::new(Zone::default())),
            loader,
            assets: None,
            brush: Brush::default(),
            brush_size,
            percent: 0.0,
            phase: Phase::Uninitialized,
            lifecycle: DestroyHandle::new(),
            zone: Zone::default(),
            listening: false,
            active_pointer: None,
            moves: FrameThrottle::default(),
            progress,
            fade,
            on_progress: None,
            on_complete: None,
        })
    }

    /// Replaces the host used for layout and pointer capture.
    pub fn with_host(mut self, host: impl RevealHost + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    /// Sets the callback invoked with every emitted percentage.
    pub fn on_progress(mut self, callback: impl FnMut(f64) + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Sets the callback invoked once when the reveal completes.
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Handle that can destroy this controller while `init` is pending.
    pub fn destroy_handle(&self) -> DestroyHandle {
        self.lifecycle.clone()
    }

    /// Loads the mask, background and brush concurrently, then draws the mask
    /// and starts accepting pointer input.
    ///
    /// If the controller is destroyed before the loads resolve, the loaded
    /// rasters are dropped and `Ok(())` is returned without touching the
    /// surface.
    ///
    /// # Errors
    /// Returns the first asset failure; the controller then stays inert and a
    /// new instance is required to retry. Calling `init` twice returns
    /// [`RevealError::AlreadyInitialized`].
    pub async fn init(&mut self) -> Result<(), RevealError> {
        if self.lifecycle.is_destroyed() {
            debug!("init called on destroyed controller; ignoring");
            return Ok(());
        }
        if self.phase != Phase::Uninitialized {
            return Err(RevealError::AlreadyInitialized);
        }
        self.phase = Phase::Loading;
        info!(
            "Loading scratch reveal assets ({}x{})",
            self.options.width, self.options.height
        );

        let loader = Arc::clone(&self.loader);
        let sources = self.options.sources.clone();
        let loaded = futures::try_join!(
            load_asset(loader.as_ref(), AssetKind::Brush, &sources.brush),
            load_asset(loader.as_ref(), AssetKind::Mask, &sources.mask),
            load_asset(loader.as_ref(), AssetKind::Background, &sources.background),
        );

        if self.lifecycle.is_destroyed() {
            debug!("Controller destroyed while loading assets; abandoning init");
            return Ok(());
        }

        let (brush, mask, background) = match loaded {
            Ok(rasters) => rasters,
            Err(err) => {
                warn!("Scratch reveal initialization failed: {}", err);
                self.phase = Phase::Failed;
                return Err(err);
            }
        };

        let assets = match self.upload_assets(&mask, &background, &brush) {
            Ok(assets) => assets,
            Err(err) => {
                warn!("Failed to prepare scratch reveal assets: {}", err);
                self.phase = Phase::Failed;
                return Err(err.into());
            }
        };
        self.assets = Some(assets);

        self.draw_mask();
        self.place_background();
        self.zone = self.host.bounding_rect();
        self.host.set_interactive(true);
        self.listening = true;
        self.phase = Phase::Ready;
        info!("Scratch reveal ready");
        Ok(())
    }

    fn upload_assets(
        &self,
        mask: &Raster,
        background: &Raster,
        brush: &Raster,
    ) -> Result<Assets<S::Image>, SurfaceError> {
        Ok(Assets {
            mask: self.surface.upload(mask)?,
            background: self.surface.upload(background)?,
            brush: self.surface.upload(brush)?,
        })
    }

    /// Marks the controller destroyed and detaches pointer handling.
    ///
    /// Safe to call repeatedly and before `init` completes.
    pub fn destroy(&mut self) {
        if !self.lifecycle.is_destroyed() {
            debug!("Destroying scratch reveal");
        }
        self.lifecycle.destroy();
        self.detach_if_destroyed();
    }

    /// Tears down input state once the destroyed flag is set, which may have
    /// happened through a [`DestroyHandle`]. Capture is released at most once.
    fn detach_if_destroyed(&mut self) -> bool {
        if !self.lifecycle.is_destroyed() {
            return false;
        }
        self.listening = false;
        self.moves.cancel();
        if let Some(pointer_id) = self.active_pointer.take() {
            self.release_capture(pointer_id);
        }
        true
    }

    /// Resizes the surface and redraws a fresh mask.
    ///
    /// Ignored when destroyed, done or failed, given a zero dimension, or when the size
    /// is unchanged. Resets the recorded percentage to 0.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.lifecycle.is_destroyed() || matches!(self.phase, Phase::Done | Phase::Failed) {
            return;
        }
        if width == 0 || height == 0 {
            return;
        }
        if self.surface.width() == width && self.surface.height() == height {
            return;
        }

        if let Err(err) = self.surface.resize(width, height) {
            warn!("Failed to resize scratch surface to {}x{}: {}", width, height, err);
            return;
        }
        debug!("Resized scratch surface to {}x{}", width, height);

        self.percent = 0.0;
        self.surface.set_composite(CompositeMode::SourceOver);
        self.draw_mask();
        self.zone = self.host.bounding_rect();
    }

    /// Updates the brush width used by later stamps; 0 means natural size.
    ///
    /// Negative and non-finite sizes are ignored.
    pub fn set_brush_size(&mut self, size: f64) {
        if self.lifecycle.is_destroyed() {
            return;
        }
        if let Some(size) = BrushSize::new(size) {
            self.brush_size = size;
        }
    }

    /// Wipes the surface to fully transparent.
    pub fn clear(&mut self) {
        self.surface.clear();
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle.is_destroyed()
    }

    pub fn brush_size(&self) -> BrushSize {
        self.brush_size
    }

    /// Cursor position in surface pixels.
    pub fn cursor(&self) -> (f64, f64) {
        self.brush.position()
    }

    /// Whether pointer input currently reaches the controller.
    pub fn accepts_pointer(&self) -> bool {
        self.listening && self.phase == Phase::Ready && !self.lifecycle.is_destroyed()
    }

    /// Scratch layer opacity at `now` (below 1 only while the completion fade runs).
    pub fn opacity(&self, now: Instant) -> f64 {
        self.fade.opacity(now)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    /// Starts a scratch: captures the pointer and stamps once.
    pub fn pointer_down(&mut self, event: PointerEvent) {
        if self.detach_if_destroyed() || !self.accepts_pointer() {
            return;
        }

        // Layout may have shifted since the last interaction.
        self.zone = self.host.bounding_rect();
        self.update_position(&event);
        self.scratch();

        if let Some(previous) = self.active_pointer.replace(event.pointer_id) {
            if previous != event.pointer_id {
                self.release_capture(previous);
            }
        }
        self.host.capture_pointer(event.pointer_id);
        self.moves.cancel();

        self.sample(event.time, Delivery::Always);
        self.evaluate_completion(event.time);
    }

    /// Queues a move for the next [`ScratchReveal::frame`]; only the latest is kept.
    pub fn pointer_move(&mut self, event: PointerEvent) {
        if self.detach_if_destroyed() {
            return;
        }
        if !self.accepts_pointer() || self.active_pointer != Some(event.pointer_id) {
            return;
        }
        self.moves.schedule(event);
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        self.end_interaction(event);
    }

    pub fn pointer_leave(&mut self, event: PointerEvent) {
        self.end_interaction(event);
    }

    /// Applies the pending move, if any, and advances the completion fade.
    pub fn frame(&mut self, now: Instant) {
        if self.detach_if_destroyed() {
            return;
        }
        if let Some(event) = self.moves.take() {
            self.handle_move(event, now);
        }
        if self.fade.advance(now) {
            debug!("Completion fade finished; clearing surface");
            self.surface.clear();
        }
    }

    fn handle_move(&mut self, event: PointerEvent, now: Instant) {
        if !self.accepts_pointer() || self.active_pointer != Some(event.pointer_id) {
            return;
        }
        self.update_position(&event);
        self.scratch();
        self.sample(now, Delivery::Throttled);
        self.evaluate_completion(now);
    }

    fn end_interaction(&mut self, event: PointerEvent) {
        if self.detach_if_destroyed() || !self.accepts_pointer() {
            return;
        }
        if let Some(pending) = self.moves.take() {
            self.handle_move(pending, event.time);
            if self.phase == Phase::Done {
                return;
            }
        }

        self.sample(event.time, Delivery::Always);
        if self.active_pointer == Some(event.pointer_id) {
            self.active_pointer = None;
            self.release_capture(event.pointer_id);
        }
        self.evaluate_completion(event.time);
    }

    fn update_position(&mut self, event: &PointerEvent) {
        if self.options.offset_per_event {
            self.zone = self.host.bounding_rect();
        }
        let (x, y) = self.zone.to_surface(
            event.client_x,
            event.client_y,
            self.surface.width(),
            self.surface.height(),
        );
        self.brush.update_position(x, y);
    }

    fn scratch(&mut self) {
        let Some(assets) = self.assets.as_ref() else {
            return;
        };
        self.surface.set_composite(CompositeMode::DestinationOut);
        self.brush
            .stamp(&mut self.surface, Some(&assets.brush), self.brush_size);
    }

    fn draw_mask(&mut self) {
        let Some(assets) = self.assets.as_ref() else {
            return;
        };
        let width = self.surface.width() as f64;
        let height = self.surface.height() as f64;
        self.surface.set_composite(CompositeMode::SourceOver);
        self.surface.clear();
        self.surface.draw_image(&assets.mask, 0.0, 0.0, width, height);
    }

    fn place_background(&mut self) {
        if self.assets.is_none() {
            return;
        }
        self.host
            .attach_background(self.surface.width(), self.surface.height());
    }

    fn sample(&mut self, now: Instant, delivery: Delivery) {
        if !self.options.enabled_percent_update {
            return;
        }
        match estimate_cleared_percent(&self.surface) {
            Ok(percent) => self.percent = percent,
            Err(err) => {
                warn!("Failed to sample scratch coverage: {}", err);
                return;
            }
        }

        let completes = self.phase == Phase::Ready && self.crossed_threshold();
        if delivery == Delivery::Always || completes || self.progress.ready(now) {
            self.progress.record(now);
            if let Some(callback) = self.on_progress.as_mut() {
                callback(self.percent);
            }
        }
    }

    fn crossed_threshold(&self) -> bool {
        self.percent > self.options.percent_to_finish
    }

    fn evaluate_completion(&mut self, now: Instant) {
        if self.phase != Phase::Ready || !self.crossed_threshold() {
            return;
        }

        self.phase = Phase::Done;
        info!("Scratch reveal complete at {:.1}%", self.percent);
        self.host.set_interactive(false);
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }

        if let Some(pointer_id) = self.active_pointer.take() {
            self.release_capture(pointer_id);
        }
        self.moves.cancel();

        if self.fade.start(now) && self.fade.advance(now) {
            self.surface.clear();
        }
    }

    fn release_capture(&mut self, pointer_id: PointerId) {
        if let Err(err) = self.host.release_pointer(pointer_id) {
            debug!("Ignoring pointer release failure: {}", err);
        }
    }
}

impl ScratchReveal<CairoSurface> {
    /// Creates a controller drawing into a new cairo surface.
    pub fn with_cairo(
        options: RevealOptions,
        loader: Arc<dyn AssetLoader>,
    ) -> Result<Self, RevealError> {
        let surface = CairoSurface::new(options.width.max(1), options.height.max(1))?;
        Self::new(options, surface, loader)
    }

    /// Paints the background and the scratch layer (at the current fade
    /// opacity) into `ctx`.
    pub fn render(&self, ctx: &cairo::Context, now: Instant) -> Result<(), cairo::Error> {
        let background = self.assets.as_ref().map(|assets| &assets.background);
        render_scene(ctx, background, &self.surface, self.opacity(now))
    }
}

async fn load_asset(
    loader: &dyn AssetLoader,
    kind: AssetKind,
    src: &str,
) -> Result<Raster, RevealError> {
    loader
        .load(src)
        .await
        .map_err(|source| RevealError::AssetLoad {
            kind,
            src: src.to_string(),
            source,
        })
}

fn validate_options(options: &RevealOptions) -> Result<(), RevealError> {
    if options.width == 0 || options.height == 0 {
        return Err(RevealError::InvalidDimensions {
            width: options.width,
            height: options.height,
        });
    }

    let sources = [
        (AssetKind::Mask, &options.sources.mask),
        (AssetKind::Background, &options.sources.background),
        (AssetKind::Brush, &options.sources.brush),
    ];
    for (kind, src) in sources {
        if src.trim().is_empty() {
            return Err(RevealError::MissingSource(kind));
        }
    }

    if !options.percent_to_finish.is_finite() {
        return Err(RevealError::InvalidThreshold(options.percent_to_finish));
    }

    Ok(())
}
