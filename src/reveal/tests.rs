use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::*;
use crate::assets::{AssetError, AssetKind, AssetLoader};
use crate::draw::{CairoSurface, Raster, Surface};

const SIZE: u32 = 100;

#[derive(Clone, Default)]
struct MemoryLoader {
    rasters: HashMap<String, Raster>,
    gate: Option<Arc<Semaphore>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MemoryLoader {
    fn with_brush(brush: Raster) -> Self {
        let mut rasters = HashMap::new();
        rasters.insert(
            "mask".to_string(),
            Raster::solid(SIZE, SIZE, [0.6, 0.6, 0.6, 1.0]),
        );
        rasters.insert(
            "background".to_string(),
            Raster::solid(4, 4, [0.0, 0.4, 0.0, 1.0]),
        );
        rasters.insert("brush".to_string(), brush);
        Self {
            rasters,
            ..Self::default()
        }
    }

    fn standard() -> Self {
        Self::with_brush(Raster::solid(20, 20, [0.0, 0.0, 0.0, 1.0]))
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AssetLoader for MemoryLoader {
    async fn load(&self, src: &str) -> Result<Raster, AssetError> {
        self.calls.lock().unwrap().push(src.to_string());
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| AssetError::Decode(e.to_string()))?
                .forget();
        }
        self.rasters
            .get(src)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(src.to_string()))
    }
}

#[derive(Default)]
struct HostLog {
    zone: Zone,
    captures: Vec<PointerId>,
    releases: Vec<PointerId>,
    interactive: Option<bool>,
    backgrounds: usize,
    fail_release: bool,
}

#[derive(Clone, Default)]
struct RecordingHost(Rc<RefCell<HostLog>>);

impl RevealHost for RecordingHost {
    fn bounding_rect(&self) -> Zone {
        self.0.borrow().zone
    }

    fn capture_pointer(&mut self, pointer_id: PointerId) {
        self.0.borrow_mut().captures.push(pointer_id);
    }

    fn release_pointer(&mut self, pointer_id: PointerId) -> Result<(), PointerReleaseError> {
        let mut log = self.0.borrow_mut();
        log.releases.push(pointer_id);
        if log.fail_release {
            Err(PointerReleaseError(pointer_id))
        } else {
            Ok(())
        }
    }

    fn set_interactive(&mut self, interactive: bool) {
        self.0.borrow_mut().interactive = Some(interactive);
    }

    fn attach_background(&mut self, _width: u32, _height: u32) {
        self.0.borrow_mut().backgrounds += 1;
    }
}

#[derive(Clone, Default)]
struct Recorder {
    progress: Rc<RefCell<Vec<f64>>>,
    completions: Rc<Cell<usize>>,
}

impl Recorder {
    fn progress_len(&self) -> usize {
        self.progress.borrow().len()
    }

    fn last_progress(&self) -> Option<f64> {
        self.progress.borrow().last().copied()
    }
}

fn options() -> RevealOptions {
    RevealOptions::new(SIZE, SIZE, AssetSources::new("mask", "background", "brush"))
}

fn build(
    options: RevealOptions,
    loader: MemoryLoader,
) -> (ScratchReveal<CairoSurface>, Recorder, RecordingHost) {
    let recorder = Recorder::default();
    let host = RecordingHost::default();
    let progress = Rc::clone(&recorder.progress);
    let completions = Rc::clone(&recorder.completions);
    let reveal = ScratchReveal::with_cairo(options, Arc::new(loader))
        .unwrap()
        .with_host(host.clone())
        .on_progress(move |percent| progress.borrow_mut().push(percent))
        .on_complete(move || completions.set(completions.get() + 1));
    (reveal, recorder, host)
}

async fn ready(options: RevealOptions) -> (ScratchReveal<CairoSurface>, Recorder, RecordingHost) {
    let (mut reveal, recorder, host) = build(options, MemoryLoader::standard());
    reveal.init().await.unwrap();
    (reveal, recorder, host)
}

fn alpha(reveal: &ScratchReveal<CairoSurface>) -> Vec<u8> {
    reveal.surface().alpha_channel().unwrap()
}

fn at(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

fn event(x: f64, y: f64, time: Instant) -> PointerEvent {
    PointerEvent::new(1, x, y, time)
}

#[test]
fn new_rejects_invalid_configuration() {
    let loader: Arc<dyn AssetLoader> = Arc::new(MemoryLoader::standard());

    let mut missing = options();
    missing.sources.mask = String::new();
    assert!(matches!(
        ScratchReveal::with_cairo(missing, Arc::clone(&loader)),
        Err(RevealError::MissingSource(AssetKind::Mask))
    ));

    let mut flat = options();
    flat.height = 0;
    assert!(matches!(
        ScratchReveal::with_cairo(flat, Arc::clone(&loader)),
        Err(RevealError::InvalidDimensions { .. })
    ));

    assert!(matches!(
        ScratchReveal::with_cairo(options().percent_to_finish(f64::NAN), Arc::clone(&loader)),
        Err(RevealError::InvalidThreshold(_))
    ));

    assert!(matches!(
        ScratchReveal::with_cairo(options().brush_size(-2.0), loader),
        Err(RevealError::InvalidBrushSize(_))
    ));
}

#[tokio::test]
async fn init_draws_mask_and_binds_pointer() {
    let loader = MemoryLoader::standard();
    let (mut reveal, recorder, host) = build(options(), loader.clone());
    assert_eq!(reveal.phase(), Phase::Uninitialized);
    assert!(!reveal.accepts_pointer());

    reveal.init().await.unwrap();

    assert_eq!(loader.call_count(), 3);
    assert_eq!(reveal.phase(), Phase::Ready);
    assert!(reveal.accepts_pointer());
    assert_eq!(reveal.percent(), 0.0);
    assert!(alpha(&reveal).iter().all(|a| *a == 255));
    assert_eq!(host.0.borrow().backgrounds, 1);
    assert_eq!(host.0.borrow().interactive, Some(true));
    assert_eq!(recorder.progress_len(), 0);
}

#[tokio::test]
async fn init_twice_is_rejected() {
    let (mut reveal, _, _) = ready(options()).await;
    assert!(matches!(
        reveal.init().await,
        Err(RevealError::AlreadyInitialized)
    ));
}

#[tokio::test]
async fn load_failure_leaves_controller_inert() {
    let mut loader = MemoryLoader::standard();
    loader.rasters.remove("brush");
    let (mut reveal, recorder, host) = build(options(), loader);

    let err = reveal.init().await.unwrap_err();
    assert!(matches!(
        err,
        RevealError::AssetLoad {
            kind: AssetKind::Brush,
            ..
        }
    ));
    assert_eq!(reveal.phase(), Phase::Failed);

    reveal.pointer_down(event(50.0, 50.0, Instant::now()));
    assert!(alpha(&reveal).iter().all(|a| *a == 0));
    assert_eq!(recorder.progress_len(), 0);
    assert!(host.0.borrow().captures.is_empty());

    assert!(matches!(
        reveal.init().await,
        Err(RevealError::AlreadyInitialized)
    ));
}

#[tokio::test]
async fn destroy_during_load_prevents_all_effects() {
    let gate = Arc::new(Semaphore::new(0));
    let mut loader = MemoryLoader::standard();
    loader.gate = Some(Arc::clone(&gate));
    let (mut reveal, recorder, host) = build(options(), loader.clone());

    let handle = reveal.destroy_handle();
    let (result, ()) = tokio::join!(reveal.init(), async move {
        handle.destroy();
        gate.add_permits(3);
    });

    assert!(result.is_ok());
    assert_eq!(loader.call_count(), 3);
    assert!(reveal.is_destroyed());
    assert!(!reveal.accepts_pointer());
    assert!(alpha(&reveal).iter().all(|a| *a == 0));
    assert_eq!(host.0.borrow().backgrounds, 0);

    reveal.pointer_down(event(50.0, 50.0, Instant::now()));
    reveal.frame(Instant::now());
    assert_eq!(recorder.progress_len(), 0);
    assert_eq!(recorder.completions.get(), 0);
    assert!(alpha(&reveal).iter().all(|a| *a == 0));
}

#[tokio::test]
async fn destroy_before_init_skips_loading() {
    let loader = MemoryLoader::standard();
    let (mut reveal, _, _) = build(options(), loader.clone());
    reveal.destroy();
    reveal.destroy();

    assert!(reveal.init().await.is_ok());
    assert_eq!(loader.call_count(), 0);
    assert_eq!(reveal.phase(), Phase::Uninitialized);
}

#[tokio::test]
async fn destroy_releases_active_capture_once() {
    let (mut reveal, recorder, host) = ready(options().percent_to_finish(100.0)).await;
    let t0 = Instant::now();
    reveal.pointer_down(event(10.0, 10.0, t0));
    reveal.pointer_move(event(40.0, 10.0, at(t0, 5)));

    reveal.destroy();
    reveal.destroy();
    reveal.frame(at(t0, 16));

    assert_eq!(host.0.borrow().releases, vec![1]);
    assert_eq!(recorder.progress_len(), 1);
    assert_eq!(reveal.cursor(), (10.0, 10.0));
}

#[tokio::test]
async fn destroy_handle_after_ready_releases_capture_on_next_call() {
    let (mut reveal, recorder, host) = ready(options().percent_to_finish(100.0)).await;
    let t0 = Instant::now();
    reveal.pointer_down(event(10.0, 10.0, t0));
    reveal.pointer_move(event(40.0, 10.0, at(t0, 5)));

    reveal.destroy_handle().destroy();
    assert!(reveal.is_destroyed());
    assert!(!reveal.accepts_pointer());

    reveal.frame(at(t0, 16));
    reveal.pointer_up(event(40.0, 10.0, at(t0, 20)));
    reveal.destroy();

    assert_eq!(host.0.borrow().releases, vec![1]);
    assert_eq!(recorder.progress_len(), 1);
    assert_eq!(reveal.cursor(), (10.0, 10.0));
}

#[tokio::test]
async fn pointer_down_stamps_and_reports() {
    let (mut reveal, recorder, host) = ready(options().percent_to_finish(100.0)).await;
    reveal.pointer_down(event(50.0, 50.0, Instant::now()));

    assert_eq!(host.0.borrow().captures, vec![1]);
    assert_eq!(recorder.progress_len(), 1);
    assert!(reveal.percent() > 0.0);
    assert_eq!(recorder.last_progress(), Some(reveal.percent()));
    assert_eq!(reveal.cursor(), (50.0, 50.0));
}

#[tokio::test]
async fn moves_are_coalesced_until_the_next_frame() {
    let (mut reveal, recorder, _) = ready(options().percent_to_finish(100.0)).await;
    let t0 = Instant::now();
    reveal.pointer_down(event(10.0, 10.0, t0));

    reveal.pointer_move(event(30.0, 10.0, at(t0, 2)));
    reveal.pointer_move(event(50.0, 10.0, at(t0, 4)));
    reveal.pointer_move(event(90.0, 90.0, at(t0, 6)));
    assert_eq!(recorder.progress_len(), 1);
    assert_eq!(reveal.cursor(), (10.0, 10.0));

    reveal.frame(at(t0, 16));
    assert_eq!(reveal.cursor(), (90.0, 90.0));
    assert_eq!(recorder.progress_len(), 2);

    // Nothing pending: a frame without moves does not stamp or report.
    reveal.frame(at(t0, 32));
    assert_eq!(recorder.progress_len(), 2);
}

#[tokio::test]
async fn moves_from_other_pointers_are_ignored() {
    let (mut reveal, recorder, _) = ready(options().percent_to_finish(100.0)).await;
    let t0 = Instant::now();
    reveal.pointer_move(event(30.0, 30.0, t0));
    reveal.frame(at(t0, 16));
    assert_eq!(recorder.progress_len(), 0);

    reveal.pointer_down(event(10.0, 10.0, at(t0, 20)));
    reveal.pointer_move(PointerEvent::new(7, 60.0, 60.0, at(t0, 24)));
    reveal.frame(at(t0, 32));
    assert_eq!(reveal.cursor(), (10.0, 10.0));
    assert_eq!(recorder.progress_len(), 1);
}

#[tokio::test]
async fn pointer_up_flushes_pending_move_and_releases_capture() {
    let (mut reveal, recorder, host) = ready(options().percent_to_finish(100.0)).await;
    let t0 = Instant::now();
    reveal.pointer_down(event(10.0, 10.0, t0));
    reveal.pointer_move(event(70.0, 40.0, at(t0, 4)));
    reveal.pointer_up(event(70.0, 40.0, at(t0, 8)));

    assert_eq!(reveal.cursor(), (70.0, 40.0));
    assert_eq!(recorder.progress_len(), 3);
    assert_eq!(host.0.borrow().releases, vec![1]);

    // Moves after release are not tracked.
    reveal.pointer_move(event(20.0, 80.0, at(t0, 12)));
    reveal.frame(at(t0, 16));
    assert_eq!(reveal.cursor(), (70.0, 40.0));
}

#[tokio::test]
async fn pointer_leave_reports_without_stamping() {
    let (mut reveal, recorder, _) = ready(options().percent_to_finish(100.0)).await;
    let before = alpha(&reveal);
    reveal.pointer_leave(event(50.0, 50.0, Instant::now()));

    assert_eq!(alpha(&reveal), before);
    assert_eq!(recorder.progress.borrow().as_slice(), &[0.0]);
}

#[tokio::test]
async fn completion_fires_exactly_once() {
    let (mut reveal, recorder, host) = ready(options().brush_size(40.0).percent_to_finish(30.0)).await;
    let t0 = Instant::now();
    reveal.pointer_down(event(10.0, 50.0, t0));
    assert!(!reveal.is_done());

    let mut ms = 0;
    for _ in 0..3 {
        for y in [20.0, 50.0, 80.0] {
            for x in [10.0, 30.0, 50.0, 70.0, 90.0] {
                ms += 16;
                reveal.pointer_move(event(x, y, at(t0, ms - 8)));
                reveal.frame(at(t0, ms));
            }
        }
    }

    assert!(reveal.is_done());
    assert_eq!(recorder.completions.get(), 1);
    assert!(recorder.last_progress().unwrap() > 30.0);
    assert_eq!(host.0.borrow().interactive, Some(false));
    assert_eq!(host.0.borrow().releases, vec![1]);

    let emitted = recorder.progress_len();
    reveal.pointer_down(event(50.0, 50.0, at(t0, ms + 20)));
    reveal.pointer_up(event(50.0, 50.0, at(t0, ms + 30)));
    assert_eq!(recorder.progress_len(), emitted);
    assert_eq!(recorder.completions.get(), 1);
    assert_eq!(host.0.borrow().captures, vec![1]);
}

#[tokio::test]
async fn completion_tolerates_lost_capture() {
    let (mut reveal, recorder, host) = ready(options().brush_size(80.0).percent_to_finish(20.0)).await;
    host.0.borrow_mut().fail_release = true;

    reveal.pointer_down(event(50.0, 50.0, Instant::now()));

    assert!(reveal.is_done());
    assert_eq!(recorder.completions.get(), 1);
    assert_eq!(host.0.borrow().releases, vec![1]);
}

#[tokio::test]
async fn completion_fades_then_clears_surface() {
    let (mut reveal, _, _) = ready(options().brush_size(80.0).percent_to_finish(20.0)).await;
    let t0 = Instant::now();
    reveal.pointer_down(event(50.0, 50.0, t0));
    assert!(reveal.is_done());

    assert_eq!(reveal.opacity(t0), 1.0);
    assert!((reveal.opacity(at(t0, 175)) - 0.5).abs() < 1e-6);
    reveal.frame(at(t0, 200));
    assert!(alpha(&reveal).iter().any(|a| *a != 0));

    reveal.frame(at(t0, 350));
    assert!(alpha(&reveal).iter().all(|a| *a == 0));
    assert_eq!(reveal.opacity(at(t0, 400)), 0.0);
}

#[tokio::test]
async fn zero_fade_clears_immediately() {
    let (mut reveal, _, _) = ready(
        options()
            .brush_size(80.0)
            .percent_to_finish(20.0)
            .fade_duration(Duration::ZERO),
    )
    .await;
    reveal.pointer_down(event(50.0, 50.0, Instant::now()));
    assert!(reveal.is_done());
    assert!(alpha(&reveal).iter().all(|a| *a == 0));
}

#[tokio::test]
async fn progress_interval_throttles_move_samples() {
    let (mut reveal, recorder, _) = ready(
        options()
            .percent_to_finish(100.0)
            .progress_interval(Duration::from_millis(120)),
    )
    .await;
    let t0 = Instant::now();
    reveal.pointer_down(event(10.0, 10.0, t0));

    for i in 1..=10u64 {
        reveal.pointer_move(event(10.0 + i as f64 * 8.0, 10.0, at(t0, i * 16 - 4)));
        reveal.frame(at(t0, i * 16));
    }
    // The down sample, then the first frame at least 120ms later (t=128ms).
    assert_eq!(recorder.progress_len(), 2);

    reveal.pointer_up(event(90.0, 10.0, at(t0, 170)));
    assert_eq!(recorder.progress_len(), 3);
}

#[tokio::test]
async fn completing_sample_bypasses_progress_throttle() {
    let (mut reveal, recorder, _) = ready(
        options()
            .percent_to_finish(5.0)
            .progress_interval(Duration::from_millis(120)),
    )
    .await;
    let t0 = Instant::now();
    reveal.pointer_down(event(0.0, 0.0, t0));
    assert!(!reveal.is_done());
    assert_eq!(recorder.progress_len(), 1);

    reveal.set_brush_size(60.0);
    reveal.pointer_move(event(50.0, 50.0, at(t0, 8)));
    reveal.frame(at(t0, 16));

    assert!(reveal.is_done());
    assert_eq!(recorder.progress_len(), 2);
    assert!(recorder.last_progress().unwrap() > 5.0);
    assert_eq!(recorder.completions.get(), 1);
}

#[tokio::test]
async fn disabled_percent_updates_never_complete() {
    let mut opts = options().brush_size(80.0).percent_to_finish(1.0);
    opts.enabled_percent_update = false;
    let (mut reveal, recorder, _) = ready(opts).await;

    reveal.pointer_down(event(50.0, 50.0, Instant::now()));
    reveal.pointer_up(event(50.0, 50.0, Instant::now()));

    assert_eq!(reveal.percent(), 0.0);
    assert_eq!(recorder.progress_len(), 0);
    assert!(!reveal.is_done());
    assert!(alpha(&reveal).iter().any(|a| *a == 0));
}

#[tokio::test]
async fn pointer_coordinates_use_zone_offset_and_scale() {
    let (mut reveal, _, host) = ready(options().percent_to_finish(100.0)).await;
    host.0.borrow_mut().zone = Zone::new(10.0, 20.0, 50.0, 50.0);

    reveal.pointer_down(event(35.0, 45.0, Instant::now()));
    assert_eq!(reveal.cursor(), (50.0, 50.0));
}

#[tokio::test]
async fn cached_zone_is_refreshed_per_event_when_configured() {
    let mut opts = options().percent_to_finish(100.0);
    opts.offset_per_event = true;
    let (mut reveal, _, host) = ready(opts).await;
    let t0 = Instant::now();

    reveal.pointer_down(event(10.0, 10.0, t0));
    host.0.borrow_mut().zone = Zone::at(0.0, -30.0);
    reveal.pointer_move(event(10.0, 10.0, at(t0, 4)));
    reveal.frame(at(t0, 16));
    assert_eq!(reveal.cursor(), (10.0, 40.0));
}

#[tokio::test]
async fn resize_is_ignored_for_degenerate_or_unchanged_sizes() {
    let (mut reveal, _, _) = ready(options().percent_to_finish(100.0)).await;
    reveal.pointer_down(event(50.0, 50.0, Instant::now()));
    let percent = reveal.percent();
    assert!(percent > 0.0);

    reveal.resize(SIZE, SIZE);
    reveal.resize(0, 50);
    reveal.resize(50, 0);
    assert_eq!(reveal.percent(), percent);
    assert_eq!(reveal.surface().width(), SIZE);
}

#[tokio::test]
async fn resize_resets_progress_and_redraws_mask() {
    let (mut reveal, _, _) = ready(options().percent_to_finish(100.0)).await;
    reveal.pointer_down(event(50.0, 50.0, Instant::now()));
    assert!(reveal.percent() > 0.0);

    reveal.resize(160, 120);
    assert_eq!(reveal.percent(), 0.0);
    assert_eq!(
        (reveal.surface().width(), reveal.surface().height()),
        (160, 120)
    );
    let pixels = alpha(&reveal);
    assert_eq!(pixels.len(), 160 * 120);
    assert!(pixels.iter().all(|a| *a == 255));
}

#[tokio::test]
async fn resize_after_done_or_destroy_is_ignored() {
    let (mut done, _, _) = ready(options().brush_size(80.0).percent_to_finish(20.0)).await;
    done.pointer_down(event(50.0, 50.0, Instant::now()));
    assert!(done.is_done());
    done.resize(200, 200);
    assert_eq!(done.surface().width(), SIZE);

    let (mut destroyed, _, _) = ready(options()).await;
    destroyed.destroy();
    destroyed.resize(200, 200);
    assert_eq!(destroyed.surface().width(), SIZE);
}

#[tokio::test]
async fn resize_after_load_failure_is_ignored() {
    let mut loader = MemoryLoader::standard();
    loader.rasters.remove("mask");
    let (mut reveal, _, _) = build(options(), loader);
    assert!(reveal.init().await.is_err());

    reveal.resize(200, 150);
    assert_eq!(reveal.surface().width(), SIZE);
    assert_eq!(reveal.surface().height(), SIZE);
    assert!(alpha(&reveal).iter().all(|a| *a == 0));
}

#[tokio::test]
async fn set_brush_size_validates_input() {
    let brush = Raster::solid(20, 10, [0.0, 0.0, 0.0, 1.0]);
    let (mut reveal, _, _) = build(
        options().brush_size(32.0).percent_to_finish(100.0),
        MemoryLoader::with_brush(brush),
    );
    reveal.init().await.unwrap();

    reveal.set_brush_size(-1.0);
    reveal.set_brush_size(f64::NAN);
    reveal.set_brush_size(f64::INFINITY);
    assert_eq!(reveal.brush_size().get(), 32.0);

    reveal.set_brush_size(0.0);
    assert!(reveal.brush_size().is_natural());

    // On the x axis the stamp is unrotated: a natural 20x10 brush centered on
    // the top edge clears exactly 20x5 pixels.
    reveal.pointer_down(event(50.0, 0.0, Instant::now()));
    assert_eq!(reveal.percent(), 1.0);
}

#[tokio::test]
async fn set_brush_size_after_destroy_is_ignored() {
    let (mut reveal, _, _) = ready(options().brush_size(12.0)).await;
    reveal.destroy();
    reveal.set_brush_size(40.0);
    assert_eq!(reveal.brush_size().get(), 12.0);
}

#[tokio::test]
async fn clear_wipes_surface() {
    let (mut reveal, _, _) = ready(options()).await;
    reveal.clear();
    assert!(alpha(&reveal).iter().all(|a| *a == 0));
}
