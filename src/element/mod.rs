//! Declarative element wrapper around [`ScratchReveal`].
//!
//! [`ScratchRevealElement`] keeps string attributes the way a markup element
//! does, rebuilds the controller when they change and reports progress,
//! completion and errors as [`RevealEvent`]s on an unbounded channel.

pub mod attributes;
pub mod host;
pub mod registry;


use std::cell::Cell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::assets::{AssetKind, AssetLoader};
use crate::draw::CairoSurface;
use crate::reveal::options::{DEFAULT_HEIGHT, DEFAULT_PERCENT_TO_FINISH, DEFAULT_WIDTH};
use crate::reveal::{
    AssetSources, RevealError, RevealOptions, ScratchReveal, SourcePolicy, Zone,
};

pub use attributes::{parse_brush_size, parse_dimension, parse_flag, parse_number};
pub use host::ElementHost;
pub use registry::{is_registered, register_element};

/// Tag name used when no other is given.
pub const DEFAULT_TAG: &str = "scratch-reveal";

pub const ATTR_WIDTH: &str = "width";
pub const ATTR_HEIGHT: &str = "height";
pub const ATTR_PERCENT_TO_FINISH: &str = "percent-to-finish";
pub const ATTR_COMPLETE_PERCENT: &str = "complete-percent";
pub const ATTR_BRUSH_SRC: &str = "brush-src";
pub const ATTR_BRUSH_SIZE: &str = "brush-size";
pub const ATTR_MASK_SRC: &str = "mask-src";
pub const ATTR_BACKGROUND_SRC: &str = "background-src";
pub const ATTR_ENABLED_PERCENT_UPDATE: &str = "enabled-percent-update";

/// Events dispatched by the element.
#[derive(Debug, Clone, PartialEq)]
pub enum RevealEvent {
    Progress { percent: f64 },
    Complete { percent: f64 },
    Error { message: String },
}

/// Attribute-driven host for a cairo-backed [`ScratchReveal`].
///
/// Creating the first element registers [`DEFAULT_TAG`].
pub struct ScratchRevealElement {
    attributes: BTreeMap<String, String>,
    policy: SourcePolicy,
    loader: Arc<dyn AssetLoader>,
    events: UnboundedSender<RevealEvent>,
    reported_errors: HashSet<String>,
    instance: Option<ScratchReveal<CairoSurface>>,
    /// On-screen rectangle shared with the controller's host
    bounds: Rc<Cell<Zone>>,
    connected: bool,
    rebuild_scheduled: bool,
    /// Last observed host size, used when width/height attributes are absent
    host_size: Option<(u32, u32)>,
}

impl ScratchRevealElement {
    pub fn new(
        loader: Arc<dyn AssetLoader>,
        policy: SourcePolicy,
    ) -> (Self, UnboundedReceiver<RevealEvent>) {
        register_element(DEFAULT_TAG);
        let (events, receiver) = mpsc::unbounded_channel();
        let element = Self {
            attributes: BTreeMap::new(),
            policy,
            loader,
            events,
            reported_errors: HashSet::new(),
            instance: None,
            bounds: Rc::default(),
            connected: false,
            rebuild_scheduled: false,
            host_size: None,
        };
        (element, receiver)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Sets an attribute. Unchanged values do not schedule a rebuild.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if self.attribute(name) == Some(value.as_str()) {
            return;
        }
        self.attributes.insert(name.to_string(), value);
        self.schedule_rebuild();
    }

    pub fn remove_attribute(&mut self, name: &str) {
        if self.attributes.remove(name).is_some() {
            self.schedule_rebuild();
        }
    }

    /// Attaches the element to a host of the given size and schedules a build.
    pub fn connect(&mut self, host_width: f64, host_height: f64) {
        self.host_size = observed_size(host_width, host_height).or(self.host_size);
        self.connected = true;
        self.rebuild_scheduled = true;
    }

    /// Detaches the element and destroys the current controller.
    pub fn disconnect(&mut self) {
        self.connected = false;
        self.rebuild_scheduled = false;
        if let Some(mut instance) = self.instance.take() {
            instance.destroy();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_rebuild_scheduled(&self) -> bool {
        self.rebuild_scheduled
    }

    pub fn instance(&self) -> Option<&ScratchReveal<CairoSurface>> {
        self.instance.as_ref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut ScratchReveal<CairoSurface>> {
        self.instance.as_mut()
    }

    /// Runs a scheduled rebuild, awaiting asset loading.
    ///
    /// Any number of attribute changes since the last flush produce a single
    /// rebuild. Returns whether a rebuild happened.
    pub async fn flush(&mut self) -> bool {
        if !self.rebuild_scheduled || !self.connected {
            return false;
        }
        self.rebuild_scheduled = false;

        if let Some(mut previous) = self.instance.take() {
            previous.destroy();
        }

        let options = match self.build_options() {
            Ok(options) => options,
            Err(err) => {
                self.report_error(err.to_string());
                return true;
            }
        };
        let (width, height) = (options.width, options.height);

        let progress_events = self.events.clone();
        let complete_events = self.events.clone();
        let loader = Arc::clone(&self.loader);
        let instance = match ScratchReveal::<CairoSurface>::with_cairo(options, loader) {
            Ok(instance) => instance,
            Err(err) => {
                self.report_error(err.to_string());
                return true;
            }
        };
        self.bounds.set(self.display_zone());
        let mut instance = instance
            .with_host(ElementHost::new(Rc::clone(&self.bounds)))
            .on_progress(move |percent| {
                let _ = progress_events.send(RevealEvent::Progress { percent });
            })
            .on_complete(move || {
                let _ = complete_events.send(RevealEvent::Complete { percent: 100.0 });
            });

        debug!("Building scratch reveal element ({}x{})", width, height);
        if let Err(err) = instance.init().await {
            self.report_error(err.to_string());
        }
        self.instance = Some(instance);
        true
    }

    /// Records a host size change. The display rectangle always follows the
    /// host; the surface is resized only while width or height is auto-sized.
    pub fn observe_resize(&mut self, host_width: f64, host_height: f64) {
        let Some(size) = observed_size(host_width, host_height) else {
            return;
        };
        self.host_size = Some(size);
        // The surface fills the element, so its rectangle follows the host
        // even when the pixel size is fixed by attributes.
        self.bounds.set(self.display_zone());
        if !self.auto_sized() {
            return;
        }

        let (width, height) = self.dimensions();
        let brush_size = self.brush_size_for(width, height);
        if let Some(instance) = self.instance.as_mut() {
            instance.resize(width, height);
            instance.set_brush_size(brush_size);
        }
    }

    /// True while either dimension follows the host size.
    pub fn auto_sized(&self) -> bool {
        self.attribute(ATTR_WIDTH).is_none() || self.attribute(ATTR_HEIGHT).is_none()
    }

    /// Surface size from attributes, then the observed host size, then defaults.
    pub fn dimensions(&self) -> (u32, u32) {
        let (host_width, host_height) = self.host_size.unwrap_or((DEFAULT_WIDTH, DEFAULT_HEIGHT));
        (
            parse_dimension(self.attribute(ATTR_WIDTH), host_width),
            parse_dimension(self.attribute(ATTR_HEIGHT), host_height),
        )
    }

    /// Rectangle the surface is displayed in: the host size when known,
    /// otherwise the surface size.
    fn display_zone(&self) -> Zone {
        let (width, height) = self.host_size.unwrap_or_else(|| self.dimensions());
        Zone::new(0.0, 0.0, width as f64, height as f64)
    }

    /// Builds controller options from the current attributes.
    ///
    /// # Errors
    /// Fails with [`RevealError::MissingSource`] when the policy is strict and
    /// a source attribute is absent.
    pub fn build_options(&self) -> Result<RevealOptions, RevealError> {
        let (width, height) = self.dimensions();
        let sources = AssetSources {
            mask: self
                .policy
                .resolve(AssetKind::Mask, self.attribute(ATTR_MASK_SRC))?,
            background: self
                .policy
                .resolve(AssetKind::Background, self.attribute(ATTR_BACKGROUND_SRC))?,
            brush: self
                .policy
                .resolve(AssetKind::Brush, self.attribute(ATTR_BRUSH_SRC))?,
        };

        let threshold = self
            .attribute(ATTR_PERCENT_TO_FINISH)
            .or_else(|| self.attribute(ATTR_COMPLETE_PERCENT));

        let mut options = RevealOptions::new(width, height, sources)
            .brush_size(self.brush_size_for(width, height))
            .percent_to_finish(parse_number(threshold, DEFAULT_PERCENT_TO_FINISH));
        options.enabled_percent_update =
            parse_flag(self.attribute(ATTR_ENABLED_PERCENT_UPDATE), true);
        Ok(options)
    }

    fn brush_size_for(&self, width: u32, height: u32) -> f64 {
        parse_brush_size(self.attribute(ATTR_BRUSH_SIZE), width, height, 0.0)
    }

    fn schedule_rebuild(&mut self) {
        if self.connected {
            self.rebuild_scheduled = true;
        }
    }

    /// Emits an error event, once per distinct message.
    fn report_error(&mut self, message: String) {
        if !self.reported_errors.insert(message.clone()) {
            return;
        }
        warn!("scratch-reveal: {}", message);
        let _ = self.events.send(RevealEvent::Error { message });
    }
}

fn observed_size(width: f64, height: f64) -> Option<(u32, u32)> {
    if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
        return None;
    }
    Some((width.round() as u32, height.round() as u32))
}
