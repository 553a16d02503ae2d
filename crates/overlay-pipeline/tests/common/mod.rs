//! Shared doubles for overlay-pipeline integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use overlay_common::{GeoBounds, RasterError, RasterResult, ViewRequest};
use overlay_pipeline::{
    LayerHandle, LayerPlacement, LayerRegistration, MapSink, Notice, NoticeLevel, Notifier,
    OverlayStrategy, TileEndpoint, TileService,
};
use raster_io::RasterInfo;

/// Map sink that records every call.
#[derive(Default)]
pub struct RecordingSink {
    pub layers: Vec<(LayerHandle, LayerRegistration)>,
    pub views: Vec<ViewRequest>,
    /// Reject every `add_layer` call
    pub reject_layers: bool,
}

impl RecordingSink {
    pub fn rejecting() -> Self {
        Self {
            reject_layers: true,
            ..Self::default()
        }
    }

    pub fn only_layer(&self) -> &LayerRegistration {
        assert_eq!(self.layers.len(), 1, "expected exactly one registered layer");
        &self.layers[0].1
    }
}

impl MapSink for RecordingSink {
    fn add_layer(&mut self, layer: LayerRegistration) -> RasterResult<LayerHandle> {
        if self.reject_layers {
            return Err(RasterError::sink(format!("{} layers not supported", layer.kind())));
        }
        let handle = LayerHandle::new();
        self.layers.push((handle, layer));
        Ok(handle)
    }

    fn set_view(&mut self, view: ViewRequest) -> RasterResult<()> {
        self.views.push(view);
        Ok(())
    }
}

/// Notifier that keeps every notice.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Vec<Notice>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<&str> {
        self.notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message.as_str())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// What a scripted strategy does when attempted.
#[derive(Debug, Clone)]
pub enum Script {
    /// Register a tile layer covering the bounds
    Succeed(GeoBounds),
    /// Fail with a decode error carrying the message
    FailDecode(String),
    /// Fail as unavailable
    FailUnavailable(String),
}

/// Strategy that follows a script and counts its attempts.
pub struct ScriptedStrategy {
    name: String,
    script: Script,
    calls: Arc<AtomicUsize>,
    seen_paths: Arc<Mutex<Vec<(PathBuf, bool)>>>,
}

impl ScriptedStrategy {
    pub fn new(name: &str, script: Script) -> Self {
        Self {
            name: name.to_string(),
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            seen_paths: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared attempt counter, readable after the strategy is boxed.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Paths attempted, with whether the file existed at that moment.
    pub fn seen_paths(&self) -> Arc<Mutex<Vec<(PathBuf, bool)>>> {
        Arc::clone(&self.seen_paths)
    }
}

impl OverlayStrategy for ScriptedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn attempt(&self, path: &Path, sink: &mut dyn MapSink) -> RasterResult<LayerPlacement> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen_paths.lock() {
            seen.push((path.to_path_buf(), path.exists()));
        }

        match &self.script {
            Script::Succeed(bounds) => {
                let handle = sink.add_layer(LayerRegistration::Tile {
                    url_template: format!("scripted://{}/{{z}}/{{x}}/{{y}}", self.name),
                    name: self.name.clone(),
                    bounds: *bounds,
                })?;
                Ok(LayerPlacement {
                    handle,
                    bounds: *bounds,
                    statistics: None,
                })
            }
            Script::FailDecode(msg) => Err(RasterError::decode(msg.clone())),
            Script::FailUnavailable(msg) => Err(RasterError::unavailable(msg.clone())),
        }
    }
}

/// Strategy that panics, for exercising release on unwinding.
pub struct PanickingStrategy;

impl OverlayStrategy for PanickingStrategy {
    fn name(&self) -> &str {
        "panicking"
    }

    fn attempt(&self, _path: &Path, _sink: &mut dyn MapSink) -> RasterResult<LayerPlacement> {
        panic!("strategy blew up");
    }
}

/// Tile service that accepts everything and records what it was given.
#[derive(Default)]
pub struct RecordingTileService {
    pub published: Mutex<Vec<(PathBuf, RasterInfo)>>,
    pub withdrawn: Mutex<Vec<String>>,
}

impl TileService for RecordingTileService {
    fn name(&self) -> &str {
        "recording"
    }

    fn publish(&self, path: &Path, info: &RasterInfo) -> RasterResult<TileEndpoint> {
        if let Ok(mut published) = self.published.lock() {
            published.push((path.to_path_buf(), info.clone()));
        }
        Ok(TileEndpoint {
            layer_id: "layer-1".to_string(),
            url_template: "http://tiles.test/layer-1/{z}/{x}/{y}.png".to_string(),
        })
    }

    fn unpublish(&self, endpoint: &TileEndpoint) -> RasterResult<()> {
        if let Ok(mut withdrawn) = self.withdrawn.lock() {
            withdrawn.push(endpoint.layer_id.clone());
        }
        Ok(())
    }
}

/// Read a fixture file written into `dir` back as upload bytes.
pub fn read_bytes(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e))
}
