//! Overlay preview.
//!
//! Runs the raster overlay pipeline outside of any UI and writes what the
//! map would have received: a `map.json` document plus one PNG per image
//! layer.

pub mod config_loader;
pub mod map_document;
pub mod notify;

pub use config_loader::{load_config, resolve_config};
pub use map_document::{write_document, DocumentSink, LayerEntry, LayerSource, MapDocument, DOCUMENT_FILE};
pub use notify::LogNotifier;
