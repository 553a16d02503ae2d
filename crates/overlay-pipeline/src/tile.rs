//! Tile service seam used by the tile-server strategy.

use std::path::{Path, PathBuf};

use overlay_common::{RasterError, RasterResult};
use raster_io::RasterInfo;
use tracing::debug;
use uuid::Uuid;

/// Where a published raster can be fetched as tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileEndpoint {
    pub layer_id: String,
    /// `{z}`, `{x}` and `{y}` are substituted by the map client
    pub url_template: String,
}

/// A capability that serves rasters as map tiles.
///
/// `publish` must take whatever it needs from `path` before returning;
/// the path may be a transient upload that is deleted right after.
pub trait TileService: Send + Sync {
    fn name(&self) -> &str;

    fn publish(&self, path: &Path, info: &RasterInfo) -> RasterResult<TileEndpoint>;

    /// Withdraw a published raster whose layer never reached the map.
    ///
    /// Unknown or already withdrawn endpoints are not an error.
    fn unpublish(&self, endpoint: &TileEndpoint) -> RasterResult<()>;
}

/// Tile server that serves files dropped into a shared directory.
///
/// Publishing copies the raster to `<publish_dir>/<layer_id>.tif` and
/// returns `<base_url>/<layer_id>/{z}/{x}/{y}.png`.
#[derive(Debug, Clone)]
pub struct UrlTemplateTileService {
    base_url: String,
    publish_dir: PathBuf,
}

impl UrlTemplateTileService {
    pub fn new(base_url: impl Into<String>, publish_dir: impl Into<PathBuf>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            publish_dir: publish_dir.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn publish_dir(&self) -> &Path {
        &self.publish_dir
    }

    fn published_path(&self, layer_id: &str) -> PathBuf {
        self.publish_dir.join(format!("{}.tif", layer_id))
    }
}

impl TileService for UrlTemplateTileService {
    fn name(&self) -> &str {
        &self.base_url
    }

    fn publish(&self, path: &Path, info: &RasterInfo) -> RasterResult<TileEndpoint> {
        let layer_id = Uuid::new_v4().simple().to_string();
        let target = self.published_path(&layer_id);

        std::fs::create_dir_all(&self.publish_dir)
            .and_then(|_| std::fs::copy(path, &target))
            .map_err(|e| {
                RasterError::unavailable(format!(
                    "cannot publish to {}: {}",
                    self.publish_dir.display(),
                    e
                ))
            })?;

        debug!(
            layer_id = %layer_id,
            target = %target.display(),
            width = info.width,
            height = info.height,
            "Published raster for tiling"
        );

        Ok(TileEndpoint {
            url_template: format!("{}/{}/{{z}}/{{x}}/{{y}}.png", self.base_url, layer_id),
            layer_id,
        })
    }

    fn unpublish(&self, endpoint: &TileEndpoint) -> RasterResult<()> {
        let target = self.published_path(&endpoint.layer_id);
        raster_io::release(&target)?;
        debug!(layer_id = %endpoint.layer_id, "Withdrew published raster");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> RasterInfo {
        RasterInfo {
            width: 4,
            height: 4,
            band_count: 1,
            sample_type: None,
            tiled: true,
            bounds: None,
            nodata: None,
        }
    }

    #[test]
    fn test_publish_copies_and_builds_template() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("scene.tif");
        std::fs::write(&source, b"tiff bytes").unwrap();

        let service = UrlTemplateTileService::new("http://tiles.local/", dir.path().join("published"));
        let endpoint = service.publish(&source, &info()).unwrap();

        assert_eq!(
            endpoint.url_template,
            format!("http://tiles.local/{}/{{z}}/{{x}}/{{y}}.png", endpoint.layer_id)
        );
        let copied = dir.path().join("published").join(format!("{}.tif", endpoint.layer_id));
        assert_eq!(std::fs::read(copied).unwrap(), b"tiff bytes");

        // The published copy outlives the source
        std::fs::remove_file(&source).unwrap();
        assert!(service.publish_dir().read_dir().unwrap().count() == 1);
    }

    #[test]
    fn test_unpublish_removes_copy_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("scene.tif");
        std::fs::write(&source, b"tiff bytes").unwrap();

        let service = UrlTemplateTileService::new("http://tiles.local", dir.path().join("published"));
        let endpoint = service.publish(&source, &info()).unwrap();
        assert_eq!(service.publish_dir().read_dir().unwrap().count(), 1);

        service.unpublish(&endpoint).unwrap();
        assert_eq!(service.publish_dir().read_dir().unwrap().count(), 0);
        service.unpublish(&endpoint).unwrap();
        assert!(source.exists());
    }

    #[test]
    fn test_publish_missing_source_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let service = UrlTemplateTileService::new("http://tiles.local", dir.path());
        let err = service
            .publish(&dir.path().join("missing.tif"), &info())
            .unwrap_err();
        assert_eq!(err.kind(), "Unavailable");
    }
}
