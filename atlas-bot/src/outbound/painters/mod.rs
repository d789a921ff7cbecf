use atlas_core::{MapRenderer, MapStyle, MarkerColor, RenderError};

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::warn;
use uuid::Uuid;

use crate::domain::{models::CommandError, ports::MapPainter};

/// [MapPainter] over the core [MapRenderer]. Every render gets its own file in `scratch_dir`,
/// which is read back and deleted before the bytes are returned.
#[derive(Clone)]
pub struct RendererPainter {
    renderer: MapRenderer,
    scratch_dir: PathBuf,
}

impl RendererPainter {
    pub fn new(renderer: MapRenderer, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            scratch_dir: scratch_dir.into(),
        }
    }

    async fn paint<F>(&self, render: F) -> Result<Vec<u8>, CommandError>
    where
        F: FnOnce(&MapRenderer, &Path) -> Result<PathBuf, RenderError> + Send + 'static,
    {
        let renderer = self.renderer.clone();
        let output = self
            .scratch_dir
            .join(format!("atlas-{}.png", Uuid::new_v4()));

        tokio::task::spawn_blocking(move || {
            let written = render(&renderer, &output)?;
            let png = fs::read(&written);

            if let Err(err) = fs::remove_file(&written) {
                warn!("Failed to remove {}: {err}", written.display());
            }

            Ok::<_, RenderError>(png?)
        })
        .await
        .map_err(|err| CommandError::Rendering(err.into()))?
        .map_err(|err| CommandError::Rendering(err.into()))
    }
}

impl MapPainter for RendererPainter {
    async fn paint_cities(
        &self,
        cities: Vec<(String, MarkerColor)>,
        style: MapStyle,
    ) -> Result<Vec<u8>, CommandError> {
        self.paint(move |renderer, output| renderer.render_cities(output, &cities, style))
            .await
    }

    async fn paint_distance(&self, from: &str, to: &str) -> Result<Vec<u8>, CommandError> {
        let (from, to) = (from.to_string(), to.to_string());
        self.paint(move |renderer, output| renderer.render_distance(output, &from, &to))
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::Arc;

    use atlas_core::{Basemap, CityStore, DrawConfig};

    #[tokio::test]
    async fn test_failed_render_leaves_no_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CityStore::new(dir.path().join("cities.db"));
        store.initialize().unwrap();

        let scratch = dir.path().join("scratch");
        fs::create_dir(&scratch).unwrap();

        let renderer = MapRenderer::new(store, Arc::new(Basemap::empty()), DrawConfig::default());
        let painter = RendererPainter::new(renderer, &scratch);

        let err = painter
            .paint_cities(vec![("London".to_string(), MarkerColor::Red)], MapStyle::Simple)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Rendering(_)));

        let err = painter.paint_distance("London", "Paris").await.unwrap_err();
        assert!(matches!(err, CommandError::Rendering(_)));

        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    }
}
