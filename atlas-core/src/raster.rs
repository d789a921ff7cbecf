use crate::renderer::RenderError;

use std::{io::Write, path::Path, sync::Arc};

use svg::Document;
use tiny_skia::{Color, Pixmap, Transform};
use tracing::debug;

/// Turns composed SVG documents into PNG bytes. Holds the font database so system fonts are
/// scanned once rather than on every render.
#[derive(Clone)]
pub(crate) struct Rasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Rasterizer {
    pub fn with_system_fonts() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();

        debug!("Loaded {} font faces", fontdb.len());

        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    pub fn to_png(&self, document: &Document) -> Result<Vec<u8>, RenderError> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };

        let tree = usvg::Tree::from_str(&document.to_string(), &options)?;
        let size = tree.size().to_int_size();

        // The pixmap is dropped on every exit path, including the encoding failure below.
        let mut pixmap =
            Pixmap::new(size.width(), size.height()).ok_or(RenderError::Canvas {
                width: size.width(),
                height: size.height(),
            })?;
        pixmap.fill(Color::WHITE);

        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|err| RenderError::Encode(err.to_string()))
    }
}

/// Writes `bytes` to a temporary file beside `path` and moves it into place, so `path` only
/// ever holds a complete image. The temporary file is removed if anything fails.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::Builder::new()
        .prefix(".atlas-")
        .suffix(".png")
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| RenderError::Io(err.error))?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_write_atomically_replaces_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("map.png");

        std::fs::write(&target, b"old").unwrap();
        write_atomically(&target, b"new").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert_eq!(
            std::fs::read_dir(dir.path()).unwrap().count(),
            1,
            "No temporary file should be left behind"
        );
    }

    #[test]
    fn test_write_atomically_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("map.png");

        assert!(matches!(
            write_atomically(&target, b"png"),
            Err(RenderError::Io(_))
        ));
        assert!(!target.exists());
    }

    #[test]
    fn test_to_png_produces_a_png() {
        let document = Document::new()
            .set("width", 300)
            .set("height", 200)
            .set("viewBox", "0 0 300 200");

        let png = Rasterizer::with_system_fonts().to_png(&document).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let pixmap = Pixmap::decode_png(&png).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (300, 200));
    }
}
