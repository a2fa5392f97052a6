//! Page thumbnail: rasterize the whole page at a reduced scale and encode it
//! as a PNG data URL for the persistence collaborator.

use crate::error::RenderError;
use crate::paint::paint_scene;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kurbo::Affine;
use tiny_skia::Pixmap;
use tmpl_core::model::{PAGE_HEIGHT, PAGE_WIDTH};
use tmpl_core::scene::SceneGraph;

/// An encoded page thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl Thumbnail {
    /// `data:image/png;base64,...`
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

/// Paint the page onto a white pixmap at `scale` (1.0 = one pixel per unit).
pub fn rasterize(scene: &SceneGraph, scale: f64) -> Result<Pixmap, RenderError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RenderError::InvalidScale(scale));
    }
    let width = (PAGE_WIDTH * scale).ceil().max(1.0) as u32;
    let height = (PAGE_HEIGHT * scale).ceil().max(1.0) as u32;
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let painted = paint_scene(&mut pixmap, scene, Affine::scale(scale));
    log::debug!("rasterized {painted} objects at {width}x{height}");
    Ok(pixmap)
}

/// Rasterize and PNG-encode the page.
pub fn render_thumbnail(scene: &SceneGraph, scale: f64) -> Result<Thumbnail, RenderError> {
    let pixmap = rasterize(scene, scale)?;
    let png = pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(Thumbnail {
        width: pixmap.width(),
        height: pixmap.height(),
        png,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

    #[test]
    fn thumbnail_is_scaled_page() {
        let thumb = render_thumbnail(&SceneGraph::new(), 0.3).unwrap();
        assert_eq!((thumb.width, thumb.height), (179, 253));
        assert_eq!(&thumb.png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn data_url_prefix() {
        let thumb = render_thumbnail(&SceneGraph::new(), 0.1).unwrap();
        let url = thumb.to_data_url();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn rejects_bad_scale() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                render_thumbnail(&SceneGraph::new(), scale),
                Err(RenderError::InvalidScale(_))
            ));
        }
    }
}
