use thiserror::Error;

/// Errors raised while rasterizing a scene.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("thumbnail scale must be a positive finite number, got {0}")]
    InvalidScale(f64),

    #[error("cannot allocate a {width}x{height} pixmap")]
    Surface { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}
