use thiserror::Error;
use vista_render::RenderError;

/// Errors raised while building the sky compositor.
#[derive(Debug, Error)]
pub enum SkyError {
    #[error("invalid colour {value:?} for {field}: expected #rgb or #rrggbb")]
    InvalidColor { field: &'static str, value: String },
    #[error("sky resolution ratio must be positive and finite, got {0}")]
    ResolutionRatio(f32),
    #[error(transparent)]
    Render(#[from] RenderError),
}
