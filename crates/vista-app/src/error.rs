use thiserror::Error;
use vista_config::ConfigError;
use vista_render::RenderError;
use vista_sky::SkyError;
use vista_terrain::TerrainError;

/// Errors raised while assembling the frame pipeline.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("render: {0}")]
    Render(#[from] RenderError),
    #[error("terrain: {0}")]
    Terrain(#[from] TerrainError),
    #[error("sky: {0}")]
    Sky(#[from] SkyError),
    #[error("generator thread: {0}")]
    Generator(std::io::Error),
}
