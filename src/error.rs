use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid camera configuration: {0}")]
    InvalidCamera(String),

    #[error("Can't resize the frame buffer while a render is running")]
    ResizeWhileRendering,

    #[error("Can't reconfigure the renderer while a render is running")]
    Busy,

    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),
}
