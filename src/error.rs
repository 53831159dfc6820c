pub type VaporResult<T> = Result<T, VaporError>;

#[derive(thiserror::Error, Debug)]
pub enum VaporError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("raster error: {0}")]
    Raster(String),

    #[error("animation error: {0}")]
    Animation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VaporError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }
}
