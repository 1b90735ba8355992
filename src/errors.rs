use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatterError {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("audio error: {0}")]
    Audio(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type ChatterResult<T> = Result<T, ChatterError>;

impl ChatterError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        ChatterError::Config(msg.into())
    }

    pub fn transport_error(msg: impl Into<String>) -> Self {
        ChatterError::Transport(msg.into())
    }

    pub fn protocol_error(msg: impl Into<String>) -> Self {
        ChatterError::Protocol(msg.into())
    }

    pub fn audio_error(msg: impl Into<String>) -> Self {
        ChatterError::Audio(msg.into())
    }
}
