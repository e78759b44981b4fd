use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Frame too large: {len} > {max}")]
    FrameTooLarge { len: u32, max: u32 },

    #[error("Unexpected EOF while reading frame")]
    UnexpectedEof,

    #[error("No open channel to the decision service")]
    NotConnected,

    #[error("Call to the decision service timed out")]
    Timeout,

    #[error("Decision service error [{code}]: {message}")]
    Remote { code: String, message: String },

    #[error("Unexpected reply: expected {expected}, got {got}")]
    UnexpectedReply {
        expected: &'static str,
        got: &'static str,
    },

    #[error("Config error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Whether the failure came from the transport (unreachable peer, broken
    /// stream, deadline) rather than from the content of a reply.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BridgeError::Io(_)
                | BridgeError::UnexpectedEof
                | BridgeError::NotConnected
                | BridgeError::Timeout
                | BridgeError::FrameTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
