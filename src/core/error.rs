use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Advisory error: {0}")]
    Advisory(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
