use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid resistance mode {0:?}, expected one of: normal, resistant, vulnerable, immune, heal")]
    InvalidMode(String),

    #[error("no turn order, set initiative before advancing turns")]
    NoTurnOrder,

    #[error("battle already started")]
    AlreadyStarted,

    #[error("invalid dice formula {0:?}")]
    InvalidFormula(String),

    #[error("no such stat: {0}")]
    UnknownStat(String),

    #[error("no such damage type: {0}")]
    UnknownDamageType(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("no such archetype: {0}")]
    UnknownArchetype(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
