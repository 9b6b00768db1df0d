use thiserror::Error;

/// Everything that can go wrong while defining, building or persisting fixtures.
///
/// Blueprint level variants carry the error prefix of the factory that raised
/// them so that messages read the same way regardless of where they surface.
#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("{prefix}{reason}")]
    InvalidDefinition { prefix: String, reason: String },
    #[error("{prefix}{name} factory name is not defined")]
    UndefinedBlueprint { prefix: String, name: String },
    #[error("{prefix}{name} is abstract. No model attached to it")]
    AbstractBlueprint { prefix: String, name: String },
    #[error(
        "{prefix}{name} trait is not defined. Use a local trait within the builder or register a global one"
    )]
    UnknownTrait { prefix: String, name: String },
    #[error("Builder error: {0}")]
    Builder(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
    #[error("Task error: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, FactoryError>;

impl FactoryError {
    /// Convenience for builders and traits that need to bail out with a message.
    pub fn builder(message: impl Into<String>) -> Self {
        Self::Builder(message.into())
    }
}

// Helper conversions
impl From<rusqlite::Error> for FactoryError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}

impl From<config::ConfigError> for FactoryError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}

impl From<tokio::task::JoinError> for FactoryError {
    fn from(e: tokio::task::JoinError) -> Self { Self::Task(e.to_string()) }
}
