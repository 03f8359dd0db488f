/// Core value-type and configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid linkage hash encoding: {0}")]
    InvalidHashEncoding(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("config io error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}
