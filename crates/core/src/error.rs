use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unrecognized seniority level: {0:?}")]
pub struct ParseLevelError(pub String);
