use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("vocabulary parse error: {0}")]
    Vocabulary(#[from] toml::de::Error),

    #[error("invalid skill {skill:?}: {reason}")]
    InvalidSkill { skill: String, reason: String },
}
