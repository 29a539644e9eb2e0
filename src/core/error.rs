use thiserror::Error;

#[derive(Debug, Error)]
pub enum SquirlsError {
    #[error("Corrupted PWM {name}: {reason}")]
    CorruptedPwm { name: String, reason: String },
    #[error("Invalid decision tree: {0}")]
    InvalidTree(String),
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),
    #[error("Invalid transcript {accession}: {reason}")]
    InvalidTranscript { accession: String, reason: String },
    #[error("Invalid variant: {0}")]
    InvalidVariant(String),
    #[error("Invalid region: {0}")]
    InvalidRegion(String),
    #[error("Invalid splicing parameters: {0}")]
    InvalidParameters(String),
    #[error("Invalid k-mer table: {0}")]
    InvalidKmers(String),
    #[error("Invalid model: {0}")]
    InvalidModel(String),
    #[error("Failed to fetch sequence: {0}")]
    Sequence(String),
    #[error("Failed to parse model: {0}")]
    Model(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write results: {0}")]
    Output(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SquirlsError>;
