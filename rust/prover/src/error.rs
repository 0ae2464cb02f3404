use std::fmt;

#[derive(Debug)]
pub enum ProverError {
    Io(String),
    Json(String),
    Snarkjs(String),
    Encoding(String),
    InvalidInput(String),
    MissingArtifact(String),
}

impl ProverError {
    /// True when the failure comes from the proof encoding step rather than proving.
    pub fn is_encoding(&self) -> bool {
        matches!(self, ProverError::Encoding(_))
    }
}

impl fmt::Display for ProverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProverError::Io(msg) => write!(f, "io error: {msg}"),
            ProverError::Json(msg) => write!(f, "json error: {msg}"),
            ProverError::Snarkjs(msg) => write!(f, "snarkjs error: {msg}"),
            ProverError::Encoding(msg) => write!(f, "encoding error: {msg}"),
            ProverError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            ProverError::MissingArtifact(msg) => write!(f, "missing circuit artifact: {msg}"),
        }
    }
}

impl std::error::Error for ProverError {}

impl From<std::io::Error> for ProverError {
    fn from(err: std::io::Error) -> Self {
        ProverError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ProverError {
    fn from(err: serde_json::Error) -> Self {
        ProverError::Json(err.to_string())
    }
}
