use std::fmt;

use veilswap_prover::ProverError;

#[derive(Debug)]
pub enum ClientError {
    InvalidInput(String),
    Proving(String),
    Encoding(String),
    Rpc(String),
    Submission(String),
    Config(String),
    Serde(String),
    Io(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            ClientError::Proving(msg) => write!(f, "proving error: {msg}"),
            ClientError::Encoding(msg) => write!(f, "encoding error: {msg}"),
            ClientError::Rpc(msg) => write!(f, "rpc error: {msg}"),
            ClientError::Submission(msg) => write!(f, "submission error: {msg}"),
            ClientError::Config(msg) => write!(f, "config error: {msg}"),
            ClientError::Serde(msg) => write!(f, "serde error: {msg}"),
            ClientError::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ProverError> for ClientError {
    fn from(err: ProverError) -> Self {
        if err.is_encoding() {
            ClientError::Encoding(err.to_string())
        } else {
            ClientError::Proving(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serde(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prover_encoding_errors_keep_their_category() {
        let err: ClientError = ProverError::Encoding("signal too wide".to_string()).into();
        assert!(matches!(err, ClientError::Encoding(_)));
    }

    #[test]
    fn other_prover_errors_are_proving_failures() {
        let err: ClientError = ProverError::MissingArtifact("swap.wasm".to_string()).into();
        match err {
            ClientError::Proving(msg) => assert!(msg.contains("swap.wasm")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
