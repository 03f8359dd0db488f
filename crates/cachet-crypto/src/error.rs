/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Linkage computation errors.
///
/// These indicate a defect in the caller (an empty or oversized field fed
/// into the canonical encoding), never a transient runtime condition.
#[derive(Debug, thiserror::Error)]
pub enum LinkageError {
    #[error("linkage field '{0}' is empty")]
    EmptyField(&'static str),

    #[error("linkage field '{field}' exceeds {max} bytes, got {len}")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        len: usize,
    },
}
