use thiserror::Error;

/// Structural and precondition failures. A proof that simply does not check out is never an
/// error: verification reports it as `Ok(false)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("malformed proof text: {0}")]
    MalformedProofText(String),

    #[error("value {value} does not occur in the domain")]
    InvalidRealValue { value: u64 },

    #[error("group parameters of the proof or ciphertext do not match the public key")]
    KeyMismatch,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(&'static str),

    #[error("invalid domain: {0}")]
    InvalidDomain(&'static str),

    #[error("operands cannot be combined: {0}")]
    OperandMismatch(&'static str),
}
