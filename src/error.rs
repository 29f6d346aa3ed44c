use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TlvError {
    #[error("invalid tag {0:?}")]
    InvalidTag(String),

    #[error("value of tag {tag} is {len} bytes, at most 99 fit the length field")]
    ValueTooLong { tag: String, len: usize },

    #[error("truncated field at offset {offset}")]
    Truncated { offset: usize },

    #[error("invalid length field at offset {offset}")]
    InvalidLength { offset: usize },

    #[error("field ends inside a multi-byte character at offset {offset}")]
    NotCharBoundary { offset: usize },
}

/// Raised by the payload builder when a request cannot be encoded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid bank BIN {0:?}: expected 6 digits")]
    InvalidBankBin(String),

    #[error("invalid account number {0:?}: expected at least 6 characters")]
    InvalidAccountNumber(String),

    #[error("invalid amount {0}: expected a finite, non-negative value")]
    InvalidAmount(f64),

    #[error("{0}")]
    Field(#[from] TlvError),
}

/// Why a candidate payload string was rejected by the validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralMismatch {
    #[error("invalid payload format indicator")]
    FormatIndicator,

    #[error("malformed payload: {0}")]
    Malformed(#[from] TlvError),

    #[error("missing CRC")]
    MissingCrc,

    #[error("CRC mismatch: expected {expected}, found {found}")]
    CrcMismatch { expected: String, found: String },

    #[error("field {0} is repeated or out of order")]
    FieldOrder(String),

    #[error("invalid point of initiation method")]
    InitiationMethod,

    #[error("not a VND transaction")]
    NotVnd,

    #[error("not a Vietnam transaction")]
    NotVietnam,
}

/// Failure of one service command; reported back to the caller, never fatal.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("invalid message: {0}")]
    Message(#[from] serde_json::Error),

    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("unknown bank code {0:?}")]
    UnknownBank(String),

    #[error("no {0} given and no merchant configured")]
    MissingField(&'static str),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Mismatch(#[from] StructuralMismatch),
}
