use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("quote too short: {len} bytes")]
    QuoteTooShort { len: usize },

    #[error("invalid TD Report size: {len} bytes, expected 584")]
    InvalidTdReportSize { len: usize },

    #[error("quote does not match any supported encoding")]
    UnrecognizedFormat,

    #[error("no TD quote body found in quote")]
    MissingBody,

    #[error("unexpected {field} length: {actual} bytes, expected {expected}")]
    UnexpectedLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("public key is not on the P-256 curve")]
    PublicKeyNotOnCurve,

    #[error("could not reconstruct signed payload: {0}")]
    PayloadReconstructionFailed(String),

    #[error("quote signature verification failed")]
    SignatureVerificationFailed,

    #[error("no kernel/initrd pair found in {}", dir.display())]
    NoBootFiles { dir: PathBuf },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
