use solor_credentials::CredentialError;
use solor_digest::DigestError;
use solor_identifiers::IdentifierError;
use solor_uuid::UuidError;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("digest error: {0}")]
    Digest(#[from] DigestError),
    #[error("UUID error: {0}")]
    Uuid(#[from] UuidError),
    #[error("identifier error: {0}")]
    Identifier(#[from] IdentifierError),
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;
