use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("{0} public keys are not supported for node registration")]
    UnsupportedKeyAlgorithm(&'static str),

    #[error("malformed secp256k1 public key: {0}")]
    MalformedKey(String),
}
