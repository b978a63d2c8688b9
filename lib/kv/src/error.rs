use thiserror::Error;

#[derive(Error, Debug)]
pub enum KVError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("remote endpoint error: {0}")]
    Remote(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
