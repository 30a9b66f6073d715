use thiserror::Error;

/// Library error taxonomy.
///
/// Per-request instrumentation paths are infallible; only configuration
/// handling can fail.
#[derive(Error, Debug)]
pub enum WrapError {
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<figment::Error> for WrapError {
    fn from(err: figment::Error) -> Self {
        WrapError::Config(err.to_string())
    }
}

impl From<garde::Report> for WrapError {
    fn from(err: garde::Report) -> Self {
        WrapError::Config(err.to_string())
    }
}
