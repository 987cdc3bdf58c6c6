use thiserror::Error;

/// Errors raised while setting up a training experiment
///
/// Everything here is detected before the first episode runs. Index violations during
/// training are programming errors and panic instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid value for `{name}`: {value} (expected {expected})")]
    InvalidConfig {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("vocabulary is empty, the corpus contains no words")]
    EmptyVocabulary,

    #[error("failed to read corpus: {0}")]
    Corpus(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
