use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    #[error("invalid value {value:?} for option --{option}: {reason}")]
    OptionParse {
        option: String,
        value: String,
        reason: String,
    },

    #[error("no such font: {0}")]
    FontNotFound(String),

    #[error("malformed font: {0}")]
    FontFormat(String),

    #[error("{0} was updated before its inputs were set")]
    NotConfigured(&'static str),

    #[error("{effect} failed to update: {source}")]
    Update {
        effect: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("could not resolve repository: {0}")]
    EnvironmentResolution(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn option_parse(option: &str, value: &str, reason: impl Into<String>) -> Self {
        Error::OptionParse {
            option: option.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
