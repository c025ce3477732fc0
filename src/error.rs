//! Crate-level error types.

use std::fmt;

/// Errors produced by the motif crate.
#[derive(Debug)]
pub enum MotifError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// An easing name that does not match any known curve.
    InvalidEase(String),
    /// A browser API call rejected the request.
    Dom(String),
    /// A resource failed to release during registry teardown.
    Teardown {
        /// Label of the resource that failed.
        resource: String,
        /// Why it failed.
        reason: String,
    },
}

impl fmt::Display for MotifError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::InvalidEase(name) => write!(f, "unknown easing '{name}'"),
            Self::Dom(msg) => write!(f, "DOM error: {msg}"),
            Self::Teardown { resource, reason } => {
                write!(f, "failed to dispose {resource}: {reason}")
            }
        }
    }
}

impl std::error::Error for MotifError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MotifError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teardown_message_names_resource() {
        let err = MotifError::Teardown {
            resource: "task#3".to_owned(),
            reason: "handle poisoned".to_owned(),
        };
        assert_eq!(err.to_string(), "failed to dispose task#3: handle poisoned");
    }

    #[test]
    fn io_error_has_source() {
        use std::error::Error as _;
        let err = MotifError::from(std::io::Error::other("boom"));
        assert!(err.source().is_some());
        assert!(MotifError::InvalidEase("x".to_owned()).source().is_none());
    }
}
