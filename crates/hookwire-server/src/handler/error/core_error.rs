//! Engine error to HTTP error conversion.

use hookwire_core::ErrorKind as CoreErrorKind;

use crate::handler::{Error, ErrorKind};

/// Tracing target for engine error conversion.
const TRACING_TARGET: &str = "hookwire_server::handler::error";

impl From<hookwire_core::Error> for Error<'static> {
    fn from(error: hookwire_core::Error) -> Self {
        let message = error.message().map(str::to_owned);

        match error.kind() {
            CoreErrorKind::NotFound => with_message(ErrorKind::NotFound, message),
            CoreErrorKind::InvalidInput => with_message(ErrorKind::BadRequest, message),
            CoreErrorKind::Conflict => with_message(ErrorKind::Conflict, message),
            CoreErrorKind::Storage | CoreErrorKind::Queue => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    source = ?std::error::Error::source(&error),
                    "backend failure while serving request"
                );
                ErrorKind::InternalServerError.into_error()
            }
            CoreErrorKind::DuplicateHandler | CoreErrorKind::Internal => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "internal engine error while serving request"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

fn with_message(kind: ErrorKind, message: Option<String>) -> Error<'static> {
    match message {
        Some(message) => kind.with_message(message),
        None => kind.into_error(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_status_codes() {
        let cases = [
            (hookwire_core::Error::not_found("gone"), ErrorKind::NotFound),
            (hookwire_core::Error::invalid_input("bad"), ErrorKind::BadRequest),
            (hookwire_core::Error::conflict("twice"), ErrorKind::Conflict),
            (
                hookwire_core::Error::storage(std::io::Error::other("down")),
                ErrorKind::InternalServerError,
            ),
            (
                hookwire_core::Error::queue(std::io::Error::other("down")),
                ErrorKind::InternalServerError,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(Error::from(error).kind(), expected);
        }
    }

    #[test]
    fn keeps_client_facing_message() {
        let error = Error::from(hookwire_core::Error::not_found("delivery 42 not found"));
        assert_eq!(error.message(), Some("delivery 42 not found"));

        let error = Error::from(hookwire_core::Error::storage(std::io::Error::other("secret")));
        assert_eq!(error.message(), None);
    }
}
