//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::typed_header::TypedHeaderRejection;
use common::{pagination, validate};
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde_json::{json, Value};
use service::{auth, command, infra::database};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            details: None,
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// REST API [`Error`].
///
/// Renders as a structured JSON body `{type, message, details?}` with its
/// status code, the stable `type` string being usable for client-side
/// localization.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code, rendered as the `type` body field.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// [`Error`] message.
    pub message: String,

    /// Structured details of this [`Error`], if any.
    ///
    /// Never populated for internal errors: no stack traces or internal
    /// identifiers leave the process.
    pub details: Option<Value>,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,
}

impl Error {
    /// Create a new [`Error`] representing an internal server error.
    ///
    /// The provided message is logged, never exposed to the client.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        tracing::error!("internal error: {}", msg.to_string());
        Self {
            code: "internal",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_string(),
            details: None,
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            message,
            details: _,
            backtrace,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let mut body = json!({
            "type": self.code,
            "message": self.message,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status_code, Json(body)).into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an
    /// [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "auth.validation",
            status_code: http::StatusCode::CONFLICT,
            message: "Malformed authorization header".to_string(),
            details: None,
            backtrace: None,
        })
    }
}

impl AsError for validate::Error {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "validation",
            status_code: http::StatusCode::CONFLICT,
            message: "Validation error".to_string(),
            details: Some(Value::Array(
                self.violations
                    .iter()
                    .map(|v| {
                        json!({
                            "field": v.field,
                            "constraint": v.constraint.as_str(),
                        })
                    })
                    .collect(),
            )),
            backtrace: None,
        })
    }
}

impl AsError for pagination::InvalidArguments {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "validation",
            status_code: http::StatusCode::CONFLICT,
            message: "Validation error".to_string(),
            details: Some(json!([{"field": "size", "constraint": "length"}])),
            backtrace: None,
        })
    }
}

impl AsError for auth::Forbidden {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "auth.insufficientRights",
            status_code: http::StatusCode::FORBIDDEN,
            message: "Insufficient rights".to_string(),
            details: None,
            backtrace: None,
        })
    }
}

impl AsError for auth::UnknownSession {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "auth.unknownSession",
            status_code: http::StatusCode::UNAUTHORIZED,
            message: "Unknown session".to_string(),
            details: None,
            backtrace: None,
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_user_session::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::SessionVanished(e) => e.try_as_error(),
            E::WrongCredentials => Some(Error {
                code: "auth.login",
                status_code: http::StatusCode::CONFLICT,
                message: "Invalid email and/or password".to_string(),
                details: None,
                backtrace: None,
            }),
        }
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_user::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::DuplicateEmail => Some(duplicate_error()),
            E::Validation(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::modify_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::modify_user::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::DuplicateEmail => Some(duplicate_error()),
            E::Validation(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_article::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_article::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::Validation(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::modify_article::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::modify_article::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::Validation(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_channel::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_channel::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::Validation(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::modify_channel::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::modify_channel::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::UnknownMember(id) => Some(Error {
                code: "validation",
                status_code: http::StatusCode::CONFLICT,
                message: "Validation error".to_string(),
                details: Some(json!([{
                    "field": "members",
                    "constraint": "allowed",
                    "value": id.to_string(),
                }])),
                backtrace: None,
            }),
            E::Validation(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::remove_channel::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::remove_channel::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_channel_message::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_channel_message::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::Validation(e) => e.try_as_error(),
        }
    }
}

/// Builds the [`Error`] for a uniqueness constraint violation.
fn duplicate_error() -> Error {
    Error {
        code: "duplicate",
        status_code: http::StatusCode::CONFLICT,
        message: "Resource already exists".to_string(),
        details: None,
        backtrace: None,
    }
}
