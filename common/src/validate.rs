//! Field validation failures.

use std::fmt;

use derive_more::Error as StdError;

/// Error of validating one or more fields of an entity descriptor.
///
/// Carries enough detail to be turned into a user-facing validation error
/// without access to the entity itself.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// Violated constraints, in detection order.
    pub violations: Vec<Violation>,
}

impl Error {
    /// Creates a new [`Error`] from a single [`Violation`].
    #[must_use]
    pub fn new(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    /// Creates a new [`Error`] describing the `field` violating the
    /// `constraint`.
    #[must_use]
    pub fn violation(field: impl Into<String>, constraint: Constraint) -> Self {
        Self::new(Violation {
            field: field.into(),
            constraint,
        })
    }

    /// Prefixes every [`Violation`]'s field path with the provided segment.
    ///
    /// Used when an entity embeds another validated value (e.g. an
    /// association element).
    #[must_use]
    pub fn scoped(mut self, segment: &str) -> Self {
        for v in &mut self.violations {
            v.field = format!("{segment}.{}", v.field);
        }
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: ")?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Single violated constraint of a single field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Violation {
    /// Dot-separated path of the violating field.
    pub field: String,

    /// Violated [`Constraint`].
    pub constraint: Constraint,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` violates `{}` constraint", self.field, self.constraint)
    }
}

/// Kind of a violated constraint.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Constraint {
    /// Required field is missing.
    Required,

    /// Value does not match the declared format.
    Format,

    /// Value is outside the declared length bounds.
    Length,

    /// Value is not one of the allowed alternatives.
    Allowed,

    /// Value describes a forbidden state transition.
    Transition,

    /// Value is already set and cannot be reassigned.
    Immutable,
}

impl Constraint {
    /// Returns the wire name of this [`Constraint`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Format => "format",
            Self::Length => "length",
            Self::Allowed => "allowed",
            Self::Transition => "transition",
            Self::Immutable => "immutable",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unwraps the required `field` of a descriptor.
///
/// # Errors
///
/// Errors with a [`Constraint::Required`] [`Violation`] if the value is
/// absent.
pub fn required<T>(field: &str, value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| Error::violation(field, Constraint::Required))
}

/// Validates the `field` of a descriptor with the provided checked
/// constructor.
///
/// # Errors
///
/// Errors with the given [`Constraint`] [`Violation`] if the constructor
/// rejects the value.
pub fn field<R, T>(
    field: &str,
    constraint: Constraint,
    raw: R,
    new: impl FnOnce(R) -> Option<T>,
) -> Result<T, Error> {
    new(raw).ok_or_else(|| Error::violation(field, constraint))
}

#[cfg(test)]
mod spec {
    use super::{field, required, Constraint, Error};

    #[test]
    fn required_names_the_field() {
        let err = required::<String>("email", None).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "email");
        assert_eq!(err.violations[0].constraint, Constraint::Required);

        assert_eq!(required("email", Some(1)).unwrap(), 1);
    }

    #[test]
    fn field_reports_the_constraint() {
        let err = field("tag", Constraint::Length, "", |s: &str| {
            (!s.is_empty()).then(|| s.to_owned())
        })
        .unwrap_err();
        assert_eq!(err.violations[0].field, "tag");
        assert_eq!(err.violations[0].constraint, Constraint::Length);
    }

    #[test]
    fn scoped_prefixes_field_paths() {
        let err = Error::violation("id", Constraint::Format).scoped("members");
        assert_eq!(err.violations[0].field, "members.id");
    }
}
