//! Declarative payload validation.
//!
//! Request types implement [`Validate`] by listing their constraints against
//! a [`Rules`] collector. Nested records are checked recursively and every
//! failure is reported with its full field path, e.g.
//! `to[0].email_address.address`.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use bytes::Bytes;
use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap());

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the offending field, using the JSON field names.
    pub field: String,
    /// Name of the rule that failed (`required`, `email`, ...).
    pub rule: &'static str,
}

/// All constraint failures found in a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    /// Error for a single field.
    pub fn field(field: impl Into<String>, rule: &'static str) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.into(),
                rule,
            }],
        }
    }

    /// The individual failures, in declaration order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// `true` if the given field failed any rule.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    fn into_result(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.rule)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Values that have a "zero" state for the `required` rule.
pub trait Zero {
    fn is_zero(&self) -> bool;
}

impl Zero for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Zero for str {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Zero for Bytes {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Zero for Vec<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Zero for HashMap<K, V, S> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Zero> Zero for Option<T> {
    fn is_zero(&self) -> bool {
        self.as_ref().is_none_or(Zero::is_zero)
    }
}

/// Collects constraint failures for one record.
pub struct Rules<'a> {
    prefix: String,
    errors: &'a mut ValidationError,
}

impl Rules<'_> {
    fn path(&self, field: &str) -> String {
        if field.is_empty() {
            self.prefix.clone()
        } else if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.prefix, field)
        }
    }

    /// Record a failure of `rule` on `field`.
    pub fn fail(&mut self, field: &str, rule: &'static str) -> &mut Self {
        let field = self.path(field);
        self.errors.errors.push(FieldError { field, rule });
        self
    }

    /// The field must not be at its zero value.
    pub fn required<T: Zero + ?Sized>(&mut self, field: &str, value: &T) -> &mut Self {
        if value.is_zero() {
            self.fail(field, "required");
        }
        self
    }

    /// The field, when set, must be `local@domain` with no whitespace and a
    /// single `@`. Dotless domains such as `localhost` are accepted.
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !EMAIL_RE.is_match(value) {
            self.fail(field, "email");
        }
        self
    }

    /// The field must not be a dot segment (`.` or `..`), which a URL path
    /// would resolve away.
    pub fn path_segment(&mut self, field: &str, value: &str) -> &mut Self {
        if matches!(value, "." | "..") {
            self.fail(field, "path_segment");
        }
        self
    }

    /// Validate a nested record under `field`. An empty `field` merges the
    /// record's fields into the current level (flattened records).
    pub fn nested<T: Validate + ?Sized>(&mut self, field: &str, value: &T) -> &mut Self {
        let mut child = Rules {
            prefix: self.path(field),
            errors: &mut *self.errors,
        };
        value.check(&mut child);
        self
    }

    /// Validate every element of `values` under `field[i]`.
    pub fn each<T: Validate>(&mut self, field: &str, values: &[T]) -> &mut Self {
        let base = self.path(field);
        for (i, value) in values.iter().enumerate() {
            let mut child = Rules {
                prefix: format!("{base}[{i}]"),
                errors: &mut *self.errors,
            };
            value.check(&mut child);
        }
        self
    }
}

/// A request payload with declared constraints.
pub trait Validate {
    /// Declare this record's constraints.
    fn check(&self, rules: &mut Rules<'_>);

    /// Run every constraint, returning all failures at once.
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        self.check(&mut Rules {
            prefix: String::new(),
            errors: &mut errors,
        });
        errors.into_result()
    }
}

/// The unit payload has no constraints; it stands in for "no body".
impl Validate for () {
    fn check(&self, _rules: &mut Rules<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Inner {
        address: String,
    }

    impl Validate for Inner {
        fn check(&self, rules: &mut Rules<'_>) {
            rules
                .required("address", &self.address)
                .email("address", &self.address);
        }
    }

    #[derive(Default)]
    struct Outer {
        name: String,
        from: Inner,
        to: Vec<Inner>,
    }

    impl Validate for Outer {
        fn check(&self, rules: &mut Rules<'_>) {
            rules
                .required("name", &self.name)
                .nested("from", &self.from)
                .required("to", &self.to)
                .each("to", &self.to);
        }
    }

    #[test]
    fn reports_nested_paths() {
        let payload = Outer {
            name: String::new(),
            from: Inner {
                address: "not-an-address".into(),
            },
            to: vec![
                Inner {
                    address: "ok@example.com".into(),
                },
                Inner::default(),
            ],
        };

        let err = payload.validate().unwrap_err();
        assert!(err.has_field("name"));
        assert!(err.has_field("from.address"));
        assert!(err.has_field("to[1].address"));
        assert!(!err.has_field("to[0].address"));
        assert_eq!(err.errors().len(), 3);
        assert_eq!(
            err.to_string(),
            "name: required; from.address: email; to[1].address: required"
        );
    }

    #[test]
    fn empty_collection_is_required_failure() {
        let payload = Outer {
            name: "x".into(),
            from: Inner {
                address: "a@b.io".into(),
            },
            to: vec![],
        };
        let err = payload.validate().unwrap_err();
        assert_eq!(err.errors(), &[FieldError { field: "to".into(), rule: "required" }]);
    }

    #[test]
    fn email_format() {
        for ok in [
            "a@b.co",
            "first.last+tag@sub.example.org",
            "ops@localhost",
            "a@[127.0.0.1]",
        ] {
            assert!(EMAIL_RE.is_match(ok), "{ok}");
        }
        for bad in ["plain", "a b@c.io", "@example.com", "a@", "a@b@c.io"] {
            assert!(!EMAIL_RE.is_match(bad), "{bad}");
        }
    }

    #[test]
    fn option_zero() {
        assert!(None::<String>.is_zero());
        assert!(Some(String::new()).is_zero());
        assert!(!Some("k".to_string()).is_zero());
    }

    #[test]
    fn unit_is_always_valid() {
        assert!(().validate().is_ok());
    }
}
