//! Values written into the tree and typed access to values read back out.
//!
//! Every leaf stores its value as text.  Numbers, booleans and other types are
//! produced on demand by parsing that text, so the same leaf can be read as a
//! string, an `i32` or an `f64` depending on what the caller needs.
//!
//! # Two styles of typed access (for beginners)
//!
//! - **Lenient getters** such as [`Scalars::get_i32_or`] never fail.  If the
//!   path is absent or the text does not parse, the caller-supplied default is
//!   returned instead.
//! - **The fallible getter** [`Scalars::get_as`] reports a
//!   [`ConfigError::TypeMismatch`] instead of hiding the problem, which is the
//!   better choice when a bad value should stop startup.

use std::str::FromStr;

use crate::domain::error::ConfigError;
use crate::domain::tree::NodeId;

/// A value that can be assigned to a path with [`crate::ConfigTree::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Store this text as a leaf value, replacing any section at the path.
    Scalar(String),
    /// Move an existing section of the same tree to the path.
    Section(NodeId),
    /// Remove whatever is stored at the path, including whole subtrees.
    Null,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Scalar(value.clone())
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Section(id)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

macro_rules! value_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Scalar(value.to_string())
                }
            }
        )*
    };
}

value_from_display!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// The result of resolving a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The path holds a leaf value.
    Scalar(&'a str),
    /// The path holds a section; use the handle to read or write inside it.
    Section(NodeId),
}

impl<'a> Lookup<'a> {
    /// Returns the leaf text, or `None` for a section.
    pub fn as_scalar(self) -> Option<&'a str> {
        match self {
            Lookup::Scalar(s) => Some(s),
            Lookup::Section(_) => None,
        }
    }

    /// Returns the section handle, or `None` for a leaf.
    pub fn as_section(self) -> Option<NodeId> {
        match self {
            Lookup::Section(id) => Some(id),
            Lookup::Scalar(_) => None,
        }
    }
}

/// Conversion from a stored leaf text into a typed value.
pub trait FromScalar: Sized {
    /// Human-readable type name used in [`ConfigError::TypeMismatch`].
    const TYPE_NAME: &'static str;

    /// Parses `raw`, returning `None` when it is not a valid value of this type.
    fn from_scalar(raw: &str) -> Option<Self>;
}

macro_rules! from_scalar_via_parse {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromScalar for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn from_scalar(raw: &str) -> Option<Self> {
                    <$ty as FromStr>::from_str(raw).ok()
                }
            }
        )*
    };
}

from_scalar_via_parse!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64, char);

impl FromScalar for bool {
    const TYPE_NAME: &'static str = "bool";

    /// Accepts `true` and `false` in any letter case.
    fn from_scalar(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("true") {
            Some(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}

impl FromScalar for String {
    const TYPE_NAME: &'static str = "string";

    fn from_scalar(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

macro_rules! numeric_accessors {
    ($($ty:ty => $get:ident, $get_or:ident, $is:ident;)*) => {
        $(
            #[doc = concat!("Returns the value at `path` parsed as `", stringify!($ty), "`, or `default` when absent or unparseable.")]
            fn $get_or(&self, path: &str, default: $ty) -> $ty {
                self.parse_or(path, default)
            }

            #[doc = concat!("Same as [`Self::", stringify!($get_or), "`] with a zero default.")]
            fn $get(&self, path: &str) -> $ty {
                self.$get_or(path, 0 as $ty)
            }

            #[doc = concat!("Returns `true` when `path` holds text that parses as `", stringify!($ty), "`.")]
            ///
            /// Implemented by reading the value twice with two different
            /// defaults: only a real parse result agrees with both reads.
            fn $is(&self, path: &str) -> bool {
                self.$get_or(path, 0 as $ty) == self.$get_or(path, 1 as $ty)
            }
        )*
    };
}

/// Read access to leaf values, shared by the tree and its section views.
///
/// Implementors only provide [`Scalars::lookup`]; every typed accessor is
/// derived from it.
pub trait Scalars {
    /// Resolves `path` relative to this node.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] when `path` is malformed.
    fn lookup(&self, path: &str) -> Result<Option<Lookup<'_>>, ConfigError>;

    /// Returns the leaf text at `path`, or `None` for sections, absent paths
    /// and malformed paths.
    fn get_string(&self, path: &str) -> Option<&str> {
        self.lookup(path).ok().flatten().and_then(|l| l.as_scalar())
    }

    /// Returns the leaf text at `path`, or `default`.
    fn get_string_or<'s>(&'s self, path: &str, default: &'s str) -> &'s str {
        self.get_string(path).unwrap_or(default)
    }

    /// Returns `true` when `path` resolves to a leaf or a section.
    fn contains(&self, path: &str) -> bool {
        matches!(self.lookup(path), Ok(Some(_)))
    }

    /// Parses the leaf at `path` with [`FromStr`], falling back to `default`.
    fn parse_or<T: FromStr>(&self, path: &str, default: T) -> T {
        self.get_string(path)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(default)
    }

    /// Reads the leaf at `path` as `T`.
    ///
    /// Returns `Ok(None)` when nothing is stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] for malformed paths and
    /// [`ConfigError::TypeMismatch`] when the path holds a section or text
    /// that is not a valid `T`.
    fn get_as<T: FromScalar>(&self, path: &str) -> Result<Option<T>, ConfigError> {
        match self.lookup(path)? {
            None => Ok(None),
            Some(Lookup::Scalar(raw)) => {
                T::from_scalar(raw)
                    .map(Some)
                    .ok_or_else(|| ConfigError::TypeMismatch {
                        path: path.to_string(),
                        expected: T::TYPE_NAME,
                        found: raw.to_string(),
                    })
            }
            Some(Lookup::Section(_)) => Err(ConfigError::TypeMismatch {
                path: path.to_string(),
                expected: T::TYPE_NAME,
                found: "<section>".to_string(),
            }),
        }
    }

    /// Returns `true` when [`Scalars::get_as`] would yield a value of type `T`.
    fn is_type<T: FromScalar>(&self, path: &str) -> bool {
        matches!(self.get_as::<T>(path), Ok(Some(_)))
    }

    numeric_accessors! {
        i8 => get_i8, get_i8_or, is_i8;
        i16 => get_i16, get_i16_or, is_i16;
        i32 => get_i32, get_i32_or, is_i32;
        i64 => get_i64, get_i64_or, is_i64;
        f32 => get_f32, get_f32_or, is_f32;
        f64 => get_f64, get_f64_or, is_f64;
    }

    /// Returns `true` only when the leaf at `path` equals `"true"` ignoring
    /// case.
    ///
    /// This is a predicate, not a parser: `"yes"`, `"1"`, an absent path and
    /// a section all read as `false`.  Use [`Scalars::get_as`] with `bool` to
    /// tell `false` apart from garbage.
    fn get_bool(&self, path: &str) -> bool {
        self.get_string(path)
            .is_some_and(|raw| raw.eq_ignore_ascii_case("true"))
    }

    /// Returns `true` when the leaf at `path` is `"true"` or `"false"`,
    /// ignoring case.
    fn is_bool(&self, path: &str) -> bool {
        self.get_string(path)
            .is_some_and(|raw| bool::from_scalar(raw).is_some())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Minimal flat implementation so the accessors can be tested without a tree.
    struct FlatScalars(HashMap<&'static str, &'static str>);

    impl Scalars for FlatScalars {
        fn lookup(&self, path: &str) -> Result<Option<Lookup<'_>>, ConfigError> {
            crate::domain::path::validate_path(path)?;
            Ok(self.0.get(path).map(|v| Lookup::Scalar(*v)))
        }
    }

    fn scalars(entries: &[(&'static str, &'static str)]) -> FlatScalars {
        FlatScalars(entries.iter().copied().collect())
    }

    // ── Value conversions ─────────────────────────────────────────────────────

    #[test]
    fn test_value_from_number_stores_display_text() {
        assert_eq!(Value::from(42), Value::Scalar("42".to_string()));
        assert_eq!(Value::from(-1.5f64), Value::Scalar("-1.5".to_string()));
        assert_eq!(Value::from(true), Value::Scalar("true".to_string()));
    }

    #[test]
    fn test_value_from_none_is_null() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Scalar("x".to_string()));
    }

    // ── numeric getters ───────────────────────────────────────────────────────

    #[test]
    fn test_get_i32_parses_value() {
        let s = scalars(&[("a", "42")]);
        assert_eq!(s.get_i32("a"), 42);
        assert_eq!(s.get_i32_or("a", 7), 42);
    }

    #[test]
    fn test_get_i32_returns_default_when_absent_or_unparseable() {
        let s = scalars(&[("a", "forty-two")]);
        assert_eq!(s.get_i32_or("a", 7), 7);
        assert_eq!(s.get_i32_or("missing", 7), 7);
        assert_eq!(s.get_i32("missing"), 0);
    }

    #[test]
    fn test_get_i8_returns_default_when_out_of_range() {
        let s = scalars(&[("a", "300")]);
        assert_eq!(s.get_i8_or("a", -1), -1);
        assert_eq!(s.get_i16("a"), 300);
    }

    #[test]
    fn test_get_f64_parses_fraction_and_exponent() {
        let s = scalars(&[("a", "2.5"), ("b", "1e3")]);
        assert_eq!(s.get_f64("a"), 2.5);
        assert_eq!(s.get_f32("b"), 1000.0);
    }

    #[test]
    fn test_getters_on_invalid_path_return_default() {
        let s = scalars(&[]);
        assert_eq!(s.get_i64_or("a..b", 9), 9);
        assert_eq!(s.get_string("a:b"), None);
    }

    // ── is_* checks ───────────────────────────────────────────────────────────

    #[test]
    fn test_is_i32_agrees_with_both_sentinel_defaults_for_real_values() {
        // The sentinel values 0 and 1 themselves must still be detected.
        for raw in ["0", "1", "42", "-7"] {
            let s = scalars(&[("a", raw)]);
            assert!(s.is_i32("a"), "{raw} must be an i32");
            assert_eq!(s.get_i32_or("a", 0), s.get_i32_or("a", 1));
        }
    }

    #[test]
    fn test_is_i32_is_false_for_non_numeric_and_absent() {
        let s = scalars(&[("a", "abc"), ("b", "4.2")]);
        assert!(!s.is_i32("a"));
        assert!(!s.is_i32("b"));
        assert!(!s.is_i32("missing"));
        assert_ne!(s.get_i32_or("a", 0), s.get_i32_or("a", 1));
    }

    #[test]
    fn test_is_f64_accepts_integers_and_rejects_nan() {
        let s = scalars(&[("a", "3"), ("b", "NaN")]);
        assert!(s.is_f64("a"));
        // NaN never compares equal to itself.
        assert!(!s.is_f64("b"));
    }

    // ── booleans ──────────────────────────────────────────────────────────────

    #[test]
    fn test_get_bool_is_true_only_for_true_ignoring_case() {
        let s = scalars(&[("a", "TRUE"), ("b", "yes"), ("c", "false")]);
        assert!(s.get_bool("a"));
        assert!(!s.get_bool("b"));
        assert!(!s.get_bool("c"));
        assert!(!s.get_bool("missing"));
    }

    #[test]
    fn test_is_bool_accepts_true_and_false_only() {
        let s = scalars(&[("a", "False"), ("b", "1")]);
        assert!(s.is_bool("a"));
        assert!(!s.is_bool("b"));
    }

    // ── get_as ────────────────────────────────────────────────────────────────

    #[test]
    fn test_get_as_returns_typed_value() {
        let s = scalars(&[("port", "3306"), ("ssl", "True")]);
        assert_eq!(s.get_as::<u16>("port"), Ok(Some(3306)));
        assert_eq!(s.get_as::<bool>("ssl"), Ok(Some(true)));
        assert_eq!(s.get_as::<String>("port"), Ok(Some("3306".to_string())));
    }

    #[test]
    fn test_get_as_absent_returns_none() {
        let s = scalars(&[]);
        assert_eq!(s.get_as::<u16>("port"), Ok(None));
    }

    #[test]
    fn test_get_as_reports_type_mismatch() {
        let s = scalars(&[("port", "http")]);
        assert_eq!(
            s.get_as::<u16>("port"),
            Err(ConfigError::TypeMismatch {
                path: "port".to_string(),
                expected: "u16",
                found: "http".to_string(),
            })
        );
        assert!(!s.is_type::<u16>("port"));
        assert!(s.is_type::<String>("port"));
    }

    #[test]
    fn test_get_as_reports_invalid_path() {
        let s = scalars(&[]);
        assert!(matches!(
            s.get_as::<u16>("a..b"),
            Err(ConfigError::InvalidPath(_))
        ));
    }
}
