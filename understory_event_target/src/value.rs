// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loosely typed values accepted at the dynamic edges of the API.
//!
//! Listener arguments, attribute handler assignments, custom event details, and plain
//! event properties are all [`Value`]s. Primitive variants compare by value and reference
//! variants compare by identity, which matches how listeners are deduplicated.

use core::any::Any;
use core::fmt;
use std::rc::Rc;

use crate::listener::{Callback, EventListenerObject};

/// A dynamically typed value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean primitive.
    Bool(bool),
    /// Number primitive.
    Number(f64),
    /// String primitive.
    String(Rc<str>),
    /// A callable listener.
    Function(Callback),
    /// An object whose `handleEvent` member is looked up at call time.
    Object(EventListenerObject),
    /// Any other host object, compared by identity.
    Host(Rc<dyn Any>),
}

/// Coarse classification of a [`Value`], used in diagnostics.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueKind {
    /// [`Value::Undefined`].
    Undefined,
    /// [`Value::Null`].
    Null,
    /// [`Value::Bool`].
    Boolean,
    /// [`Value::Number`].
    Number,
    /// [`Value::String`].
    String,
    /// [`Value::Function`].
    Function,
    /// [`Value::Object`].
    Object,
    /// [`Value::Host`].
    Host,
}

impl ValueKind {
    /// Lowercase name used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Function => "function",
            Self::Object => "object",
            Self::Host => "host object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Wraps an arbitrary host object.
    pub fn host<T: Any>(value: T) -> Self {
        Self::Host(Rc::new(value))
    }

    /// Classification of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Undefined => ValueKind::Undefined,
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Boolean,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Function(_) => ValueKind::Function,
            Self::Object(_) => ValueKind::Object,
            Self::Host(_) => ValueKind::Host,
        }
    }

    /// Returns `true` for [`Value::Undefined`] and [`Value::Null`].
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Truthiness: `false`, `0`, `NaN`, `""`, null, and undefined are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Function(_) | Self::Object(_) | Self::Host(_) => true,
        }
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if this is a [`Value::Number`].
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the callback if this is a [`Value::Function`].
    pub const fn as_function(&self) -> Option<&Callback> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the listener object if this is a [`Value::Object`].
    pub const fn as_object(&self) -> Option<&EventListenerObject> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Downcasts a [`Value::Host`] payload.
    pub fn downcast_host<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Host(h) => h.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// String conversion with script-language rules.
    ///
    /// Numbers use the shortest round-trip form with exponent notation outside
    /// `[1e-6, 1e21)`; functions and objects use their tag strings.
    pub fn to_js_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".into(),
            Self::Null => "null".into(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => number_to_string(*n),
            Self::String(s) => s.to_string(),
            Self::Function(_) => "[object Function]".into(),
            Self::Object(_) | Self::Host(_) => "[object Object]".into(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Host(a), Self::Host(b)) => core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }
}

pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }
    if n == 0.0 {
        return "0".into();
    }
    if (1e-6..1e21).contains(&n.abs()) {
        return format!("{n}");
    }
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl From<Rc<str>> for Value {
    fn from(value: Rc<str>) -> Self {
        Self::String(value)
    }
}

impl From<Callback> for Value {
    fn from(value: Callback) -> Self {
        Self::Function(value)
    }
}

impl From<&Callback> for Value {
    fn from(value: &Callback) -> Self {
        Self::Function(value.clone())
    }
}

impl From<EventListenerObject> for Value {
    fn from(value: EventListenerObject) -> Self {
        Self::Object(value)
    }
}

impl From<&EventListenerObject> for Value {
    fn from(value: &EventListenerObject) -> Self {
        Self::Object(value.clone())
    }
}

impl From<&Self> for Value {
    fn from(value: &Self) -> Self {
        value.clone()
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_format_like_script_strings() {
        assert_eq!(number_to_string(1000.0), "1000");
        assert_eq!(number_to_string(0.1), "0.1");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(number_to_string(123_456_789_012.0), "123456789012");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::host(()).is_truthy());
    }

    #[test]
    fn reference_values_compare_by_identity() {
        let a = Callback::new(|_| Ok(()));
        let b = Callback::new(|_| Ok(()));
        assert_eq!(Value::from(&a), Value::from(a.clone()));
        assert_ne!(Value::from(&a), Value::from(&b));

        let host = Value::host(5_u8);
        assert_eq!(host, host.clone());
        assert_ne!(host, Value::host(5_u8));
        assert_eq!(host.downcast_host::<u8>(), Some(&5));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<bool>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn kinds_name_themselves() {
        assert_eq!(Value::from(1).kind().to_string(), "number");
        assert_eq!(Value::from(true).kind(), ValueKind::Boolean);
        assert_eq!(Value::Object(EventListenerObject::new()).to_js_string(), "[object Object]");
    }
}
