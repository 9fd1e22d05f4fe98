use std::{
    any::Any,
    fmt::Display,
    ops::{Add, Div, Mul, Sub},
    sync::Arc,
};

use lazy_static::lazy_static;
use num_traits::{Bounded, Zero};

use crate::num;

/// Immutable shared text payload.
pub type GmString = Arc<str>;

/// Longest string, in bytes, [`Value::repeat`] builds.
pub const MAX_REPEAT_LEN: usize = 1 << 28;

lazy_static! {
    pub static ref ZERO: Value = Value::Real(0.0);
    pub static ref ONE: Value = Value::Real(1.0);
    pub static ref EMPTY_STRING: Value = Value::Str(GmString::from(""));
    pub static ref UNDEFINED: Value = Value::Undefined;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    Real,
    Str,
}

/// The dynamic value stored in every variable slot, argument and return value.
///
/// Reading a value as the wrong kind never fails: the string accessor gives `""`
/// for anything that isn't a string and the real accessor gives `0.0` for anything
/// that isn't a real. Arithmetic and comparison follow the host language's rules,
/// which are not symmetric (see the operator impls below).
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Undefined,
    Real(f64),
    Str(GmString),
}

impl Value {
    pub const fn undefined() -> Self {
        Self::Undefined
    }

    pub const fn real(n: f64) -> Self {
        Self::Real(n)
    }

    pub const fn bool(b: bool) -> Self {
        Self::Real(if b { 1.0 } else { 0.0 })
    }

    #[inline]
    pub fn string(s: &str) -> Self {
        Self::Str(GmString::from(s))
    }

    /// `text` repeated `times` times. The count is truncated toward zero and
    /// saturates at `i32::MAX`; counts below one (and NaN) give the empty string.
    ///
    /// Results longer than [`MAX_REPEAT_LEN`] bytes give the empty string too.
    pub fn repeat(times: f64, text: &str) -> Self {
        // `as i32` truncates, saturates and maps NaN to 0
        let n = usize::try_from(times as i32).unwrap_or(0);
        if n == 0 || text.is_empty() {
            return EMPTY_STRING.clone();
        }
        match n.checked_mul(text.len()) {
            Some(len) if len <= MAX_REPEAT_LEN => Self::Str(GmString::from(text.repeat(n))),
            _ => EMPTY_STRING.clone(),
        }
    }

    /// Builds a value from an untyped host object.
    ///
    /// Integers, floats and booleans become reals, strings become strings, and
    /// `None` or anything else becomes undefined.
    pub fn from_dynamic(obj: Option<&dyn Any>) -> Self {
        let Some(obj) = obj else {
            return Self::Undefined;
        };

        if let Some(v) = obj.downcast_ref::<Value>() {
            v.clone()
        } else if let Some(s) = obj.downcast_ref::<String>() {
            Self::string(s)
        } else if let Some(s) = obj.downcast_ref::<&'static str>() {
            Self::string(s)
        } else if let Some(s) = obj.downcast_ref::<GmString>() {
            Self::Str(Arc::clone(s))
        } else if let Some(n) = obj.downcast_ref::<f64>() {
            Self::Real(*n)
        } else if let Some(n) = obj.downcast_ref::<f32>() {
            Self::Real(f64::from(*n))
        } else if let Some(n) = obj.downcast_ref::<i32>() {
            Self::Real(f64::from(*n))
        } else if let Some(n) = obj.downcast_ref::<u32>() {
            Self::Real(f64::from(*n))
        } else if let Some(n) = obj.downcast_ref::<i64>() {
            Self::Real(*n as f64)
        } else if let Some(b) = obj.downcast_ref::<bool>() {
            Self::bool(*b)
        } else {
            Self::Undefined
        }
    }

    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Real(_) => ValueKind::Real,
            Value::Str(_) => ValueKind::Str,
        }
    }

    pub const fn type_string(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Real(_) => "real",
            Value::Str(_) => "string",
        }
    }

    /// is_real(val)
    #[inline]
    pub const fn is_real(&self) -> bool {
        matches!(self, Self::Real(_))
    }

    /// is_string(val)
    #[inline]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::Str(_))
    }

    #[inline]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// The real a function expecting a real sees: the payload for reals, 0 otherwise.
    #[inline]
    pub const fn as_real(&self) -> f64 {
        if let Self::Real(n) = self {
            *n
        } else {
            0.0
        }
    }

    /// The text a function expecting a string sees: the payload for strings, `""` otherwise.
    #[inline]
    pub fn as_str(&self) -> &str {
        if let Self::Str(s) = self {
            s
        } else {
            ""
        }
    }

    /// Like [`Value::as_str`] but hands out the shared payload.
    pub fn as_string(&self) -> GmString {
        if let Self::Str(s) = self {
            Arc::clone(s)
        } else {
            GmString::from("")
        }
    }

    /// Rounds the real payload half to even. Non-reals read as 0.
    #[inline]
    pub fn as_integer(&self) -> i32 {
        self.as_int()
    }

    /// [`Value::as_integer`] for any primitive integer type, clamped to its range.
    pub fn as_int<T>(&self) -> T
    where
        T: num_traits::NumCast + Bounded + Zero,
    {
        num::to_int(self.as_real())
    }

    /// True only for reals that are at least 0.5. Strings are never true.
    #[inline]
    pub fn as_bool(&self) -> bool {
        matches!(self, Self::Real(n) if *n >= 0.5)
    }

    /// The text `string(val)` produces. Strings print verbatim, everything else
    /// goes through [`num::format_real`].
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            _ => num::format_real(self.as_real()),
        }
    }

    pub fn set_string(&mut self, s: impl Into<GmString>) {
        *self = Self::Str(s.into());
    }

    pub fn set_real(&mut self, n: f64) {
        *self = Self::Real(n);
    }

    pub fn set_integer(&mut self, n: i32) {
        *self = Self::from(n);
    }

    pub fn set_bool(&mut self, b: bool) {
        *self = Self::bool(b);
    }

    /// Numeric addition whatever the receiver holds.
    pub fn add_real(&self, rhs: &Value) -> Value {
        Value::Real(self.as_real() + rhs.as_real())
    }

    /// String concatenation whatever the receiver holds.
    pub fn add_string(&self, rhs: &Value) -> Value {
        let (a, b) = (self.as_str(), rhs.as_str());
        let mut s = String::with_capacity(a.len() + b.len());
        s.push_str(a);
        s.push_str(b);
        Value::Str(GmString::from(s))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Undefined, Value::Undefined) => true,
            _ => false,
        }
    }
}

// The left operand picks the arithmetic. A real on the left adds as reals, anything
// else concatenates. For -, * and / a non-real left operand always gives 0.

impl Add for &Value {
    type Output = Value;

    fn add(self, rhs: Self) -> Self::Output {
        if self.is_real() {
            self.add_real(rhs)
        } else {
            self.add_string(rhs)
        }
    }
}

impl Sub for &Value {
    type Output = Value;

    fn sub(self, rhs: Self) -> Self::Output {
        match self {
            Value::Real(a) => Value::Real(a - rhs.as_real()),
            _ => ZERO.clone(),
        }
    }
}

impl Mul for &Value {
    type Output = Value;

    fn mul(self, rhs: Self) -> Self::Output {
        match self {
            Value::Real(a) => Value::Real(a * rhs.as_real()),
            _ => ZERO.clone(),
        }
    }
}

impl Div for &Value {
    type Output = Value;

    fn div(self, rhs: Self) -> Self::Output {
        match self {
            Value::Real(a) => Value::Real(a / rhs.as_real()),
            _ => ZERO.clone(),
        }
    }
}

macro_rules! forward_owned_binop {
    ($($tr:ident::$method:ident),*) => {
        $(
            impl $tr for Value {
                type Output = Value;

                #[inline]
                fn $method(self, rhs: Self) -> Self::Output {
                    $tr::$method(&self, &rhs)
                }
            }
        )*
    };
}

forward_owned_binop!(Add::add, Sub::sub, Mul::mul, Div::div);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Real(f64::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Real(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Real(f64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Real(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(GmString::from(value))
    }
}

impl From<GmString> for Value {
    fn from(value: GmString) -> Self {
        Self::Str(value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}
