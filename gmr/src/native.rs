use std::{fmt::Display, rc::Rc};

use gml_core::{GmString, Value};
use log::warn;

use crate::{
    config::ArgPolicy,
    err::RuntimeError,
    library::{Arity, FunctionDesc, ParamKind},
};

type Adapter = Rc<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>;

/// A registered built-in, ready to be called with raw runtime values.
#[derive(Clone)]
pub struct NativeFunc {
    pub name: Rc<str>,
    pub arity: Arity,
    func: Adapter,
}

impl std::fmt::Debug for NativeFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunc")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl NativeFunc {
    pub fn new(
        name: &str,
        arity: Arity,
        func: impl Fn(&[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name),
            arity,
            func: Rc::new(func),
        }
    }

    #[inline]
    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.func)(args)
    }
}

impl Display for NativeFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__native__/{}/{}", self.name, self.arity)
    }
}

/// Rust types a native function can take as a parameter.
pub trait FromValue: Sized {
    /// Kind the adapter checks (or coerces) the argument to.
    const KIND: ParamKind;

    fn from_value(v: &Value) -> Self;
}

/// Rust types a native function can return.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl FromValue for f64 {
    const KIND: ParamKind = ParamKind::Real;

    fn from_value(v: &Value) -> Self {
        v.as_real()
    }
}

impl FromValue for i32 {
    const KIND: ParamKind = ParamKind::Real;

    fn from_value(v: &Value) -> Self {
        v.as_integer()
    }
}

impl FromValue for i64 {
    const KIND: ParamKind = ParamKind::Real;

    fn from_value(v: &Value) -> Self {
        v.as_int()
    }
}

impl FromValue for bool {
    const KIND: ParamKind = ParamKind::Real;

    fn from_value(v: &Value) -> Self {
        v.as_bool()
    }
}

impl FromValue for String {
    const KIND: ParamKind = ParamKind::Str;

    fn from_value(v: &Value) -> Self {
        v.as_str().to_owned()
    }
}

impl FromValue for GmString {
    const KIND: ParamKind = ParamKind::Str;

    fn from_value(v: &Value) -> Self {
        v.as_string()
    }
}

impl FromValue for Value {
    const KIND: ParamKind = ParamKind::Any;

    fn from_value(v: &Value) -> Self {
        v.clone()
    }
}

macro_rules! into_value_via_from {
    ($($t:ty),*) => {
        $(
            impl IntoValue for $t {
                #[inline]
                fn into_value(self) -> Value {
                    Value::from(self)
                }
            }
        )*
    };
}

into_value_via_from!(f64, i32, i64, bool, String, GmString, &str);

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Undefined
    }
}

/// Builds the calling adapter for `desc`, exposed under `name`.
///
/// The adapter checks the argument list against the declared signature using `policy`
/// and then runs the native implementation. Errors coming out of the implementation
/// are wrapped in [`RuntimeError::Native`].
pub fn marshal(desc: &FunctionDesc, name: &str, policy: ArgPolicy) -> NativeFunc {
    let arity = desc.arity();
    let desc = desc.clone();
    let exposed: Rc<str> = Rc::from(name);

    NativeFunc::new(name, arity, move |args| {
        let args = match policy {
            ArgPolicy::Lenient => lenient_args(&desc, &exposed, args),
            ArgPolicy::Strict => strict_args(&desc, &exposed, args)?,
        };

        desc.invoke(&args).map_err(|source| RuntimeError::Native {
            name: exposed.to_string(),
            source,
        })
    })
}

fn lenient_args(desc: &FunctionDesc, name: &str, args: &[Value]) -> Vec<Value> {
    let count = match desc.arity() {
        Arity::Fixed(n) => n,
        Arity::Variadic { min } => args.len().max(min),
    };

    (0..count)
        .map(|i| {
            let kind = desc.param_kind(i);
            match args.get(i) {
                Some(v) if kind.accepts(v) => v.clone(),
                Some(v) => {
                    warn!(
                        "{name}: argument {i} is {}, coercing to {}",
                        v.type_string(),
                        kind.type_string()
                    );
                    kind.coerce(v)
                }
                None => kind.coerce(&Value::Undefined),
            }
        })
        .collect()
}

fn strict_args(desc: &FunctionDesc, name: &str, args: &[Value]) -> Result<Vec<Value>, RuntimeError> {
    let arity = desc.arity();
    if !arity.accepts(args.len()) {
        return Err(RuntimeError::ArgumentCount {
            name: name.to_owned(),
            expected: arity,
            got: args.len(),
        });
    }

    for (index, v) in args.iter().enumerate() {
        let kind = desc.param_kind(index);
        if !kind.accepts(v) {
            return Err(RuntimeError::InvalidType {
                name: name.to_owned(),
                index,
                expected: kind.type_string(),
                actual: v.type_string(),
            });
        }
    }

    Ok(args.to_vec())
}
