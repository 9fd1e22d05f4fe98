//! The contract a library implements to plug variables, constants, functions,
//! instance behaviour and event handling into the runtime.
//!
//! Functions are described up front in a registration table ([`FunctionLibrary`]),
//! and the host turns each description into a callable adapter at load time.

use std::{
    cell::Cell,
    fmt::{Debug, Display},
    rc::Rc,
};

use gml_core::{Value, UNDEFINED};

use crate::{
    config::ArgPolicy,
    err::RuntimeError,
    instance::{DefaultInstanceFactory, EventType, Instance, InstanceFactory},
    native::{self, FromValue, IntoValue, NativeFunc},
};

/// Native implementation behind a function description.
pub type NativeImpl = Rc<dyn Fn(&[Value]) -> anyhow::Result<Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic { min: usize },
}

impl Arity {
    pub const fn accepts(self, nargs: usize) -> bool {
        match self {
            Arity::Fixed(n) => nargs == n,
            Arity::Variadic { min } => nargs >= min,
        }
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{n}"),
            Arity::Variadic { min } => write!(f, "{min}+"),
        }
    }
}

/// The kind of value a parameter expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Real,
    Str,
    Any,
}

impl ParamKind {
    pub const fn accepts(self, v: &Value) -> bool {
        match self {
            ParamKind::Real => v.is_real(),
            ParamKind::Str => v.is_string(),
            ParamKind::Any => true,
        }
    }

    /// Reads `v` as this kind through the total accessors.
    pub fn coerce(self, v: &Value) -> Value {
        match self {
            ParamKind::Real => Value::real(v.as_real()),
            ParamKind::Str => Value::from(v.as_string()),
            ParamKind::Any => v.clone(),
        }
    }

    pub const fn type_string(self) -> &'static str {
        match self {
            ParamKind::Real => "real",
            ParamKind::Str => "string",
            ParamKind::Any => "any",
        }
    }
}

/// One built-in function: its name, its parameters and the native code behind it.
#[derive(Clone)]
pub struct FunctionDesc {
    pub name: String,
    pub params: Vec<ParamKind>,
    /// Kind of every argument past `params`. `None` means the arity is fixed.
    pub rest: Option<ParamKind>,
    imp: NativeImpl,
}

impl Debug for FunctionDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDesc")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("rest", &self.rest)
            .finish_non_exhaustive()
    }
}

impl FunctionDesc {
    pub fn new(
        name: &str,
        params: &[ParamKind],
        imp: impl Fn(&[Value]) -> anyhow::Result<Value> + 'static,
    ) -> Self {
        Self {
            name: name.to_owned(),
            params: params.to_vec(),
            rest: None,
            imp: Rc::new(imp),
        }
    }

    /// A function taking at least `min` arguments, all of kind `kind`.
    pub fn variadic(
        name: &str,
        min: usize,
        kind: ParamKind,
        imp: impl Fn(&[Value]) -> anyhow::Result<Value> + 'static,
    ) -> Self {
        Self {
            name: name.to_owned(),
            params: vec![kind; min],
            rest: Some(kind),
            imp: Rc::new(imp),
        }
    }

    pub fn unary<A, R>(name: &str, f: impl Fn(A) -> R + 'static) -> Self
    where
        A: FromValue,
        R: IntoValue,
    {
        Self::new(name, &[A::KIND], move |args| {
            Ok(f(A::from_value(arg(args, 0))).into_value())
        })
    }

    pub fn binary<A, B, R>(name: &str, f: impl Fn(A, B) -> R + 'static) -> Self
    where
        A: FromValue,
        B: FromValue,
        R: IntoValue,
    {
        Self::new(name, &[A::KIND, B::KIND], move |args| {
            Ok(f(A::from_value(arg(args, 0)), B::from_value(arg(args, 1))).into_value())
        })
    }

    pub fn arity(&self) -> Arity {
        match self.rest {
            Some(_) => Arity::Variadic {
                min: self.params.len(),
            },
            None => Arity::Fixed(self.params.len()),
        }
    }

    /// Declared kind of the argument at `index`.
    pub fn param_kind(&self, index: usize) -> ParamKind {
        self.params
            .get(index)
            .copied()
            .or(self.rest)
            .unwrap_or(ParamKind::Any)
    }

    /// Runs the native implementation without any marshalling.
    pub fn invoke(&self, args: &[Value]) -> anyhow::Result<Value> {
        (self.imp)(args)
    }
}

#[inline]
fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&*UNDEFINED)
}

/// A named group of function descriptions.
#[derive(Debug, Clone, Default)]
pub struct FunctionLibrary {
    pub name: String,
    pub functions: Vec<FunctionDesc>,
}

impl FunctionLibrary {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            functions: Vec::new(),
        }
    }

    pub fn with(mut self, desc: FunctionDesc) -> Self {
        self.functions.push(desc);
        self
    }
}

/// Context handed to a library when the host asks it for an instance factory.
#[derive(Debug, Clone)]
pub struct LibraryContext {
    library: String,
    next_id: Rc<Cell<u32>>,
    max_instances: u32,
}

impl LibraryContext {
    pub fn new(library: &str, next_id: Rc<Cell<u32>>, max_instances: u32) -> Self {
        Self {
            library: library.to_owned(),
            next_id,
            max_instances,
        }
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    /// Hands out the next instance id. Ids are shared by every library of one host.
    pub fn allocate_id(&self) -> Result<u32, RuntimeError> {
        let id = self.next_id.get();
        if id >= self.max_instances {
            return Err(RuntimeError::InstanceLimit {
                max: self.max_instances,
            });
        }
        self.next_id.set(id + 1);
        Ok(id)
    }
}

pub trait LibraryInitializer {
    fn name(&self) -> &str;

    fn global_variables(&self) -> Vec<&str> {
        Vec::new()
    }

    fn constants(&self) -> Vec<(&str, Value)> {
        Vec::new()
    }

    fn instance_variables(&self) -> Vec<&str> {
        Vec::new()
    }

    fn function_libraries(&self) -> Vec<FunctionLibrary> {
        Vec::new()
    }

    /// Builds the adapter the host calls for `desc`, exposed as `name`.
    fn transform_function(&self, desc: &FunctionDesc, name: &str, policy: ArgPolicy) -> NativeFunc {
        native::marshal(desc, name, policy)
    }

    fn create_instance_factory(&self, context: &LibraryContext) -> Box<dyn InstanceFactory> {
        Box::new(DefaultInstanceFactory::new(context.clone()))
    }

    fn perform_event(
        &self,
        _instance: &mut Instance,
        _event: EventType,
        _num: i32,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
