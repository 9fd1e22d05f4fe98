use std::{collections::HashMap, fmt::Display};

use gml_core::Value;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{err::RuntimeError, library::LibraryContext};

/// Event categories, numbered the way scripts and saved games refer to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum EventType {
    Create = 0,
    Destroy = 1,
    Alarm = 2,
    Step = 3,
    Collision = 4,
    Keyboard = 5,
    Mouse = 6,
    Other = 7,
    Draw = 8,
    KeyPress = 9,
    KeyRelease = 10,
}

impl EventType {
    pub fn from_number(n: i64) -> Result<Self, RuntimeError> {
        <Self as FromPrimitive>::from_i64(n).ok_or(RuntimeError::UnknownEvent(n))
    }

    /// Reads the event number from a runtime value (rounded like any integer argument).
    pub fn from_value(v: &Value) -> Result<Self, RuntimeError> {
        Self::from_number(v.as_int())
    }

    pub const fn type_string(self) -> &'static str {
        match self {
            EventType::Create => "create",
            EventType::Destroy => "destroy",
            EventType::Alarm => "alarm",
            EventType::Step => "step",
            EventType::Collision => "collision",
            EventType::Keyboard => "keyboard",
            EventType::Mouse => "mouse",
            EventType::Other => "other",
            EventType::Draw => "draw",
            EventType::KeyPress => "keypress",
            EventType::KeyRelease => "keyrelease",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_string())
    }
}

/// An object instance and its variable namespace.
#[derive(Debug, Clone)]
pub struct Instance {
    id: u32,
    object_index: i32,
    vars: HashMap<String, Value>,
}

impl Instance {
    pub fn new(id: u32, object_index: i32) -> Self {
        Self {
            id,
            object_index,
            vars: HashMap::new(),
        }
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub const fn object_index(&self) -> i32 {
        self.object_index
    }

    /// Adds `name` as undefined unless the instance already has it.
    pub fn declare(&mut self, name: &str) {
        if !self.vars.contains_key(name) {
            self.vars.insert(name.to_owned(), Value::Undefined);
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Value, RuntimeError> {
        self.vars
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownVariable {
                name: name.to_owned(),
                id: self.id,
            })
    }

    /// Lenient read: a missing variable reads as undefined.
    pub fn get_or_undefined(&self, name: &str) -> Value {
        self.vars.get(name).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, name: &str, v: impl Into<Value>) {
        self.vars.insert(name.to_owned(), v.into());
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}

pub trait InstanceFactory {
    fn create(&self, object_index: i32) -> Result<Instance, RuntimeError>;
}

/// Factory that builds bare instances with ids taken from the library context.
#[derive(Debug, Clone)]
pub struct DefaultInstanceFactory {
    context: LibraryContext,
}

impl DefaultInstanceFactory {
    pub fn new(context: LibraryContext) -> Self {
        Self { context }
    }
}

impl InstanceFactory for DefaultInstanceFactory {
    fn create(&self, object_index: i32) -> Result<Instance, RuntimeError> {
        let id = self.context.allocate_id()?;
        Ok(Instance::new(id, object_index))
    }
}
