use std::{cell::Cell, collections::HashMap, rc::Rc};

use gml_core::Value;
use log::{debug, trace};

use crate::{
    config::RuntimeConfig,
    err::RuntimeError,
    instance::{EventType, Instance, InstanceFactory},
    library::{FunctionLibrary, LibraryContext, LibraryInitializer},
    native::NativeFunc,
};

/// Host side of the library contract: owns the global namespace, the function
/// table and the loaded libraries.
pub struct Runtime {
    config: RuntimeConfig,
    globals: HashMap<String, Value>,
    constants: HashMap<String, Value>,
    instance_vars: Vec<String>,
    functions: HashMap<String, NativeFunc>,
    factories: HashMap<String, Box<dyn InstanceFactory>>,
    libraries: Vec<Box<dyn LibraryInitializer>>,
    next_id: Rc<Cell<u32>>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            globals: HashMap::new(),
            constants: HashMap::new(),
            instance_vars: Vec::new(),
            functions: HashMap::new(),
            factories: HashMap::new(),
            libraries: Vec::new(),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Registers everything `lib` exposes and keeps it around for event dispatch.
    ///
    /// Name clashes are checked before anything is registered, so a failed load
    /// leaves the runtime untouched.
    pub fn load_library(&mut self, lib: impl LibraryInitializer + 'static) -> Result<(), RuntimeError> {
        let name = lib.name().to_owned();
        if self.factories.contains_key(&name) {
            return Err(RuntimeError::Duplicate {
                what: "library",
                name,
            });
        }
        debug!("loading library {name}");

        let constants = lib.constants();
        let globals = lib.global_variables();
        let groups = lib.function_libraries();
        self.check_clashes(&constants, &globals, &groups)?;

        for g in globals {
            if !self.globals.contains_key(g) {
                trace!("global {g}");
                self.globals.insert(g.to_owned(), Value::Undefined);
            }
        }

        for (c, v) in constants {
            trace!("constant {c} = {v}");
            self.constants.insert(c.to_owned(), v);
        }

        for v in lib.instance_variables() {
            if !self.instance_vars.iter().any(|known| known == v) {
                trace!("instance variable {v}");
                self.instance_vars.push(v.to_owned());
            }
        }

        for group in &groups {
            for desc in &group.functions {
                let f = lib.transform_function(desc, &desc.name, self.config.arg_policy);
                trace!("function {}::{f}", group.name);
                self.functions.insert(desc.name.clone(), f);
            }
        }

        let context =
            LibraryContext::new(&name, Rc::clone(&self.next_id), self.config.max_instances);
        self.factories.insert(name, lib.create_instance_factory(&context));
        self.libraries.push(Box::new(lib));

        Ok(())
    }

    fn check_clashes(
        &self,
        constants: &[(&str, Value)],
        globals: &[&str],
        groups: &[FunctionLibrary],
    ) -> Result<(), RuntimeError> {
        let mut seen_constants: Vec<&str> = Vec::new();
        for (c, _) in constants {
            if self.constants.contains_key(*c)
                || self.globals.contains_key(*c)
                || globals.contains(c)
                || seen_constants.contains(c)
            {
                return Err(RuntimeError::Duplicate {
                    what: "constant",
                    name: c.to_string(),
                });
            }
            seen_constants.push(*c);
        }

        if let Some(g) = globals.iter().find(|g| self.constants.contains_key(**g)) {
            return Err(RuntimeError::Duplicate {
                what: "constant",
                name: g.to_string(),
            });
        }

        let mut seen_functions: Vec<&str> = Vec::new();
        for desc in groups.iter().flat_map(|g| g.functions.iter()) {
            let name = desc.name.as_str();
            if self.functions.contains_key(name) || seen_functions.contains(&name) {
                return Err(RuntimeError::Duplicate {
                    what: "function",
                    name: desc.name.clone(),
                });
            }
            seen_functions.push(name);
        }

        Ok(())
    }

    /// Reads a constant or a global variable.
    pub fn global(&self, name: &str) -> Result<&Value, RuntimeError> {
        self.constants
            .get(name)
            .or_else(|| self.globals.get(name))
            .ok_or_else(|| RuntimeError::UnknownIdentifier {
                name: name.to_owned(),
            })
    }

    /// Writes a global variable, creating it if needed. Constants can't be assigned.
    pub fn set_global(&mut self, name: &str, v: impl Into<Value>) -> Result<(), RuntimeError> {
        if self.constants.contains_key(name) {
            return Err(RuntimeError::ConstantAssignment {
                name: name.to_owned(),
            });
        }
        self.globals.insert(name.to_owned(), v.into());
        Ok(())
    }

    pub fn is_constant(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    pub fn function(&self, name: &str) -> Option<&NativeFunc> {
        self.functions.get(name)
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let f = self
            .functions
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownFunction {
                name: name.to_owned(),
            })?;
        f.call(args)
    }

    /// Creates an instance through `library`'s factory. The instance gets every
    /// registered instance variable, set to undefined.
    pub fn create_instance(&self, library: &str, object_index: i32) -> Result<Instance, RuntimeError> {
        let factory = self
            .factories
            .get(library)
            .ok_or_else(|| RuntimeError::UnknownLibrary {
                name: library.to_owned(),
            })?;

        let mut inst = factory.create(object_index)?;
        for v in &self.instance_vars {
            inst.declare(v);
        }
        debug!("created instance {} of object {object_index}", inst.id());
        Ok(inst)
    }

    /// Offers the event to every loaded library, in load order.
    pub fn perform_event(
        &self,
        instance: &mut Instance,
        event: EventType,
        num: i32,
    ) -> Result<(), RuntimeError> {
        trace!("event {event}/{num} on instance {}", instance.id());
        for lib in &self.libraries {
            lib.perform_event(instance, event, num)
                .map_err(|source| RuntimeError::Native {
                    name: format!("{}::{event}", lib.name()),
                    source,
                })?;
        }
        Ok(())
    }

    /// Registered functions, sorted by name.
    pub fn functions(&self) -> Vec<&NativeFunc> {
        let mut fs: Vec<&NativeFunc> = self.functions.values().collect();
        fs.sort_by(|a, b| a.name.cmp(&b.name));
        fs
    }

    /// Registered constants, sorted by name.
    pub fn constants(&self) -> Vec<(&str, &Value)> {
        let mut cs: Vec<(&str, &Value)> = self
            .constants
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        cs.sort_by(|a, b| a.0.cmp(b.0));
        cs
    }

    pub fn instance_variables(&self) -> &[String] {
        &self.instance_vars
    }
}
