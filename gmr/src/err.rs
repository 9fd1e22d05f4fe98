use crate::library::Arity;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Invalid type for argument {index} of {name}: expected: {expected}; got: {actual}")]
    InvalidType {
        name: String,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Wrong number of arguments to {name}: expected: {expected}; got: {got}")]
    ArgumentCount {
        name: String,
        expected: Arity,
        got: usize,
    },
    #[error("Unknown identifier: {name}")]
    UnknownIdentifier { name: String },
    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },
    #[error("Unknown library: {name}")]
    UnknownLibrary { name: String },
    #[error("Unknown variable {name} on instance {id}")]
    UnknownVariable { name: String, id: u32 },
    #[error("Unknown event type: {0}")]
    UnknownEvent(i64),
    #[error("Cannot assign to constant: {name}")]
    ConstantAssignment { name: String },
    #[error("{what} already registered: {name}")]
    Duplicate { what: &'static str, name: String },
    #[error("Instance limit reached: {max}")]
    InstanceLimit { max: u32 },
    #[error("Error inside {name}: {source}")]
    Native {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}
