pub mod config;
pub mod err;
pub mod instance;
pub mod library;
pub mod native;
pub mod runtime;
pub mod stdlib;
mod test;

pub use config::{ArgPolicy, RuntimeConfig};
pub use err::RuntimeError;
pub use library::LibraryInitializer;
pub use runtime::Runtime;
