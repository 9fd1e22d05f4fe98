//! Runtime configuration.
//!
//! Holds the knobs the host applies when it registers and calls library functions.

/// What a function adapter does when a call doesn't match the declared signature.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ArgPolicy {
    /// Pad missing arguments with undefined, drop surplus ones and coerce
    /// mismatched kinds through the total accessors.
    #[default]
    Lenient,
    /// Reject wrong argument counts and mismatched kinds.
    Strict,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Argument mismatch policy used for every function adapter
    pub arg_policy: ArgPolicy,

    /// Maximum number of instances the factories may hand out
    pub max_instances: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            arg_policy: ArgPolicy::Lenient,
            max_instances: 1_000_000,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            arg_policy: ArgPolicy::Strict,
            ..Self::default()
        }
    }
}
