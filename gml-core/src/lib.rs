pub mod num;
pub mod val;

pub use val::{GmString, Value, ValueKind, EMPTY_STRING, MAX_REPEAT_LEN, ONE, UNDEFINED, ZERO};
