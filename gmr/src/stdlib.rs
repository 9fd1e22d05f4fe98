//! Built-in library: math and string functions, the usual constants, a few
//! globals and the basic movement variables every instance carries.

use gml_core::{
    num::{parse_real, round_even},
    Value,
};
use phf::phf_map;

use crate::{
    instance::{EventType, Instance},
    library::{FunctionDesc, FunctionLibrary, LibraryInitializer, ParamKind},
};

pub const STD_LIBRARY: &str = "std";

pub static CONSTANTS: phf::Map<&'static str, f64> = phf_map! {
    "pi" => std::f64::consts::PI,
    "true" => 1.0,
    "false" => 0.0,
    "c_black" => 0.0,
    "c_white" => 16777215.0,
    "c_red" => 255.0,
    "c_green" => 32768.0,
    "c_blue" => 16711680.0,
};

const GLOBALS: &[&str] = &["score", "lives", "health", "room_speed"];

const INSTANCE_VARS: &[&str] = &["x", "y", "xstart", "ystart", "hspeed", "vspeed", "visible"];

#[derive(Debug, Default, Clone, Copy)]
pub struct StdLib;

impl StdLib {
    fn real_functions() -> FunctionLibrary {
        FunctionLibrary::new("real")
            .with(FunctionDesc::unary("abs", f64::abs))
            .with(FunctionDesc::unary("sqrt", f64::sqrt))
            .with(FunctionDesc::unary("round", round_even))
            .with(FunctionDesc::unary("floor", f64::floor))
            .with(FunctionDesc::unary("ceil", f64::ceil))
            .with(FunctionDesc::unary("sign", |x: f64| {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }))
            .with(FunctionDesc::variadic("min", 1, ParamKind::Real, |args| {
                Ok(Value::real(
                    args.iter().map(Value::as_real).fold(f64::INFINITY, f64::min),
                ))
            }))
            .with(FunctionDesc::variadic("max", 1, ParamKind::Real, |args| {
                Ok(Value::real(
                    args.iter()
                        .map(Value::as_real)
                        .fold(f64::NEG_INFINITY, f64::max),
                ))
            }))
    }

    fn string_functions() -> FunctionLibrary {
        FunctionLibrary::new("string")
            .with(FunctionDesc::unary("string", |v: Value| v.to_display_string()))
            .with(FunctionDesc::unary("real", |v: Value| match v {
                Value::Str(s) => parse_real(&s),
                other => other.as_real(),
            }))
            .with(FunctionDesc::unary("string_length", |s: String| {
                s.chars().count() as f64
            }))
            .with(FunctionDesc::binary("string_repeat", |s: String, n: f64| {
                Value::repeat(n, &s)
            }))
            .with(FunctionDesc::unary("string_upper", |s: String| s.to_uppercase()))
            .with(FunctionDesc::unary("string_lower", |s: String| s.to_lowercase()))
    }

    fn type_functions() -> FunctionLibrary {
        FunctionLibrary::new("type")
            .with(FunctionDesc::unary("is_real", |v: Value| v.is_real()))
            .with(FunctionDesc::unary("is_string", |v: Value| v.is_string()))
    }
}

impl LibraryInitializer for StdLib {
    fn name(&self) -> &str {
        STD_LIBRARY
    }

    fn global_variables(&self) -> Vec<&str> {
        GLOBALS.to_vec()
    }

    fn constants(&self) -> Vec<(&str, Value)> {
        CONSTANTS
            .entries()
            .map(|(name, n)| (*name, Value::real(*n)))
            .collect()
    }

    fn instance_variables(&self) -> Vec<&str> {
        INSTANCE_VARS.to_vec()
    }

    fn function_libraries(&self) -> Vec<FunctionLibrary> {
        vec![
            Self::real_functions(),
            Self::string_functions(),
            Self::type_functions(),
        ]
    }

    fn perform_event(
        &self,
        instance: &mut Instance,
        event: EventType,
        _num: i32,
    ) -> anyhow::Result<()> {
        match event {
            EventType::Create => {
                let x = instance.get_or_undefined("x");
                let y = instance.get_or_undefined("y");
                instance.set("xstart", x);
                instance.set("ystart", y);
            }
            EventType::Step => {
                let hspeed = instance.get_or_undefined("hspeed");
                let vspeed = instance.get_or_undefined("vspeed");
                let x = instance.get_or_undefined("x").add_real(&hspeed);
                let y = instance.get_or_undefined("y").add_real(&vspeed);
                instance.set("x", x);
                instance.set("y", y);
            }
            _ => {}
        }
        Ok(())
    }
}
