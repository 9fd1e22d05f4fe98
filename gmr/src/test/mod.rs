#[cfg(test)]
mod tests {
    use gml_core::{Value, EMPTY_STRING, UNDEFINED};

    use crate::{
        config::{ArgPolicy, RuntimeConfig},
        err::RuntimeError,
        instance::{EventType, Instance, InstanceFactory},
        library::{FunctionDesc, FunctionLibrary, LibraryContext, LibraryInitializer, ParamKind},
        native::NativeFunc,
        runtime::Runtime,
        stdlib::{StdLib, STD_LIBRARY},
    };

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn std_runtime(config: RuntimeConfig) -> anyhow::Result<Runtime> {
        init();
        let mut rt = Runtime::new(config);
        rt.load_library(StdLib)?;
        Ok(rt)
    }

    /// Library that tallies collisions and builds instances of its own.
    struct Counter;

    struct SpawnAt {
        context: LibraryContext,
    }

    impl InstanceFactory for SpawnAt {
        fn create(&self, object_index: i32) -> Result<Instance, RuntimeError> {
            let mut inst = Instance::new(self.context.allocate_id()?, object_index);
            inst.set("spawned_by", self.context.library());
            Ok(inst)
        }
    }

    impl LibraryInitializer for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn global_variables(&self) -> Vec<&str> {
            vec!["score", "ticks"]
        }

        fn constants(&self) -> Vec<(&str, Value)> {
            vec![("c_max", Value::real(99.0)), ("greeting", Value::string("hi"))]
        }

        fn instance_variables(&self) -> Vec<&str> {
            vec!["x", "hits"]
        }

        fn function_libraries(&self) -> Vec<FunctionLibrary> {
            vec![FunctionLibrary::new("counter").with(FunctionDesc::new(
                "join",
                &[ParamKind::Str, ParamKind::Str],
                |args| Ok(&args[0] + &args[1]),
            ))]
        }

        fn transform_function(
            &self,
            desc: &FunctionDesc,
            name: &str,
            _policy: ArgPolicy,
        ) -> NativeFunc {
            // always strict, whatever the host asks for
            crate::native::marshal(desc, name, ArgPolicy::Strict)
        }

        fn create_instance_factory(&self, context: &LibraryContext) -> Box<dyn InstanceFactory> {
            Box::new(SpawnAt {
                context: context.clone(),
            })
        }

        fn perform_event(
            &self,
            instance: &mut Instance,
            event: EventType,
            num: i32,
        ) -> anyhow::Result<()> {
            if event == EventType::Collision {
                let hits = instance.get_or_undefined("hits").add_real(&Value::from(num));
                instance.set("hits", hits);
            }
            if event == EventType::Other && num == 99 {
                anyhow::bail!("user event 99 is reserved");
            }
            Ok(())
        }
    }

    #[test]
    fn globals_start_undefined() -> anyhow::Result<()> {
        let mut rt = std_runtime(RuntimeConfig::default())?;
        assert_eq!(rt.global("score")?, &*UNDEFINED);

        rt.set_global("score", 10)?;
        assert_eq!(rt.global("score")?, &Value::real(10.0));

        // assigning an unknown global creates it
        rt.set_global("name", "player")?;
        assert_eq!(rt.global("name")?, &Value::string("player"));

        assert!(matches!(
            rt.global("nope"),
            Err(RuntimeError::UnknownIdentifier { .. })
        ));
        Ok(())
    }

    #[test]
    fn constants_are_immutable() -> anyhow::Result<()> {
        let mut rt = std_runtime(RuntimeConfig::default())?;
        assert_eq!(rt.global("c_red")?, &Value::real(255.0));
        assert!(rt.is_constant("pi"));
        assert!(matches!(
            rt.set_global("pi", 3),
            Err(RuntimeError::ConstantAssignment { .. })
        ));
        assert_eq!(rt.global("pi")?, &Value::real(std::f64::consts::PI));
        Ok(())
    }

    #[test]
    fn calls_go_through_the_adapter() -> anyhow::Result<()> {
        let rt = std_runtime(RuntimeConfig::default())?;
        assert_eq!(rt.call("abs", &[Value::real(-3.0)])?, Value::real(3.0));
        assert_eq!(
            rt.call("string_repeat", &[Value::string("ab"), Value::real(3.0)])?,
            Value::string("ababab")
        );
        // lenient: string where a real is expected reads as 0
        assert_eq!(rt.call("sqrt", &[Value::string("16")])?, Value::real(0.0));
        // lenient: missing argument reads as the empty string
        assert_eq!(rt.call("string_length", &[])?, Value::real(0.0));
        assert_eq!(rt.call("string", &[])?, Value::string("0"));
        assert_eq!(rt.call("is_string", &[Value::string("")])?, Value::real(1.0));
        assert_eq!(
            rt.call("string_repeat", &[Value::string("ab"), Value::real(1e300)])?,
            *EMPTY_STRING
        );

        assert!(matches!(
            rt.call("no_such_fn", &[]),
            Err(RuntimeError::UnknownFunction { .. })
        ));
        Ok(())
    }

    #[test]
    fn strict_policy() -> anyhow::Result<()> {
        let rt = std_runtime(RuntimeConfig::strict())?;
        assert!(matches!(
            rt.call("sqrt", &[Value::string("16")]),
            Err(RuntimeError::InvalidType { index: 0, .. })
        ));
        assert!(matches!(
            rt.call("abs", &[]),
            Err(RuntimeError::ArgumentCount { got: 0, .. })
        ));
        assert_eq!(rt.call("sqrt", &[Value::real(16.0)])?, Value::real(4.0));
        Ok(())
    }

    #[test]
    fn library_overrides_transform() -> anyhow::Result<()> {
        let mut rt = std_runtime(RuntimeConfig::default())?;
        rt.load_library(Counter)?;

        assert_eq!(
            rt.call("join", &[Value::string("a"), Value::string("b")])?,
            Value::string("ab")
        );
        // host is lenient but this library insists on strict adapters
        assert!(matches!(
            rt.call("join", &[Value::string("a")]),
            Err(RuntimeError::ArgumentCount { .. })
        ));
        assert_eq!(rt.global("greeting")?, &Value::string("hi"));
        // redeclared global keeps its slot
        assert_eq!(rt.global("ticks")?, &*UNDEFINED);
        Ok(())
    }

    #[test]
    fn clashes_leave_runtime_untouched() -> anyhow::Result<()> {
        struct Clash;

        impl LibraryInitializer for Clash {
            fn name(&self) -> &str {
                "clash"
            }

            fn global_variables(&self) -> Vec<&str> {
                vec!["fresh"]
            }

            fn function_libraries(&self) -> Vec<FunctionLibrary> {
                vec![FunctionLibrary::new("clash").with(FunctionDesc::unary("abs", |x: f64| x))]
            }
        }

        let mut rt = std_runtime(RuntimeConfig::default())?;
        assert!(matches!(
            rt.load_library(Clash),
            Err(RuntimeError::Duplicate { what: "function", .. })
        ));
        assert!(rt.global("fresh").is_err());
        assert!(matches!(
            rt.load_library(StdLib),
            Err(RuntimeError::Duplicate { what: "library", .. })
        ));
        Ok(())
    }

    #[test]
    fn instances_and_events() -> anyhow::Result<()> {
        let mut rt = std_runtime(RuntimeConfig::default())?;
        rt.load_library(Counter)?;

        let mut inst = rt.create_instance(STD_LIBRARY, 3)?;
        assert_eq!(inst.object_index(), 3);
        assert_eq!(inst.get("visible")?, &*UNDEFINED);
        assert_eq!(inst.get("hits")?, &*UNDEFINED);

        inst.set("x", 4.0);
        inst.set("hspeed", 1.0);
        rt.perform_event(&mut inst, EventType::Create, 0)?;
        rt.perform_event(&mut inst, EventType::Step, 0)?;
        rt.perform_event(&mut inst, EventType::Collision, 2)?;
        assert_eq!(inst.get("x")?, &Value::real(5.0));
        assert_eq!(inst.get("xstart")?, &Value::real(4.0));
        assert_eq!(inst.get("hits")?, &Value::real(2.0));

        let err = rt.perform_event(&mut inst, EventType::Other, 99);
        assert!(matches!(err, Err(RuntimeError::Native { .. })));

        let other = rt.create_instance("counter", 1)?;
        assert_eq!(other.get("spawned_by")?, &Value::string("counter"));
        assert_eq!(other.get("x")?, &*UNDEFINED);
        assert_ne!(other.id(), inst.id());

        assert!(matches!(
            rt.create_instance("missing", 0),
            Err(RuntimeError::UnknownLibrary { .. })
        ));
        Ok(())
    }

    #[test]
    fn instance_limit() -> anyhow::Result<()> {
        let rt = std_runtime(RuntimeConfig {
            max_instances: 1,
            ..RuntimeConfig::default()
        })?;
        rt.create_instance(STD_LIBRARY, 0)?;
        assert!(matches!(
            rt.create_instance(STD_LIBRARY, 0),
            Err(RuntimeError::InstanceLimit { max: 1 })
        ));
        Ok(())
    }

    #[test]
    fn listings_are_sorted() -> anyhow::Result<()> {
        let rt = std_runtime(RuntimeConfig::default())?;
        let fs = rt.functions();
        let names: Vec<&str> = fs.iter().map(|f| &*f.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"string_upper"));

        let constants = rt.constants();
        assert_eq!(constants.first().map(|c| c.0), Some("c_black"));
        assert!(rt.instance_variables().iter().any(|v| v == "ystart"));
        assert_eq!(rt.call("string_lower", &[Value::string("AbC")])?, Value::string("abc"));
        assert_ne!(rt.call("string_upper", &[])?, Value::Undefined);
        assert_eq!(rt.call("string_upper", &[])?, *EMPTY_STRING);
        Ok(())
    }
}
