use anyhow::Context;
use clap::{Parser, Subcommand};
use gml_core::Value;
use gmr::{stdlib::StdLib, ArgPolicy, Runtime, RuntimeConfig};

#[derive(Parser)]
#[command(name = "gmr", version, about = "Call built-in functions of the runtime")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Reject calls whose arguments don't match the declared signature
    #[arg(long)]
    strict: bool,

    /// Maximum number of instances the runtime hands out
    #[arg(long, default_value_t = RuntimeConfig::default().max_instances)]
    max_instances: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a function. Arguments that parse as numbers are passed as reals
    Call {
        name: String,
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List registered functions
    Functions,
    /// List registered constants
    Constants,
}

fn parse_arg(s: &str) -> Value {
    match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::real(n),
        _ => Value::string(s),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = RuntimeConfig {
        arg_policy: if cli.strict {
            ArgPolicy::Strict
        } else {
            ArgPolicy::Lenient
        },
        max_instances: cli.max_instances,
    };

    let mut rt = Runtime::new(config);
    rt.load_library(StdLib)?;

    match cli.command {
        Commands::Call { name, args } => {
            let args: Vec<Value> = args.iter().map(|a| parse_arg(a)).collect();
            let v = rt
                .call(&name, &args)
                .with_context(|| format!("calling {name}"))?;
            println!("{v}");
        }
        Commands::Functions => {
            for f in rt.functions() {
                println!("{}/{}", f.name, f.arity);
            }
        }
        Commands::Constants => {
            for (name, v) in rt.constants() {
                println!("{name} = {v}");
            }
        }
    }

    Ok(())
}
