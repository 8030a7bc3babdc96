use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use thiserror::Error;

use wit_canon::ast::{Canon, CanonOpt, CanonSection, DefType};
use wit_canon::canon::{convert_func_type, instantiate_canonical_section};
use wit_canon::cli::{Config, ConfigError, LoggingError, init_logging};
use wit_canon::runtime::{ComponentInstance, CoreModule, FuncIdx};
use wit_canon::wit::{WitFunction, load_wit_function_from_path};
use wit_canon::{CanonError, wave};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Canon(#[from] CanonError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Logging(#[from] LoggingError),

    #[error("Core module has no export named `{0}`")]
    MissingExport(String),
}

#[derive(Parser)]
#[command(name = "wit-canon")]
#[command(about = "Lift core wasm functions to WIT signatures through the canonical ABI")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "WIT_CANON_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, overrides `logging.level` (e.g. "info", "wit_canon=trace")
    #[arg(long, global = true, env = "WIT_CANON_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the component signature of a WIT function and its core signature
    Signature {
        /// Path to the WIT file or package directory
        #[arg(short, long)]
        wit: PathBuf,

        /// Name of the function
        #[arg(short, long)]
        func: String,
    },

    /// Lift a core module export to a WIT function and call it with WAVE arguments
    ///
    /// Unsigned and bool WIT types are carried as the signed interface type
    /// of the same width, so their arguments and results are written as
    /// signed WAVE values: pass `-1`, not `4294967295`, for a `u32`, and `1`
    /// for `true`.
    Call {
        /// Path to the WIT file or package directory
        #[arg(short, long)]
        wit: PathBuf,

        /// Name of the WIT function
        #[arg(short, long)]
        func: String,

        /// Core module to instantiate (.wasm or .wat)
        #[arg(short, long)]
        module: PathBuf,

        /// Core export to lift (defaults to the function name)
        #[arg(short, long)]
        export: Option<String>,

        /// Memory export used for strings, overrides `runtime.memory_export`
        #[arg(long)]
        memory_export: Option<String>,

        /// Realloc export used for strings, overrides `runtime.realloc_export`
        #[arg(long)]
        realloc_export: Option<String>,

        /// WAVE-encoded arguments, one per parameter
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Signature { wit, func } => {
            let wit = load_wit_function_from_path(&wit, &func)?;
            let ty = convert_func_type(&wit.types, &wit.func)?;
            println!("component: {ty}");
            println!("core:      {}", ty.to_core()?);
        }

        Commands::Call {
            wit,
            func,
            module,
            export,
            memory_export,
            realloc_export,
            args,
        } => {
            let wit = load_wit_function_from_path(&wit, &func)?;
            let export = export.unwrap_or(func);
            let memory_export = memory_export.unwrap_or(config.runtime.memory_export);
            let realloc_export = realloc_export.unwrap_or(config.runtime.realloc_export);

            let results = call(&wit, &module, &export, &memory_export, &realloc_export, &args)?;
            for value in &results {
                println!("{}", wave::to_wave(value)?);
            }
        }
    }

    Ok(())
}

fn call(
    wit: &WitFunction,
    module: &Path,
    export: &str,
    memory_export: &str,
    realloc_export: &str,
    args: &[String],
) -> Result<Vec<wit_canon::abi::InterfaceValue>, AppError> {
    let core = CoreModule::from_file(module)?;
    let mut instance = ComponentInstance::new();
    let exports = core.export_into(&mut instance)?;

    for ty in &wit.types {
        instance.add_type(ty.clone());
    }
    let func_type = instance.add_type(DefType::Func(wit.func.clone()));

    let core_func = exports
        .func(export)
        .ok_or_else(|| AppError::MissingExport(export.to_string()))?;
    let mut options = Vec::new();
    if let Some(memory) = exports.memory(memory_export) {
        options.push(CanonOpt::Memory(memory.0));
    }
    if let Some(realloc) = exports.func(realloc_export) {
        options.push(CanonOpt::Realloc(realloc.0));
    }

    let lifted = FuncIdx(instance.function_count() as u32);
    let section = CanonSection::new(vec![Canon::Lift {
        core_func: core_func.0,
        options,
        func_type,
    }]);
    instantiate_canonical_section(&section, &mut instance)?;

    let params = instance.function(lifted)?.func_type().params().to_vec();
    let values = wave::parse_args(&params, args)?;
    Ok(instance.invoke(lifted, &values)?)
}
