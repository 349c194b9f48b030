//! # modcli
//!
//! Resolve a module's documented exports and bind command-line tokens to one
//! of them. The result is printed as JSON for an external invoker.
//!
//! ## Usage
//!
//! ```bash
//! modcli --describe cli.js           # descriptor JSON
//! modcli cli.js greet world --loud   # {"command", "file", "args"} JSON
//! modcli ./packages/tool deploy      # package directory, entry from package.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use modcli::{ExportGraphResolver, ModcliConfig, bind, manifest};

#[derive(Parser, Debug)]
#[command(name = "modcli")]
#[command(about = "Run documented module exports as commands")]
#[command(version)]
struct Args {
    /// Print the resolved command descriptor instead of binding arguments
    #[arg(long)]
    describe: bool,

    /// Config file (default: .modcli/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Entry module, or a package directory
    entry: PathBuf,

    /// Command and its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Serialize)]
struct Invocation<'a> {
    command: &'a str,
    file: &'a Path,
    args: &'a [Option<Value>],
}

fn init_logging(args: &Args) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();
}

fn load_config(args: &Args) -> ModcliConfig {
    match &args.config {
        Some(path) => ModcliConfig::load_from_path(path),
        None => ModcliConfig::load(Path::new(".")),
    }
}

fn entry_file(entry: &Path, config: &ModcliConfig) -> Result<PathBuf> {
    if !entry.is_dir() {
        return Ok(entry.to_path_buf());
    }
    let found = manifest::locate_entry(entry, &config.resolve)
        .with_context(|| format!("no entry module found in {}", entry.display()))?;
    debug!("package {} resolves to {}", entry.display(), found.display());
    Ok(found)
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args);
    let entry = entry_file(&args.entry, &config)?;

    let resolver = ExportGraphResolver::new(&config);
    let descriptor = resolver
        .resolve(&entry)
        .await
        .with_context(|| format!("failed to resolve {}", entry.display()))?;

    let output = if args.describe {
        serde_json::to_string_pretty(&descriptor)?
    } else {
        let invocation = bind(&descriptor, &args.args)
            .with_context(|| format!("invalid arguments for {}", descriptor.name))?;
        let file = descriptor
            .get(&invocation.command)
            .map(|binding| binding.defining_file.as_path())
            .unwrap_or(descriptor.entry_file.as_path());
        serde_json::to_string_pretty(&Invocation {
            command: &invocation.command,
            file,
            args: &invocation.values,
        })?
    };
    println!("{output}");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[modcli][error] {:#}", e);
            ExitCode::FAILURE
        }
    }
}
