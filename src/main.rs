//! `png-scrub`: rewrite every PNG in a directory with configured strings
//! removed from its text chunks.
//!
//! Run: `png-scrub --config config.toml` or
//! `png-scrub --input-dir in --output-dir out --remove "Secret ,ACME"`

use clap::{Parser, ValueEnum};
use png_scrub::{batch, config, ConfigBuilder, ItxtMode};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "png-scrub", version, about)]
struct Cli {
    /// TOML config file (defaults to config.toml next to the executable)
    #[arg(short, long, env = "PNG_SCRUB_CONFIG")]
    config: Option<PathBuf>,

    /// Directory scanned recursively for .png files
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory the rewritten files are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Strings to remove; repeat the flag or separate with commas
    #[arg(short, long = "remove", value_name = "STRING")]
    remove: Vec<String>,

    /// Fail on a truncated chunk stream instead of dropping the partial chunk
    #[arg(long)]
    strict: bool,

    /// Drop a truncated trailing chunk, overriding `strict = true` in the config file
    #[arg(long, conflicts_with = "strict")]
    lenient: bool,

    /// How iTXt values are located
    #[arg(long, value_enum)]
    itxt_mode: Option<ItxtModeArg>,

    /// Exit with status 2 if any file failed
    #[arg(long)]
    fail_on_error: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ItxtModeArg {
    Simple,
    Structured,
}

impl From<ItxtModeArg> for ItxtMode {
    fn from(arg: ItxtModeArg) -> Self {
        match arg {
            ItxtModeArg::Simple => ItxtMode::Simple,
            ItxtModeArg::Structured => ItxtMode::Structured,
        }
    }
}

impl Cli {
    fn overrides(&self) -> ConfigBuilder {
        ConfigBuilder {
            remove_string: (!self.remove.is_empty()).then(|| self.remove.join(",")),
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            strict: if self.strict {
                Some(true)
            } else if self.lenient {
                Some(false)
            } else {
                None
            },
            itxt_mode: self.itxt_mode.map(Into::into),
        }
    }

    /// File values (when there is a file) overlaid with command line values
    fn load_config(&self) -> png_scrub::Result<png_scrub::Config> {
        let base = match &self.config {
            Some(path) => ConfigBuilder::from_file(path)?,
            None => {
                let path = config::default_config_path()?;
                if path.is_file() {
                    ConfigBuilder::from_file(&path)?
                } else {
                    ConfigBuilder::new()
                }
            }
        };
        base.merge(self.overrides()).build()
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match batch::run(&config) {
        Ok(report) if cli.fail_on_error && !report.is_success() => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "batch aborted");
            ExitCode::FAILURE
        }
    }
}
