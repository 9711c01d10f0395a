use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

use crate::process::{schema::FIO_OWNER, NormalizeOptions, SplitMode};

/// Prefix of the environment variables read into [`Config`] (`ATON_INPUT`, `ATON_LOG`, ...).
pub const ENV_PREFIX: &str = "ATON";

#[derive(Parser, Debug, Default)]
#[command(name = "aton")]
#[command(about = "Normalize corporate ownership disclosures and report anomalies")]
#[command(version)]
pub struct Cli {
    /// CSV file with the composite disclosure column
    #[arg(value_name = "INPUT_CSV", conflicts_with = "input")]
    pub input_file: Option<PathBuf>,

    /// Same as INPUT_CSV (env: ATON_INPUT)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Name of the composite column [default: FIO_owner]
    #[arg(short, long, value_name = "NAME")]
    pub column: Option<String>,

    /// positional | anchored [default: positional]
    #[arg(long, value_name = "MODE")]
    pub split: Option<SplitMode>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Include per-company ownership timelines
    #[arg(long)]
    pub timeline: bool,

    /// Tracing filter, overridden by RUST_LOG (env: ATON_LOG) [default: info]
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,

    /// YAML file with any of the settings above
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything the pipeline needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "input")]
    pub input_path: PathBuf,
    #[serde(rename = "column")]
    pub composite_column: String,
    #[serde(rename = "log")]
    pub log_filter: String,
    #[serde(rename = "split")]
    pub split_mode: SplitMode,
    pub output: OutputFormat,
    pub timeline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            composite_column: FIO_OWNER.to_string(),
            log_filter: "info".to_string(),
            split_mode: SplitMode::default(),
            output: OutputFormat::default(),
            timeline: false,
        }
    }
}

impl Config {
    /// Layer, lowest to highest precedence: defaults, the `--config` YAML file,
    /// `ATON_*` variables, command-line flags.
    ///
    /// `env` replaces the process environment when given.
    pub fn resolve(cli: Cli, env: Option<config::Map<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = &cli.config {
            builder = builder
                .add_source(config::File::from(path.as_path()).format(config::FileFormat::Yaml));
        }

        let input = cli
            .input
            .or(cli.input_file)
            .map(|p| p.to_string_lossy().into_owned());

        let config: Config = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(env))
            .set_override_option("input", input)?
            .set_override_option("column", cli.column)?
            .set_override_option("split", cli.split.map(SplitMode::as_str))?
            .set_override_option("log", cli.log)?
            .set_override_option("output", cli.json.then_some("json"))?
            .set_override_option("timeline", cli.timeline.then_some(true))?
            .build()
            .context("loading configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        if config.input_path.as_os_str().is_empty() {
            bail!("no input file given (pass INPUT_CSV, --input or set {ENV_PREFIX}_INPUT)");
        }
        Ok(config)
    }

    /// Parse `args` (program name excluded) and resolve against `env`.
    pub fn from_sources<I, T>(args: I, env: Option<config::Map<String, String>>) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let argv = std::iter::once(std::ffi::OsString::from("aton"))
            .chain(args.into_iter().map(Into::into));
        let cli = Cli::try_parse_from(argv)?;
        Config::resolve(cli, env)
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            composite_column: self.composite_column.clone(),
            split_mode: self.split_mode,
        }
    }
}
