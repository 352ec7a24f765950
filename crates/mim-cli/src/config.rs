use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use mimpp::engine::config::{MbeConfig, MbeConfigBuilder, MimConfig, MimConfigBuilder};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const DEFAULT_ORDER: usize = 0;
const DEFAULT_MBE_FRAGMENTIZER: &str = "atomic";

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialMbeConfig {
    truncation: Option<usize>,
}

/// The run configuration as read from a TOML file; every field is optional until merged.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialRunConfig {
    fragmentizer: Option<String>,
    methods: Option<Vec<String>>,
    basis_sets: Option<Vec<String>>,
    weights: Option<Vec<f64>>,
    order: Option<usize>,
    workers: Option<usize>,
    mbe: Option<PartialMbeConfig>,
}

/// What to compute after all configuration sources have been merged.
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    Mim(MimConfig),
    Mbe(MbeConfig),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub order: usize,
    pub mode: RunMode,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolves the final configuration. Precedence: `--set` values, then command line
    /// flags, then the file, then defaults.
    pub fn merge_with_cli(mut self, args: &RunArgs, threads: Option<usize>) -> Result<RunConfig> {
        if let Some(fragmentizer) = &args.fragmentizer {
            self.fragmentizer = Some(fragmentizer.clone());
        }
        if let Some(order) = args.order {
            self.order = Some(order);
        }
        if let Some(truncation) = args.truncation {
            self.mbe.get_or_insert_with(Default::default).truncation = Some(truncation);
        }
        if let Some(threads) = threads {
            self.workers = Some(threads);
        }
        self.apply_set_values(&args.set_values)?;

        let order = self.order.unwrap_or(DEFAULT_ORDER);
        let methods = self
            .methods
            .ok_or_else(|| CliError::Config("`methods` is required.".to_string()))?;

        let truncation = self.mbe.and_then(|mbe| mbe.truncation);
        let mode = match truncation {
            Some(truncation) => {
                if self.weights.is_some() {
                    return Err(CliError::Config(
                        "`weights` cannot be combined with an [mbe] expansion, which generates its own."
                            .to_string(),
                    ));
                }
                let mut builder = MbeConfigBuilder::new()
                    .methods(methods)
                    .base_fragmentizer(
                        self.fragmentizer
                            .unwrap_or_else(|| DEFAULT_MBE_FRAGMENTIZER.to_string()),
                    )
                    .truncation(truncation);
                if let Some(basis_sets) = self.basis_sets {
                    builder = builder.basis_sets(basis_sets);
                }
                if let Some(workers) = self.workers {
                    builder = builder.max_workers(workers);
                }
                RunMode::Mbe(builder.build().map_err(|e| CliError::Config(e.to_string()))?)
            }
            None => {
                let weights = self.weights.ok_or_else(|| {
                    CliError::Config(
                        "`weights` is required unless an [mbe] truncation is given.".to_string(),
                    )
                })?;
                let mut builder = MimConfigBuilder::new().methods(methods).weights(weights);
                if let Some(basis_sets) = self.basis_sets {
                    builder = builder.basis_sets(basis_sets);
                }
                if let Some(fragmentizer) = self.fragmentizer {
                    builder = builder.fragmentizer(fragmentizer);
                }
                if let Some(workers) = self.workers {
                    builder = builder.max_workers(workers);
                }
                RunMode::Mim(builder.build().map_err(|e| CliError::Config(e.to_string()))?)
            }
        };

        Ok(RunConfig { order, mode })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;
            let (key, value) = (key.trim(), value.trim());

            match key {
                "fragmentizer" => self.fragmentizer = Some(value.to_string()),
                "methods" => self.methods = Some(split_list(value)),
                "basis-sets" => self.basis_sets = Some(split_list(value)),
                "weights" => {
                    self.weights = Some(
                        split_list(value)
                            .iter()
                            .map(|w| parse_value::<f64>(key, w))
                            .collect::<Result<_>>()?,
                    )
                }
                "order" => self.order = Some(parse_value(key, value)?),
                "workers" => self.workers = Some(parse_value(key, value)?),
                "mbe.truncation" => {
                    self.mbe.get_or_insert_with(Default::default).truncation =
                        Some(parse_value(key, value)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unknown configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}
