use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use pacstat_core::errors::{ErrorInfo, PacError};
use serde::{Deserialize, Serialize};

use crate::columns;

/// Column naming and weighted-source handling for the merge step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub epsilon_column: String,
    pub expanded_column: String,
    pub weight_column: String,
    pub alg_column: String,
    /// Source that reports a multiplicative weight instead of an epsilon.
    pub weighted_source: String,
    /// Decimal places kept when deriving epsilon from a weight.
    pub epsilon_decimals: u32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            epsilon_column: columns::EPSILON.to_string(),
            expanded_column: columns::EXPANDED.to_string(),
            weight_column: columns::WEIGHT.to_string(),
            alg_column: columns::ALG_NAME.to_string(),
            weighted_source: columns::DPS.to_string(),
            epsilon_decimals: 2,
        }
    }
}

/// Selects the record whose `Expanded` value serves as a gain reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSpec {
    /// Suffix used in the derived column names (`Gain<name>`, `HasGain<name>`).
    pub name: String,
    /// Required value of the algorithm tag column.
    pub algorithm: String,
    /// Required value of the condition column, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl ReferenceSpec {
    pub fn new(name: impl Into<String>, algorithm: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            algorithm: algorithm.into(),
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// What to do when two records match the same reference under one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Abort gain computation with a schema error.
    ///
    /// Conditions files from a delta sweep hold one row per delta for every
    /// key, so they need one of the keep policies.
    #[default]
    Reject,
    /// Keep the first matching record in table order.
    KeepFirst,
    /// Keep the last matching record in table order.
    KeepLast,
}

/// Join key, reference selectors and output naming for gain computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainConfig {
    pub epsilon_column: String,
    pub instance_column: String,
    pub alg_column: String,
    pub condition_column: String,
    pub expanded_column: String,
    pub references: Vec<ReferenceSpec>,
    pub gain_prefix: String,
    pub has_gain_prefix: String,
    pub duplicates: DuplicatePolicy,
}

impl Default for GainConfig {
    fn default() -> Self {
        Self {
            epsilon_column: columns::EPSILON.to_string(),
            instance_column: columns::INSTANCE_ID.to_string(),
            alg_column: columns::ALG_NAME.to_string(),
            condition_column: columns::PAC_CONDITION.to_string(),
            expanded_column: columns::EXPANDED.to_string(),
            references: vec![
                ReferenceSpec::new("FMin", columns::BASIC).with_condition(columns::FMIN_CONDITION),
                ReferenceSpec::new("Oracle", columns::BASIC)
                    .with_condition(columns::ORACLE_CONDITION),
                ReferenceSpec::new("DPS", columns::DPS),
            ],
            gain_prefix: "Gain".to_string(),
            has_gain_prefix: "HasGain".to_string(),
            duplicates: DuplicatePolicy::Reject,
        }
    }
}

impl GainConfig {
    /// Ratio column for `reference`, e.g. `GainFMin`.
    pub fn gain_column(&self, reference: &ReferenceSpec) -> String {
        format!("{}{}", self.gain_prefix, reference.name)
    }

    /// Flag column for `reference`, e.g. `HasGainFMin`.
    pub fn has_gain_column(&self, reference: &ReferenceSpec) -> String {
        format!("{}{}", self.has_gain_prefix, reference.name)
    }

    /// Derived columns in output order: every ratio column, then every flag column.
    pub fn derived_columns(&self) -> Vec<String> {
        let gains = self.references.iter().map(|r| self.gain_column(r));
        let flags = self.references.iter().map(|r| self.has_gain_column(r));
        gains.chain(flags).collect()
    }
}

/// Columns read and written by the delta-zero baseline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    pub instance_column: String,
    pub epsilon_column: String,
    pub condition_column: String,
    pub delta_column: String,
    pub expanded_column: String,
    pub output_column: String,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            instance_column: columns::INSTANCE_ID.to_string(),
            epsilon_column: columns::EPSILON.to_string(),
            condition_column: columns::PAC_CONDITION.to_string(),
            delta_column: columns::DELTA.to_string(),
            expanded_column: columns::EXPANDED.to_string(),
            output_column: columns::EXPANDED_FMIN.to_string(),
        }
    }
}

/// One algorithm source: its table name and a path template under the results root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    /// Relative path; `{domain}` is replaced by the domain name.
    pub path: String,
}

impl SourceSpec {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Optional pre-merge step that annotates the raw Basic conditions summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineJob {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub columns: BaselineConfig,
}

/// Full per-domain batch configuration, usually read from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub results_root: PathBuf,
    pub domains: Vec<String>,
    pub sources: Vec<SourceSpec>,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineJob>,
    pub merge: MergeConfig,
    pub gains: GainConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            results_root: PathBuf::from("results"),
            domains: ["GridPathFinding", "pancakes", "dockyard", "vacuumrobot"]
                .into_iter()
                .map(String::from)
                .collect(),
            sources: vec![
                SourceSpec::new(columns::BASIC, "basic/conditions-{domain}-gains.csv"),
                SourceSpec::new(columns::OPEN, "openBased/open-{domain}.csv"),
                SourceSpec::new(columns::DPS, "dps/DPS{domain}.csv"),
                SourceSpec::new(columns::BOUNDED_COST, "boundedCost/bc-{domain}.csv"),
            ],
            output: "merged-{domain}.csv".to_string(),
            baseline: None,
            merge: MergeConfig::default(),
            gains: GainConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, PacError> {
        let config: Self = serde_yaml::from_str(text).map_err(|err| {
            PacError::Config(
                ErrorInfo::new("config-parse", "failed to parse pipeline configuration")
                    .with_hint(err.to_string()),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a YAML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PacError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            PacError::Config(
                ErrorInfo::new("config-read", "failed to read pipeline configuration")
                    .with_path(path)
                    .with_hint(err.to_string()),
            )
        })?;
        Self::from_yaml_str(&text).map_err(|err| match err {
            PacError::Config(info) => PacError::Config(info.with_path(path)),
            other => other,
        })
    }

    pub fn validate(&self) -> Result<(), PacError> {
        if self.sources.is_empty() {
            return Err(PacError::Config(ErrorInfo::new(
                "config-no-sources",
                "pipeline configuration lists no sources",
            )));
        }
        let mut names = BTreeSet::new();
        for source in &self.sources {
            if !names.insert(source.name.as_str()) {
                return Err(PacError::Config(
                    ErrorInfo::new("config-duplicate-source", "source listed twice")
                        .with_context("source", source.name.clone()),
                ));
            }
        }
        let mut references = BTreeSet::new();
        for reference in &self.gains.references {
            if !references.insert(reference.name.as_str()) {
                return Err(PacError::Config(
                    ErrorInfo::new("config-duplicate-reference", "reference listed twice")
                        .with_context("reference", reference.name.clone()),
                ));
            }
        }
        Ok(())
    }

    /// Resolves a `{domain}` path template under the results root.
    pub fn resolve(&self, template: &str, domain: &str) -> PathBuf {
        self.results_root.join(template.replace("{domain}", domain))
    }

    /// Merged output file for `domain`.
    pub fn output_path(&self, domain: &str) -> PathBuf {
        self.resolve(&self.output, domain)
    }
}
