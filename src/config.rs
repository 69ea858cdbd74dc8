//! Configuration of a generation run.
use crate::catalogue::Target;
use crate::error::GeneratorError;
use crate::layout::{IndexOrder, MultipleSimulations};
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Equation models that can be selected from a configuration file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    #[default]
    Elastic,
    Acoustic,
}

fn default_targets() -> BTreeSet<Target> {
    BTreeSet::from([Target::Cpu])
}

/// Everything that determines the set of generated kernels, apart from the matrix values.
///
/// ```
/// use adergen::catalogue::Target;
/// use adergen::config::GeneratorConfig;
///
/// let config = GeneratorConfig::new(4)
///     .with_multiple_simulations(8)
///     .with_targets([Target::Cpu, Target::Gpu]);
/// assert!(config.validate().is_ok());
/// assert!(config.simulations().is_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Polynomial order, i.e. one more than the polynomial degree of the basis.
    pub order: usize,
    /// Number of batched simulations; 0 and 1 disable batching.
    #[serde(default)]
    pub multiple_simulations: usize,
    #[serde(default = "default_targets")]
    pub targets: BTreeSet<Target>,
    #[serde(default)]
    pub model: ModelChoice,
}

impl GeneratorConfig {
    /// An unbatched configuration generating cpu kernels for the elastic model.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            multiple_simulations: 0,
            targets: default_targets(),
            model: ModelChoice::default(),
        }
    }

    pub fn with_multiple_simulations(mut self, multiple_simulations: usize) -> Self {
        self.multiple_simulations = multiple_simulations;
        self
    }

    pub fn with_targets(mut self, targets: impl IntoIterator<Item = Target>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    pub fn with_model(mut self, model: ModelChoice) -> Self {
        self.model = model;
        self
    }

    pub fn simulations(&self) -> MultipleSimulations {
        MultipleSimulations::new(self.multiple_simulations)
    }

    pub fn index_order(&self) -> IndexOrder {
        self.simulations().index_order()
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.order == 0 {
            return Err(GeneratorError::InvalidOrder { order: self.order });
        }
        if self.targets.is_empty() {
            return Err(GeneratorError::invalid_configuration("at least one target must be requested"));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> eyre::Result<Self> {
        let config: Self = serde_json::from_str(json).wrap_err("failed to parse generator configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&json).wrap_err_with(|| format!("invalid configuration in {}", path.display()))
    }
}
