use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::Result;
use crate::optim::optimizer::OptimizerConfig;
use crate::playground::layers::{check_playground_sizes, parse_layers};
use crate::train::runs::DEFAULT_HISTORY_CAP;

/// Everything needed to (re)build a playground session's model and optimizer.
///
/// Deserializes from the studio's build request; every field has a default,
/// and the optimizer fields sit at the top level.
///
/// # Fields
/// - `layers`        : comma-separated sizes, must start with 2 and end with 1
/// - `activation`    : activation name, see [`Activation`]
/// - `optimizer`     : learning rate, momentum, l2, weight decay, clip norm
/// - `steps_per_tick`: single-sample updates per tick (at least 1)
/// - `history_cap`   : loss samples kept per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub layers: String,
    pub activation: String,
    #[serde(flatten)]
    pub optimizer: OptimizerConfig,
    pub steps_per_tick: usize,
    pub history_cap: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            layers: "2,8,8,1".into(),
            activation: "relu".into(),
            optimizer: OptimizerConfig::default(),
            steps_per_tick: 10,
            history_cap: DEFAULT_HISTORY_CAP,
        }
    }
}

impl SessionConfig {
    /// Parses and checks the config, returning the layer sizes and the
    /// resolved activation.
    pub fn resolve(&self) -> Result<(Vec<usize>, Activation)> {
        let sizes = parse_layers(&self.layers);
        check_playground_sizes(&sizes)?;
        let activation: Activation = self.activation.parse()?;
        self.optimizer.validate()?;
        Ok((sizes, activation))
    }

    pub fn steps(&self) -> usize {
        self.steps_per_tick.max(1)
    }
}
