//! Mediator configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::Lifetime;

/// What `publish` does when a notification handler fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStrategy {
    /// Run every handler, then report all failures together.
    #[default]
    ContinueOnError,
    /// Return the first failure; later handlers do not run.
    StopOnFirstError,
}

/// Options fixed when the `Mediator` is built.
///
/// Every field has a default, so a partial document is enough:
///
/// ```json
/// { "validation": true, "publish_strategy": "stop_on_first_error" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediatorOptions {
    /// Insert the validation gate into every command and query pipeline.
    pub validation: bool,
    /// Lifetime for modules registered without an explicit one.
    pub default_lifetime: Lifetime,
    pub publish_strategy: PublishStrategy,
    /// Reuse pipeline plans per request type instead of rebuilding them.
    pub cache_pipelines: bool,
}

impl Default for MediatorOptions {
    fn default() -> Self {
        Self {
            validation: false,
            default_lifetime: Lifetime::Scoped,
            publish_strategy: PublishStrategy::ContinueOnError,
            cache_pipelines: true,
        }
    }
}

impl MediatorOptions {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }
}
