//! Runtime Configuration
//!
//! Knobs for a [`Runtime`](super::Runtime). The defaults reproduce the plain
//! engine behaviour: no recursion limit and subscriptions that are never
//! removed once made.
//!
//! Configuration can be built in code or loaded from JSON:
//!
//! ```
//! use ripple_core::reactive::{RuntimeConfig, SubscriptionPolicy};
//!
//! let config = RuntimeConfig::from_json(r#"{"max_depth": 64, "subscriptions": "prune"}"#)?;
//! assert_eq!(config.max_depth, Some(64));
//! assert_eq!(config.subscriptions, SubscriptionPolicy::Prune);
//! # Ok::<(), ripple_core::ReactiveError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ReactiveError, Result};

/// What happens to a subscription when an effect re-runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPolicy {
    /// Subscriptions accumulate. A cell an effect no longer reads keeps
    /// re-running it on every change.
    #[default]
    Retain,
    /// Before each run the effect is removed from every cell it subscribed to
    /// during its previous run, so its subscriptions always match what its
    /// latest run read.
    ///
    /// Re-subscribing appends the effect to the end of each cell's subscriber
    /// list, so notification order becomes "most recently run last" rather
    /// than first-subscription order.
    Prune,
}

/// Configuration for a reactive runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum number of nested effect runs.
    ///
    /// When set, an effect run that would exceed the limit panics with a
    /// [`ReactiveError::RecursionLimit`] payload instead of overflowing the
    /// stack. `None` disables the check.
    pub max_depth: Option<usize>,

    /// Subscription bookkeeping between runs.
    pub subscriptions: SubscriptionPolicy,
}

impl RuntimeConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RuntimeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    pub fn with_subscription_policy(mut self, policy: SubscriptionPolicy) -> Self {
        self.subscriptions = policy;
        self
    }

    /// Reject settings that would make every effect fail.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == Some(0) {
            return Err(ReactiveError::InvalidConfig {
                reason: "max_depth must be at least 1".into(),
            });
        }
        Ok(())
    }
}
