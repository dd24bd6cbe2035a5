//! Exploration mode detection.
//!
//! A notebook opened from inside a running pipeline step (the step name is
//! set in the environment) can resume from the variables earlier steps left
//! in the marshal directory instead of re-running them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::marshal::MarshalStore;

/// Whether the current session is exploring a single pipeline step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exploration {
    pub is_exploration: bool,
    /// Step being explored; empty when not exploring.
    pub step_name: String,
}

/// Decides exploration mode from the step name and the marshal directory.
#[derive(Clone)]
pub struct ExplorationDetector {
    step_name: Option<String>,
    store: MarshalStore,
}

impl ExplorationDetector {
    /// Create a detector for the given pipeline step (usually
    /// [`EnvConfig::pipeline_step`](crate::config::EnvConfig::pipeline_step)).
    pub fn new(step_name: Option<String>, store: MarshalStore) -> Self {
        Self {
            step_name: step_name.filter(|s| !s.is_empty()),
            store,
        }
    }

    /// Exploration requires both a step name and an existing marshal
    /// directory. Recomputed on every call.
    pub fn detect(&self, notebook_path: &Path) -> Result<Exploration> {
        let Some(step_name) = &self.step_name else {
            return Ok(Exploration::default());
        };

        let dir = self.store.locate(notebook_path)?;
        if !dir.exists() {
            tracing::debug!(
                "Step `{}` set but no marshal directory at {}",
                step_name,
                dir.display()
            );
            return Ok(Exploration::default());
        }

        Ok(Exploration {
            is_exploration: true,
            step_name: step_name.clone(),
        })
    }
}
