//! Default-state templates new slices are seeded from.

use crate::state::{deep_merge, empty_list, empty_single};
use crate::types::SliceKind;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;

/// Defaults merged into the templates by [`StateTemplates::configure`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Merged into the single-slice template (and inherited by list slices).
    pub initial_state: Option<Value>,

    /// Merged into the list-slice template.
    pub initial_state_list: Option<Value>,
}

/// Templates for single and list slices.
///
/// Reads hand out deep copies, so a slice never shares state with the
/// template or with another slice.
#[derive(Debug)]
pub struct StateTemplates {
    single: RwLock<Value>,
    list: RwLock<Value>,
}

impl StateTemplates {
    pub fn new() -> Self {
        let mut list = empty_list();
        deep_merge(&mut list, &empty_single());

        Self {
            single: RwLock::new(empty_single()),
            list: RwLock::new(list),
        }
    }

    /// Deep-merge caller defaults into the templates.
    ///
    /// Only slices constructed afterwards see the change.
    pub fn configure(&self, config: &TemplateConfig) {
        if let Some(ref initial) = config.initial_state {
            deep_merge(&mut self.single.write(), initial);
        }
        if let Some(ref initial) = config.initial_state_list {
            deep_merge(&mut self.list.write(), initial);
        }
        tracing::debug!(
            single = config.initial_state.is_some(),
            list = config.initial_state_list.is_some(),
            "state templates configured"
        );
    }

    /// Copy of the single-slice template.
    pub fn initial_state(&self) -> Value {
        self.single.read().clone()
    }

    /// Copy of the list-slice template with the single-slice template merged
    /// over it.
    pub fn initial_state_list(&self) -> Value {
        let mut state = self.list.read().clone();
        deep_merge(&mut state, &self.single.read());
        state
    }

    /// Copy of the template for `kind`.
    pub fn initial_for(&self, kind: SliceKind) -> Value {
        match kind {
            SliceKind::Single => self.initial_state(),
            SliceKind::List => self.initial_state_list(),
        }
    }

    /// Restore the built-in templates.
    pub fn reset(&self) {
        let fresh = Self::new();
        *self.single.write() = fresh.single.into_inner();
        *self.list.write() = fresh.list.into_inner();
    }
}

impl Default for StateTemplates {
    fn default() -> Self {
        Self::new()
    }
}
