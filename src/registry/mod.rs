//! Shared registration state: slice keys and default-state templates.
//!
//! A [`SliceContext`] bundles both. Most callers use the process-wide
//! [`SliceContext::global`]; tests build their own with
//! [`SliceContext::new`] so that keys never collide across test cases.

mod keys;
mod templates;

pub use keys::{encode_base36, KeyRegistry};
pub use templates::{StateTemplates, TemplateConfig};

use std::sync::OnceLock;

/// Key registry and state templates slices are constructed against.
#[derive(Debug, Default)]
pub struct SliceContext {
    keys: KeyRegistry,
    templates: StateTemplates,
}

impl SliceContext {
    /// Create an isolated context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide context.
    pub fn global() -> &'static SliceContext {
        static GLOBAL: OnceLock<SliceContext> = OnceLock::new();
        GLOBAL.get_or_init(SliceContext::new)
    }

    pub fn keys(&self) -> &KeyRegistry {
        &self.keys
    }

    pub fn templates(&self) -> &StateTemplates {
        &self.templates
    }

    /// Merge defaults into this context's templates.
    pub fn configure(&self, config: &TemplateConfig) -> &Self {
        self.templates.configure(config);
        self
    }

    /// Clear registered keys and restore the built-in templates.
    pub fn reset(&self) {
        self.keys.reset();
        self.templates.reset();
    }
}

/// Merge defaults into the process-wide templates.
pub fn configure(config: &TemplateConfig) {
    SliceContext::global().configure(config);
}
