use std::collections::BTreeMap;

use log::debug;

use crate::errors::FilterError;
use crate::filter::{Filter, PlainTextFilter, PlainTextParameters};

/// Builds a fresh filter
pub type FilterFactory = Box<dyn Fn() -> Box<dyn Filter> + Send + Sync>;

/// Filter configurations by id
#[derive(Default)]
pub struct FilterRegistry {
    factories: BTreeMap<String, FilterFactory>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in filters in their default configuration
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_plaintext(PlainTextParameters::default());
        registry
    }

    /// Register or replace a configuration
    pub fn register<F>(&mut self, config_id: &str, factory: F)
    where
        F: Fn() -> Box<dyn Filter> + Send + Sync + 'static,
    {
        debug!("Registered filter configuration '{}'", config_id);
        self.factories.insert(config_id.to_string(), Box::new(factory));
    }

    /// Register the plain-text filter with specific parameters
    pub fn register_plaintext(&mut self, parameters: PlainTextParameters) {
        self.register(PlainTextFilter::CONFIG_ID, move || {
            Box::new(PlainTextFilter::with_parameters(parameters.clone()))
        });
    }

    /// Whether a configuration exists
    pub fn contains(&self, config_id: &str) -> bool {
        self.factories.contains_key(config_id)
    }

    /// Registered configuration ids
    pub fn config_ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Create a filter for a configuration
    pub fn create(&self, config_id: &str) -> Result<Box<dyn Filter>, FilterError> {
        self.factories
            .get(config_id)
            .map(|factory| factory())
            .ok_or_else(|| FilterError::UnknownConfiguration(config_id.to_string()))
    }
}
