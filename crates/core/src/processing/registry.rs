//! Algorithm registry and provider.
//!
//! A provider is populated once at startup with factory functions; callers
//! enumerate it or look algorithms up by id.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::processing::{Feedback, Outputs, Parameters, ProcessingAlgorithm};

/// Constructor for a fresh algorithm instance
pub type AlgorithmFactory = fn() -> Box<dyn ProcessingAlgorithm>;

/// Mapping from algorithm id to factory.
#[derive(Debug, Clone, Default)]
pub struct AlgorithmRegistry {
    factories: BTreeMap<&'static str, AlgorithmFactory>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under the id of the algorithm it builds.
    ///
    /// Registering the same id twice is an error.
    pub fn register(&mut self, factory: AlgorithmFactory) -> Result<()> {
        let id = factory().id();
        if self.factories.contains_key(id) {
            return Err(Error::InvalidParameter {
                name: "algorithm",
                value: id.to_string(),
                reason: "already registered".to_string(),
            });
        }
        self.factories.insert(id, factory);
        Ok(())
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    pub fn create(&self, id: &str) -> Option<Box<dyn ProcessingAlgorithm>> {
        self.factories.get(id).map(|factory| factory())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Summary of a registered algorithm, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmInfo {
    /// Qualified id, `provider:algorithm`
    pub id: String,
    pub name: String,
    pub group: String,
    pub group_id: String,
    pub help: String,
}

/// A named group of algorithms.
#[derive(Debug, Clone)]
pub struct Provider {
    id: &'static str,
    name: &'static str,
    long_name: Option<&'static str>,
    registry: AlgorithmRegistry,
}

impl Provider {
    pub fn new(id: &'static str, name: &'static str) -> Self {
        Self {
            id,
            name,
            long_name: None,
            registry: AlgorithmRegistry::new(),
        }
    }

    pub fn with_long_name(mut self, long_name: &'static str) -> Self {
        self.long_name = Some(long_name);
        self
    }

    /// Builder-style registration
    pub fn with_algorithm(mut self, factory: AlgorithmFactory) -> Result<Self> {
        self.registry.register(factory)?;
        Ok(self)
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Longer name; falls back to [`Provider::name`]
    pub fn long_name(&self) -> &'static str {
        self.long_name.unwrap_or(self.name)
    }

    /// Fresh instances of every algorithm, ordered by id
    pub fn algorithms(&self) -> Vec<Box<dyn ProcessingAlgorithm>> {
        self.registry
            .ids()
            .filter_map(|id| self.registry.create(id))
            .collect()
    }

    pub fn list(&self) -> Vec<AlgorithmInfo> {
        self.algorithms()
            .iter()
            .map(|alg| AlgorithmInfo {
                id: format!("{}:{}", self.id, alg.id()),
                name: alg.display_name().to_string(),
                group: alg.group().to_string(),
                group_id: alg.group_id().to_string(),
                help: alg.short_help().to_string(),
            })
            .collect()
    }

    /// Look an algorithm up by bare id or `provider:id`
    pub fn algorithm(&self, id: &str) -> Result<Box<dyn ProcessingAlgorithm>> {
        let bare = match id.split_once(':') {
            Some((provider, rest)) if provider == self.id => rest,
            Some(_) => return Err(Error::UnknownAlgorithm(id.to_string())),
            None => id,
        };
        self.registry
            .create(bare)
            .ok_or_else(|| Error::UnknownAlgorithm(id.to_string()))
    }

    /// Look up, validate and run an algorithm
    pub fn run(&self, id: &str, params: &Parameters, feedback: &mut Feedback) -> Result<Outputs> {
        self.algorithm(id)?.execute(params, feedback)
    }
}
