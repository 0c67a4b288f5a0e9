use std::collections::HashMap;

use crate::{ParameterReference, PrepareError, Value};

/// Caller-supplied values addressed by parameter name.
///
/// Names bound here but never referenced by the statement are ignored; a
/// referenced name with no bound value fails resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    values: HashMap<String, Value>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Produces the positional argument vector for `parameters`: position
    /// `i` receives the value bound under `parameters[i].name`. Repeated
    /// names resolve independently at each position.
    pub fn resolve(&self, parameters: &[ParameterReference]) -> Result<Vec<Value>, PrepareError> {
        parameters
            .iter()
            .map(|parameter| {
                self.values
                    .get(&parameter.name)
                    .cloned()
                    .ok_or_else(|| PrepareError::UnboundParameter {
                        name: parameter.name.clone(),
                    })
            })
            .collect()
    }
}
