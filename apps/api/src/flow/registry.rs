//! Flow Registry: the named set of flows, built once at startup.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::flow::template::TemplateError;
use crate::flow::AdvisorFlow;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("flow name '{0}' is registered twice")]
    DuplicateName(String),

    #[error("flow '{name}' has an invalid template: {source}")]
    Template {
        name: &'static str,
        #[source]
        source: TemplateError,
    },
}

/// Public description of a registered flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowInfo {
    pub name: &'static str,
    pub requires_credential: bool,
}

#[derive(Default, Clone)]
pub struct FlowRegistry {
    flows: BTreeMap<&'static str, Arc<dyn AdvisorFlow>>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, flow: Arc<dyn AdvisorFlow>) -> Result<(), RegistryError> {
        let name = flow.name();
        if self.flows.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        self.flows.insert(name, flow);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AdvisorFlow>> {
        self.flows.get(name).cloned()
    }

    /// Registered flows in name order.
    pub fn describe(&self) -> Vec<FlowInfo> {
        self.flows
            .values()
            .map(|f| FlowInfo {
                name: f.name(),
                requires_credential: f.requires_credential(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::flow::InvocationFailure;

    struct Named(&'static str);

    #[async_trait]
    impl AdvisorFlow for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn requires_credential(&self) -> bool {
            true
        }

        async fn invoke_json(&self, input: Value) -> Result<Value, InvocationFailure> {
            Ok(input)
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = FlowRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(Named("chatbot"))).unwrap();
        let err = registry.register(Arc::new(Named("chatbot"))).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(name) if name == "chatbot"));
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_describe_is_sorted() {
        let mut registry = FlowRegistry::new();
        registry.register(Arc::new(Named("zeta"))).unwrap();
        registry.register(Arc::new(Named("alpha"))).unwrap();
        let names: Vec<&str> = registry.describe().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("missing").is_none());
    }
}
