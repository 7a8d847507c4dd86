//! Lookup table from type name to adapter

use std::collections::BTreeMap;
use std::sync::Arc;

use cxform_domain::{CxError, Result};
use tracing::debug;

use crate::ports::{DataSource, ResourceAdapter};

/// Registered resource adapters and data sources
#[derive(Default, Clone)]
pub struct Registry {
    resources: BTreeMap<&'static str, Arc<dyn ResourceAdapter>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource adapter; a type name may only be registered once.
    pub fn register_resource(&mut self, adapter: Arc<dyn ResourceAdapter>) -> Result<()> {
        let name = adapter.type_name();
        if self.resources.contains_key(name) {
            return Err(CxError::Config(format!("resource type '{name}' registered twice")));
        }
        debug!(resource_type = name, "registered resource");
        self.resources.insert(name, adapter);
        Ok(())
    }

    pub fn register_data_source(&mut self, source: Arc<dyn DataSource>) -> Result<()> {
        let name = source.type_name();
        if self.data_sources.contains_key(name) {
            return Err(CxError::Config(format!("data source '{name}' registered twice")));
        }
        debug!(data_source = name, "registered data source");
        self.data_sources.insert(name, source);
        Ok(())
    }

    pub fn resource(&self, name: &str) -> Result<Arc<dyn ResourceAdapter>> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| CxError::InvalidInput(format!("unknown resource type '{name}'")))
    }

    pub fn data_source(&self, name: &str) -> Result<Arc<dyn DataSource>> {
        self.data_sources
            .get(name)
            .cloned()
            .ok_or_else(|| CxError::InvalidInput(format!("unknown data source '{name}'")))
    }

    /// Resource type names in sorted order.
    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.data_sources.keys().copied()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::context::OpContext;
    use crate::ports::ExportedResources;
    use crate::schema::Schema;
    use crate::state::ResourceData;

    struct Named(&'static str, Schema);

    #[async_trait]
    impl ResourceAdapter for Named {
        fn type_name(&self) -> &'static str {
            self.0
        }

        fn schema(&self) -> &Schema {
            &self.1
        }

        async fn create(&self, _ctx: &OpContext, _data: &mut ResourceData) -> Result<()> {
            Ok(())
        }

        async fn read(&self, _ctx: &OpContext, _data: &mut ResourceData) -> Result<()> {
            Ok(())
        }

        async fn update(&self, _ctx: &OpContext, _data: &mut ResourceData) -> Result<()> {
            Ok(())
        }

        async fn delete(&self, _ctx: &OpContext, _data: &mut ResourceData) -> Result<()> {
            Ok(())
        }

        async fn export(&self, _ctx: &OpContext) -> Result<ExportedResources> {
            Ok(ExportedResources::new())
        }
    }

    #[test]
    fn test_looks_up_by_type_name() {
        let mut registry = Registry::new();
        registry.register_resource(Arc::new(Named("b_type", Schema::new()))).unwrap();
        registry.register_resource(Arc::new(Named("a_type", Schema::new()))).unwrap();

        assert_eq!(registry.resource("a_type").unwrap().type_name(), "a_type");
        assert_eq!(registry.resource_types().collect::<Vec<_>>(), vec!["a_type", "b_type"]);
    }

    #[test]
    fn test_rejects_duplicates_and_unknown_names() {
        let mut registry = Registry::new();
        registry.register_resource(Arc::new(Named("a_type", Schema::new()))).unwrap();
        let err = registry.register_resource(Arc::new(Named("a_type", Schema::new()))).unwrap_err();
        assert!(matches!(err, CxError::Config(_)));
        assert!(matches!(registry.resource("missing"), Err(CxError::InvalidInput(_))));
    }
}
