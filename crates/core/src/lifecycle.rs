//! Plan and apply driver
//!
//! Decides which adapter operation a declared configuration needs and runs
//! it. Replacement (force-new change) is delete followed by create.

use std::sync::Arc;

use cxform_domain::Result;
use tracing::info;

use crate::context::OpContext;
use crate::ports::ResourceAdapter;
use crate::schema::Schema;
use crate::state::{Attributes, ResourceData};

/// Reconciled state of one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState {
    pub id: String,
    pub attributes: Attributes,
}

/// What an apply needs to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Create,
    Update { changed: Vec<String> },
    Replace { forced: Vec<String> },
    NoOp,
}

/// Compare prior state with declared configuration.
pub fn plan(schema: &Schema, prior: Option<&Attributes>, config: &Attributes) -> Plan {
    let Some(prior) = prior else {
        return Plan::Create;
    };
    let forced = schema.force_new_changes(prior, config);
    if !forced.is_empty() {
        return Plan::Replace { forced };
    }
    let changed = schema.changed_attributes(prior, config);
    if changed.is_empty() {
        Plan::NoOp
    } else {
        Plan::Update { changed }
    }
}

/// Outcome of a refresh or import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Present(ResourceState),
    /// The entity no longer exists and should be dropped from state.
    Gone,
}

/// Runs adapter operations for one resource type
#[derive(Clone)]
pub struct Lifecycle {
    adapter: Arc<dyn ResourceAdapter>,
    ctx: OpContext,
}

impl Lifecycle {
    pub fn new(adapter: Arc<dyn ResourceAdapter>, ctx: OpContext) -> Self {
        Self { adapter, ctx }
    }

    /// Validate declared configuration, then fill defaults and derived values.
    pub fn prepare(&self, mut config: Attributes) -> Result<Attributes> {
        let schema = self.adapter.schema();
        schema.validate(&config)?;
        schema.apply_defaults(&mut config);
        self.adapter.prepare_config(&mut config)?;
        Ok(config)
    }

    pub fn plan(&self, prior: Option<&ResourceState>, config: &Attributes) -> Plan {
        plan(self.adapter.schema(), prior.map(|state| &state.attributes), config)
    }

    /// Bring the entity in line with `config`.
    pub async fn apply(
        &self,
        prior: Option<&ResourceState>,
        config: Attributes,
    ) -> Result<ResourceState> {
        let config = self.prepare(config)?;
        let type_name = self.adapter.type_name();

        match (self.plan(prior, &config), prior) {
            (Plan::Create, _) | (_, None) => self.create(config).await,
            (Plan::NoOp, Some(prior)) => Ok(prior.clone()),
            (Plan::Update { changed }, Some(prior)) => {
                info!(type_name, id = %prior.id, ?changed, "Planned in-place update");
                // Unset computed values mean "keep what the server has"
                let mut config = config;
                self.adapter.schema().carry_computed(&prior.attributes, &mut config);
                let mut data =
                    ResourceData::for_update(&prior.id, prior.attributes.clone(), config);
                self.adapter.update(&self.ctx, &mut data).await?;
                let id = data.require_id()?.to_string();
                let mut attributes = data.into_attributes();
                self.keep_computed(&prior.attributes, &mut attributes);
                Ok(ResourceState { id, attributes })
            }
            (Plan::Replace { forced }, Some(prior)) => {
                info!(type_name, id = %prior.id, ?forced, "Planned replacement");
                self.destroy(prior).await?;
                self.create(config).await
            }
        }
    }

    async fn create(&self, config: Attributes) -> Result<ResourceState> {
        let mut data = ResourceData::from_config(config);
        self.adapter.create(&self.ctx, &mut data).await?;
        let id = data.require_id()?.to_string();
        Ok(ResourceState { id, attributes: data.into_attributes() })
    }

    /// Computed values the update did not report are carried over from prior
    /// state.
    fn keep_computed(&self, prior: &Attributes, attributes: &mut Attributes) {
        for (name, attr) in self.adapter.schema().iter() {
            if attr.is_computed() && !attributes.contains(name) {
                if let Some(value) = prior.get(name) {
                    attributes.set(name, value.clone());
                }
            }
        }
    }

    /// Re-read the entity.
    pub async fn refresh(&self, state: &ResourceState) -> Result<RefreshOutcome> {
        let data = ResourceData::from_state(&state.id, state.attributes.clone());
        self.read(data).await
    }

    /// Read an existing entity that has no state yet.
    pub async fn import(&self, id: &str) -> Result<RefreshOutcome> {
        self.read(ResourceData::from_state(id, Attributes::new())).await
    }

    async fn read(&self, mut data: ResourceData) -> Result<RefreshOutcome> {
        self.adapter.read(&self.ctx, &mut data).await?;
        Ok(match data.id() {
            Some(id) => {
                let id = id.to_string();
                RefreshOutcome::Present(ResourceState { id, attributes: data.into_attributes() })
            }
            None => RefreshOutcome::Gone,
        })
    }

    pub async fn destroy(&self, state: &ResourceState) -> Result<()> {
        let mut data = ResourceData::from_state(&state.id, state.attributes.clone());
        self.adapter.delete(&self.ctx, &mut data).await
    }
}
