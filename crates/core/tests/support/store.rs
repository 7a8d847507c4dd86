//! In-memory widget store with propagation lag
//!
//! Models the behaviour the reconcile helpers exist for: new widgets read as
//! not-found for a few reads, deleted widgets linger in a `deleted` state,
//! and updates can be rejected with a stale version.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cxform_core::reconcile::{
    collect_pages, confirm_deleted, read_entity, settle, update_with_version_retry,
};
use cxform_core::{
    Attribute, Attributes, ExportedResources, OpContext, ResourceAdapter, ResourceData,
    ResourceMeta, Schema,
};
use cxform_domain::{CxError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub name: String,
    pub size: i64,
    pub kind: String,
    pub version: i64,
    pub state: String,
}

#[derive(Debug, Default)]
struct Inner {
    widgets: BTreeMap<String, Widget>,
    hidden_reads: BTreeMap<String, u32>,
    next_id: u32,
    stale_updates: u32,
    lag_reads: u32,
    calls: Vec<String>,
}

/// Shared fake server state
#[derive(Debug, Clone, Default)]
pub struct WidgetStore {
    inner: Arc<Mutex<Inner>>,
}

impl WidgetStore {
    /// New widgets stay invisible for `lag_reads` reads.
    pub fn with_lag(lag_reads: u32) -> Self {
        let store = Self::default();
        store.inner.lock().unwrap().lag_reads = lag_reads;
        store
    }

    /// Reject the next `count` updates with a stale version.
    pub fn reject_updates(&self, count: u32) {
        self.inner.lock().unwrap().stale_updates = count;
    }

    pub fn insert(&self, id: &str, widget: Widget) {
        self.inner.lock().unwrap().widgets.insert(id.to_string(), widget);
    }

    pub fn widget(&self, id: &str) -> Option<Widget> {
        self.inner.lock().unwrap().widgets.get(id).cloned()
    }

    pub fn remove(&self, id: &str) {
        self.inner.lock().unwrap().widgets.remove(id);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.inner.lock().unwrap().calls.push(call.into());
    }

    async fn create(&self, name: &str, size: i64, kind: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = format!("w{}", inner.next_id);
        let widget = Widget {
            name: name.to_string(),
            size,
            kind: kind.to_string(),
            version: 1,
            state: "active".into(),
        };
        inner.widgets.insert(id.clone(), widget);
        let lag = inner.lag_reads;
        inner.hidden_reads.insert(id.clone(), lag);
        inner.calls.push(format!("create {id}"));
        id
    }

    async fn get(&self, id: &str) -> Result<Widget> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(remaining) = inner.hidden_reads.get_mut(id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CxError::NotFound(format!("widget {id}")));
            }
        }
        inner.widgets.get(id).cloned().ok_or_else(|| CxError::NotFound(format!("widget {id}")))
    }

    async fn update(&self, id: &str, version: i64, name: &str, size: i64) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("update {id}@{version}"));
        if inner.stale_updates > 0 {
            inner.stale_updates -= 1;
            if let Some(widget) = inner.widgets.get_mut(id) {
                widget.version += 1;
            }
            return Err(CxError::VersionConflict(format!("version {version} is stale")));
        }
        let widget = inner
            .widgets
            .get_mut(id)
            .ok_or_else(|| CxError::NotFound(format!("widget {id}")))?;
        if widget.version != version {
            return Err(CxError::VersionConflict(format!("version {version} is stale")));
        }
        widget.name = name.to_string();
        widget.size = size;
        widget.version += 1;
        Ok(widget.version)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("delete {id}"));
        let widget = inner
            .widgets
            .get_mut(id)
            .ok_or_else(|| CxError::NotFound(format!("widget {id}")))?;
        widget.state = "deleted".into();
        Ok(())
    }

    async fn list(&self, page_size: usize, page_number: u32) -> Vec<(String, Widget)> {
        let inner = self.inner.lock().unwrap();
        let skip = page_size * (page_number as usize - 1);
        inner
            .widgets
            .iter()
            .skip(skip)
            .take(page_size)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Adapter over the fake store
pub struct WidgetAdapter {
    store: WidgetStore,
    schema: Schema,
}

impl WidgetAdapter {
    pub fn new(store: WidgetStore) -> Self {
        let schema = Schema::new()
            .attr("name", Attribute::string().required())
            .attr("size", Attribute::int().optional().default(1i64))
            .attr("kind", Attribute::string().required().force_new())
            .attr("version", Attribute::int().computed());
        Self { store, schema }
    }
}

#[async_trait]
impl ResourceAdapter for WidgetAdapter {
    fn type_name(&self) -> &'static str {
        "test_widget"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let name = data.attrs().require_string("name")?.to_string();
        let kind = data.attrs().require_string("kind")?.to_string();
        let size = data.get_int("size")?.unwrap_or(1);
        let id = self.store.create(&name, size, &kind).await;
        data.set_id(id);
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        let store = self.store.clone();
        let found = read_entity(ctx, data, "widget", || {
            let store = store.clone();
            let id = id.clone();
            async move { store.get(&id).await }
        })
        .await?;
        let Some(widget) = found else {
            data.clear_id();
            return Ok(());
        };
        data.set("name", widget.name);
        data.set("size", widget.size);
        data.set("kind", widget.kind);
        data.set("version", widget.version);
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        let name = data.attrs().require_string("name")?.to_string();
        let size = data.get_int("size")?.unwrap_or(1);
        let store = self.store.clone();
        update_with_version_retry(ctx, "widget", &id, || {
            let (store, id, name) = (store.clone(), id.clone(), name.clone());
            async move {
                let current = store.get(&id).await?;
                store.update(&id, current.version, &name, size).await
            }
        })
        .await?;
        settle(ctx, ctx.policy().settle_delay).await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        self.store.delete(&id).await?;
        let store = self.store.clone();
        confirm_deleted(
            ctx,
            "widget",
            &id,
            || {
                let (store, id) = (store.clone(), id.clone());
                async move { store.get(&id).await }
            },
            |widget: &Widget| widget.state == "deleted",
        )
        .await
    }

    async fn export(&self, ctx: &OpContext) -> Result<ExportedResources> {
        let store = self.store.clone();
        let widgets = collect_pages(ctx, 2, |page| {
            let store = store.clone();
            async move { Ok(store.list(2, page).await) }
        })
        .await?;
        Ok(widgets
            .into_iter()
            .filter(|(_, widget)| widget.state != "deleted")
            .map(|(id, widget)| (id, ResourceMeta::new(widget.name)))
            .collect())
    }
}

pub fn widget_config(name: &str, kind: &str) -> Attributes {
    Attributes::new().with("name", name).with("kind", kind)
}
