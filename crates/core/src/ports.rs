//! Port interfaces for resource adapters
//!
//! Each entity type implements [`ResourceAdapter`] once; data sources
//! implement [`DataSource`]. Both are looked up by type name through the
//! [`crate::Registry`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use cxform_domain::Result;

use crate::context::OpContext;
use crate::schema::Schema;
use crate::state::{AttrValue, Attributes, ResourceData};

/// Display metadata for one exported entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMeta {
    pub name: String,
}

impl ResourceMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Exported entities keyed by id
pub type ExportedResources = BTreeMap<String, ResourceMeta>;

/// An attribute that holds the id of another resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefAttr {
    /// Attribute path, with `.` separating nested block fields.
    pub attribute: &'static str,
    pub ref_type: &'static str,
    /// Literals the platform accepts in place of an id, e.g. `*` for all
    /// divisions.
    pub alt_values: &'static [&'static str],
}

impl RefAttr {
    pub const fn new(attribute: &'static str, ref_type: &'static str) -> Self {
        Self { attribute, ref_type, alt_values: &[] }
    }

    pub const fn with_alt_values(mut self, alt_values: &'static [&'static str]) -> Self {
        self.alt_values = alt_values;
        self
    }

    /// Whether `value` is an alternate literal or an id `known` resolves.
    pub fn resolves(&self, value: &str, known: &dyn Fn(&str, &str) -> bool) -> bool {
        self.alt_values.contains(&value) || known(self.ref_type, value)
    }
}

/// Drop an element of the `block` list once every field in `fields` lost its
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveIfMissing {
    pub block: &'static str,
    pub fields: &'static [&'static str],
}

/// Remove references that `known(ref_type, id)` cannot resolve, then drop
/// blocks left without their required references.
pub fn prune_references(
    references: &[RefAttr],
    removals: &[RemoveIfMissing],
    attrs: &mut Attributes,
    known: &dyn Fn(&str, &str) -> bool,
) {
    for reference in references {
        match reference.attribute.split_once('.') {
            None => drop_dangling(attrs, reference.attribute, reference, known),
            Some((block, field)) => {
                let Some(AttrValue::List(items)) = attrs.get(block) else { continue };
                let items = items
                    .iter()
                    .cloned()
                    .map(|item| match item {
                        AttrValue::Block(mut nested) => {
                            drop_dangling(&mut nested, field, reference, known);
                            AttrValue::Block(nested)
                        }
                        other => other,
                    })
                    .collect::<Vec<_>>();
                attrs.set(block, AttrValue::List(items));
            }
        }
    }

    for removal in removals {
        let Some(AttrValue::List(items)) = attrs.get(removal.block) else { continue };
        let kept = items
            .iter()
            .filter(|item| match item {
                AttrValue::Block(nested) => {
                    removal.fields.iter().any(|field| nested.contains(field))
                }
                _ => true,
            })
            .cloned()
            .collect::<Vec<_>>();
        attrs.set(removal.block, AttrValue::List(kept));
    }
}

fn drop_dangling(
    attrs: &mut Attributes,
    field: &str,
    reference: &RefAttr,
    known: &dyn Fn(&str, &str) -> bool,
) {
    let dangling = attrs
        .get(field)
        .and_then(AttrValue::as_str)
        .is_some_and(|id| !reference.resolves(id, known));
    if dangling {
        attrs.remove(field);
    }
}

/// Uniform four-operation contract for one entity type
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    /// Provider type name, e.g. `genesyscloud_location`
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    /// Derive computed attributes from configuration before planning.
    fn prepare_config(&self, _config: &mut Attributes) -> Result<()> {
        Ok(())
    }

    /// Create the entity, set its id and reconcile state.
    async fn create(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()>;

    /// Refresh state. Clears the id when the entity no longer exists.
    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()>;

    async fn update(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()>;

    /// Delete the entity and wait until the server stops returning it.
    async fn delete(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()>;

    /// Enumerate every instance of this type.
    async fn export(&self, ctx: &OpContext) -> Result<ExportedResources>;

    /// Attributes that reference other resources.
    fn references(&self) -> &'static [RefAttr] {
        &[]
    }

    /// Blocks that are meaningless once their references are gone.
    fn remove_if_missing(&self) -> &'static [RemoveIfMissing] {
        &[]
    }
}

/// Read-only lookup
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    /// Resolve the declared lookup and set the id of the match.
    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFS: &[RefAttr] = &[
        RefAttr::new("site_id", "site"),
        RefAttr::new("roles.role_id", "role"),
        RefAttr::new("roles.division_id", "division").with_alt_values(&["*"]),
    ];
    const REMOVALS: &[RemoveIfMissing] =
        &[RemoveIfMissing { block: "roles", fields: &["role_id"] }];

    fn known(ref_type: &str, id: &str) -> bool {
        matches!((ref_type, id), ("role", "r1") | ("division", "d1") | ("site", "s1"))
    }

    fn role(role_id: &str, division_id: &str) -> AttrValue {
        AttrValue::Block(
            Attributes::new().with("role_id", role_id).with("division_id", division_id),
        )
    }

    #[test]
    fn test_alt_values_resolve_without_lookup() {
        let division = REFS[2];
        assert!(division.resolves("*", &|_: &str, _: &str| false));
        assert!(!REFS[1].resolves("*", &|_: &str, _: &str| false));
    }

    #[test]
    fn test_prune_drops_dangling_references_and_orphaned_blocks() {
        let mut attrs = Attributes::new().with("site_id", "gone").with(
            "roles",
            AttrValue::List(vec![role("r1", "*"), role("r1", "d-gone"), role("r-gone", "d1")]),
        );

        prune_references(REFS, REMOVALS, &mut attrs, &known);

        assert!(!attrs.contains("site_id"));
        let roles = attrs.get_blocks("roles").unwrap().unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].get_string("division_id").unwrap(), Some("*"));
        assert_eq!(roles[1].get_string("role_id").unwrap(), Some("r1"));
        assert!(!roles[1].contains("division_id"));
    }

    #[test]
    fn test_prune_keeps_resolved_references() {
        let mut attrs = Attributes::new()
            .with("site_id", "s1")
            .with("roles", AttrValue::List(vec![role("r1", "d1")]));
        let before = attrs.clone();

        prune_references(REFS, REMOVALS, &mut attrs, &known);

        assert_eq!(attrs, before);
    }
}
