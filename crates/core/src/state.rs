//! Attribute model
//!
//! [`Attributes`] is the typed key-value store adapters read declared
//! configuration from and write reconciled state into. Accessors never cast:
//! asking for the wrong type is a [`CxError::TypeMismatch`].

use std::collections::BTreeMap;

use cxform_domain::{CxError, Result};
use serde_json::Value;

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    String(String),
    /// Ordered list. Sets are lists kept sorted and de-duplicated.
    List(Vec<AttrValue>),
    Map(BTreeMap<String, String>),
    Block(Attributes),
}

impl AttrValue {
    /// Variant name used in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Block(_) => "block",
        }
    }

    /// Canonical set of strings: sorted, without duplicates.
    pub fn string_set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<String> = items.into_iter().map(Into::into).collect();
        values.sort();
        values.dedup();
        Self::List(values.into_iter().map(Self::String).collect())
    }

    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::String(s.into())).collect())
    }

    /// A list of nested blocks.
    pub fn blocks<I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = Attributes>,
    {
        Self::List(blocks.into_iter().map(Self::Block).collect())
    }

    /// A block list holding exactly one block (`max_items = 1` style).
    pub fn single_block(block: Attributes) -> Self {
        Self::List(vec![Self::Block(block)])
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Plain JSON rendering, without schema knowledge.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::String(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect(),
            ),
            Self::Block(block) => block.to_json(),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        Self::string_list(value)
    }
}

impl From<BTreeMap<String, String>> for AttrValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self::Map(value)
    }
}

impl From<Attributes> for AttrValue {
    fn from(value: Attributes) -> Self {
        Self::Block(value)
    }
}

/// Ordered attribute map with typed accessors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(BTreeMap<String, AttrValue>);

fn mismatch(key: &str, expected: &str, found: &AttrValue) -> CxError {
    CxError::TypeMismatch {
        key: key.to_string(),
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Set when `Some`, remove when `None`.
    pub fn set_opt<V: Into<AttrValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        let key = key.into();
        match value {
            Some(value) => {
                self.0.insert(key, value.into());
            }
            None => {
                self.0.remove(&key);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_string(&self, key: &str) -> Result<Option<&str>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(AttrValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(mismatch(key, "string", other)),
        }
    }

    /// Like [`Self::get_string`] but treats an empty string as absent.
    pub fn get_non_empty_string(&self, key: &str) -> Result<Option<&str>> {
        Ok(self.get_string(key)?.filter(|s| !s.is_empty()))
    }

    pub fn require_string(&self, key: &str) -> Result<&str> {
        self.get_string(key)?
            .ok_or_else(|| CxError::InvalidInput(format!("attribute '{key}' is required")))
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(AttrValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(key, "bool", other)),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(AttrValue::Int(i)) => Ok(Some(*i)),
            Some(other) => Err(mismatch(key, "int", other)),
        }
    }

    /// Strings of a list or set attribute, in stored order.
    pub fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(AttrValue::List(items)) => items
                .iter()
                .map(|item| match item {
                    AttrValue::String(s) => Ok(s.clone()),
                    other => Err(mismatch(key, "list of strings", other)),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(mismatch(key, "list", other)),
        }
    }

    pub fn get_string_map(&self, key: &str) -> Result<Option<&BTreeMap<String, String>>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(AttrValue::Map(map)) => Ok(Some(map)),
            Some(other) => Err(mismatch(key, "map", other)),
        }
    }

    /// All blocks of a block list or block set attribute.
    pub fn get_blocks(&self, key: &str) -> Result<Option<Vec<&Attributes>>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(AttrValue::Block(block)) => Ok(Some(vec![block])),
            Some(AttrValue::List(items)) => items
                .iter()
                .map(|item| match item {
                    AttrValue::Block(block) => Ok(block),
                    other => Err(mismatch(key, "list of blocks", other)),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(mismatch(key, "block", other)),
        }
    }

    /// First block of a single-block attribute.
    pub fn get_block(&self, key: &str) -> Result<Option<&Attributes>> {
        Ok(self.get_blocks(key)?.and_then(|blocks| blocks.into_iter().next()))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
    }
}

impl<K: Into<String>> FromIterator<(K, AttrValue)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, AttrValue)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// One entity's id plus its attributes during a single operation.
///
/// `prior` holds the last reconciled state so adapters can ask which
/// attributes changed. A freshly created resource has no prior state and is
/// flagged new, which widens the not-found tolerance of the follow-up read.
#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    id: Option<String>,
    attrs: Attributes,
    prior: Attributes,
    new_resource: bool,
}

impl ResourceData {
    /// Declared configuration for an entity that does not exist yet.
    pub fn from_config(config: Attributes) -> Self {
        Self { id: None, attrs: config, prior: Attributes::new(), new_resource: true }
    }

    /// Previously reconciled state, used for refresh, import and delete.
    pub fn from_state(id: impl Into<String>, state: Attributes) -> Self {
        Self { id: Some(id.into()), prior: state.clone(), attrs: state, new_resource: false }
    }

    /// New configuration applied on top of an existing entity.
    pub fn for_update(id: impl Into<String>, prior: Attributes, config: Attributes) -> Self {
        Self { id: Some(id.into()), attrs: config, prior, new_resource: false }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn require_id(&self) -> Result<&str> {
        self.id().ok_or_else(|| CxError::Internal("resource has no id".into()))
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Marks the entity as gone; the caller drops it from state.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn is_new_resource(&self) -> bool {
        self.new_resource
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    pub fn prior(&self) -> &Attributes {
        &self.prior
    }

    pub fn into_attributes(self) -> Attributes {
        self.attrs
    }

    pub fn get_string(&self, key: &str) -> Result<Option<&str>> {
        self.attrs.get_string(key)
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.attrs.get_bool(key)
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.attrs.get_int(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.set(key, value);
    }

    pub fn set_opt<V: Into<AttrValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        self.attrs.set_opt(key, value);
    }

    pub fn has_change(&self, key: &str) -> bool {
        self.attrs.get(key) != self.prior.get(key)
    }

    pub fn has_changes(&self, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.has_change(key))
    }
}
