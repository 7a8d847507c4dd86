//! Resource schemas
//!
//! A [`Schema`] describes every attribute a resource accepts: its type,
//! whether the user must, may, or cannot set it, whether changing it forces
//! the entity to be recreated, and which field validators apply. The schema
//! also drives JSON decoding so that maps and nested blocks are unambiguous.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use cxform_common::validation::{FieldValidator, ValidationError};
use cxform_domain::{CxError, Result};
use serde_json::{Map, Value};

use crate::state::{AttrValue, Attributes};

/// Replacement text for sensitive values in rendered state.
pub const REDACTED: &str = "(sensitive)";

/// Returns true when two string values should be considered equal.
pub type DiffSuppressFn = fn(&str, &str) -> bool;

type StrValidator = Arc<dyn FieldValidator<str> + Send + Sync>;
type IntValidator = Arc<dyn FieldValidator<i64> + Send + Sync>;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttrType {
    String,
    Bool,
    Int,
    StringList,
    StringSet,
    StringMap,
    BlockList(Schema),
    BlockSet(Schema),
}

impl AttrType {
    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::StringList => "list of strings",
            Self::StringSet => "set of strings",
            Self::StringMap => "map",
            Self::BlockList(_) => "list of blocks",
            Self::BlockSet(_) => "set of blocks",
        }
    }
}

#[derive(Clone)]
enum Check {
    Str(StrValidator),
    Int(IntValidator),
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(_) => f.write_str("Check::Str"),
            Self::Int(_) => f.write_str("Check::Int"),
        }
    }
}

/// A single attribute definition, built with chained setters.
#[derive(Debug, Clone)]
pub struct Attribute {
    ty: AttrType,
    required: bool,
    optional: bool,
    computed: bool,
    force_new: bool,
    sensitive: bool,
    default: Option<AttrValue>,
    max_items: Option<usize>,
    description: &'static str,
    checks: Vec<Check>,
    diff_suppress: Option<DiffSuppressFn>,
}

impl Attribute {
    fn of(ty: AttrType) -> Self {
        Self {
            ty,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            max_items: None,
            description: "",
            checks: Vec::new(),
            diff_suppress: None,
        }
    }

    pub fn string() -> Self {
        Self::of(AttrType::String)
    }

    pub fn bool() -> Self {
        Self::of(AttrType::Bool)
    }

    pub fn int() -> Self {
        Self::of(AttrType::Int)
    }

    pub fn string_list() -> Self {
        Self::of(AttrType::StringList)
    }

    pub fn string_set() -> Self {
        Self::of(AttrType::StringSet)
    }

    pub fn string_map() -> Self {
        Self::of(AttrType::StringMap)
    }

    pub fn block_list(schema: Schema) -> Self {
        Self::of(AttrType::BlockList(schema))
    }

    pub fn block_set(schema: Schema) -> Self {
        Self::of(AttrType::BlockSet(schema))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Server-assigned. Combined with [`Self::optional`] the server value is
    /// kept when the user leaves the attribute unset.
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default(mut self, value: impl Into<AttrValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Validate string values, or every element of a string list or set.
    pub fn validate_str<V>(mut self, validator: V) -> Self
    where
        V: FieldValidator<str> + Send + Sync + 'static,
    {
        self.checks.push(Check::Str(Arc::new(validator)));
        self
    }

    pub fn validate_int<V>(mut self, validator: V) -> Self
    where
        V: FieldValidator<i64> + Send + Sync + 'static,
    {
        self.checks.push(Check::Int(Arc::new(validator)));
        self
    }

    pub fn suppress_diff(mut self, suppress: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(suppress);
        self
    }

    pub fn ty(&self) -> &AttrType {
        &self.ty
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    /// Computed without being settable by the user.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    pub fn is_force_new(&self) -> bool {
        self.force_new
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    fn block_schema(&self) -> Option<&Schema> {
        match &self.ty {
            AttrType::BlockList(schema) | AttrType::BlockSet(schema) => Some(schema),
            _ => None,
        }
    }
}

/// Named attribute definitions for one resource or nested block.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: BTreeMap<&'static str, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes.iter().map(|(name, attr)| (*name, attr))
    }

    /// Check declared configuration against the schema.
    ///
    /// Every problem is collected; the returned `InvalidInput` names each
    /// offending attribute path.
    pub fn validate(&self, config: &Attributes) -> Result<()> {
        let mut errors = ValidationError::new();
        self.validate_into(config, "", &mut errors);
        errors.into_result().map_err(|err| CxError::InvalidInput(err.to_string()))
    }

    fn validate_into(&self, config: &Attributes, prefix: &str, errors: &mut ValidationError) {
        for key in config.keys() {
            if !self.attributes.contains_key(key) {
                errors.add_field_error(path(prefix, key), "unknown attribute");
            }
        }

        for (name, attr) in &self.attributes {
            let field = path(prefix, name);
            let Some(value) = config.get(name) else {
                if attr.required {
                    errors.add_field_error(field, "is required");
                }
                continue;
            };
            if attr.is_computed_only() {
                errors.add_field_error(field, "is computed and cannot be set");
                continue;
            }
            attr.validate_value(value, &field, errors);
        }
    }

    /// Fill unset attributes that declare a default, recursing into blocks.
    pub fn apply_defaults(&self, config: &mut Attributes) {
        for (name, attr) in &self.attributes {
            if !config.contains(name) {
                if let Some(default) = &attr.default {
                    config.set(*name, default.clone());
                }
                continue;
            }
            let Some(schema) = attr.block_schema() else { continue };
            if let Some(AttrValue::List(items)) = config.get(name) {
                let items = items
                    .iter()
                    .map(|item| match item {
                        AttrValue::Block(block) => {
                            let mut block = block.clone();
                            schema.apply_defaults(&mut block);
                            AttrValue::Block(block)
                        }
                        other => other.clone(),
                    })
                    .collect();
                config.set(*name, AttrValue::List(items));
            }
        }
    }

    /// Fill computed attributes the configuration leaves unset with their
    /// prior value, recursing into blocks.
    ///
    /// List blocks pair up by position, set blocks by their declared fields.
    pub fn carry_computed(&self, prior: &Attributes, config: &mut Attributes) {
        for (name, attr) in &self.attributes {
            let Some(old) = prior.get(name) else { continue };
            if !config.contains(name) {
                if attr.computed {
                    config.set(*name, old.clone());
                }
                continue;
            }
            let Some(schema) = attr.block_schema() else { continue };
            let (AttrValue::List(old_items), Some(AttrValue::List(new_items))) =
                (old, config.get(name))
            else {
                continue;
            };

            let items = new_items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let counterpart = match attr.ty {
                        AttrType::BlockSet(_) => {
                            old_items.iter().find(|old| block_match(schema, old, item))
                        }
                        _ => old_items.get(index),
                    };
                    match (counterpart, item) {
                        (Some(AttrValue::Block(old_block)), AttrValue::Block(block)) => {
                            let mut block = block.clone();
                            schema.carry_computed(old_block, &mut block);
                            AttrValue::Block(block)
                        }
                        _ => item.clone(),
                    }
                })
                .collect();
            config.set(*name, AttrValue::List(items));
        }
    }

    /// Force-new attributes whose declared value differs from prior state.
    pub fn force_new_changes(&self, prior: &Attributes, config: &Attributes) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|(_, attr)| attr.force_new)
            .filter(|(name, attr)| !attr.matches(prior.get(name), config.get(name)))
            .map(|(name, _)| (*name).to_string())
            .collect()
    }

    /// User-settable attributes whose declared value differs from prior state.
    pub fn changed_attributes(&self, prior: &Attributes, config: &Attributes) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|(_, attr)| !attr.is_computed_only())
            .filter(|(name, attr)| !attr.matches(prior.get(name), config.get(name)))
            .map(|(name, _)| (*name).to_string())
            .collect()
    }

    /// Decode a JSON object into attributes, guided by attribute types.
    pub fn decode(&self, value: &Value) -> Result<Attributes> {
        self.decode_at(value, "")
    }

    fn decode_at(&self, value: &Value, prefix: &str) -> Result<Attributes> {
        let Value::Object(object) = value else {
            return Err(CxError::InvalidInput(format!(
                "{}: expected an object",
                if prefix.is_empty() { "configuration" } else { prefix }
            )));
        };

        let mut attrs = Attributes::new();
        for (key, raw) in object {
            let field = path(prefix, key);
            let attr = self
                .attributes
                .get(key.as_str())
                .ok_or_else(|| CxError::InvalidInput(format!("{field}: unknown attribute")))?;
            if raw.is_null() {
                continue;
            }
            attrs.set(key.clone(), attr.decode_value(raw, &field)?);
        }
        Ok(attrs)
    }

    /// Render attributes as JSON, optionally masking sensitive values.
    pub fn encode(&self, attrs: &Attributes, redact: bool) -> Value {
        let mut object = Map::new();
        for (key, value) in attrs.iter() {
            let rendered = match self.attributes.get(key) {
                Some(attr) if redact && attr.sensitive => Value::String(REDACTED.into()),
                Some(attr) => match (attr.block_schema(), value) {
                    (Some(schema), AttrValue::List(items)) => Value::Array(
                        items
                            .iter()
                            .map(|item| match item {
                                AttrValue::Block(block) => schema.encode(block, redact),
                                other => other.to_json(),
                            })
                            .collect(),
                    ),
                    _ => value.to_json(),
                },
                None => value.to_json(),
            };
            object.insert(key.to_string(), rendered);
        }
        Value::Object(object)
    }

    /// Block-aware equality that ignores server-computed values the user
    /// left unset.
    fn blocks_match(&self, prior: &Attributes, config: &Attributes) -> bool {
        self.attributes.iter().all(|(name, attr)| match config.get(name) {
            None if attr.computed => true,
            declared => attr.matches(prior.get(name), declared),
        })
    }
}

impl Attribute {
    fn validate_value(&self, value: &AttrValue, field: &str, errors: &mut ValidationError) {
        match (&self.ty, value) {
            (AttrType::String, AttrValue::String(s)) => self.check_str(s, field, errors),
            (AttrType::Bool, AttrValue::Bool(_)) | (AttrType::StringMap, AttrValue::Map(_)) => {}
            (AttrType::Int, AttrValue::Int(i)) => {
                for check in &self.checks {
                    if let Check::Int(validator) = check {
                        if let Err(message) = validator.validate(i) {
                            errors.add_field_error(field, message);
                        }
                    }
                }
            }
            (AttrType::StringList | AttrType::StringSet, AttrValue::List(items)) => {
                self.check_len(items.len(), field, errors);
                for (index, item) in items.iter().enumerate() {
                    match item {
                        AttrValue::String(s) => {
                            self.check_str(s, &format!("{field}.{index}"), errors);
                        }
                        other => errors.add_field_error(
                            format!("{field}.{index}"),
                            format!("expected string, found {}", other.type_name()),
                        ),
                    }
                }
            }
            (AttrType::BlockList(schema) | AttrType::BlockSet(schema), AttrValue::List(items)) => {
                self.check_len(items.len(), field, errors);
                for (index, item) in items.iter().enumerate() {
                    let item_path = format!("{field}.{index}");
                    match item {
                        AttrValue::Block(block) => schema.validate_into(block, &item_path, errors),
                        other => errors.add_field_error(
                            item_path,
                            format!("expected block, found {}", other.type_name()),
                        ),
                    }
                }
            }
            (expected, found) => errors.add_field_error(
                field,
                format!("expected {}, found {}", expected.name(), found.type_name()),
            ),
        }
    }

    fn check_str(&self, value: &str, field: &str, errors: &mut ValidationError) {
        for check in &self.checks {
            if let Check::Str(validator) = check {
                if let Err(message) = validator.validate(value) {
                    errors.add_field_error(field, message);
                }
            }
        }
    }

    fn check_len(&self, len: usize, field: &str, errors: &mut ValidationError) {
        if let Some(max) = self.max_items {
            if len > max {
                errors.add_field_error(field, format!("must not contain more than {max} items"));
            }
        }
    }

    fn matches(&self, prior: Option<&AttrValue>, declared: Option<&AttrValue>) -> bool {
        match (prior, declared) {
            (_, None) if self.computed => true,
            (None, None) => true,
            (Some(AttrValue::String(old)), Some(AttrValue::String(new))) => {
                old == new || self.diff_suppress.is_some_and(|suppress| suppress(old, new))
            }
            (Some(AttrValue::List(old)), Some(AttrValue::List(new))) => match &self.ty {
                AttrType::BlockList(schema) => {
                    old.len() == new.len()
                        && old.iter().zip(new).all(|(o, n)| block_match(schema, o, n))
                }
                AttrType::BlockSet(schema) => {
                    old.len() == new.len()
                        && new.iter().all(|n| old.iter().any(|o| block_match(schema, o, n)))
                }
                _ => old == new,
            },
            // An empty declared collection is the same as leaving it unset.
            (None, Some(AttrValue::List(new))) | (Some(AttrValue::List(new)), None) => {
                new.is_empty()
            }
            (old, new) => old == new,
        }
    }

    fn decode_value(&self, raw: &Value, field: &str) -> Result<AttrValue> {
        let invalid = || CxError::InvalidInput(format!("{field}: expected {}", self.ty.name()));
        match &self.ty {
            AttrType::String => raw.as_str().map(AttrValue::from).ok_or_else(invalid),
            AttrType::Bool => raw.as_bool().map(AttrValue::Bool).ok_or_else(invalid),
            AttrType::Int => raw.as_i64().map(AttrValue::Int).ok_or_else(invalid),
            AttrType::StringList | AttrType::StringSet => {
                let items = raw
                    .as_array()
                    .ok_or_else(invalid)?
                    .iter()
                    .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                    .collect::<Result<Vec<_>>>()?;
                Ok(if matches!(self.ty, AttrType::StringSet) {
                    AttrValue::string_set(items)
                } else {
                    AttrValue::string_list(items)
                })
            }
            AttrType::StringMap => raw
                .as_object()
                .ok_or_else(invalid)?
                .iter()
                .map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())).ok_or_else(invalid))
                .collect::<Result<BTreeMap<_, _>>>()
                .map(AttrValue::Map),
            AttrType::BlockList(schema) | AttrType::BlockSet(schema) => {
                let items = match raw {
                    Value::Array(items) => items.iter().collect::<Vec<_>>(),
                    Value::Object(_) => vec![raw],
                    _ => return Err(invalid()),
                };
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| schema.decode_at(item, &format!("{field}.{index}")))
                    .collect::<Result<Vec<_>>>()
                    .map(AttrValue::blocks)
            }
        }
    }
}

fn block_match(schema: &Schema, prior: &AttrValue, declared: &AttrValue) -> bool {
    match (prior, declared) {
        (AttrValue::Block(old), AttrValue::Block(new)) => schema.blocks_match(old, new),
        (old, new) => old == new,
    }
}

fn path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use cxform_common::validation::{OneOfValidator, RangeValidator, StringValidator};
    use serde_json::json;

    use super::*;

    fn request_schema() -> Schema {
        Schema::new()
            .attr("request_url_template", Attribute::string().required())
            .attr(
                "request_type",
                Attribute::string()
                    .required()
                    .validate_str(OneOfValidator::new(["GET", "PUT", "POST", "PATCH"])),
            )
            .attr("request_template", Attribute::string().optional().computed())
            .attr("headers", Attribute::string_map().optional())
    }

    fn schema() -> Schema {
        Schema::new()
            .attr("name", Attribute::string().required())
            .attr(
                "category",
                Attribute::string()
                    .required()
                    .validate_str(StringValidator::new().min_length(1).max_length(256)),
            )
            .attr("integration_id", Attribute::string().required().force_new())
            .attr("secure", Attribute::bool().optional().force_new().default(false))
            .attr(
                "access_token_validity_seconds",
                Attribute::int()
                    .optional()
                    .default(86_400i64)
                    .validate_int(RangeValidator::new(300, 172_800)),
            )
            .attr("scopes", Attribute::string_set().optional())
            .attr("secret", Attribute::string().optional().sensitive())
            .attr("version", Attribute::int().computed())
            .attr("config_request", Attribute::block_list(request_schema()).optional().max_items(1))
    }

    fn config() -> Attributes {
        Attributes::new()
            .with("name", "Lookup")
            .with("category", "Web Services")
            .with("integration_id", "i1")
            .with(
                "config_request",
                AttrValue::single_block(
                    Attributes::new()
                        .with("request_url_template", "https://example.com/${input.id}")
                        .with("request_type", "GET"),
                ),
            )
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(schema().validate(&config()).is_ok());
    }

    #[test]
    fn test_rejects_unknown_and_missing_attributes() {
        let mut attrs = config().with("colour", "blue");
        attrs.remove("name");
        let err = schema().validate(&attrs).unwrap_err();
        let CxError::InvalidInput(message) = err else { panic!("expected InvalidInput") };
        assert!(message.contains("colour: unknown attribute"));
        assert!(message.contains("name: is required"));
    }

    #[test]
    fn test_rejects_nested_enum_violation() {
        let attrs = config().with(
            "config_request",
            AttrValue::single_block(
                Attributes::new().with("request_url_template", "u").with("request_type", "DELETE"),
            ),
        );
        let err = schema().validate(&attrs).unwrap_err();
        assert!(err.to_string().contains("config_request.0.request_type"));
    }

    #[test]
    fn test_rejects_out_of_range_int_and_type_errors() {
        let attrs = config().with("access_token_validity_seconds", 60i64).with("secure", "yes");
        let message = schema().validate(&attrs).unwrap_err().to_string();
        assert!(message
            .contains("access_token_validity_seconds: Value must be between 300 and 172800"));
        assert!(message.contains("secure: expected bool, found string"));
    }

    #[test]
    fn test_rejects_computed_only_and_max_items() {
        let block = Attributes::new().with("request_url_template", "u").with("request_type", "GET");
        let attrs = config()
            .with("version", 3i64)
            .with("config_request", AttrValue::blocks([block.clone(), block]));
        let message = schema().validate(&attrs).unwrap_err().to_string();
        assert!(message.contains("version: is computed"));
        assert!(message.contains("more than 1 items"));
    }

    #[test]
    fn test_defaults_fill_unset_attributes() {
        let mut attrs = config();
        schema().apply_defaults(&mut attrs);
        assert_eq!(attrs.get_bool("secure").unwrap(), Some(false));
        assert_eq!(attrs.get_int("access_token_validity_seconds").unwrap(), Some(86_400));
    }

    #[test]
    fn test_force_new_and_changed_attributes() {
        let prior = config().with("version", 2i64);
        let renamed = config().with("name", "Lookup v2");
        assert!(schema().force_new_changes(&prior, &renamed).is_empty());
        assert_eq!(schema().changed_attributes(&prior, &renamed), vec!["name".to_string()]);

        let moved = config().with("integration_id", "i2");
        assert_eq!(schema().force_new_changes(&prior, &moved), vec!["integration_id".to_string()]);
    }

    #[test]
    fn test_carry_computed_keeps_server_values_in_nested_blocks() {
        let server_block = Attributes::new()
            .with("request_url_template", "https://example.com/${input.id}")
            .with("request_type", "GET")
            .with("request_template", "${input.rawRequest}");
        let prior = config()
            .with("version", 2i64)
            .with("config_request", AttrValue::single_block(server_block));
        let mut renamed = config().with("name", "Lookup v2");

        schema().carry_computed(&prior, &mut renamed);

        assert_eq!(renamed.get_int("version").unwrap(), Some(2));
        assert_eq!(renamed.get_string("name").unwrap(), Some("Lookup v2"));
        let block = renamed.get_block("config_request").unwrap().unwrap();
        assert_eq!(block.get_string("request_template").unwrap(), Some("${input.rawRequest}"));
        assert_eq!(block.get_string("request_type").unwrap(), Some("GET"));
    }

    #[test]
    fn test_carry_computed_leaves_declared_and_plain_optional_values() {
        let prior = config().with("scopes", AttrValue::string_set(["a"])).with("secret", "s");
        let mut declared = config().with(
            "config_request",
            AttrValue::single_block(
                Attributes::new()
                    .with("request_url_template", "u")
                    .with("request_type", "POST")
                    .with("request_template", "{}"),
            ),
        );

        schema().carry_computed(&prior, &mut declared);

        assert!(!declared.contains("scopes"));
        assert!(!declared.contains("secret"));
        let block = declared.get_block("config_request").unwrap().unwrap();
        assert_eq!(block.get_string("request_template").unwrap(), Some("{}"));
    }

    #[test]
    fn test_computed_block_fields_do_not_count_as_changes() {
        let mut prior = config();
        prior.set(
            "config_request",
            AttrValue::single_block(
                Attributes::new()
                    .with("request_url_template", "https://example.com/${input.id}")
                    .with("request_type", "GET")
                    .with("request_template", "${input.rawRequest}"),
            ),
        );
        assert!(schema().changed_attributes(&prior, &config()).is_empty());
    }

    #[test]
    fn test_decode_uses_schema_types() {
        let attrs = schema()
            .decode(&json!({
                "name": "Lookup",
                "scopes": ["b", "a", "b"],
                "config_request": {
                    "request_url_template": "u",
                    "request_type": "GET",
                    "headers": {"X-A": "1"}
                },
                "secret": null
            }))
            .unwrap();
        assert_eq!(attrs.get_string_list("scopes").unwrap(), Some(vec!["a".into(), "b".into()]));
        let block = attrs.get_block("config_request").unwrap().unwrap();
        assert_eq!(block.get_string_map("headers").unwrap().unwrap()["X-A"], "1");
        assert!(!attrs.contains("secret"));
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        let err = schema().decode(&json!({"secure": "true"})).unwrap_err();
        assert_eq!(err, CxError::InvalidInput("secure: expected bool".into()));
    }

    #[test]
    fn test_encode_redacts_sensitive_values() {
        let attrs = config().with("secret", "hunter2");
        let json = schema().encode(&attrs, true);
        assert_eq!(json["secret"], REDACTED);
        assert_eq!(json["config_request"][0]["request_type"], "GET");
        assert_eq!(schema().encode(&attrs, false)["secret"], "hunter2");
    }
}
