//! Integration data actions
//!
//! The contract is immutable; changing it replaces the action. Request and
//! success templates live behind a separate template endpoint and are read
//! back from there.

use std::sync::Arc;

use async_trait::async_trait;
use cxform_common::{OneOfValidator, StringValidator};
use cxform_core::diff::json_equivalent;
use cxform_core::reconcile::{
    collect_pages, confirm_deleted, read_entity, settle, update_with_version_retry,
};
use cxform_core::{
    AttrValue, Attribute, Attributes, ExportedResources, OpContext, RefAttr, ResourceAdapter,
    ResourceData, ResourceMeta, Schema,
};
use cxform_domain::constants::{
    DEFAULT_PAGE_SIZE, REQUEST_TEMPLATE_NAME, STATIC_ACTION_PREFIX, SUCCESS_TEMPLATE_NAME,
};
use cxform_domain::{
    ActionConfig, ActionContract, ActionInput, ActionOutput, CxError, EntityListing,
    IntegrationAction, RequestConfig, ResponseConfig, Result, UpdateActionInput,
};
use serde_json::Value;
use tracing::info;

use super::{encode_id, set_unless_equivalent};
use crate::api::PlatformClient;

pub const TYPE_NAME: &str = "genesyscloud_integration_action";
const KIND: &str = "integration action";
const BASE_PATH: &str = "/api/v2/integrations/actions";

const REFERENCES: &[RefAttr] = &[RefAttr::new("integration_id", "genesyscloud_integration")];

/// An action together with its two templates.
struct ActionSnapshot {
    action: IntegrationAction,
    request_template: String,
    success_template: String,
}

pub struct IntegrationActionResource {
    client: Arc<PlatformClient>,
    schema: Schema,
}

impl IntegrationActionResource {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client, schema: schema() }
    }

    async fn get_action(&self, id: &str) -> Result<IntegrationAction> {
        self.client
            .get_with_query(
                &format!("{BASE_PATH}/{}", encode_id(id)),
                &[("expand", "contract".to_string()), ("includeConfig", "true".to_string())],
            )
            .await
    }

    async fn get_template(&self, id: &str, name: &str) -> Result<Option<String>> {
        let path = format!("{BASE_PATH}/{}/templates/{name}", encode_id(id));
        match self.client.get_text(&path).await {
            Ok(template) => Ok(Some(template)),
            Err(CxError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// `Ok(None)` when a template is missing, which means the action is gone.
    async fn snapshot(&self, id: &str) -> Result<Option<ActionSnapshot>> {
        let action = self.get_action(id).await?;
        let Some(request_template) = self.get_template(id, REQUEST_TEMPLATE_NAME).await? else {
            return Ok(None);
        };
        let Some(success_template) = self.get_template(id, SUCCESS_TEMPLATE_NAME).await? else {
            return Ok(None);
        };
        Ok(Some(ActionSnapshot { action, request_template, success_template }))
    }
}

fn schema() -> Schema {
    let request = Schema::new()
        .attr(
            "request_url_template",
            Attribute::string()
                .required()
                .describe("URL that may include placeholders for requests to 3rd party service."),
        )
        .attr(
            "request_type",
            Attribute::string()
                .required()
                .describe("HTTP method to use for request (GET | PUT | POST | PATCH).")
                .validate_str(OneOfValidator::new(["GET", "PUT", "POST", "PATCH"])),
        )
        .attr(
            "request_template",
            Attribute::string()
                .optional()
                .computed()
                .describe("Velocity template to define request body sent to 3rd party service."),
        )
        .attr("headers", Attribute::string_map().optional());

    let response = Schema::new()
        .attr("translation_map", Attribute::string_map().optional())
        .attr("translation_map_defaults", Attribute::string_map().optional())
        .attr(
            "success_template",
            Attribute::string()
                .optional()
                .computed()
                .describe("Velocity template to build response to return from Action."),
        );

    let name_rule = || StringValidator::new().min_length(1).max_length(256);

    Schema::new()
        .attr("name", Attribute::string().required().validate_str(name_rule()))
        .attr("category", Attribute::string().required().validate_str(name_rule()))
        .attr(
            "integration_id",
            Attribute::string()
                .required()
                .force_new()
                .describe("The ID of the integration this action is associated with."),
        )
        .attr("secure", Attribute::bool().optional().default(false).force_new())
        .attr(
            "contract_input",
            Attribute::string()
                .required()
                .force_new()
                .suppress_diff(json_equivalent)
                .describe("JSON Schema of the request body sent to the action."),
        )
        .attr(
            "contract_output",
            Attribute::string()
                .required()
                .force_new()
                .suppress_diff(json_equivalent)
                .describe("JSON Schema of the successful result returned to the caller."),
        )
        .attr("config_request", Attribute::block_list(request).required().max_items(1))
        .attr(
            "config_response",
            Attribute::block_list(response).optional().computed().max_items(1),
        )
}

fn parse_contract(data: &ResourceData, key: &str) -> Result<Value> {
    let raw = data.attrs().require_string(key)?;
    serde_json::from_str(raw)
        .map_err(|e| CxError::InvalidInput(format!("Failed to parse {key} {raw}: {e}")))
}

fn build_contract(data: &ResourceData) -> Result<ActionContract> {
    Ok(ActionContract {
        input: Some(ActionInput { input_schema: Some(parse_contract(data, "contract_input")?) }),
        output: Some(ActionOutput {
            success_schema: Some(parse_contract(data, "contract_output")?),
        }),
    })
}

fn build_config(data: &ResourceData) -> Result<ActionConfig> {
    let request = match data.attrs().get_block("config_request")? {
        Some(block) => RequestConfig {
            request_url_template: block.get_string("request_url_template")?.map(str::to_string),
            request_template: Some(
                block.get_string("request_template")?.unwrap_or_default().to_string(),
            ),
            request_type: block.get_string("request_type")?.map(str::to_string),
            headers: Some(block.get_string_map("headers")?.cloned().unwrap_or_default()),
        },
        None => RequestConfig::default(),
    };

    let response = match data.attrs().get_block("config_response")? {
        Some(block) => ResponseConfig {
            translation_map: Some(
                block.get_string_map("translation_map")?.cloned().unwrap_or_default(),
            ),
            translation_map_defaults: Some(
                block.get_string_map("translation_map_defaults")?.cloned().unwrap_or_default(),
            ),
            success_template: Some(
                block.get_string("success_template")?.unwrap_or_default().to_string(),
            ),
        },
        None => ResponseConfig::default(),
    };

    Ok(ActionConfig { request: Some(request), response: Some(response) })
}

fn flatten_schema(schema: Option<&Value>) -> Option<String> {
    schema.map(Value::to_string)
}

fn flatten_request(request: &RequestConfig, template: String) -> Attributes {
    let mut block = Attributes::new();
    block.set_opt("request_url_template", request.request_url_template.clone());
    block.set_opt("request_type", request.request_type.clone());
    block.set("request_template", template);
    block.set_opt("headers", request.headers.clone().filter(|headers| !headers.is_empty()));
    block
}

fn flatten_response(response: &ResponseConfig, template: String) -> Attributes {
    let mut block = Attributes::new();
    block.set_opt("translation_map", response.translation_map.clone().filter(|m| !m.is_empty()));
    block.set_opt(
        "translation_map_defaults",
        response.translation_map_defaults.clone().filter(|m| !m.is_empty()),
    );
    block.set("success_template", template);
    block
}

fn apply_snapshot(data: &mut ResourceData, snapshot: ActionSnapshot) {
    let ActionSnapshot { action, request_template, success_template } = snapshot;

    data.set_opt("name", action.name);
    data.set_opt("category", action.category);
    data.set_opt("integration_id", action.integration_id);
    data.set_opt("secure", action.secure);

    let contract = action.contract.unwrap_or_default();
    let input = flatten_schema(contract.input.as_ref().and_then(|i| i.input_schema.as_ref()));
    let output = flatten_schema(contract.output.as_ref().and_then(|o| o.success_schema.as_ref()));
    set_unless_equivalent(data, "contract_input", input, json_equivalent);
    set_unless_equivalent(data, "contract_output", output, json_equivalent);

    let config = action.config.unwrap_or_default();
    let request = config.request.map(|r| flatten_request(&r, request_template));
    let response = config.response.map(|r| flatten_response(&r, success_template));
    data.set_opt("config_request", request.map(AttrValue::single_block));
    data.set_opt("config_response", response.map(AttrValue::single_block));
}

#[async_trait]
impl ResourceAdapter for IntegrationActionResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let name = data.attrs().require_string("name")?.to_string();
        info!(name = %name, "Creating {KIND}");

        let body = IntegrationAction {
            name: Some(name.clone()),
            category: data.get_string("category")?.map(str::to_string),
            integration_id: data.get_string("integration_id")?.map(str::to_string),
            secure: Some(data.get_bool("secure")?.unwrap_or(false)),
            contract: Some(build_contract(data)?),
            config: Some(build_config(data)?),
            ..IntegrationAction::default()
        };
        let created: IntegrationAction = self.client.post(BASE_PATH, &body).await?;
        let id = created
            .id
            .ok_or_else(|| CxError::Internal(format!("created {KIND} {name} has no id")))?;
        data.set_id(&id);

        info!(id = %id, name = %name, "Created {KIND}");
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Reading {KIND}");

        let snapshot = read_entity(ctx, data, KIND, || self.snapshot(&id)).await?.flatten();
        let Some(snapshot) = snapshot else {
            data.clear_id();
            return Ok(());
        };

        apply_snapshot(data, snapshot);
        info!(id = %id, "Read {KIND}");
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        let name = data.attrs().require_string("name")?.to_string();
        let category = data.get_string("category")?.map(str::to_string);
        let config = build_config(data)?;
        info!(id = %id, name = %name, "Updating {KIND}");

        update_with_version_retry(ctx, KIND, &id, || async {
            // The PATCH must carry the latest version
            let current = self.get_action(&id).await?;
            let body = UpdateActionInput {
                name: Some(name.clone()),
                category: category.clone(),
                config: Some(config.clone()),
                version: current.version,
            };
            let _: IntegrationAction =
                self.client.patch(&format!("{BASE_PATH}/{}", encode_id(&id)), &body).await?;
            Ok(())
        })
        .await?;

        info!(id = %id, name = %name, "Updated {KIND}");
        settle(ctx, ctx.policy().settle_delay).await?;
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Deleting {KIND}");

        self.client.delete(&format!("{BASE_PATH}/{}", encode_id(&id))).await?;
        confirm_deleted(ctx, KIND, &id, || self.get_action(&id), |_: &IntegrationAction| false)
            .await?;

        info!(id = %id, "Deleted {KIND}");
        Ok(())
    }

    async fn export(&self, ctx: &OpContext) -> Result<ExportedResources> {
        let actions = collect_pages(ctx, DEFAULT_PAGE_SIZE, |page| async move {
            let listing: EntityListing<IntegrationAction> = self
                .client
                .get_with_query(
                    BASE_PATH,
                    &[
                        ("pageSize", DEFAULT_PAGE_SIZE.to_string()),
                        ("pageNumber", page.to_string()),
                    ],
                )
                .await?;
            Ok(listing.into_entities())
        })
        .await?;

        Ok(actions
            .into_iter()
            .filter_map(|action| {
                let id = action.id?;
                // Built-in actions cannot be managed
                if id.starts_with(STATIC_ACTION_PREFIX) {
                    return None;
                }
                Some((id, ResourceMeta::new(action.name.unwrap_or_default())))
            })
            .collect())
    }

    fn references(&self) -> &'static [RefAttr] {
        REFERENCES
    }
}
