//! Architect flows
//!
//! Flows are not written field by field. Create and update register an
//! import job, upload the flow file to the presigned URL the job hands back,
//! then wait for the job to finish publishing.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cxform_common::PollStep;
use cxform_core::reconcile::{collect_pages, confirm_deleted, poll, read_entity};
use cxform_core::{
    Attribute, Attributes, ExportedResources, OpContext, ResourceAdapter, ResourceData,
    ResourceMeta, Schema,
};
use cxform_domain::constants::DEFAULT_PAGE_SIZE;
use cxform_domain::{ArchitectJobStatus, CxError, EntityListing, Flow, RegisterArchitectJob, Result};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::encode_id;
use crate::api::PlatformClient;

pub const TYPE_NAME: &str = "genesyscloud_architect_flow";
const KIND: &str = "flow";
const BASE_PATH: &str = "/api/v2/flows";
const JOBS_PATH: &str = "/api/v2/flows/jobs";
const UNLOCK_PATH: &str = "/api/v2/flows/actions/unlock";

pub struct ArchitectFlowResource {
    client: Arc<PlatformClient>,
    schema: Schema,
}

/// Hex SHA-256 of the file at `path`.
pub fn file_content_hash(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let content = std::fs::read(path)
        .map_err(|e| CxError::InvalidInput(format!("Failed to read {}: {e}", path.display())))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

impl ArchitectFlowResource {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client, schema: schema() }
    }

    fn path(id: &str) -> String {
        format!("{BASE_PATH}/{}", encode_id(id))
    }

    async fn get_flow(&self, id: &str) -> Result<Flow> {
        self.client.get(&Self::path(id)).await
    }

    async fn job_status(&self, job_id: &str) -> Result<ArchitectJobStatus> {
        self.client
            .get_with_query(
                &format!("{JOBS_PATH}/{}", encode_id(job_id)),
                &[("expand", "messages".to_string())],
            )
            .await
    }

    /// Import the flow file and return the id of the published flow.
    async fn import(&self, ctx: &OpContext, filepath: &str) -> Result<String> {
        let content = tokio::fs::read(filepath)
            .await
            .map_err(|e| CxError::InvalidInput(format!("Failed to read {filepath}: {e}")))?;

        let job: RegisterArchitectJob = self.client.post(JOBS_PATH, &json!({})).await?;
        let job_id = job
            .id
            .ok_or_else(|| CxError::Internal("registered flow job has no id".into()))?;
        let upload_url = job.presigned_url.ok_or_else(|| {
            CxError::Internal(format!("flow job {job_id} has no presigned upload URL"))
        })?;
        debug!(job_id = %job_id, "Registered flow import job");

        self.client.upload(&upload_url, &job.headers.unwrap_or_default(), content).await?;
        info!(job_id = %job_id, filepath, "Uploaded flow file");

        let what = format!("flow import job {job_id}");
        poll(ctx, ctx.policy().flow_job_timeout, &what, || async {
            let status = self.job_status(&job_id).await?;
            if status.is_failure() {
                return Err(CxError::Api {
                    status: 400,
                    message: format!("flow import job {job_id} failed: {}", status.message_text()),
                });
            }
            if !status.is_success() {
                let state = status.status.unwrap_or_else(|| "unknown".into());
                return Ok(PollStep::Pending(format!("job status {state}")));
            }
            match status.flow.and_then(|flow| flow.id) {
                Some(flow_id) => Ok(PollStep::Ready(flow_id)),
                None => Err(CxError::Internal(format!("flow import job {job_id} has no flow"))),
            }
        })
        .await
    }
}

fn schema() -> Schema {
    Schema::new()
        .attr(
            "filepath",
            Attribute::string()
                .required()
                .describe("Path to the flow configuration file to import."),
        )
        .attr(
            "file_content_hash",
            Attribute::string()
                .optional()
                .computed()
                .describe("SHA-256 of the flow file. A changed hash re-imports the flow."),
        )
        .attr(
            "force_unlock",
            Attribute::bool()
                .optional()
                .default(false)
                .describe("Unlock the flow before deleting it if another user holds the lock."),
        )
        .attr("name", Attribute::string().computed())
        .attr("type", Attribute::string().computed())
}

#[async_trait]
impl ResourceAdapter for ArchitectFlowResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn prepare_config(&self, config: &mut Attributes) -> Result<()> {
        if config.contains("file_content_hash") {
            return Ok(());
        }
        let hash = file_content_hash(config.require_string("filepath")?)?;
        config.set("file_content_hash", hash);
        Ok(())
    }

    async fn create(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let filepath = data.attrs().require_string("filepath")?.to_string();
        info!(filepath = %filepath, "Creating {KIND}");

        let id = self.import(ctx, &filepath).await?;
        data.set_id(&id);

        info!(id = %id, filepath = %filepath, "Created {KIND}");
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Reading {KIND}");

        let Some(flow) = read_entity(ctx, data, KIND, || self.get_flow(&id)).await? else {
            data.clear_id();
            return Ok(());
        };

        data.set_opt("name", flow.name);
        data.set_opt("type", flow.flow_type);
        info!(id = %id, "Read {KIND}");
        Ok(())
    }

    async fn update(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        let filepath = data.attrs().require_string("filepath")?.to_string();
        info!(id = %id, filepath = %filepath, "Updating {KIND}");

        let flow_id = self.import(ctx, &filepath).await?;
        if flow_id != id {
            // The file named a different flow
            data.set_id(&flow_id);
        }

        info!(id = %flow_id, "Updated {KIND}");
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id()?.to_string();
        info!(id = %id, "Deleting {KIND}");

        if data.get_bool("force_unlock")?.unwrap_or(false) {
            self.client.post_empty(UNLOCK_PATH, &[("flow", id.clone())]).await?;
            debug!(id = %id, "Unlocked {KIND}");
        }

        self.client.delete(&Self::path(&id)).await?;
        confirm_deleted(ctx, KIND, &id, || self.get_flow(&id), |_: &Flow| false).await?;

        info!(id = %id, "Deleted {KIND}");
        Ok(())
    }

    async fn export(&self, ctx: &OpContext) -> Result<ExportedResources> {
        let flows = collect_pages(ctx, DEFAULT_PAGE_SIZE, |page| async move {
            let listing: EntityListing<Flow> = self
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

        Ok(flows
            .into_iter()
            .filter(|flow| !flow.system.unwrap_or(false))
            .filter_map(|flow| Some((flow.id?, ResourceMeta::new(flow.name.unwrap_or_default()))))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_hashes_file_content() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "hello").unwrap();
        assert_eq!(
            file_content_hash(file.path()).unwrap(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_missing_file_is_invalid_input() {
        let err = file_content_hash("/nonexistent/flow.yaml").unwrap_err();
        assert!(matches!(err, CxError::InvalidInput(_)));
    }
}
