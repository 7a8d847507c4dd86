//! Routing queue lookup by exact name

use std::sync::Arc;

use async_trait::async_trait;
use cxform_core::reconcile::search_until_found;
use cxform_core::{Attribute, DataSource, OpContext, ResourceData, Schema};
use cxform_domain::constants::DEFAULT_PAGE_SIZE;
use cxform_domain::{EntityListing, Queue, Result};
use tracing::{debug, info};

use crate::api::PlatformClient;

pub const TYPE_NAME: &str = "genesyscloud_routing_queue";
const QUEUES_PATH: &str = "/api/v2/routing/queues";

pub struct RoutingQueueDataSource {
    client: Arc<PlatformClient>,
    schema: Schema,
}

impl RoutingQueueDataSource {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        let schema =
            Schema::new().attr("name", Attribute::string().required().describe("Queue name."));
        Self { client, schema }
    }

    /// Page through the name search until a queue with exactly `name` turns
    /// up. An empty page means the search has nothing (yet).
    async fn find(&self, name: &str) -> Result<Option<String>> {
        for page in 1u32.. {
            let listing: EntityListing<Queue> = self
                .client
                .get_with_query(
                    QUEUES_PATH,
                    &[
                        ("pageSize", DEFAULT_PAGE_SIZE.to_string()),
                        ("pageNumber", page.to_string()),
                        ("name", name.to_string()),
                    ],
                )
                .await?;
            let queues = listing.into_entities();
            if queues.is_empty() {
                debug!(name, page, "No matching routing queue yet");
                return Ok(None);
            }
            if let Some(id) = queues
                .into_iter()
                .find(|queue| queue.name.as_deref() == Some(name))
                .and_then(|queue| queue.id)
            {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl DataSource for RoutingQueueDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let name = data.attrs().require_string("name")?.to_string();
        let what = format!("routing queue named {name}");
        let id = search_until_found(ctx, &what, || self.find(&name)).await?;
        info!(name = %name, id = %id, "Found routing queue");
        data.set_id(id);
        Ok(())
    }
}
