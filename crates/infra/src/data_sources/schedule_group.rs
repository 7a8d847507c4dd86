//! Schedule group lookup by name

use std::sync::Arc;

use async_trait::async_trait;
use cxform_core::reconcile::search_until_found;
use cxform_core::{Attribute, DataSource, OpContext, ResourceData, Schema};
use cxform_domain::constants::DEFAULT_PAGE_SIZE;
use cxform_domain::{EntityListing, Result, ScheduleGroup};
use tracing::info;

use crate::api::PlatformClient;

pub const TYPE_NAME: &str = "genesyscloud_architect_schedulegroups";
const SCHEDULE_GROUPS_PATH: &str = "/api/v2/architect/schedulegroups";

pub struct ScheduleGroupDataSource {
    client: Arc<PlatformClient>,
    schema: Schema,
}

impl ScheduleGroupDataSource {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        let schema = Schema::new()
            .attr("name", Attribute::string().required().describe("Schedule group name."));
        Self { client, schema }
    }

    /// The first search result is taken as the match.
    async fn find(&self, name: &str) -> Result<Option<String>> {
        let listing: EntityListing<ScheduleGroup> = self
            .client
            .get_with_query(
                SCHEDULE_GROUPS_PATH,
                &[
                    ("pageSize", DEFAULT_PAGE_SIZE.to_string()),
                    ("pageNumber", "1".to_string()),
                    ("name", name.to_string()),
                ],
            )
            .await?;
        Ok(listing.into_entities().into_iter().next().and_then(|group| group.id))
    }
}

#[async_trait]
impl DataSource for ScheduleGroupDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, ctx: &OpContext, data: &mut ResourceData) -> Result<()> {
        let name = data.attrs().require_string("name")?.to_string();
        let what = format!("schedule group named {name}");
        let id = search_until_found(ctx, &what, || self.find(&name)).await?;
        info!(name = %name, id = %id, "Found schedule group");
        data.set_id(id);
        Ok(())
    }
}
