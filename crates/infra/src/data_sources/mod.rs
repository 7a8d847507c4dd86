//! Read-only lookups by name
//!
//! Search indexes lag behind writes, so both lookups retry until a match
//! shows up or the search timeout passes.

pub mod routing_queue;
pub mod schedule_group;

pub use routing_queue::RoutingQueueDataSource;
pub use schedule_group::ScheduleGroupDataSource;
