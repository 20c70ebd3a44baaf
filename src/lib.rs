pub mod cyclocity;
pub mod pipeline;
pub mod trips;
