pub mod config;
pub mod dataset;
pub mod dispatch;
pub mod export;
pub mod http_client;
pub mod loader;
pub mod matchup_bundles;
pub mod normalize;
pub mod pipeline;
pub mod query_catalog;
pub mod roster_groups;
pub mod sort_filter;
pub mod state;
pub mod view;
