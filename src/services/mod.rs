pub mod analytics_service;
pub mod link_service;

pub use analytics_service::{AnalyticsScope, AnalyticsService};
pub use link_service::{CreateLinkRequest, LinkService, UpdateLinkRequest};
