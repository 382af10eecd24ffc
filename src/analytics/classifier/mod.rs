pub mod geo;
pub mod referrer;
pub mod user_agent;

pub use geo::{GeoClassifier, GeoInfo, NullGeoClassifier};
pub use referrer::classify_referrer;
pub use user_agent::{UaInfo, classify_user_agent};
