use crate::core::retry::RetryPolicy;
use crate::domain::model::{BlogPost, Review, Venue};
use async_trait::async_trait;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn retry_policy(&self) -> RetryPolicy;
    fn city_hub_overrides(&self) -> Vec<(String, String)>;
}

/// Remote venue, review and blog content.
///
/// Implementations swallow transport failures: lists come back empty and
/// single lookups come back `None`.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn venues(&self, city: Option<&str>) -> Vec<Venue>;
    async fn venue(&self, id: &str) -> Option<Venue>;
    async fn reviews(&self, venue_id: &str) -> Vec<Review>;
    async fn blog_posts(&self) -> Vec<BlogPost>;
    async fn blog_post(&self, slug: &str) -> Option<BlogPost>;
}

/// Uniform samples in `[0, 1)` used to jitter retry delays.
pub trait JitterSource: Send + Sync {
    fn sample(&self) -> f64;
}
