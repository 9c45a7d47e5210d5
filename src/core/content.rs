use crate::core::retry::{RandomJitter, RetryPolicy, RetryingLoader};
use crate::core::{BlogPost, ConfigProvider, ContentApi, JitterSource, Review, Venue};
use crate::utils::error::{HubError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// REST client for venue, review and blog content.
pub struct HttpContentApi<J: JitterSource = RandomJitter> {
    client: Client,
    base_url: String,
    loader: RetryingLoader<J>,
}

impl HttpContentApi<RandomJitter> {
    pub fn new(base_url: impl Into<String>, timeout: Duration, policy: RetryPolicy) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_loader(
            client,
            base_url,
            RetryingLoader::with_policy(policy),
        ))
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.api_base_url(),
            config.request_timeout(),
            config.retry_policy(),
        )
    }
}

impl<J: JitterSource> HttpContentApi<J> {
    pub fn with_loader(client: Client, base_url: impl Into<String>, loader: RetryingLoader<J>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            loader,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| HubError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        url.path_segments_mut()
            .map_err(|_| HubError::InvalidConfigValueError {
                field: "api.base_url".to_string(),
                value: self.base_url.clone(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &Url, query: &[(&str, &str)]) -> Result<T> {
        let client = &self.client;

        self.loader
            .load(move || async move {
                tracing::debug!("GET {}", url);
                let response = client
                    .get(url.clone())
                    .query(query)
                    .send()
                    .await
                    .map_err(HubError::from_request)?;

                let status = response.status();
                if !status.is_success() {
                    return Err(HubError::HttpStatus {
                        status,
                        url: url.to_string(),
                    });
                }

                response.json::<T>().await.map_err(HubError::from_request)
            })
            .await
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        what: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Vec<T> {
        let fetched = match self.endpoint(segments) {
            Ok(url) => self.fetch_json::<Vec<T>>(&url, query).await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(items) => {
                tracing::debug!("Fetched {} {}", items.len(), what);
                items
            }
            Err(e) => {
                tracing::error!("❌ Failed to fetch {}: {}", what, e);
                Vec::new()
            }
        }
    }

    async fn fetch_one<T: DeserializeOwned>(&self, what: &str, segments: &[&str]) -> Option<T> {
        let fetched = match self.endpoint(segments) {
            Ok(url) => self.fetch_json::<T>(&url, &[]).await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(item) => Some(item),
            Err(e) if e.is_not_found() => {
                tracing::debug!("No {} at {}", what, segments.join("/"));
                None
            }
            Err(e) => {
                tracing::error!("❌ Failed to fetch {}: {}", what, e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl<J: JitterSource> ContentApi for HttpContentApi<J> {
    async fn venues(&self, city: Option<&str>) -> Vec<Venue> {
        match city.map(str::trim).filter(|c| !c.is_empty()) {
            Some(city) => self.fetch_list("venues", &["venues"], &[("city", city)]).await,
            None => self.fetch_list("venues", &["venues"], &[]).await,
        }
    }

    async fn venue(&self, id: &str) -> Option<Venue> {
        self.fetch_one("venue", &["venues", id]).await
    }

    async fn reviews(&self, venue_id: &str) -> Vec<Review> {
        self.fetch_list("reviews", &["venues", venue_id, "reviews"], &[])
            .await
    }

    async fn blog_posts(&self) -> Vec<BlogPost> {
        self.fetch_list("blog posts", &["blog"], &[]).await
    }

    async fn blog_post(&self, slug: &str) -> Option<BlogPost> {
        self.fetch_one("blog post", &["blog", slug]).await
    }
}
