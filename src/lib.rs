pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::TomlConfig;

pub use core::city_hub::CityHubTable;
pub use core::content::HttpContentApi;
pub use core::retry::{
    classify_failure, load_with_retry, FailureClass, FixedJitter, RandomJitter, RetryPolicy,
    RetryingLoader,
};
pub use core::{BlogPost, ConfigProvider, ContentApi, JitterSource, Review, Venue};
pub use utils::error::{HubError, Result};
