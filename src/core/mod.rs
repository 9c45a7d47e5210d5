pub mod city_hub;
pub mod content;
pub mod retry;

pub use crate::domain::model::{BlogPost, Review, Venue};
pub use crate::domain::ports::{ConfigProvider, ContentApi, JitterSource};
pub use crate::utils::error::Result;
