use crate::core::city_hub::CityHubTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub city: String,
    pub state: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f32>,
    pub lanes: Option<u32>,
    pub website: Option<String>,
}

impl Venue {
    /// Cross-link to the hub page for this venue's city, if one exists.
    pub fn hub_url<'a>(&self, hubs: &'a CityHubTable) -> Option<&'a str> {
        hubs.get_city_hub_url(Some(&self.city))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub venue_id: String,
    pub author: String,
    pub rating: u8,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}
