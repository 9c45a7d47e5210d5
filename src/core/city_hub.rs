use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_root_relative_path};
use std::collections::HashMap;

const BUILTIN_HUBS: &[(&str, &str)] = &[
    ("albuquerque", "/best-bowling-in-albuquerque"),
    ("atlanta", "/best-bowling-in-atlanta"),
    ("austin", "/best-bowling-in-austin"),
    ("boston", "/best-bowling-in-boston"),
    ("charlotte", "/best-bowling-in-charlotte"),
    ("chicago", "/best-bowling-in-chicago"),
    ("columbus", "/best-bowling-in-columbus"),
    ("dallas", "/best-bowling-in-dallas"),
    ("denver", "/best-bowling-in-denver"),
    ("detroit", "/best-bowling-in-detroit"),
    ("el paso", "/best-bowling-in-el-paso"),
    ("fort worth", "/best-bowling-in-fort-worth"),
    ("houston", "/best-bowling-in-houston"),
    ("indianapolis", "/best-bowling-in-indianapolis"),
    ("jacksonville", "/best-bowling-in-jacksonville"),
    ("kansas city", "/best-bowling-in-kansas-city"),
    ("las vegas", "/best-bowling-in-las-vegas"),
    ("los angeles", "/best-bowling-in-los-angeles"),
    ("memphis", "/best-bowling-in-memphis"),
    ("milwaukee", "/best-bowling-in-milwaukee"),
    ("minneapolis", "/best-bowling-in-minneapolis"),
    ("nashville", "/best-bowling-in-nashville"),
    ("new york", "/best-bowling-in-new-york"),
    ("oklahoma city", "/best-bowling-in-oklahoma-city"),
    ("philadelphia", "/best-bowling-in-philadelphia"),
    ("phoenix", "/best-bowling-in-phoenix"),
    ("portland", "/best-bowling-in-portland"),
    ("san antonio", "/best-bowling-in-san-antonio"),
    ("san diego", "/best-bowling-in-san-diego"),
    ("san francisco", "/best-bowling-in-san-francisco"),
    ("san jose", "/best-bowling-in-san-jose"),
    ("seattle", "/best-bowling-in-seattle"),
    ("tucson", "/best-bowling-in-tucson"),
    ("washington", "/best-bowling-in-washington-dc"),
];

fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

/// Case- and whitespace-insensitive lookup from a city name to its hub page.
///
/// Built once and never mutated. Values are returned exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityHubTable {
    entries: HashMap<String, String>,
}

impl CityHubTable {
    /// The hub pages that ship with the site.
    pub fn builtin() -> Self {
        let entries = BUILTIN_HUBS
            .iter()
            .map(|(city, path)| (normalize_city(city), (*path).to_string()))
            .collect();
        Self { entries }
    }

    /// Build a table from `(city, path)` pairs. A later duplicate city
    /// replaces the earlier one.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = Self {
            entries: HashMap::new(),
        };
        table.insert_all(entries)?;
        Ok(table)
    }

    /// The builtin table with `overrides` layered on top.
    pub fn with_overrides<I, K, V>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = Self::builtin();
        table.insert_all(overrides)?;
        Ok(table)
    }

    fn insert_all<I, K, V>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (city, path) in entries {
            let city = city.as_ref();
            let path = path.into();
            validate_non_empty_string("city_hubs", city)?;
            validate_root_relative_path(&format!("city_hubs.{}", city.trim()), &path)?;

            if let Some(previous) = self.entries.insert(normalize_city(city), path) {
                tracing::debug!("City hub '{}' replaced {}", city.trim(), previous);
            }
        }
        Ok(())
    }

    pub fn get_city_hub_url(&self, city: Option<&str>) -> Option<&str> {
        let city = city?;
        self.entries.get(&normalize_city(city)).map(String::as_str)
    }

    pub fn has_city_hub(&self, city: Option<&str>) -> bool {
        self.get_city_hub_url(city).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by normalized city name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut sorted: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(city, path)| (city.as_str(), path.as_str()))
            .collect();
        sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
        sorted.into_iter()
    }
}

impl Default for CityHubTable {
    fn default() -> Self {
        Self::builtin()
    }
}
