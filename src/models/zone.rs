use serde::{Deserialize, Serialize};

use super::{null_as_empty, string_or_number};

/// Top-level administrative grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub country_en: String,
}

impl Zone {
    /// "Title (City)" when a city is known, used in dropdowns.
    pub fn label(&self) -> String {
        if self.city_en.is_empty() || self.city_en == self.title_en {
            self.title_en.clone()
        } else {
            format!("{} ({})", self.title_en, self.city_en)
        }
    }
}

/// A local chapter belonging to a zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mehfil {
    pub id: i64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mehfil_number: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address_en: String,
}

impl Mehfil {
    pub fn label(&self) -> String {
        if self.mehfil_number.is_empty() {
            self.name_en.clone()
        } else {
            format!("#{} {}", self.mehfil_number, self.name_en)
        }
    }
}
