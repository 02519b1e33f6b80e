//! Database schema and record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS movies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    release_year INTEGER NOT NULL DEFAULT 0,
    rating REAL NOT NULL DEFAULT 0,
    is_imax BOOLEAN NOT NULL DEFAULT 0,
    price REAL NOT NULL DEFAULT 0,
    created_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_movies_name ON movies(name);

CREATE TABLE IF NOT EXISTS memories (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    PRIMARY KEY (namespace, key)
);
";

/// Timestamp format used when rendering a movie
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub release_year: i64,
    pub rating: f64,
    pub is_imax: bool,
    pub price: f64,
    pub created_at: Option<DateTime<Utc>>,
}

impl Movie {
    /// Build an unsaved movie from a field mapping. Absent fields take
    /// neutral defaults; the id is assigned by the store on creation.
    pub fn from_fields(fields: &MovieFields) -> Self {
        let mut movie = Self {
            id: 0,
            name: String::new(),
            description: String::new(),
            release_year: 0,
            rating: 0.0,
            is_imax: false,
            price: 0.0,
            created_at: None,
        };
        movie.apply(fields);
        movie
    }

    /// Overwrite every field present in the mapping. The id is never touched.
    pub fn apply(&mut self, fields: &MovieFields) {
        if let Some(name) = &fields.name {
            self.name.clone_from(name);
        }
        if let Some(description) = &fields.description {
            self.description.clone_from(description);
        }
        if let Some(release_year) = fields.release_year {
            self.release_year = release_year;
        }
        if let Some(rating) = fields.rating {
            self.rating = rating;
        }
        if let Some(is_imax) = fields.is_imax {
            self.is_imax = is_imax;
        }
        if let Some(price) = fields.price {
            self.price = price;
        }
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "release_year": self.release_year,
            "rating": self.rating,
            "is_imax": self.is_imax,
            "price": self.price,
            "created_at": self
                .created_at
                .map(|t| t.format(CREATED_AT_FORMAT).to_string()),
        });
        write!(f, "{rendered}")
    }
}

/// Partial movie mapping as supplied by tool calls and online lookups.
///
/// `id` is only meaningful for updates; creation ignores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_imax: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl MovieFields {
    /// Name usable for an upsert lookup (present and non-empty)
    pub fn lookup_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// Stored key-value memory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub namespace: String,
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_renders_json_object() {
        let movie = Movie {
            id: 3,
            name: "Dune".to_string(),
            description: "Spice".to_string(),
            release_year: 2021,
            rating: 8.1,
            is_imax: true,
            price: 12.5,
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()),
        };

        let rendered: serde_json::Value = serde_json::from_str(&movie.to_string()).unwrap();
        assert_eq!(rendered["id"], 3);
        assert_eq!(rendered["name"], "Dune");
        assert_eq!(rendered["is_imax"], true);
        assert_eq!(rendered["created_at"], "2024-05-01 09:30:00");
    }

    #[test]
    fn display_without_timestamp_renders_null() {
        let movie = Movie::from_fields(&MovieFields::default());
        let rendered: serde_json::Value = serde_json::from_str(&movie.to_string()).unwrap();
        assert!(rendered["created_at"].is_null());
    }

    #[test]
    fn apply_only_overwrites_present_fields() {
        let mut movie = Movie::from_fields(&MovieFields {
            name: Some("Alien".to_string()),
            price: Some(9.0),
            ..Default::default()
        });
        movie.id = 7;

        movie.apply(&MovieFields {
            id: Some(99),
            price: Some(11.0),
            ..Default::default()
        });

        assert_eq!(movie.id, 7);
        assert_eq!(movie.name, "Alien");
        assert!((movie.price - 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lookup_name_ignores_empty() {
        let fields = MovieFields {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(fields.lookup_name().is_none());
    }
}
