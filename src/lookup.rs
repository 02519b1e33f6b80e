//! Online movie information lookup
//!
//! Used by the lookup-confirm-insert workflow to turn a title typed by the
//! user into candidate catalog fields.

use crate::db::MovieFields;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const OMDB_URL: &str = "https://www.omdbapi.com/";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Price assigned to looked-up movies; online sources carry no ticket price
const DEFAULT_PRICE: f64 = 10.0;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Lookup request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Lookup service returned HTTP {0}")]
    Status(u16),
    #[error("No online match for {0:?}")]
    NotFound(String),
}

/// Source of external movie facts
#[async_trait]
pub trait OnlineLookup: Send + Sync {
    async fn search(&self, title: &str) -> Result<MovieFields, LookupError>;
}

#[async_trait]
impl<T: OnlineLookup + ?Sized> OnlineLookup for Arc<T> {
    async fn search(&self, title: &str) -> Result<MovieFields, LookupError> {
        (**self).search(title).await
    }
}

/// Deterministic stand-in used when no lookup API key is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderLookup;

#[async_trait]
impl OnlineLookup for PlaceholderLookup {
    async fn search(&self, title: &str) -> Result<MovieFields, LookupError> {
        Ok(MovieFields {
            id: None,
            name: Some(title.to_string()),
            description: Some(format!("Description for {title}")),
            release_year: Some(2020),
            rating: Some(7.5),
            is_imax: Some(false),
            price: Some(DEFAULT_PRICE),
        })
    }
}

/// OMDb title search
pub struct OmdbLookup {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OmdbLookup {
    pub fn new(api_key: String) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: OMDB_URL.to_string(),
        })
    }
}

#[async_trait]
impl OnlineLookup for OmdbLookup {
    async fn search(&self, title: &str) -> Result<MovieFields, LookupError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("t", title), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: OmdbResponse = response.json().await?;
        tracing::debug!(title, found = body.response == "True", "OMDb lookup");
        fields_from_omdb(title, body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbResponse {
    response: String,
    title: Option<String>,
    plot: Option<String>,
    year: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
}

fn fields_from_omdb(title: &str, body: OmdbResponse) -> Result<MovieFields, LookupError> {
    if body.response != "True" {
        return Err(LookupError::NotFound(title.to_string()));
    }

    Ok(MovieFields {
        id: None,
        name: Some(body.title.unwrap_or_else(|| title.to_string())),
        description: body.plot.filter(|p| p != "N/A"),
        // Series report ranges like "2019–2022"; keep the first year
        release_year: body.year.as_deref().and_then(|y| {
            let digits: String = y.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        }),
        rating: body.imdb_rating.and_then(|r| r.parse().ok()),
        is_imax: Some(false),
        price: Some(DEFAULT_PRICE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn placeholder_details() {
        let fields = PlaceholderLookup.search("Arrival").await.unwrap();
        assert_eq!(fields.name.as_deref(), Some("Arrival"));
        assert_eq!(fields.description.as_deref(), Some("Description for Arrival"));
        assert_eq!(fields.release_year, Some(2020));
        assert_eq!(fields.rating, Some(7.5));
        assert_eq!(fields.is_imax, Some(false));
        assert_eq!(fields.price, Some(10.0));
    }

    #[test]
    fn omdb_response_maps_to_fields() {
        let body: OmdbResponse = serde_json::from_value(json!({
            "Title": "Dune",
            "Year": "2021",
            "Plot": "A noble family becomes embroiled in a war.",
            "imdbRating": "8.0",
            "Response": "True"
        }))
        .unwrap();

        let fields = fields_from_omdb("dune", body).unwrap();
        assert_eq!(fields.name.as_deref(), Some("Dune"));
        assert_eq!(fields.release_year, Some(2021));
        assert_eq!(fields.rating, Some(8.0));
        assert_eq!(fields.price, Some(10.0));
    }

    #[test]
    fn omdb_unknown_values_are_left_absent() {
        let body: OmdbResponse = serde_json::from_value(json!({
            "Title": "Severance",
            "Year": "2022–",
            "Plot": "N/A",
            "imdbRating": "N/A",
            "Response": "True"
        }))
        .unwrap();

        let fields = fields_from_omdb("Severance", body).unwrap();
        assert_eq!(fields.release_year, Some(2022));
        assert!(fields.description.is_none());
        assert!(fields.rating.is_none());
    }

    #[test]
    fn omdb_miss_is_not_found() {
        let body: OmdbResponse = serde_json::from_value(json!({
            "Response": "False",
            "Error": "Movie not found!"
        }))
        .unwrap();

        assert!(matches!(
            fields_from_omdb("Nope", body),
            Err(LookupError::NotFound(_))
        ));
    }
}
