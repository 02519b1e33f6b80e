//! `search_movies` - text search, or the whole catalog when the catalog
//! cannot search or no query is given

use super::{parse_input, Tool, ToolContext, ToolOutput};
use crate::catalog::CatalogError;
use crate::state_machine::state::SearchMoviesInput;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct SearchMoviesTool;

#[async_trait]
impl Tool for SearchMoviesTool {
    fn name(&self) -> &'static str {
        "search_movies"
    }

    fn description(&self) -> String {
        "Search for movies matching the query.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Text to look for in movie names and descriptions"
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> Result<ToolOutput, CatalogError> {
        let input: SearchMoviesInput = match parse_input(input) {
            Ok(i) => i,
            Err(out) => return Ok(out),
        };

        let query = input.query.as_deref().filter(|q| !q.is_empty());
        let movies = match query {
            Some(q) if ctx.capabilities.text_search => ctx.catalog.search_by_text(q).await?,
            _ => ctx.catalog.all().await?,
        };

        Ok(ToolOutput::json(&movies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DatabaseCatalog, MovieCatalog};
    use crate::db::{Database, Movie, MovieFields};
    use crate::runtime::testing::InMemoryCatalog;
    use std::sync::Arc;

    async fn seed(catalog: &dyn MovieCatalog) {
        for (name, description) in [("Dune", "Desert planet"), ("Heat", "LA crime saga")] {
            catalog
                .create(&MovieFields {
                    name: Some(name.to_string()),
                    description: Some(description.to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
    }

    async fn search(ctx: ToolContext, input: Value) -> Vec<Movie> {
        let out = SearchMoviesTool.run(input, ctx).await.unwrap();
        assert!(out.success);
        serde_json::from_str(&out.output).unwrap()
    }

    #[tokio::test]
    async fn filters_when_catalog_searches() {
        let catalog = Arc::new(DatabaseCatalog::new(Database::open_in_memory().unwrap()));
        seed(catalog.as_ref()).await;
        let ctx = ToolContext::new(catalog);

        let hits = search(ctx.clone(), json!({"query": "desert"})).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Dune");

        assert_eq!(search(ctx, json!({})).await.len(), 2);
    }

    #[tokio::test]
    async fn degrades_to_list_without_text_search() {
        let catalog = Arc::new(InMemoryCatalog::new().without_text_search());
        seed(catalog.as_ref()).await;
        let all = catalog.all().await.unwrap();

        let hits = search(ToolContext::new(catalog), json!({"query": "x"})).await;
        assert_eq!(hits, all);
    }

    #[tokio::test]
    async fn unparsed_arguments_are_an_error_not_a_full_listing() {
        let catalog = Arc::new(InMemoryCatalog::new());
        seed(catalog.as_ref()).await;

        let out = SearchMoviesTool
            .run(json!("{\"query\": \"du"), ToolContext::new(catalog))
            .await
            .unwrap();
        assert!(!out.success);
        assert!(out.output.starts_with("Invalid input"));
    }
}
