//! `delete_movie_by_id`

use super::{parse_input, Tool, ToolContext, ToolOutput};
use crate::catalog::CatalogError;
use crate::state_machine::state::DeleteMovieInput;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct DeleteMovieTool;

#[async_trait]
impl Tool for DeleteMovieTool {
    fn name(&self) -> &'static str {
        "delete_movie_by_id"
    }

    fn description(&self) -> String {
        "Delete a movie by ID.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["movie_id"],
            "properties": {
                "movie_id": {"type": "integer"}
            }
        })
    }

    /// Reports success whether or not a row matched
    async fn run(&self, input: Value, ctx: ToolContext) -> Result<ToolOutput, CatalogError> {
        let input: DeleteMovieInput = match parse_input(input) {
            Ok(i) => i,
            Err(out) => return Ok(out),
        };

        ctx.catalog.delete(input.movie_id).await?;
        Ok(ToolOutput::json(&true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MovieCatalog;
    use crate::db::MovieFields;
    use crate::runtime::testing::InMemoryCatalog;
    use std::sync::Arc;

    #[tokio::test]
    async fn delete_of_missing_id_succeeds_and_changes_nothing() {
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog
            .create(&MovieFields {
                name: Some("Up".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let out = DeleteMovieTool
            .run(json!({"movie_id": 999}), ToolContext::new(catalog.clone()))
            .await
            .unwrap();

        assert_eq!(out, ToolOutput::success("true"));
        assert_eq!(catalog.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deletes_existing_row() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let id = catalog.create(&MovieFields::default()).await.unwrap();

        DeleteMovieTool
            .run(json!({"movie_id": id}), ToolContext::new(catalog.clone()))
            .await
            .unwrap();
        assert!(catalog.get(id).await.unwrap().is_none());
    }
}
