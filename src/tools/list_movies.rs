//! `list_movies` - every catalog row in display form

use super::{Tool, ToolContext, ToolOutput};
use crate::catalog::CatalogError;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct ListMoviesTool;

#[async_trait]
impl Tool for ListMoviesTool {
    fn name(&self) -> &'static str {
        "list_movies"
    }

    fn description(&self) -> String {
        "List all movies.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn run(&self, _input: Value, ctx: ToolContext) -> Result<ToolOutput, CatalogError> {
        let movies = ctx.catalog.all().await?;
        let rendered: Vec<String> = movies.iter().map(ToString::to_string).collect();
        Ok(ToolOutput::json(&rendered))
    }
}
