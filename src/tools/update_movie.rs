//! `update_movie` - overwrite fields of an existing row

use super::{parse_input, Tool, ToolContext, ToolOutput};
use crate::catalog::CatalogError;
use crate::state_machine::state::UpdateMovieInput;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct UpdateMovieTool;

#[async_trait]
impl Tool for UpdateMovieTool {
    fn name(&self) -> &'static str {
        "update_movie"
    }

    fn description(&self) -> String {
        "Update an existing movie. `movie.id` selects the movie; every other field given \
replaces the stored value."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["movie"],
            "properties": {
                "movie": {
                    "type": "object",
                    "required": ["id"],
                    "properties": {
                        "id": {"type": "integer"},
                        "name": {"type": "string"},
                        "description": {"type": "string"},
                        "release_year": {"type": "integer"},
                        "rating": {"type": "number"},
                        "is_imax": {"type": "boolean"},
                        "price": {"type": "number"}
                    }
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> Result<ToolOutput, CatalogError> {
        let input: UpdateMovieInput = match parse_input(input) {
            Ok(i) => i,
            Err(out) => return Ok(out),
        };
        let Some(id) = input.movie.id else {
            return Ok(ToolOutput::error("Invalid input: movie.id is required"));
        };

        // Missing rows are a silent no-op
        let updated = match ctx.catalog.get(id).await? {
            Some(mut movie) => {
                movie.apply(&input.movie);
                ctx.catalog.save(&movie).await?;
                Some(movie.to_string())
            }
            None => {
                tracing::debug!(id, "update_movie: no such movie");
                None
            }
        };

        Ok(ToolOutput::success(
            updated.unwrap_or_else(|| "null".to_string()),
        ))
    }
}
