//! `insert_movie` - upsert keyed on name

use super::{parse_input, Tool, ToolContext, ToolOutput};
use crate::catalog::{CatalogError, CatalogResult, MovieCatalog};
use crate::db::MovieFields;
use crate::state_machine::state::InsertMovieInput;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Insert a movie, or update the row that already carries its name.
///
/// Returns the id of the created or updated row. Without a usable name the
/// lookup is skipped and a new row is always created.
pub async fn upsert(catalog: &dyn MovieCatalog, fields: &MovieFields) -> CatalogResult<i64> {
    if let Some(name) = fields.lookup_name() {
        if let Some(mut existing) = catalog.get_by_name(name).await? {
            existing.apply(fields);
            catalog.save(&existing).await?;
            tracing::info!(id = existing.id, name, "Upsert updated existing movie");
            return Ok(existing.id);
        }
    }

    let id = catalog.create(fields).await?;
    tracing::info!(id, name = ?fields.name, "Upsert created movie");
    Ok(id)
}

pub struct InsertMovieTool;

#[async_trait]
impl Tool for InsertMovieTool {
    fn name(&self) -> &'static str {
        "insert_movie"
    }

    fn description(&self) -> String {
        "Insert a movie. If a movie with the same name exists its fields are updated instead. \
Returns the movie id."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["movie_data"],
            "properties": {
                "movie_data": {
                    "type": "object",
                    "description": "Movie fields",
                    "properties": {
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
        let input: InsertMovieInput = match parse_input(input) {
            Ok(i) => i,
            Err(out) => return Ok(out),
        };

        let id = upsert(ctx.catalog.as_ref(), &input.movie_data).await?;
        Ok(ToolOutput::json(&id))
    }
}
