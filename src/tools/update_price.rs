//! `update_price` - set the ticket price of an existing row

use super::{parse_input, Tool, ToolContext, ToolOutput};
use crate::catalog::CatalogError;
use crate::state_machine::state::UpdatePriceInput;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct UpdatePriceTool;

#[async_trait]
impl Tool for UpdatePriceTool {
    fn name(&self) -> &'static str {
        "update_price"
    }

    fn description(&self) -> String {
        "Update the price of a movie.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["movie_id", "new_price"],
            "properties": {
                "movie_id": {"type": "integer"},
                "new_price": {"type": "number"}
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> Result<ToolOutput, CatalogError> {
        let input: UpdatePriceInput = match parse_input(input) {
            Ok(i) => i,
            Err(out) => return Ok(out),
        };

        let Some(mut movie) = ctx.catalog.get(input.movie_id).await? else {
            tracing::debug!(id = input.movie_id, "update_price: no such movie");
            return Ok(ToolOutput::success("null"));
        };

        movie.price = input.new_price;
        ctx.catalog.save(&movie).await?;
        Ok(ToolOutput::success(movie.to_string()))
    }
}
