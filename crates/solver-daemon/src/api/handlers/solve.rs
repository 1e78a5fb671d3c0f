//! Expression solving handler

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Solve request body
#[derive(Debug, Deserialize)]
pub struct SolveRequest {
    /// The expression field is optional so a missing key becomes a JSON
    /// error body rather than a bare extractor rejection
    pub expression: Option<String>,
}

/// Solve response body
#[derive(Debug, Serialize)]
pub struct SolveResponse {
    pub result: String,
}

/// Solve a mathematical expression
pub async fn solve(
    payload: Result<Json<SolveRequest>, JsonRejection>,
) -> ApiResult<Json<SolveResponse>> {
    let Json(request) = payload
        .map_err(|rejection| ApiError::BadRequest(format!("Invalid request body: {rejection}")))?;

    let expression = request
        .expression
        .ok_or_else(|| ApiError::BadRequest("No expression provided".to_string()))?;
    let expression = expression.trim();

    tracing::info!(%expression, "Solving expression");

    match solver_engine::solve(expression) {
        Ok(result) => {
            tracing::info!(%expression, %result, "Solved expression");
            Ok(Json(SolveResponse { result }))
        }
        Err(err) => {
            tracing::warn!(%expression, error = %err, "Failed to solve expression");
            Err(err.into())
        }
    }
}
