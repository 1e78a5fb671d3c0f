//! Service info handler

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::state::AppState;

/// Info response
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub description: String,
    pub endpoints: BTreeMap<String, String>,
}

/// Describe the service and its endpoints
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let mut endpoints = BTreeMap::new();
    endpoints.insert(
        "/solve".to_string(),
        "POST - Solve mathematical expressions".to_string(),
    );
    endpoints.insert("/health".to_string(), "GET - Health check".to_string());

    Json(InfoResponse {
        name: state.name.clone(),
        description: state.description.clone(),
        endpoints,
    })
}
