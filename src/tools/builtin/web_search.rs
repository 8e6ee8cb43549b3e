// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Web search through the Serper API

use serde_json::{json, Map, Value};

use crate::tools::invocation::WebSearchParams;
use crate::tools::{success_envelope, ToolContext, ToolError};

pub const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

/// Response sections passed through to the model when present
const PASSTHROUGH_FIELDS: &[&str] = &[
    "searchParameters",
    "knowledgeGraph",
    "organic",
    "peopleAlsoAsk",
    "relatedSearches",
];

pub async fn web_search(
    params: &WebSearchParams,
    context: &ToolContext,
    client: &reqwest::Client,
) -> std::result::Result<String, ToolError> {
    let api_key = context
        .serper_api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ToolError::failed("SERPER_API_KEY environment variable not set"))?;

    let mut query: Vec<(&str, String)> = vec![
        ("q", params.query.clone()),
        ("gl", params.gl.clone()),
        ("hl", params.hl.clone()),
        ("type", params.search_type.clone()),
    ];
    if params.page > 1 {
        query.push(("page", params.page.to_string()));
    }
    query.push(("apiKey", api_key.to_string()));

    tracing::debug!(target: "nyron.tools", query = %params.query, "web search");

    let response = client
        .get(&context.search_endpoint)
        .query(&query)
        .send()
        .await
        .map_err(|e| ToolError::failed(format!("Error making request: {}", e)))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(ToolError::failed(format!(
            "API request failed with status: {}",
            status.as_u16()
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| ToolError::failed(format!("Error parsing response: {}", e)))?;

    let mut data = Map::new();
    data.insert("query".to_string(), json!(params.query));
    for field in PASSTHROUGH_FIELDS {
        if let Some(value) = body.get(*field) {
            data.insert((*field).to_string(), value.clone());
        }
    }

    Ok(success_envelope(
        format!("Search completed for query: {}", params.query),
        Value::Object(data),
    ))
}
