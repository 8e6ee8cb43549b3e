// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Directory tools: listing, name search and the working directory.

use glob::Pattern;
use serde_json::{json, Value};
use walkdir::WalkDir;

use crate::tools::invocation::{ListDirectoryParams, SearchFilesParams};
use crate::tools::{success_envelope, ToolContext, ToolError};

type ToolOutcome = std::result::Result<String, ToolError>;

fn or_current(path: &str) -> &str {
    if path.is_empty() {
        "."
    } else {
        path
    }
}

/// List the immediate children of a directory.
pub fn list_directory(params: &ListDirectoryParams, context: &ToolContext) -> ToolOutcome {
    let requested = or_current(&params.directory_path);
    let dir = context.resolve(requested);

    let entries = std::fs::read_dir(&dir)
        .map_err(|e| ToolError::failed(format!("Error listing directory: {}", e)))?;

    let mut items: Vec<(String, bool)> = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if !params.show_hidden && name.starts_with('.') {
            continue;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if params.filter_type.accepts(is_dir) {
            items.push((name, is_dir));
        }
    }
    items.sort();

    let items: Vec<Value> = items
        .into_iter()
        .map(|(name, is_dir)| {
            json!({
                "path": dir.join(&name).display().to_string(),
                "type": if is_dir { "folder" } else { "file" },
                "name": name,
            })
        })
        .collect();

    Ok(success_envelope(
        format!("Listed {} items in {}", items.len(), requested),
        json!({ "directory": requested, "items": items }),
    ))
}

/// Find entries whose file name matches a glob pattern.
pub fn search_files(params: &SearchFilesParams, context: &ToolContext) -> ToolOutcome {
    let requested = or_current(&params.search_path);
    let root = context.resolve(requested);

    let pattern = Pattern::new(&params.pattern)
        .map_err(|e| ToolError::failed(format!("Invalid search pattern: {}", e)))?;
    std::fs::metadata(&root)
        .map_err(|e| ToolError::failed(format!("Error searching files: {}", e)))?;

    let max_depth = if params.recursive { usize::MAX } else { 1 };
    let mut results: Vec<Value> = Vec::new();

    for entry in WalkDir::new(&root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(target: "nyron.tools", error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy();
        let is_dir = entry.file_type().is_dir();
        if !pattern.matches(&name) || !params.filter.accepts(is_dir) {
            continue;
        }

        let mut item = json!({
            "name": name,
            "path": entry.path().display().to_string(),
            "type": if is_dir { "folder" } else { "file" },
        });
        if !is_dir {
            if let Ok(metadata) = entry.metadata() {
                item["size"] = json!(metadata.len());
            }
        }
        results.push(item);
    }

    Ok(success_envelope(
        format!(
            "Found {} matches for pattern \"{}\"",
            results.len(),
            params.pattern
        ),
        json!({
            "pattern": params.pattern,
            "search_path": requested,
            "results": results,
        }),
    ))
}

/// Report the directory tools resolve relative paths against.
pub fn get_current_directory(context: &ToolContext) -> ToolOutcome {
    let current = context.working_directory.display().to_string();
    Ok(success_envelope(
        format!("Current directory: {}", current),
        json!({ "current_directory": current }),
    ))
}
