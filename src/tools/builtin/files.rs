// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! File tools: create, edit, write, read and inspect files.

use chrono::{DateTime, Local};
use serde_json::json;
use std::io::Write;

use crate::tools::invocation::{
    CreateKind, CreateParams, EditMode, EditParams, GetFileInfoParams, ReadFileParams, WriteMode,
    WriteParams,
};
use crate::tools::{success_envelope, ToolContext, ToolError};

type ToolOutcome = std::result::Result<String, ToolError>;

/// Create a file or folder under `BasePath`.
pub fn create_file_or_folder(params: &CreateParams, context: &ToolContext) -> ToolOutcome {
    let base = context.resolve(&params.base_path);
    let full_path = base.join(&params.name);
    let display = full_path.display().to_string();

    match params.type_of_create {
        CreateKind::Folder => {
            std::fs::create_dir_all(&full_path)
                .map_err(|e| ToolError::failed(format!("Error creating folder: {}", e)))?;
            Ok(success_envelope(
                format!("Folder '{}' created at {}", params.name, display),
                json!({ "path": display }),
            ))
        }
        CreateKind::File => {
            std::fs::create_dir_all(&base)
                .map_err(|e| ToolError::failed(format!("Error creating base directory: {}", e)))?;
            std::fs::File::create(&full_path)
                .map_err(|e| ToolError::failed(format!("Error creating file: {}", e)))?;
            Ok(success_envelope(
                format!("File '{}' created at {}", params.name, display),
                json!({ "path": display }),
            ))
        }
    }
}

/// Apply one edit to an existing file.
pub fn edit_content(params: &EditParams, context: &ToolContext) -> ToolOutcome {
    let path = context.resolve(&params.file_path);
    let content = std::fs::read_to_string(&path)
        .map_err(|e| ToolError::failed(format!("Error reading file: {}", e)))?;

    let edited = apply_edit(&content, params)?;

    std::fs::write(&path, edited)
        .map_err(|e| ToolError::failed(format!("Error writing file: {}", e)))?;

    Ok(success_envelope(
        format!(
            "File edited successfully using {} mode",
            params.edit_mode.as_str()
        ),
        json!({
            "path": path.display().to_string(),
            "edit_mode": params.edit_mode.as_str(),
        }),
    ))
}

fn apply_edit(content: &str, params: &EditParams) -> std::result::Result<String, ToolError> {
    let text = params.replacement_text.as_str();
    match params.edit_mode {
        EditMode::Replace => {
            if params.search_text.is_empty() {
                return Err(ToolError::failed("search_text is required for replace mode"));
            }
            Ok(content.replace(&params.search_text, text))
        }
        EditMode::InsertAtLine => {
            let line = params.line_number;
            if line == 0 {
                return Err(ToolError::failed(
                    "line_number is required for insert_at_line mode",
                ));
            }
            let mut lines: Vec<&str> = content.split('\n').collect();
            if line > lines.len() + 1 {
                return Err(ToolError::failed(format!(
                    "Line {} is out of range. File has {} lines.",
                    line,
                    lines.len()
                )));
            }
            lines.insert(line - 1, text);
            Ok(lines.join("\n"))
        }
        EditMode::AppendLine => Ok(format!("{}\n{}", content, text)),
        EditMode::PrependLine => Ok(format!("{}\n{}", text, content)),
        EditMode::ReplaceLine => {
            let line = params.line_number;
            if line == 0 {
                return Err(ToolError::failed(
                    "line_number is required for replace_line mode",
                ));
            }
            let mut lines: Vec<&str> = content.split('\n').collect();
            if line > lines.len() {
                return Err(ToolError::failed(format!(
                    "Line {} does not exist. File has {} lines.",
                    line,
                    lines.len()
                )));
            }
            lines[line - 1] = text;
            Ok(lines.join("\n"))
        }
    }
}

/// Overwrite or append to a file.
pub fn write_content(params: &WriteParams, context: &ToolContext) -> ToolOutcome {
    let path = context.resolve(&params.file_path);
    let mode = match params.mode {
        WriteMode::Overwrite => {
            std::fs::write(&path, &params.content).map_err(|e| {
                ToolError::failed(format!("Error overwriting file content: {}", e))
            })?;
            "overwrite"
        }
        WriteMode::Append => {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .and_then(|mut file| file.write_all(params.content.as_bytes()))
                .map_err(|e| {
                    ToolError::failed(format!("Error writing content to the file: {}", e))
                })?;
            "append"
        }
    };

    let display = path.display().to_string();
    Ok(success_envelope(
        format!("Content '{}' filepath {}", mode, display),
        json!({ "path": display, "mode": mode }),
    ))
}

/// Read a file, optionally keeping only the first `MaxLines` lines.
pub fn read_file(params: &ReadFileParams, context: &ToolContext) -> ToolOutcome {
    let path = context.resolve(&params.file_path);
    let content = std::fs::read_to_string(&path)
        .map_err(|e| ToolError::failed(format!("Error reading file: {}", e)))?;

    let lines: Vec<&str> = content.split('\n').collect();
    let total_lines = lines.len();

    let (content, truncated, message) = match params.max_lines {
        Some(max) if max > 0 && max < total_lines => (
            lines[..max].join("\n"),
            true,
            format!("Read file {} (showing first {} lines)", params.file_path, max),
        ),
        _ => (content, false, format!("Read file {}", params.file_path)),
    };

    Ok(success_envelope(
        message,
        json!({
            "path": path.display().to_string(),
            "content": content,
            "truncated": truncated,
            "total_lines": total_lines,
        }),
    ))
}

/// Report type, size, modification time and permission bits of a path.
pub fn get_file_info(params: &GetFileInfoParams, context: &ToolContext) -> ToolOutcome {
    let path = context.resolve(&params.path);
    let metadata = std::fs::metadata(&path)
        .map_err(|e| ToolError::failed(format!("Error getting file info: {}", e)))?;

    let mode = permission_bits(&metadata);
    let modified = metadata
        .modified()
        .map(|time| DateTime::<Local>::from(time).to_rfc3339())
        .unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| params.path.clone());

    Ok(success_envelope(
        format!("Retrieved info for {}", params.path),
        json!({
            "path": path.display().to_string(),
            "name": name,
            "type": if metadata.is_dir() { "folder" } else { "file" },
            "size": metadata.len(),
            "modified": modified,
            "permissions": format!("0{:o}", mode),
            "is_readable": mode & 0o400 != 0,
            "is_writable": mode & 0o200 != 0,
            "is_executable": mode & 0o100 != 0,
        }),
    ))
}

#[cfg(unix)]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}
