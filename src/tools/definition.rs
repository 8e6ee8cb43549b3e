// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool definition types
//!
//! JSON schemas advertised to the model for each built-in tool.

use serde_json::Value;

use crate::llm::provider::{ToolDefinition, ToolInputSchema};

use super::invocation::*;

/// Helper to create a tool input schema
pub struct SchemaBuilder {
    properties: serde_json::Map<String, Value>,
    required: Vec<String>,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        Self {
            properties: serde_json::Map::new(),
            required: vec![],
        }
    }

    fn property(mut self, name: &str, schema: Value, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema);
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// Add a string property
    pub fn string(self, name: &str, description: &str, required: bool) -> Self {
        self.property(
            name,
            serde_json::json!({ "type": "string", "description": description }),
            required,
        )
    }

    /// Add a string property restricted to fixed values
    pub fn one_of(self, name: &str, description: &str, values: &[&str], required: bool) -> Self {
        self.property(
            name,
            serde_json::json!({ "type": "string", "description": description, "enum": values }),
            required,
        )
    }

    /// Add an integer property
    pub fn integer(self, name: &str, description: &str, required: bool) -> Self {
        self.property(
            name,
            serde_json::json!({ "type": "integer", "description": description }),
            required,
        )
    }

    /// Add a boolean property
    pub fn boolean(self, name: &str, description: &str, required: bool) -> Self {
        self.property(
            name,
            serde_json::json!({ "type": "boolean", "description": description }),
            required,
        )
    }

    /// Build the schema
    pub fn build(self) -> ToolInputSchema {
        ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Value::Object(self.properties),
            required: self.required,
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn definition(name: &str, description: &str, schema: SchemaBuilder) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: schema.build(),
    }
}

/// Definitions for every built-in tool, in a stable order.
pub fn builtin_definitions() -> Vec<ToolDefinition> {
    vec![
        definition(
            CREATE_FILE_OR_FOLDER,
            "Create a file or folder in the system",
            SchemaBuilder::new()
                .string("BasePath", "Base path in which to create the file or folder", true)
                .one_of("TypeOfCreate", "Type of creation", &["file", "folder"], true)
                .string("Name", "Name of the file or folder to create", true),
        ),
        definition(
            EDIT_CONTENT,
            "Edit file content with various editing modes",
            SchemaBuilder::new()
                .string("FilePath", "Path to the file to edit", true)
                .one_of(
                    "EditMode",
                    "Edit mode",
                    &["replace", "insert_at_line", "append_line", "prepend_line", "replace_line"],
                    true,
                )
                .string("SearchText", "Text to search for (required for 'replace' mode)", false)
                .string("ReplacementText", "Text to replace with or insert", false)
                .integer(
                    "LineNumber",
                    "1-based line number (required for 'insert_at_line' and 'replace_line')",
                    false,
                ),
        ),
        definition(
            WRITE_CONTENT,
            "Write content to a file with overwrite or append mode",
            SchemaBuilder::new()
                .string("FilePath", "Path to the file to write content to", true)
                .string("Content", "Content to write to the file", true)
                .one_of("Mode", "Write mode", &["overwrite", "append"], true),
        ),
        definition(
            LIST_DIRECTORY,
            "List contents of a directory with optional filtering",
            SchemaBuilder::new()
                .string("DirectoryPath", "Directory to list (default: current directory)", false)
                .boolean("ShowHidden", "Whether to show hidden files (names starting with .)", false)
                .one_of("FilterType", "Filter items by type; empty for all", &["files", "folders", ""], false),
        ),
        definition(
            SEARCH_FILES,
            "Search for files and folders by name pattern with optional filtering",
            SchemaBuilder::new()
                .string("SearchPath", "Path to search in (default: current directory)", false)
                .string("Pattern", "File name pattern to search for (supports wildcards)", true)
                .boolean("Recursive", "Whether to search subdirectories", false)
                .one_of("Type", "Filter by type; empty for all", &["files", "folders", ""], false),
        ),
        definition(
            READ_FILE,
            "Read content from a file with optional line limiting",
            SchemaBuilder::new()
                .string("FilePath", "Path to the file to read", true)
                .string("Encoding", "File encoding (optional)", false)
                .integer("MaxLines", "Maximum number of lines to read (optional)", false),
        ),
        definition(
            GET_FILE_INFO,
            "Get type, size, modification time and permissions of a path",
            SchemaBuilder::new().string("Path", "Path to the file or folder", true),
        ),
        definition(
            GET_CURRENT_DIRECTORY,
            "Get the current working directory path",
            SchemaBuilder::new(),
        ),
        definition(
            WEB_SEARCH,
            "Search the web and return organic results, knowledge graph and related searches",
            SchemaBuilder::new()
                .string("query", "Search query", true)
                .string("gl", "Country code (default: us)", false)
                .string("hl", "Language code (default: en)", false)
                .string("type", "Search type (default: search)", false)
                .integer("page", "Result page (default: 1)", false),
        ),
    ]
}
