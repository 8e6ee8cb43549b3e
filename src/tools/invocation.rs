// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Typed tool invocations
//!
//! The model sends a tool name and a JSON argument string. `ToolInvocation`
//! decodes that pair into one variant of a closed set, so the executor never
//! inspects raw JSON.

use serde::Deserialize;

use super::ToolError;

pub const CREATE_FILE_OR_FOLDER: &str = "create_file_or_folder";
pub const EDIT_CONTENT: &str = "edit_content";
pub const WRITE_CONTENT: &str = "write_content";
pub const LIST_DIRECTORY: &str = "list_directory";
pub const SEARCH_FILES: &str = "search_files";
pub const READ_FILE: &str = "read_file";
pub const GET_FILE_INFO: &str = "get_file_info";
pub const GET_CURRENT_DIRECTORY: &str = "get_current_directory";
pub const WEB_SEARCH: &str = "web_search";

/// Every tool name the executor understands, in definition order.
pub const TOOL_NAMES: &[&str] = &[
    CREATE_FILE_OR_FOLDER,
    EDIT_CONTENT,
    WRITE_CONTENT,
    LIST_DIRECTORY,
    SEARCH_FILES,
    READ_FILE,
    GET_FILE_INFO,
    GET_CURRENT_DIRECTORY,
    WEB_SEARCH,
];

/// A decoded tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    CreateFileOrFolder(CreateParams),
    EditContent(EditParams),
    WriteContent(WriteParams),
    ListDirectory(ListDirectoryParams),
    SearchFiles(SearchFilesParams),
    ReadFile(ReadFileParams),
    GetFileInfo(GetFileInfoParams),
    GetCurrentDirectory,
    WebSearch(WebSearchParams),
}

impl ToolInvocation {
    /// Decode raw arguments for the named tool.
    ///
    /// Blank arguments are treated as `{}` since some models send an empty
    /// string for tools without parameters.
    pub fn decode(name: &str, arguments: &str) -> Result<Self, ToolError> {
        let arguments = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };

        match name {
            CREATE_FILE_OR_FOLDER => parse(name, arguments).map(Self::CreateFileOrFolder),
            EDIT_CONTENT => parse(name, arguments).map(Self::EditContent),
            WRITE_CONTENT => parse(name, arguments).map(Self::WriteContent),
            LIST_DIRECTORY => parse(name, arguments).map(Self::ListDirectory),
            SEARCH_FILES => parse(name, arguments).map(Self::SearchFiles),
            READ_FILE => parse(name, arguments).map(Self::ReadFile),
            GET_FILE_INFO => parse(name, arguments).map(Self::GetFileInfo),
            GET_CURRENT_DIRECTORY => {
                // Arguments are ignored but must still be JSON.
                parse::<serde_json::Value>(name, arguments).map(|_| Self::GetCurrentDirectory)
            }
            WEB_SEARCH => parse(name, arguments).map(Self::WebSearch),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateFileOrFolder(_) => CREATE_FILE_OR_FOLDER,
            Self::EditContent(_) => EDIT_CONTENT,
            Self::WriteContent(_) => WRITE_CONTENT,
            Self::ListDirectory(_) => LIST_DIRECTORY,
            Self::SearchFiles(_) => SEARCH_FILES,
            Self::ReadFile(_) => READ_FILE,
            Self::GetFileInfo(_) => GET_FILE_INFO,
            Self::GetCurrentDirectory => GET_CURRENT_DIRECTORY,
            Self::WebSearch(_) => WEB_SEARCH,
        }
    }
}

fn parse<T: for<'de> Deserialize<'de>>(tool: &str, arguments: &str) -> Result<T, ToolError> {
    serde_json::from_str(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateParams {
    pub base_path: String,
    pub type_of_create: CreateKind,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    Replace,
    InsertAtLine,
    AppendLine,
    PrependLine,
    ReplaceLine,
}

impl EditMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditMode::Replace => "replace",
            EditMode::InsertAtLine => "insert_at_line",
            EditMode::AppendLine => "append_line",
            EditMode::PrependLine => "prepend_line",
            EditMode::ReplaceLine => "replace_line",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EditParams {
    pub file_path: String,
    pub edit_mode: EditMode,
    #[serde(default)]
    pub search_text: String,
    #[serde(default)]
    pub replacement_text: String,
    #[serde(default)]
    pub line_number: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    Overwrite,
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WriteParams {
    pub file_path: String,
    pub content: String,
    pub mode: WriteMode,
}

/// Entry kind filter shared by list_directory and search_files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum EntryFilter {
    #[default]
    #[serde(rename = "")]
    All,
    #[serde(rename = "files")]
    Files,
    #[serde(rename = "folders")]
    Folders,
}

impl EntryFilter {
    pub fn accepts(&self, is_dir: bool) -> bool {
        match self {
            EntryFilter::All => true,
            EntryFilter::Files => !is_dir,
            EntryFilter::Folders => is_dir,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListDirectoryParams {
    pub directory_path: String,
    pub show_hidden: bool,
    pub filter_type: EntryFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchFilesParams {
    #[serde(default)]
    pub search_path: String,
    pub pattern: String,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default, rename = "Type")]
    pub filter: EntryFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReadFileParams {
    pub file_path: String,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub max_lines: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetFileInfoParams {
    #[serde(rename = "Path", alias = "FilePath")]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebSearchParams {
    pub query: String,
    #[serde(default = "default_gl")]
    pub gl: String,
    #[serde(default = "default_hl")]
    pub hl: String,
    #[serde(default = "default_search_type", rename = "type")]
    pub search_type: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_gl() -> String {
    "us".to_string()
}

fn default_hl() -> String {
    "en".to_string()
}

fn default_search_type() -> String {
    "search".to_string()
}

fn default_page() -> u32 {
    1
}
