// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Human-readable summaries of tool calls for the transcript

use serde_json::Value;

use super::invocation::*;

/// Summarize a tool call as `(title, detail)`.
///
/// Arguments that are not valid JSON are shown verbatim under the raw tool
/// name.
pub fn describe_tool_call(tool_name: &str, arguments: &str) -> (String, String) {
    let args: Value = match serde_json::from_str(arguments) {
        Ok(args) => args,
        Err(_) => return (tool_name.to_string(), arguments.to_string()),
    };
    let field = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .find_map(|k| args.get(*k).and_then(Value::as_str))
            .map(str::to_string)
    };

    let (title, detail) = match tool_name {
        READ_FILE => (
            "Reading file".to_string(),
            field(&["FilePath"]).unwrap_or_else(|| "unknown file".to_string()),
        ),
        SEARCH_FILES => {
            let detail = match field(&["Pattern"]) {
                Some(pattern) => match field(&["SearchPath"]) {
                    Some(path) if !path.is_empty() && path != "." => {
                        format!("pattern: {} in {}", pattern, path)
                    }
                    _ => format!("pattern: {}", pattern),
                },
                None => "unknown pattern".to_string(),
            };
            ("Searching for files".to_string(), detail)
        }
        WEB_SEARCH => (
            "Searching web".to_string(),
            field(&["query", "Query"])
                .map(|q| format!("\"{}\"", q))
                .unwrap_or_else(|| "unknown query".to_string()),
        ),
        CREATE_FILE_OR_FOLDER => match (field(&["BasePath"]), field(&["Name"])) {
            (Some(base), Some(name)) => {
                let title = match field(&["TypeOfCreate"]).as_deref() {
                    Some("file") => "Creating file",
                    Some(_) => "Creating folder",
                    None => "Creating",
                };
                (title.to_string(), format!("{}/{}", base, name))
            }
            _ => ("Creating item".to_string(), "unknown path".to_string()),
        },
        EDIT_CONTENT => (
            "Editing file".to_string(),
            field(&["FilePath"]).unwrap_or_else(|| "unknown file".to_string()),
        ),
        WRITE_CONTENT => (
            "Writing to file".to_string(),
            field(&["FilePath"]).unwrap_or_else(|| "unknown file".to_string()),
        ),
        LIST_DIRECTORY => {
            let detail = match field(&["DirectoryPath", "Path"]) {
                Some(path) if !path.is_empty() && path != "." => path,
                _ => "current directory".to_string(),
            };
            ("Listing directory".to_string(), detail)
        }
        GET_FILE_INFO => (
            "Getting file info".to_string(),
            field(&["Path", "FilePath"]).unwrap_or_else(|| "unknown file".to_string()),
        ),
        GET_CURRENT_DIRECTORY => ("Getting current directory".to_string(), String::new()),
        other => (title_case(other), "executing...".to_string()),
    };

    (title, detail)
}

fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_file_summary() {
        assert_eq!(
            describe_tool_call("read_file", r#"{"FilePath":"src/main.rs"}"#),
            ("Reading file".to_string(), "src/main.rs".to_string())
        );
        assert_eq!(describe_tool_call("read_file", "{}").1, "unknown file");
    }

    #[test]
    fn test_search_files_summary() {
        let (_, detail) =
            describe_tool_call("search_files", r#"{"Pattern":"*.rs","SearchPath":"src"}"#);
        assert_eq!(detail, "pattern: *.rs in src");
        let (_, detail) =
            describe_tool_call("search_files", r#"{"Pattern":"*.rs","SearchPath":"."}"#);
        assert_eq!(detail, "pattern: *.rs");
    }

    #[test]
    fn test_create_summary() {
        assert_eq!(
            describe_tool_call(
                "create_file_or_folder",
                r#"{"BasePath":"/tmp","Name":"x","TypeOfCreate":"folder"}"#
            ),
            ("Creating folder".to_string(), "/tmp/x".to_string())
        );
    }

    #[test]
    fn test_list_directory_defaults_to_current() {
        assert_eq!(
            describe_tool_call("list_directory", "{}").1,
            "current directory"
        );
        assert_eq!(
            describe_tool_call("list_directory", r#"{"DirectoryPath":"docs"}"#).1,
            "docs"
        );
    }

    #[test]
    fn test_web_search_quotes_query() {
        assert_eq!(
            describe_tool_call("web_search", r#"{"query":"rust async"}"#).1,
            "\"rust async\""
        );
    }

    #[test]
    fn test_unknown_tool_is_title_cased() {
        assert_eq!(
            describe_tool_call("fetch_weather_data", "{}"),
            ("Fetch Weather Data".to_string(), "executing...".to_string())
        );
    }

    #[test]
    fn test_invalid_json_is_shown_raw() {
        assert_eq!(
            describe_tool_call("read_file", "not json"),
            ("read_file".to_string(), "not json".to_string())
        );
    }
}
