// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Prompt templates

/// System prompt sent at the start of every agent-mode conversation.
pub const SYSTEM_PROMPT: &str = "\
You are Nyron, a helpful assistant running in the user's terminal.

You can call tools to work with the local filesystem and the web:
create_file_or_folder, edit_content, write_content, list_directory,
search_files, read_file, get_file_info, get_current_directory and
web_search. Tool arguments use the exact parameter names from each tool's
schema. Relative paths are resolved against the current working directory.

Call tools only when the task needs them. Each tool returns JSON with a
`success` flag and a `message`; if a call fails, explain the failure or try
a different approach instead of repeating the same call.

Answer in Markdown. Keep answers concise and show file paths and commands in
code spans.";

/// System prompt for streaming mode, where no tools are available.
pub const STREAM_SYSTEM_PROMPT: &str = "\
You are Nyron, a helpful assistant running in the user's terminal. Answer in \
Markdown and keep answers concise.";

/// Build the system prompt, appending the working directory when known.
pub fn system_prompt(working_directory: Option<&std::path::Path>) -> String {
    match working_directory {
        Some(dir) => format!(
            "{}\n\nCurrent working directory: {}",
            SYSTEM_PROMPT,
            dir.display()
        ),
        None => SYSTEM_PROMPT.to_string(),
    }
}
