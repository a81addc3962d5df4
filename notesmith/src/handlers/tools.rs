//! MCP `tools/list` and `tools/call` handlers.
//!
//! Each tool maps onto one [`NotesService`] operation. Arguments are handed
//! to the service as [`RawText`], so a missing or non-string argument is
//! reported by validation like any other bad input.

use notesmith_core::RawText;
use serde_json::{Map, Value, json};

use crate::error::NotesmithError;
use crate::notes::NotesService;
use crate::script::ScriptRunner;
use crate::transport::jsonrpc::{JsonRpcRequest, JsonRpcResponse, error_codes};

/// A tool argument: name, description, and whether it is required.
type Param = (&'static str, &'static str, bool);

/// A tool definition as advertised by `tools/list`.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    /// Tool name.
    pub name: &'static str,
    /// One-line description for the client.
    pub description: &'static str,
    params: &'static [Param],
}

impl ToolSpec {
    /// Builds the JSON Schema for the tool's arguments.
    #[must_use]
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|(name, description, _)| {
                (
                    (*name).to_string(),
                    json!({ "type": "string", "description": description }),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|(_, _, required)| *required)
            .map(|(name, _, _)| *name)
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

const FOLDER: Param = ("folder", "Folder name; omit to use the default", false);

/// Every tool this server offers, in listing order.
pub const TOOLS: [ToolSpec; 8] = [
    ToolSpec {
        name: "list_folders",
        description: "List the names of all Notes folders.",
        params: &[],
    },
    ToolSpec {
        name: "create_folder",
        description: "Create a Notes folder.",
        params: &[("name", "Folder name", true)],
    },
    ToolSpec {
        name: "list_notes",
        description: "List note titles in a folder, or in every folder.",
        params: &[("folder", "Folder name; omit to list every folder", false)],
    },
    ToolSpec {
        name: "search_notes",
        description: "Find notes whose title or body contains the query.",
        params: &[("query", "Text to search for", true)],
    },
    ToolSpec {
        name: "get_note",
        description: "Read a note and return its body as markdown.",
        params: &[("title", "Note title", true), FOLDER],
    },
    ToolSpec {
        name: "create_note",
        description: "Create a note from a markdown body.",
        params: &[
            ("title", "Note title", true),
            ("body", "Note body in markdown", true),
            FOLDER,
        ],
    },
    ToolSpec {
        name: "update_note",
        description: "Replace a note's body with markdown, optionally renaming it.",
        params: &[
            ("title", "Current note title", true),
            ("body", "New note body in markdown", true),
            ("new_title", "New title for the note", false),
            FOLDER,
        ],
    },
    ToolSpec {
        name: "delete_note",
        description: "Delete a note.",
        params: &[("title", "Note title", true), FOLDER],
    },
];

/// Handles `tools/list`.
#[must_use]
pub fn handle_list(request: &JsonRpcRequest) -> JsonRpcResponse {
    let tools: Vec<Value> = TOOLS
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema(),
            })
        })
        .collect();

    JsonRpcResponse::success(request.id.clone(), json!({ "tools": tools }))
}

/// Handles `tools/call`.
///
/// Protocol mistakes (no tool name, unknown tool, non-object arguments) are
/// JSON-RPC errors. Failures of the operation itself come back as a result
/// with `isError: true` and the error message as text.
pub async fn handle_call<R: ScriptRunner>(
    request: &JsonRpcRequest,
    service: &NotesService<R>,
) -> JsonRpcResponse {
    let params = request.params.as_ref();

    let Some(name) = params.and_then(|p| p.get("name")).and_then(Value::as_str) else {
        return JsonRpcResponse::error(
            request.id.clone(),
            error_codes::INVALID_PARAMS,
            "missing required parameter: name",
        );
    };

    if !TOOLS.iter().any(|tool| tool.name == name) {
        return unknown_tool(request, name);
    }

    let empty = Map::new();
    let arguments = match params.and_then(|p| p.get("arguments")) {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => {
            return JsonRpcResponse::error(
                request.id.clone(),
                error_codes::INVALID_PARAMS,
                "arguments must be an object",
            );
        }
    };

    tracing::debug!(tool = name, "calling tool");

    let result = match call_tool(name, arguments, service).await {
        Ok(text) => json!({ "content": [{ "type": "text", "text": text }] }),
        Err(e) => {
            tracing::warn!(tool = name, error = %e, "tool call failed");
            json!({
                "content": [{ "type": "text", "text": e.to_string() }],
                "isError": true,
            })
        }
    };

    JsonRpcResponse::success(request.id.clone(), result)
}

/// Suggests the closest tool name for typo correction.
///
/// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
#[must_use]
pub fn suggest_tool(input: &str) -> Option<&'static str> {
    TOOLS
        .iter()
        .map(|tool| (tool.name, strsim::damerau_levenshtein(input, tool.name)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name)
}

fn unknown_tool(request: &JsonRpcRequest, name: &str) -> JsonRpcResponse {
    let suggestion = suggest_tool(name);
    let message = suggestion.map_or_else(
        || format!("unknown tool: {name}"),
        |s| format!("unknown tool: {name} (did you mean '{s}'?)"),
    );
    JsonRpcResponse::error_with_data(
        request.id.clone(),
        error_codes::INVALID_PARAMS,
        message,
        suggestion.map(|s| json!({ "suggestion": s })),
    )
}

fn arg(arguments: &Map<String, Value>, key: &str) -> RawText {
    RawText::from(arguments.get(key))
}

async fn call_tool<R: ScriptRunner>(
    name: &str,
    args: &Map<String, Value>,
    service: &NotesService<R>,
) -> Result<String, NotesmithError> {
    match name {
        "list_folders" => Ok(name_list(&service.list_folders().await?, "No folders found.")),
        "create_folder" => {
            let created = service.create_folder(&arg(args, "name")).await?;
            Ok(format!("Created folder: {created}"))
        }
        "list_notes" => {
            let notes = service.list_notes(&arg(args, "folder")).await?;
            Ok(name_list(&notes, "No notes found."))
        }
        "search_notes" => {
            let notes = service.search_notes(&arg(args, "query")).await?;
            Ok(name_list(&notes, "No matching notes."))
        }
        "get_note" => {
            let body = service
                .show_note(&arg(args, "title"), &arg(args, "folder"))
                .await?;
            Ok(body.into_string())
        }
        "create_note" => {
            let created = service
                .create_note(&arg(args, "title"), &arg(args, "body"), &arg(args, "folder"))
                .await?;
            Ok(format!("Created note: {created}"))
        }
        "update_note" => {
            let updated = service
                .update_note(
                    &arg(args, "title"),
                    &arg(args, "body"),
                    &arg(args, "new_title"),
                    &arg(args, "folder"),
                )
                .await?;
            Ok(format!("Updated note: {updated}"))
        }
        "delete_note" => {
            let title = arg(args, "title");
            service.delete_note(&title, &arg(args, "folder")).await?;
            Ok(format!(
                "Deleted note: {}",
                title.as_text().unwrap_or_default().trim()
            ))
        }
        other => Err(NotesmithError::Usage(format!("unknown tool: {other}"))),
    }
}

fn name_list(names: &[String], empty: &str) -> String {
    if names.is_empty() {
        empty.to_string()
    } else {
        names.join("\n")
    }
}
