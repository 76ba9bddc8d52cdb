/// Tool protocol message structures and JSON-RPC handling
///
/// This module defines the JSON-RPC message format clients use to list and
/// call the habit tools.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aggregator::TrackerError;

/// Protocol version we support
pub const MCP_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 request message
///
/// Requests without an `id` are notifications and get no response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Unique identifier for this request
    #[serde(default)]
    pub id: Option<Value>,
    /// The method to call (e.g., "tools/call")
    pub method: String,
    /// Parameters for the method call
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response message
///
/// Contains either a successful result or an error.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID that we're responding to
    pub id: Value,
    /// Successful result (if no error occurred)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error information (if something went wrong)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error information
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: String) -> Self {
        Self {
            code,
            message,
            data: None,
        }
    }
}

fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

/// Tool call parameters
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call (e.g., "habit_toggle")
    pub name: String,
    /// Arguments, deserialized into the tool's own parameter struct
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

/// Tool call result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    pub is_error: bool,
}

/// Content returned by a tool
#[derive(Debug, Serialize)]
pub struct ToolContent {
    /// Type of content (always "text")
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// Tool definition advertised by `tools/list`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

/// Initialization response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// JSON-RPC error codes
pub mod error_codes {
    /// Invalid JSON was received by the server
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// The requested method doesn't exist
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Method exists but parameters are wrong
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Application codes, -32000 to -32099
    /// The specified habit ID doesn't exist
    pub const HABIT_NOT_FOUND: i32 = -32001;
    /// Input validation failed
    pub const VALIDATION_ERROR: i32 = -32003;
    /// Database or storage operation failed
    pub const STORAGE_ERROR: i32 = -32004;
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
        }
    }

    pub fn from_error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl ToolCallResult {
    /// A summary line followed by the structured result as JSON
    pub fn success(message: String, data: &Value) -> Self {
        Self {
            content: vec![
                ToolContent {
                    content_type: "text".to_string(),
                    text: message,
                },
                ToolContent {
                    content_type: "text".to_string(),
                    text: data.to_string(),
                },
            ],
            is_error: false,
        }
    }

    pub fn error(error_message: String) -> Self {
        Self {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text: format!("Error: {}", error_message),
            }],
            is_error: true,
        }
    }
}

/// Map a tracker error onto its JSON-RPC application code
pub fn tracker_error_to_json_rpc_code(error: &TrackerError) -> i32 {
    match error {
        TrackerError::InvalidInput(_) => error_codes::VALIDATION_ERROR,
        TrackerError::NotFound { .. } => error_codes::HABIT_NOT_FOUND,
        TrackerError::Storage(_) => error_codes::STORAGE_ERROR,
    }
}

impl From<TrackerError> for JsonRpcError {
    fn from(error: TrackerError) -> Self {
        JsonRpcError::new(tracker_error_to_json_rpc_code(&error), error.to_string())
    }
}
