/// Tool server that handles JSON-RPC communication
///
/// This module implements the server loop that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Processes tool calls using the habit aggregator
/// 3. Writes JSON-RPC responses to stdout

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::aggregator::TrackerError;
use crate::mcp::protocol::*;
use crate::tools::{self, ToolResponse};
use crate::{HabitTrackerServer, ServerError};

pub struct McpServer {
    habit_tracker: HabitTrackerServer,
    initialized: bool,
}

impl McpServer {
    pub fn new(habit_tracker: HabitTrackerServer) -> Self {
        Self {
            habit_tracker,
            initialized: false,
        }
    }

    /// Whether the client has sent its `initialized` notification
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server, handling JSON-RPC over stdin/stdout until stdin closes
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting tool server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("Tool server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request.method);
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, Value::Null)
            }
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };

        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                info!("Client finished initialization");
                self.initialized = true;
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        info!("Client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Streaks".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_response(id, &result)
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools = [
            tool_definition::<tools::CreateHabitParams>(
                "habit_create",
                "Create a new habit to track daily",
            ),
            tool_definition::<tools::ToggleHabitParams>(
                "habit_toggle",
                "Mark a habit done (or not done) for today or an earlier date and update its streaks",
            ),
            tool_definition::<tools::ListHabitsParams>(
                "habit_list",
                "List habits with their streaks and recent completions, with optional filters and sorting",
            ),
            tool_definition::<tools::HabitStatusParams>(
                "habit_status",
                "Show one habit's current and longest streak and its recent history",
            ),
            tool_definition::<tools::UpdateHabitParams>(
                "habit_update",
                "Rename, describe, categorize, archive or restore a habit",
            ),
            tool_definition::<tools::RecomputeParams>(
                "habit_recompute",
                "Recompute a habit's streaks from its full history and repair a stale cache",
            ),
        ];

        match tools.into_iter().collect::<Result<Vec<_>, _>>() {
            Ok(tools) => to_response(id, &json!({ "tools": tools })),
            Err(e) => JsonRpcResponse::error(
                id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to build tool schemas: {}", e),
                None,
            ),
        }
    }

    fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params {
            Some(params) => match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        error_codes::INVALID_PARAMS,
                        format!("Invalid parameters: {}", e),
                        None,
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let aggregator = self.habit_tracker.aggregator();
        // One reference day for the whole call
        let today = self.habit_tracker.today();
        let arguments = tool_params.arguments;

        let result = match tool_params.name.as_str() {
            "habit_create" => call_tool(arguments, |p| tools::create_habit(aggregator, p)),
            "habit_toggle" => call_tool(arguments, |p| tools::toggle_habit(aggregator, p, today)),
            "habit_list" => call_tool(arguments, |p| tools::list_habits(aggregator, p, today)),
            "habit_status" => call_tool(arguments, |p| tools::habit_status(aggregator, p, today)),
            "habit_update" => call_tool(arguments, |p| tools::update_habit(aggregator, p)),
            "habit_recompute" => {
                call_tool(arguments, |p| tools::recompute_habit(aggregator, p, today))
            }
            other => Ok(ToolCallResult::error(format!("Unknown tool: {}", other))),
        };

        match result {
            Ok(result) => to_response(id, &result),
            Err(error) => {
                warn!("Tool '{}' failed: {}", tool_params.name, error.message);
                JsonRpcResponse::from_error(id, error)
            }
        }
    }
}

/// Deserialize arguments, run the tool and package its response
fn call_tool<P, R>(
    arguments: Value,
    tool: impl FnOnce(P) -> Result<R, TrackerError>,
) -> Result<ToolCallResult, JsonRpcError>
where
    P: DeserializeOwned,
    R: ToolResponse,
{
    let params: P = serde_json::from_value(arguments).map_err(|e| {
        JsonRpcError::new(error_codes::INVALID_PARAMS, format!("Invalid arguments: {}", e))
    })?;

    let response = tool(params)?;

    let data = serde_json::to_value(&response).map_err(|e| {
        JsonRpcError::new(error_codes::INTERNAL_ERROR, format!("Failed to encode result: {}", e))
    })?;

    Ok(ToolCallResult::success(response.message().to_string(), &data))
}

fn tool_definition<P: JsonSchema>(
    name: &str,
    description: &str,
) -> Result<ToolDefinition, serde_json::Error> {
    Ok(ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema_for!(P))?,
    })
}

fn to_response<T: serde::Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Failed to encode response: {}", e),
            None,
        ),
    }
}
