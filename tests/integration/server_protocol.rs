/// JSON-RPC round trips through the tool server
use habit_streaks::mcp::McpServer;
use habit_streaks::*;
use serde_json::{json, Value};
use tempfile::TempDir;

#[cfg(test)]
mod server_protocol_tests {
    use super::*;

    async fn server() -> (TempDir, McpServer) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let tracker = HabitTrackerServer::new(temp_dir.path().join("habits.db"), TrackerConfig::default())
            .await
            .expect("Failed to create server");
        (temp_dir, McpServer::new(tracker))
    }

    async fn send(server: &mut McpServer, request: Value) -> Value {
        let response = server
            .process_line(&request.to_string())
            .await
            .expect("Expected a response");
        serde_json::to_value(response).unwrap()
    }

    async fn call(server: &mut McpServer, id: i64, name: &str, arguments: Value) -> Value {
        send(
            server,
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": "tools/call",
                "params": { "name": name, "arguments": arguments }
            }),
        )
        .await
    }

    /// The structured half of a successful tool result
    fn data(response: &Value) -> Value {
        let text = response["result"]["content"][1]["text"].as_str().expect("Missing data content");
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_and_list_tools() {
        let (_dir, mut server) = server().await;

        let init = send(&mut server, json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}})).await;
        assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(init["result"]["serverInfo"]["name"], "Habit Streaks");

        let notification = server
            .process_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(notification.is_none());
        assert!(server.is_initialized());

        let listed = send(&mut server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let tools = listed["result"]["tools"].as_array().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec!["habit_create", "habit_toggle", "habit_list", "habit_status", "habit_update", "habit_recompute"]
        );

        let toggle_schema = &tools[1]["inputSchema"];
        assert!(toggle_schema["properties"]["habit_id"].is_object());
        assert_eq!(toggle_schema["required"], json!(["habit_id"]));
    }

    #[tokio::test]
    async fn test_create_toggle_and_status() {
        let (_dir, mut server) = server().await;

        let created = call(&mut server, 1, "habit_create", json!({"title": "Read", "category": "productivity"})).await;
        assert_eq!(created["result"]["isError"], false);
        let habit_id = data(&created)["habit"]["id"].as_str().unwrap().to_string();

        let toggled = call(&mut server, 2, "habit_toggle", json!({"habit_id": habit_id})).await;
        let toggled = data(&toggled);
        assert_eq!(toggled["completed"], true);
        assert_eq!(toggled["current_streak"], 1);
        assert_eq!(toggled["longest_streak"], 1);

        let status = call(&mut server, 3, "habit_status", json!({"habit_id": habit_id, "recent_days": 3})).await;
        let status = data(&status);
        assert_eq!(status["completed_today"], true);
        assert_eq!(status["habit"]["title"], "Read");
        assert_eq!(status["habit"]["recent_completions"].as_array().unwrap().len(), 1);

        let listed = call(&mut server, 4, "habit_list", json!({"completed_today": true, "sort_by": "title"})).await;
        assert_eq!(data(&listed)["total"], 1);
    }

    #[tokio::test]
    async fn test_errors_map_to_application_codes() {
        let (_dir, mut server) = server().await;

        let missing = call(&mut server, 1, "habit_status", json!({"habit_id": HabitId::new().to_string()})).await;
        assert_eq!(missing["error"]["code"], -32001);

        let bad_sort = call(&mut server, 2, "habit_list", json!({"sort_by": "completion_rate"})).await;
        assert_eq!(bad_sort["error"]["code"], -32003);

        let future = call(&mut server, 3, "habit_create", json!({"title": "Run"})).await;
        let habit_id = data(&future)["habit"]["id"].as_str().unwrap().to_string();
        let future = call(&mut server, 4, "habit_toggle", json!({"habit_id": habit_id, "date": "2999-01-01"})).await;
        assert_eq!(future["error"]["code"], -32003);

        let wrong_type = call(&mut server, 5, "habit_toggle", json!({"habit_id": 42})).await;
        assert_eq!(wrong_type["error"]["code"], -32602);

        let unknown_tool = call(&mut server, 6, "habit_insights", json!({})).await;
        assert_eq!(unknown_tool["result"]["isError"], true);

        let unknown_method = send(&mut server, json!({"jsonrpc": "2.0", "id": 7, "method": "resources/list"})).await;
        assert_eq!(unknown_method["error"]["code"], -32601);

        let garbage = server.process_line("{not json").await.map(|r| serde_json::to_value(r).unwrap());
        assert_eq!(garbage.unwrap()["error"]["code"], -32700);
    }
}
