/// Tool protocol implementation
///
/// This module handles the JSON-RPC tool protocol spoken over stdio,
/// including request parsing and tool routing.

pub mod protocol;
pub mod server;

pub use server::McpServer;
