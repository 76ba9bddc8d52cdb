/// Tools exposed over the JSON-RPC tool protocol
///
/// Each tool takes a deserialized parameter struct, resolves its inputs into
/// domain values and calls the aggregator. The reference day is passed in by
/// the caller, never read here.

pub mod create;
pub mod toggle;
pub mod list;
pub mod status;
pub mod update;
pub mod recompute;

pub use create::*;
pub use toggle::*;
pub use list::*;
pub use status::*;
pub use update::*;
pub use recompute::*;

use serde::Serialize;

use crate::aggregator::RecentWindow;
use crate::domain::DomainError;

/// A tool result: a human readable summary plus structured data
pub trait ToolResponse: Serialize {
    fn message(&self) -> &str;
}

/// Resolve an optional `recent_days` argument
fn parse_window(recent_days: Option<i64>) -> Result<Option<RecentWindow>, DomainError> {
    recent_days.map(RecentWindow::new).transpose()
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}
