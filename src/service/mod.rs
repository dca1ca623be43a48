//! Service layer: compiling, dispatching and session orchestration.
//!
//! [`QuerySession`] ties the [`QueryCompiler`] and [`dispatch`] to the
//! results table, loads row details on demand and emits notifications
//! through the [`super::domain::EventBus`]. [`RefreshLoop`] re-runs the
//! session's search in the background.

pub mod compiler;
pub mod dispatcher;
pub mod refresh;
pub mod session;

pub use compiler::QueryCompiler;
pub use dispatcher::{SearchRequest, dispatch};
pub use refresh::{RefreshHandle, RefreshLoop, RefreshStats};
pub use session::{DetailOutcome, PollOutcome, QuerySession, SearchOutcome, SessionSettings};
