//! Domain layer: query parameters, event records, form and row models.
//!
//! Everything here is pure data plus the conversions between it; no
//! module in this layer performs I/O.

pub mod console_event;
pub mod event_bus;
pub mod event_record;
pub mod form;
pub mod query_param;
pub mod row;
pub mod session_id;
pub mod timestamp;

pub use console_event::ConsoleEvent;
pub use event_bus::EventBus;
pub use event_record::{EventRecord, LookupResponse, ResultSet, SearchResponse};
pub use form::{FieldKind, FormEntry, SearchForm};
pub use query_param::{QueryParam, QueryParams, SearchMode};
pub use row::{Column, DetailState, RenderedRow, RowModel};
pub use session_id::SessionId;
