//! # eventmaster-console
//!
//! Query console for the eventmaster event-search API.
//!
//! The crate turns a multi-field search form into an ordered parameter
//! list, dispatches either a point lookup or a filtered list search,
//! renders the results as a table whose rows load their payload on first
//! expansion, and can poll the backend in the background.
//!
//! ## Architecture
//!
//! ```text
//! SearchForm (domain/)
//!     │
//!     ├── QueryCompiler (service/)        form entries -> QueryParams
//!     ├── SearchRequest + dispatch        point lookup | list search
//!     │       │
//!     │       └── EventApi (client/)      reqwest against /v1/event
//!     │
//!     ├── ResultTable (render/)           replaced wholesale per response
//!     ├── QuerySession (service/)         params, table, refresh flags,
//!     │                                   fetch-once row details
//!     ├── RefreshLoop (service/)          background polling
//!     │
//!     └── EventBus (domain/)              notifications for front ends
//! ```

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod render;
pub mod service;
