//! # sheetdrop
//!
//! A small upload-and-search service for tabular data. Clients upload a
//! CSV or XLSX file, process it into a normalized in-memory dataset, fetch
//! or search the records, and attach images to rows; image retrieval falls
//! back to placeholder assets so a table render never breaks.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌───────────┐
//! │  Ingest  │──▶│ Normalizer │──▶│   Store    │
//! │ csv/xlsx │   │ image_url  │   │ uuid → rows│
//! └──────────┘   └────────────┘   └─────┬─────┘
//!                                       │
//!                   ┌───────────────────┤
//!                   ▼                   ▼
//!              ┌──────────┐       ┌──────────┐
//!              │  Search  │       │   HTTP   │
//!              │ substring│       │  (axum)  │
//!              └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! sheetdrop serve                    # start the HTTP server
//! sheetdrop process data.csv         # preview the pipeline locally
//! sheetdrop search data.csv "food"   # query a local file
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`ingest`] | CSV/XLSX parsing into raw tables |
//! | [`normalize`] | Column normalization and image references |
//! | [`store`] | In-memory dataset store |
//! | [`search`] | Substring query engine |
//! | [`images`] | Image storage and placeholder fallback |
//! | [`server`] | JSON HTTP server |

pub mod config;
pub mod images;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod search;
pub mod server;
pub mod store;
