//! Data layer: core types, loading, schema binding and filtering.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet          config.json
//!        │                               │
//!        ▼                               ▼
//!   ┌──────────┐                   ┌──────────┐
//!   │  loader   │  parse → Dataset │  schema   │  constructs + field rules
//!   └──────────┘                   └──────────┘
//!        │                               │
//!        └───────────────┬───────────────┘
//!                        ▼
//!                  ┌──────────┐
//!                  │  Survey   │  validated values per row/construct
//!                  └──────────┘
//!                        │
//!                        ▼
//!                  ┌──────────┐
//!                  │  filter   │  mean-threshold / overlap → kept + discarded
//!                  └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
