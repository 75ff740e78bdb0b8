/// Data layer: core types, loading, filtering and reductions.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (once, at startup)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, distinct values per dimension
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec + free-text course match → Selection
///   └──────────┘
///        │
///        ├──────────────┬──────────────┐
///        ▼              ▼              ▼
///   ┌───────────┐  ┌────────┐  ┌──────────┐
///   │ aggregate  │  │  rank   │  │ metrics   │
///   └───────────┘  └────────┘  └──────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod rank;
