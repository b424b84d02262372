/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, continent + year index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Selection → FilteredView (row indices)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
