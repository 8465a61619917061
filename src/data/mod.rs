/// Data layer: core types, loading, and row typing.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (raw text cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  columns + rectangular Vec<RawRow>
///   └──────────┘
///        │  (one row at a time, pulled by the engine)
///        ▼
///   ┌──────────┐
///   │  parse    │  RawRow → TypedRow (numeric or text cells)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod parse;
