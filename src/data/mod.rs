/// Data layer: tabular and structured-document readers.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .db          .json / .yaml / .xml
///        │                                │
///        ▼                                ▼
///   ┌──────────────────┐           ┌────────────┐
///   │ loader / sqlite  │           │ structured │  serde → T
///   └──────────────────┘           └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table   │  Vec<Column>, each a Vec<CellValue>
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod sqlite;
pub mod structured;
