/// Data layer: record types, loading, and filtering.
///
/// Architecture:
/// ```text
///  scale-data.json    weighbridge-data.json   (.json / .csv)
///        │                    │
///        ▼                    ▼
///   ┌──────────────────────────────┐
///   │  loader   both loads joined   │  parse rows → EquipmentRecord
///   └──────────────────────────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ RecordStore  │  scales, weighbridges, region index
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  regions × category → ViewResult (markers + counts)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
