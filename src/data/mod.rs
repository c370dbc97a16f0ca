/// Data layer: trace ingestion, smoothing, detection, curation, statistics.
///
/// Pipeline:
/// ```text
///  instrument .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse records → raw force samples
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  smooth   │  Savitzky–Golay → filtered samples
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  detect   │  local maxima → proposed peak indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ curation   │  CurationStore: detected ∪ manual − tombstones
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  mean / std dev / OLS trend of the final peaks
///   └──────────┘
/// ```
pub mod curation;
pub mod detect;
pub mod loader;
pub mod model;
pub mod smooth;
pub mod stats;
