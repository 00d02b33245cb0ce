//! Domain types shared by the fetch, discovery, and extraction layers.

pub mod date;
pub mod models;
pub mod timestamp;

pub use date::IsoDate;
pub use models::{
    percent_change, Edition, ExtractedValue, FieldMode, FieldSpec, HistoricalSnapshot,
    SourceDates,
};
pub use timestamp::UtcDateTime;
