//! Domain types for the lead-lag dataset

pub mod bar;
pub mod ids;
pub mod month;
pub mod observation;
pub mod series;

pub use bar::{PriceBar, PriceBarRow};
pub use ids::{SeriesId, SourceId};
pub use month::Month;
pub use observation::Observation;
pub use series::{AssetClass, SeriesInfo, SeriesSpec};
