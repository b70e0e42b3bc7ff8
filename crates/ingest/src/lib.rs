pub mod error;
pub mod export;
pub mod fixtures;
pub mod params;
pub mod table;

pub use error::{ExportError, IngestError};
pub use export::{export_forecast, ExportTable};
pub use fixtures::{DemoDataset, DemoFiles};
pub use params::{load_growth_adjustments, load_seasonality_adjustments};
pub use table::{load_base, load_historical, read_rows};
