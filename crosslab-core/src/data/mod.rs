//! Price data acquisition: Polygon aggregates, CSV files, synthetic walks.

pub mod csv_file;
pub mod polygon;
pub mod provider;
pub mod synthetic;

pub use csv_file::CsvProvider;
pub use polygon::PolygonProvider;
pub use provider::{DataError, DataProvider, DataSource, FetchRequest, FetchResult, Timespan};
pub use synthetic::SyntheticProvider;
