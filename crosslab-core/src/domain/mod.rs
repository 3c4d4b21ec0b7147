//! Domain types for CrossLab

pub mod bar;
pub mod position;
pub mod series;
pub mod trade;

pub use bar::Bar;
pub use position::OpenPosition;
pub use series::PriceSeries;
pub use trade::Trade;
