use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An open paper position, held between an entry signal and the next exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry: DateTime<Utc>,
    pub entry_index: usize,
    pub entry_price: f64,
}

