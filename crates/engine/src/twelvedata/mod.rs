pub mod rest;

pub use rest::{parse_time_series, TwelveDataClient};
