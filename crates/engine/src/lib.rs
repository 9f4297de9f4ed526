pub mod cycle;
pub mod lifecycle;
pub mod twelvedata;

pub use cycle::{run_cycle, CycleConfig, CycleError, CycleOutcome, Delivery};
pub use lifecycle::{Poller, PollerStats};
pub use twelvedata::TwelveDataClient;
