mod queue;
pub use queue::{CircularQueue, IntoIter, Iter};

mod config;
pub use config::SoakConfig;

pub mod logger;
pub use logger::{init_logger, DisplayOptions};

pub mod soak;
pub use soak::Report;
