pub mod collector;
pub mod ingest;
pub mod logging;
pub mod output;
pub mod replay_dir;
pub mod summary;

pub use collector::{Collector, Offer};
pub use ingest::{run, RunSettings};
pub use output::OutputWriter;
pub use replay_dir::replay_dir;
pub use summary::RunSummary;
