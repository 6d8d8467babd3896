pub mod aggregator;
pub mod progress;

pub use aggregator::summarize;
pub use progress::ProgressService;
