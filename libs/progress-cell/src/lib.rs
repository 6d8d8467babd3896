pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use models::*;
pub use router::{progress_routes, ProgressCellState};
pub use services::*;
pub use store::{InMemoryProgressStore, ProgressStore, SupabaseProgressStore};
