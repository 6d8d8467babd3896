pub mod booking;
pub mod lifecycle;
pub mod query;

pub use booking::SlotBookingService;
pub use lifecycle::AppointmentLifecycleService;
pub use query::{AppointmentQueryService, HistoryOptions};
