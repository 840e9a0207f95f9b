//! View models
//!
//! One per screen. Each owns its collection stores and a [`ViewScope`];
//! dropping a view model abandons whatever it still has in flight.
//!
//! [`ViewScope`]: crate::scope::ViewScope

mod auth;
mod dashboard;
mod desk;
mod meetings;
mod notifications;
mod topics;

pub use auth::AuthViewModel;
pub use dashboard::DashboardViewModel;
pub use desk::DeskViewModel;
pub use meetings::{MeetingsViewModel, SlotForm};
pub use notifications::NotificationsViewModel;
pub use topics::TopicsViewModel;
