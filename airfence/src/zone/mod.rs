//! Notification zones.
//!
//! A zone is a circle on the ground with a time-bounded activation window.
//! Each zone records which tracks are currently inside it. Zones are created
//! and deleted by explicit commands; their status only moves through
//! [`advance`], never by direct assignment.
//!
//! # Lifecycle
//!
//! ```text
//! Created --[start <= now <= end]--> Active
//! Active  --[now > end]-----------> Expired (membership cleared)
//! Expired --[start <= now <= end]--> Active
//! ```

mod lifecycle;
mod model;
mod store;

pub use lifecycle::{advance, LifecycleTransition};
pub use model::{Zone, ZoneDefinition, ZoneStatus};
pub use store::ZoneStore;
