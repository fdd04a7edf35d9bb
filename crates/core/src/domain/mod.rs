mod coordinates;
mod counters;
mod notification;
mod push;
mod record;
mod summary;
mod token;

pub use coordinates::Coordinates;
pub use counters::SessionCounters;
pub use notification::{Importance, LocalNotification, NotificationChannel, Platform};
pub use push::{PushMessage, RelayResponse};
pub use record::{DocumentId, UserIdentity, UserRecord};
pub use summary::{WorkflowSummary, SUMMARY_TITLE};
pub use token::DeviceToken;
