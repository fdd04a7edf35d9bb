//! Push plumbing: registration with the Expo push service, relay delivery
//! and local notification display.

pub mod error;
pub mod notifier;
pub mod relay;
pub mod token;

pub use error::{PushError, Result};
pub use notifier::LocalNotifier;
pub use relay::{ExpoPushClient, DEFAULT_EXPO_BASE_URL};
pub use token::{DeviceInfo, ExpoTokenProvider};
