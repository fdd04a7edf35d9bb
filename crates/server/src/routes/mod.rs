mod health;
mod notifications;
pub mod sse;
mod workflow;

pub use health::*;
pub use notifications::*;
pub use workflow::*;
