//! Bundled event listeners
//!
//! Small observers the gateway binary subscribes to its bridge. Applications
//! embedding the gateway usually bring their own.

mod echo;
mod logging;

pub use echo::EchoListener;
pub use logging::LoggingListener;
