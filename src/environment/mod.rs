//! Environment detection
//!
//! Classifies the host platform once at startup and lists where each
//! supported browser keeps its cookies on that platform.

pub mod detector;
pub mod signals;

pub use detector::{Detection, EnvironmentDetector, HostProfile};
pub use signals::HostSignals;
