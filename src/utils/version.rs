//! Version information

/// Crate version from Cargo metadata
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// `User-Agent` sent with status checks
pub fn user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), get_version())
}
