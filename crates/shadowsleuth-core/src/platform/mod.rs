/// Platform-specific functionality: snapshot listing capture, elevation
/// checks, and raw file timestamps.
pub mod permissions;
pub mod stat;
pub mod vss;

pub use permissions::is_elevated;
pub use vss::capture_listing;
