pub mod delegates;
pub mod frame_methods;

// Delegate caching (core analyzer)
pub use delegates::ShouldCacheDelegateLint;

// Frame-tick method checks
pub use frame_methods::{EmptyFrameTickMethodLint, OnGuiUsageLint};
