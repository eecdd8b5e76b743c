pub mod error;
pub mod config;
pub mod identity;
pub mod routing;
pub mod gateway;
pub mod api;
pub mod filters;
pub mod cli;

// Test-only printing helper: expands to eprintln! during tests and debug builds and is absent otherwise.
// Usage: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In non-test builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        // Preserve formatting checks in release without producing code
        if false { let _ = format!($($arg)*); }
    });
}
