//! Location infrastructure module
//!
//! Desktop machines carry no positioning hardware, so the provider is
//! fed from configuration and CLI flags.

mod fixed;

pub use fixed::FixedLocationProvider;
