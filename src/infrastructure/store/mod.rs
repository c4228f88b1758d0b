//! Drop store infrastructure module

mod fs;

pub use fs::FsDropStore;
