//! System-level modules

pub mod lockfile;
pub mod logging;

pub use lockfile::DataDirLock;
pub use logging::init_logging;
