//! CLI command implementations

mod config_gen;
mod link_management;

pub use config_gen::config_generate;
pub use link_management::{list_codes, show_code, shorten_url};
