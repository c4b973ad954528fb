//! CLI command implementations

mod config;
mod report;
mod scan;
mod serve;
mod status;

pub use config::{config_init, config_path, config_show, load_config};
pub use report::report_command;
pub use scan::{build_request, scan_command, ScanArgs};
pub use serve::serve_command;
pub use status::{status_command, wait_for_job};
