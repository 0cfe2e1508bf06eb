//! Command implementations.

mod analyze;
mod config;
mod doctor;
mod files;
mod init;

pub use analyze::run_analyze;
pub use config::run_config;
pub use doctor::run_doctor;
pub use files::{run_delete, run_info, run_ls, run_mkdir, run_read, run_write};
pub use init::run_init;
