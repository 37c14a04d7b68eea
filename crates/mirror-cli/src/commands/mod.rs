//! Command implementations for mirror-cli

pub mod check;
pub mod init;
pub mod plan;
pub mod status;
pub mod sync;

pub use check::run_check;
pub use init::{InitArgs, run_init};
pub use plan::run_plan;
pub use status::run_status;
pub use sync::run_sync;
