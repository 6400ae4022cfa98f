//! Command handlers, one module per sub-command.

pub mod create_fw;
pub mod create_manifest;
pub mod gen_build_info;
pub mod get;
pub mod get_build_info;
