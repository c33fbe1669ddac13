//! Host platform (linux for example) utility functions

use std::{env, path::PathBuf};

/// Environment variable which points to the root of the software installation. Parameter files
/// are read from `$POS_CTRL_SW_ROOT/params` and sessions written to `$POS_CTRL_SW_ROOT/sessions`.
pub const SW_ROOT_ENV_VAR: &str = "POS_CTRL_SW_ROOT";

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the root directory of the software.
pub fn get_pos_ctrl_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
