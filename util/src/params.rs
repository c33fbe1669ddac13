//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::{fs::read_to_string, path::Path};
use thiserror::Error;

use crate::host;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable ({}) is not set", host::SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("Cannot load the parameter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the `$POS_CTRL_SW_ROOT/params` directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    let mut path = host::get_pos_ctrl_sw_root().map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    load_path(path)
}

/// Load a parameter file from an explicit path
pub fn load_path<P, F>(path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>,
{
    let params_str = read_to_string(path).map_err(LoadError::FileLoadError)?;

    from_toml_str(&params_str)
}

/// Parse parameters from a TOML string
pub fn from_toml_str<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct TestParams {
        endpoint: String,
        #[serde(default)]
        period_s: f64,
    }

    #[test]
    fn test_from_toml_str() {
        let p: TestParams = from_toml_str("endpoint = \"tcp://*:5000\"\nperiod_s = 0.5").unwrap();
        assert_eq!(
            p,
            TestParams {
                endpoint: "tcp://*:5000".into(),
                period_s: 0.5
            }
        );

        let p: TestParams = from_toml_str("endpoint = \"tcp://*:5000\"").unwrap();
        assert_eq!(p.period_s, 0.0);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            from_toml_str::<TestParams>("period_s = 0.5"),
            Err(LoadError::DeserialiseError(_))
        ));
        assert!(matches!(
            load_path::<TestParams, _>("/this/file/does/not/exist.toml"),
            Err(LoadError::FileLoadError(_))
        ));
    }
}
