use std::env;
use std::path::PathBuf;

use verseblog::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));
    let cur_dir = env::current_dir().ok();
    let cfg_dir = dirs::config_dir();

    [exe_dir, cur_dir, cfg_dir].into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

/// An explicit path has to exist. Without one, a missing file means built-in defaults.
pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = match cfg_path.or_else(get_config_path) {
        Some(path) => path,
        None => {
            eprintln!("No {} found. Using default configuration", CFG_FILE_NAME);
            return Ok(Config::default());
        }
    };

    eprintln!("Reading config from {}", config_path.display());
    let config = read_config(&config_path).map_err(|e| e.to_string())?;

    if let Some(ref log) = config.log {
        match log.location {
            Some(ref location) => eprintln!("Log enabled. Files will be written in {}", location.display()),
            None => eprintln!("Log enabled. Using console"),
        }
    }

    Ok(config)
}
