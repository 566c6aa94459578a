use std::path::Path;

use crate::{Config, error::Error};

pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;

    validate_static_dir(&config)?;

    log::debug!("Loaded configuration from {}", path.display());

    Ok(config)
}

pub(crate) fn validate_static_dir(config: &Config) -> crate::Result<()> {
    let static_dir = &config.server.static_dir;

    if static_dir.as_os_str().is_empty() {
        return Err(Error::Validation(
            "server.static_dir must not be empty, omit it to use the default \"static\" directory".to_string(),
        ));
    }

    // A missing directory only disables asset serving, the pages and the API keep working.
    if !static_dir.is_dir() {
        log::warn!(
            "Static directory '{}' does not exist, requests under /static will return 404",
            static_dir.display()
        );
    }

    Ok(())
}
