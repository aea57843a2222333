// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{FlowdagError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::FlowdagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.queue))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    // drain_policy is strongly typed and validated during deserialization,
    // so only the numeric fields need checking here.
    if cfg.queue.channel_capacity == 0 {
        return Err(FlowdagError::ConfigError(
            "[queue].channel_capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}
