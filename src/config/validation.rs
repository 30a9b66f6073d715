use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use garde::Validate;

use super::WrapConfig;
use crate::error::WrapError;

/// Load configuration with embedded defaults, then `statsd-wrap.toml` if
/// present, then `STATSD_WRAP_`-prefixed environment variables.
pub fn load_config() -> Result<WrapConfig, WrapError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(WrapConfig::default()))
        .merge(Toml::file("statsd-wrap.toml"))
        .merge(Env::prefixed("STATSD_WRAP_"));

    let config: WrapConfig = figment.extract()?;
    config.validate()?;

    Ok(config)
}
