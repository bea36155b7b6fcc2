use config::{Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::imap::transport::Encryption;

/// Account credentials and connection settings for one IMAP account.
///
/// Values come from an optional config file (TOML or JSON) with
/// `MAILBIRD_*` environment variables layered on top; port and encryption
/// have sensible defaults. Passwords may be stored encoded — see
/// [`open_session_with`](crate::imap::session::open_session_with) for the
/// decoder hook applied before login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub encryption: Encryption,
}

impl AccountConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("port", 993)?
            .set_default("encryption", "tls")?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        // Environment overrides file values: MAILBIRD_HOST, MAILBIRD_USER, ...
        builder = builder.add_source(Environment::with_prefix("MAILBIRD"));

        Ok(builder.build()?.try_deserialize()?)
    }
}
