use std::{env, fmt, str::FromStr, time::Duration};
use tracing::warn;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://mehmetemreok.com";
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// How the smtp session is secured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Plaintext session, never upgraded
    None,
    /// STARTTLS when the server offers it
    #[default]
    Opportunistic,
    /// STARTTLS, failing when the server does not offer it
    Required,
    /// TLS from the first byte, usually on port 465
    Wrapper,
}

impl FromStr for TlsMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "opportunistic" => Ok(Self::Opportunistic),
            "starttls" | "required" => Ok(Self::Required),
            "wrapper" | "tls" | "implicit" => Ok(Self::Wrapper),
            other => Err(anyhow::anyhow!("unknown smtp tls mode {other:?}")),
        }
    }
}

/// Smtp settings. Values are kept as read from the environment and only
/// interpreted when a mail is sent, so a missing variable shows up as a
/// failed delivery rather than a failed startup.
#[derive(Clone, Default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub to: String,
    pub tls: TlsMode,
    pub accept_invalid_certs: bool,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("to", &self.to)
            .field("tls", &self.tls)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub smtp: SmtpConfig,
    pub allowed_origin: String,
    pub bind: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            smtp: SmtpConfig::default(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.into(),
            bind: DEFAULT_BIND.into(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    /// Load the `.env` file beforehand if one should be honored.
    pub fn from_env() -> Self {
        let tls = env::var("SMTP_TLS")
            .ok()
            .and_then(|s| {
                s.parse::<TlsMode>()
                    .inspect_err(|e| warn!("{e}, using opportunistic"))
                    .ok()
            })
            .unwrap_or_default();
        let accept_invalid_certs = env::var("SMTP_ACCEPT_INVALID_CERTS")
            .map(|s| s.parse::<bool>().unwrap_or(false))
            .unwrap_or(false);
        if accept_invalid_certs {
            warn!("Accepting invalid certs for smtp, use only for dev");
        }
        let timeout = env::var("SMTP_TIMEOUT_SECS").ok().and_then(|s| {
            s.parse::<u64>()
                .inspect_err(|_| warn!("Ignoring invalid SMTP_TIMEOUT_SECS {s:?}"))
                .ok()
                .map(Duration::from_secs)
        });
        let smtp = SmtpConfig {
            host: env::var("SMTP_HOST").unwrap_or_default(),
            port: env::var("SMTP_PORT").unwrap_or_default(),
            user: env::var("SMTP_USER").unwrap_or_default(),
            password: env::var("SMTP_PASS").unwrap_or_default(),
            to: env::var("SMTP_TO_EMAIL").unwrap_or_default(),
            tls,
            accept_invalid_certs,
            timeout,
        };

        Self {
            smtp,
            allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGIN.into()),
            bind: env::var("SERVER_BIND").unwrap_or_else(|_| DEFAULT_BIND.into()),
            port: env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_mode_names() {
        assert_eq!("none".parse::<TlsMode>().unwrap(), TlsMode::None);
        assert_eq!("STARTTLS".parse::<TlsMode>().unwrap(), TlsMode::Required);
        assert_eq!(" wrapper ".parse::<TlsMode>().unwrap(), TlsMode::Wrapper);
        assert_eq!(
            "opportunistic".parse::<TlsMode>().unwrap(),
            TlsMode::Opportunistic
        );
        assert!("ssl3".parse::<TlsMode>().is_err());
    }

    #[test]
    fn debug_hides_password() {
        let smtp = SmtpConfig {
            password: "hunter2".into(),
            ..Default::default()
        };
        assert!(!format!("{smtp:?}").contains("hunter2"));
    }
}
