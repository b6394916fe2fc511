pub mod prelude {
    pub use crate::app::{logger, App};
    pub use crate::config::{Config, SmtpConfig, TlsMode};
    pub use crate::contact::{Submission, CONTACT_PATH};
    pub use crate::errors::{AppError, AppResult};
    pub use crate::mail::{Mailer, SmtpRelay};
    pub use tracing::{debug, error, info, trace, warn};
}

mod app;
pub mod config;
pub mod contact;
pub mod cors;
mod errors;
pub mod mail;

pub use app::App;
pub use errors::{AppError, AppResult};
