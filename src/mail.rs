use crate::{
    config::{SmtpConfig, TlsMode},
    contact::Submission,
};
use anyhow::Context;
use lettre::{
    address::Envelope,
    message::{
        header::{ContentTransferEncoding, ContentType},
        Mailbox,
    },
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    Message, SmtpTransport, Transport,
};
use tracing::debug;

pub const SUBJECT_PREFIX: &str = "Yeni İletişim Formu Mesajı - ";

/// Relays contact submissions as plaintext mails to a single recipient.
///
/// Generic over the lettre transport so that tests can hand in a
/// `StubTransport` where the server uses [`SmtpRelay`].
#[derive(Clone, Debug)]
pub struct Mailer<T> {
    from: String,
    to: String,
    transport: T,
}

impl Mailer<SmtpRelay> {
    pub fn smtp(config: &SmtpConfig) -> Self {
        Self::new(config, SmtpRelay::new(config.clone()))
    }
}

impl<T> Mailer<T>
where
    T: Transport,
    T::Error: Into<anyhow::Error>,
{
    /// Mails are sent from the smtp account to the configured recipient.
    pub fn new(config: &SmtpConfig, transport: T) -> Self {
        Self {
            from: config.user.clone(),
            to: config.to.clone(),
            transport,
        }
    }

    pub fn message(&self, submission: &Submission) -> anyhow::Result<Message> {
        let from: Mailbox = self
            .from
            .parse()
            .with_context(|| format!("invalid sender address {:?}", self.from))?;
        let to: Mailbox = self
            .to
            .parse()
            .with_context(|| format!("invalid recipient address {:?}", self.to))?;
        let reply_to: Mailbox = submission
            .email
            .parse()
            .with_context(|| format!("invalid reply-to address {:?}", submission.email))?;
        Message::builder()
            .from(from)
            .to(to)
            .reply_to(reply_to)
            .subject(subject(submission))
            .header(ContentType::TEXT_PLAIN)
            .header(ContentTransferEncoding::QuotedPrintable)
            .body(body(submission))
            .context("could not build email")
    }

    /// Sends one mail for the submission. Blocks for the whole smtp exchange
    /// and makes a single attempt.
    pub fn send(&self, submission: &Submission) -> anyhow::Result<()> {
        let message = self.message(submission)?;
        self.transport
            .send(&message)
            .map_err(Into::<anyhow::Error>::into)?;
        debug!(to = %self.to, "Mail relayed");
        Ok(())
    }
}

pub(crate) fn subject(submission: &Submission) -> String {
    format!("{SUBJECT_PREFIX}{}", submission.name)
}

pub(crate) fn body(submission: &Submission) -> String {
    format!(
        "İsim: {}\nE-posta: {}\n\nMesaj:\n{}",
        submission.name, submission.email, submission.message
    )
}

/// Smtp transport opening a fresh authenticated session for every mail.
///
/// The connection settings are interpreted on each send, so a bad port or
/// host only fails that delivery.
#[derive(Clone, Debug)]
pub struct SmtpRelay {
    config: SmtpConfig,
}

impl SmtpRelay {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> anyhow::Result<SmtpTransport> {
        let config = &self.config;
        let port: u16 = config
            .port
            .trim()
            .parse()
            .with_context(|| format!("invalid smtp port {:?}", config.port))?;
        let tls = match config.tls {
            TlsMode::None => Tls::None,
            TlsMode::Opportunistic => Tls::Opportunistic(self.tls_parameters()?),
            TlsMode::Required => Tls::Required(self.tls_parameters()?),
            TlsMode::Wrapper => Tls::Wrapper(self.tls_parameters()?),
        };
        // No timeout unless configured: a silent server holds the request.
        let mut mailer = SmtpTransport::builder_dangerous(config.host.as_str())
            .port(port)
            .tls(tls)
            .timeout(config.timeout);
        if !config.user.is_empty() {
            mailer = mailer.credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ));
        }
        Ok(mailer.build())
    }

    fn tls_parameters(&self) -> anyhow::Result<TlsParameters> {
        TlsParameters::builder(self.config.host.clone())
            .dangerous_accept_invalid_certs(self.config.accept_invalid_certs)
            .dangerous_accept_invalid_hostnames(self.config.accept_invalid_certs)
            .build()
            .with_context(|| format!("invalid tls parameters for {:?}", self.config.host))
    }
}

impl Transport for SmtpRelay {
    type Ok = ();
    type Error = anyhow::Error;

    fn send_raw(&self, envelope: &Envelope, email: &[u8]) -> Result<Self::Ok, Self::Error> {
        let transport = self.transport()?;
        transport.send_raw(envelope, email).with_context(|| {
            format!(
                "smtp delivery through {}:{} failed",
                self.config.host, self.config.port
            )
        })?;
        Ok(())
    }
}
