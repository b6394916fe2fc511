pub mod smtp;

use axum_test::TestServer;
use contact_relay::prelude::*;
use lettre::transport::stub::StubTransport;
use serde_json::{json, Value};

pub const RECIPIENT: &str = "owner@example.com";
pub const SENDER: &str = "relay@example.com";
pub const ORIGIN: &str = "https://mehmetemreok.com";

pub fn config() -> Config {
    Config {
        smtp: SmtpConfig {
            user: SENDER.into(),
            password: "secret".into(),
            to: RECIPIENT.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn server(transport: StubTransport) -> TestServer {
    let config = config();
    let mailer = Mailer::new(&config.smtp, transport);
    App::new(config).contact(mailer).as_test_server()
}

pub fn smtp_server(smtp: SmtpConfig) -> TestServer {
    let config = Config {
        smtp,
        ..config()
    };
    let mailer = Mailer::smtp(&config.smtp);
    App::new(config).contact(mailer).as_test_server()
}

pub fn ada() -> Value {
    json!({
        "name": "Ada",
        "email": "ada@example.com",
        "message": "Hello",
    })
}
