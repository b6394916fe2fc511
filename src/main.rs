use contact_relay::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = dotenvy::dotenv();
    // before anything logs, the .env warning included
    logger();
    if let Err(e) = env_file {
        warn!("No .env file loaded: {e}");
    }

    let config = Config::from_env();
    let mailer = Mailer::smtp(&config.smtp);
    let result = App::new(config).contact(mailer).start().await;
    if let Err(e) = &result {
        error!("Server stopped: {e:#}");
    }
    result
}
