mod compose;
mod groq;
mod lang;
mod repl;
mod serp;
mod session;
mod translate;
mod turn;

pub const USER_AGENT: &str = concat!("thanglish-chat/", env!("CARGO_PKG_VERSION"));

use std::time::Duration;

use reqwest::Client;
use tracing::info;

use groq::GroqClient;
use serp::SerpClient;
use translate::TranslateClient;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout; individual clients set tighter per-request timeouts.
const HTTP_TIMEOUT: Duration = Duration::from_secs(90);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("thanglish_chat=info".parse()?),
        )
        .init();

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;

    // Both API keys are required; bail out before the first prompt.
    let groq = GroqClient::from_env(http.clone())
        .inspect_err(|e| tracing::error!("completion client unavailable: {e}"))?;
    let serp = SerpClient::from_env(http.clone())
        .inspect_err(|e| tracing::error!("search client unavailable: {e}"))?;
    let translate = TranslateClient::new(http);

    info!(model = %groq.model(), "starting thanglish-chat");

    repl::run(&translate, &translate, &serp, &groq).await?;
    Ok(())
}
