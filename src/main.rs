use clap::Parser;
use std::time::Duration;
use tracing::info;
use webwrap::{Browser, BrowserConfig, BrowserKind};

/// Open a page through the facade and report what loaded.
#[derive(Parser)]
#[command(name = "webwrap", about = "Drive a browser through the webwrap facade")]
struct Args {
    /// URL to open
    url: String,

    /// Browser to launch: chrome or firefox
    #[arg(long, default_value = "chrome")]
    browser: String,

    #[arg(long)]
    headless: bool,

    /// Run against a Selenium Grid hub instead of a local driver
    #[arg(long)]
    remote: bool,

    #[arg(long, default_value = "localhost")]
    grid_host: String,

    #[arg(long, default_value_t = 4444)]
    grid_port: u16,

    /// Extra browser startup argument, repeatable
    #[arg(long = "arg")]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let config = BrowserConfig {
        kind: args.browser.parse::<BrowserKind>()?,
        remote: args.remote,
        headless: args.headless,
        grid_host: args.grid_host,
        grid_port: args.grid_port,
        args: args.args,
        ..Default::default()
    };

    let browser = Browser::launch(&config).await?;
    browser.navigate(&args.url).await?;
    browser.delay(Duration::from_secs(1)).await;

    let url = browser.current_url().await?;
    info!("Loaded {url}");

    browser.quit_if_alive().await?;
    Ok(())
}
