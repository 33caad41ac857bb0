use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use tokio::io::AsyncWriteExt;

use media_relay::relay::error::ErrorBody;
use media_relay::relay::{relay_url, CUSTOM_COOKIE_HEADER};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Client for the media relay", long_about = None)]
struct Cli {
    /// Relay base URL.
    #[arg(short, long, default_value = "http://localhost:8080", env = "TWITTER_PROXY_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the relay answers with its documentation page
    Status,
    /// Print the relayed URL for a target
    Link { target: String },
    /// Download a target through the relay
    Fetch {
        target: String,

        /// Write the body here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Session cookie forwarded upstream as `Cookie`
        #[arg(short, long)]
        cookie: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    // Relay-wrapped redirects are relative to the relay, so following them
    // keeps the download inside it.
    let client = reqwest::Client::builder().no_proxy().build()?;

    match cli.command {
        Commands::Status => {
            let res = client.get(relay_url(&cli.url, "")).send().await?;
            let status = res.status();
            let body = res.text().await?;
            if status == StatusCode::OK && body.contains("Twitter/X Proxy Worker") {
                println!("Relay at {} is up", cli.url);
            } else {
                eprintln!("Error: unexpected answer from {} (status {})", cli.url, status);
                std::process::exit(1);
            }
        }
        Commands::Link { target } => {
            println!("{}", relay_url(&cli.url, &target));
        }
        Commands::Fetch {
            target,
            output,
            cookie,
        } => {
            let mut headers = HeaderMap::new();
            if let Some(cookie) = cookie {
                headers.insert(CUSTOM_COOKIE_HEADER, HeaderValue::from_str(&cookie)?);
            }

            let res = client
                .get(relay_url(&cli.url, &target))
                .headers(headers)
                .send()
                .await?;
            fetch_response(res, output).await?;
        }
    }

    Ok(())
}

async fn fetch_response(
    mut res: reqwest::Response,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        let body = res.bytes().await.unwrap_or_default();
        eprintln!("Error: {}", failure_message(status, &body));
        std::process::exit(1);
    }

    match output {
        Some(path) => {
            let mut file = tokio::fs::File::create(&path).await?;
            let mut written = 0usize;
            while let Some(chunk) = res.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len();
            }
            file.flush().await?;
            eprintln!("Wrote {} bytes to {}", written, path.display());
        }
        None => {
            let mut stdout = tokio::io::stdout();
            while let Some(chunk) = res.chunk().await? {
                stdout.write_all(&chunk).await?;
            }
            stdout.flush().await?;
        }
    }

    Ok(())
}

/// Explain a non-success answer. A relay failure carries an `ErrorBody`;
/// anything else is an upstream status passed through by the relay.
fn failure_message(status: StatusCode, body: &[u8]) -> String {
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        if let Ok(error) = serde_json::from_slice::<ErrorBody>(body) {
            return format!("relay failed: {}", error.error);
        }
    }
    format!("upstream returned status {}", status)
}
