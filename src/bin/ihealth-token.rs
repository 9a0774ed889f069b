use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use http::Method;
use ihealth_token::config::loader;
use ihealth_token::observability::metrics;
use ihealth_token::persist::{FilePersist, Persist};
use ihealth_token::transport::ReqwestTransport;
use ihealth_token::utils::logging::{self, LogLevel};
use ihealth_token::{RequestOptions, TokenManager};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "ihealth.yaml")]
    config: PathBuf,
    #[arg(short, long, env = "TOKEN_FILE", default_value = "token.json")]
    token_file: PathBuf,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Print prometheus metrics after the command
    #[arg(long)]
    metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the URL the end user opens to grant access
    AuthorizeUrl,
    /// Exchange an authorization code for a token and store it
    Exchange {
        #[arg(long)]
        code: String,
    },
    /// Renew the stored token
    Refresh,
    /// Print the stored token with secrets masked
    Show,
    /// Call the API with the stored token, refreshing it first when expired
    Request {
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "GET")]
        method: String,
        /// key=value, sent as form for POST and as query otherwise
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

const USER_AGENT: &str = concat!("ihealth-token/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, start logging
    // -------------------------------

    let args = Args::parse();
    let client_config = loader::file_to_config(&args.config).await?;
    logging::init_logging(&logging::resolve(Some(&client_config), args.log_level));

    // -------------------------------
    // 2. Restore token from file
    // -------------------------------

    let store = Arc::new(FilePersist::new(&args.token_file));
    let persist: Arc<dyn Persist> = store.clone();
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let transport = Arc::new(ReqwestTransport::from_client(client));
    let manager = TokenManager::with_transport(client_config, Some(persist), transport);

    if let Some(token) = store.load().await? {
        info!("token restored from '{}'", store.path().display());
        manager.set_token(Some(token)).await;
    }

    // -------------------------------
    // 3. Run command
    // -------------------------------

    match args.command {
        Command::AuthorizeUrl => println!("{}", manager.authorize_url()?),
        Command::Exchange { code } => {
            let token = manager.fetch_token(&code).await?;
            println!("{}", token.redacted());
        }
        Command::Refresh => {
            let token = manager.refresh().await?;
            println!("{}", token.redacted());
        }
        Command::Show => match manager.get_token().await {
            Some(token) => println!("{}", token.redacted()),
            None => bail!("no token in '{}', run `exchange` first", store.path().display()),
        },
        Command::Request {
            url,
            method,
            params,
            timeout_ms,
        } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())?;
            let is_post = method == Method::POST;
            let mut options = RequestOptions::new(method, url);
            for (key, value) in params {
                options = if is_post { options.form(key, value) } else { options.query(key, value) };
            }
            if let Some(timeout_ms) = timeout_ms {
                options = options.timeout(Duration::from_millis(timeout_ms));
            }

            let response = manager.request(options).await?;
            if response.refreshed.is_some() {
                info!("token was refreshed and stored in '{}'", store.path().display());
            }
            info!("response status {}", response.status);
            println!("{}", response.body);
        }
    }

    // -------------------------------
    // 4. Metrics
    // -------------------------------

    if args.metrics {
        print!("{}", metrics::render().await?);
    }

    Ok(())
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}
