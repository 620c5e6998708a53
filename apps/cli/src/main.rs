use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use url::Url;
use widget_gate_common::constants::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use widget_gate_common::signature::{email_hash, sign_timestamped};
use widget_gate_common::{
    SessionCodec, WidgetSessionParams, current_timestamp_millis, current_timestamp_secs,
    generate_hmac_secret,
};

/// CLI arguments for the widget gateway companion
#[derive(Parser, Debug)]
#[command(name = "wgctl")]
#[command(about = "Widget session gateway companion tool", long_about = None)]
#[command(version)]
struct Args {
    /// Base URL of a deployed widget API
    #[arg(
        short,
        long,
        global = true,
        env = "WGCTL_ENDPOINT",
        default_value = "http://localhost:3000"
    )]
    endpoint: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "10")]
    request_timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new mailbox HMAC secret
    Secret,

    /// Compute the email hash an integrator hands to the widget
    EmailHash {
        #[arg(long)]
        email: String,

        /// Mailbox HMAC secret
        #[arg(long, env = "WGCTL_HMAC_SECRET", hide_env_values = true)]
        hmac_secret: String,

        /// Unix milliseconds (defaults to now)
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Print signature headers for a server-to-server callback body
    Sign {
        #[arg(long, env = "WGCTL_HMAC_SECRET", hide_env_values = true)]
        hmac_secret: String,

        /// Raw request body
        #[arg(long)]
        body: String,

        /// Unix seconds (defaults to now)
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Mint a session token locally with the server secret
    Mint {
        #[arg(long, env = "WGCTL_SESSION_SECRET", hide_env_values = true)]
        session_secret: String,

        #[arg(long)]
        mailbox: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long, conflicts_with = "email")]
        anonymous_id: Option<String>,

        #[arg(long)]
        hide_widget: bool,

        #[arg(long)]
        whitelabel: bool,

        /// Token lifetime in seconds (defaults to 12 hours)
        #[arg(long)]
        ttl_secs: Option<u64>,
    },

    /// Verify a session token and print its payload
    Inspect {
        #[arg(long, env = "WGCTL_SESSION_SECRET", hide_env_values = true)]
        session_secret: String,

        token: String,
    },

    /// Request a session from a deployed widget API
    Session {
        #[arg(long)]
        mailbox: String,

        /// Identify as this email (requires the mailbox HMAC secret)
        #[arg(long, requires = "hmac_secret")]
        email: Option<String>,

        #[arg(long, env = "WGCTL_HMAC_SECRET", hide_env_values = true)]
        hmac_secret: Option<String>,

        /// Customer value reported in customerMetadata
        #[arg(long)]
        value: Option<f64>,

        /// Token to refresh
        #[arg(long)]
        current_token: Option<String>,
    },

    /// Send a signed webhook event to a mailbox
    Webhook {
        #[arg(long)]
        mailbox: String,

        #[arg(long, env = "WGCTL_HMAC_SECRET", hide_env_values = true)]
        hmac_secret: String,

        #[arg(long)]
        event: String,

        /// JSON event data
        #[arg(long, default_value = "{}")]
        data: String,
    },
}

/// Configuration for talking to a deployed widget API
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Url,
    pub request_timeout: Duration,
}

impl Config {
    fn from_args(args: &Args) -> Result<Self> {
        let mut endpoint = Url::parse(&args.endpoint)
            .with_context(|| format!("Invalid endpoint URL: {}", args.endpoint))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!("Endpoint must be http or https: {}", args.endpoint);
        }

        // Keep stage prefixes such as /dev when joining api paths
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        Ok(Self {
            endpoint,
            request_timeout: Duration::from_secs(args.request_timeout),
        })
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        self.endpoint
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Failed to build URL for {}", path))
    }
}

/// `{email, emailHash, timestamp}` as the widget expects it
fn email_hash_payload(email: &str, hmac_secret: &str, timestamp_ms: i64) -> Result<Value> {
    let hash = email_hash(email, timestamp_ms, hmac_secret)?;
    Ok(json!({
        "email": email,
        "emailHash": hash,
        "timestamp": timestamp_ms,
    }))
}

/// Signature and timestamp headers for `body`
fn signature_headers(
    hmac_secret: &str,
    timestamp: i64,
    body: &[u8],
) -> Result<[(&'static str, String); 2]> {
    let signature = sign_timestamped(hmac_secret, timestamp, body)?;
    Ok([
        (SIGNATURE_HEADER, signature),
        (TIMESTAMP_HEADER, timestamp.to_string()),
    ])
}

fn session_params(
    mailbox: &str,
    email: Option<String>,
    anonymous_id: Option<String>,
    hide_widget: bool,
    whitelabel: bool,
) -> WidgetSessionParams {
    let mut params = WidgetSessionParams::new(mailbox)
        .with_show_widget(!hide_widget)
        .with_whitelabel(whitelabel);
    if let Some(email) = email {
        params = params.with_email(email);
    }
    if let Some(id) = anonymous_id {
        params = params.with_anonymous_session_id(id);
    }
    params
}

fn session_request_body(
    mailbox: &str,
    identity: Option<Value>,
    value: Option<f64>,
    current_token: Option<String>,
) -> Value {
    let mut body = json!({ "mailboxSlug": mailbox });
    if let Some(Value::Object(identity)) = identity {
        for (key, v) in identity {
            body[key] = v;
        }
    }
    if let Some(value) = value {
        body["customerMetadata"] = json!({ "value": value });
    }
    if let Some(token) = current_token {
        body["currentToken"] = json!(token);
    }
    body
}

async fn print_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let text = response
        .text()
        .await
        .context("Failed to read response body")?;

    debug!("Response status: {}", status);
    let rendered = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or(text);
    println!("{}", rendered);

    if !status.is_success() {
        bail!("Request failed with status {}", status);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = Config::from_args(&args)?;

    match args.command {
        Command::Secret => {
            println!("{}", generate_hmac_secret());
        }
        Command::EmailHash {
            email,
            hmac_secret,
            timestamp,
        } => {
            let timestamp = timestamp.unwrap_or_else(current_timestamp_millis);
            let payload = email_hash_payload(&email, &hmac_secret, timestamp)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Command::Sign {
            hmac_secret,
            body,
            timestamp,
        } => {
            let timestamp = timestamp.unwrap_or_else(current_timestamp_secs);
            for (name, value) in signature_headers(&hmac_secret, timestamp, body.as_bytes())? {
                println!("{}: {}", name, value);
            }
        }
        Command::Mint {
            session_secret,
            mailbox,
            email,
            anonymous_id,
            hide_widget,
            whitelabel,
            ttl_secs,
        } => {
            let mut codec = SessionCodec::new(session_secret.as_bytes());
            if let Some(ttl) = ttl_secs {
                codec = codec.with_ttl(Duration::from_secs(ttl));
            }
            let params = session_params(&mailbox, email, anonymous_id, hide_widget, whitelabel);
            println!("{}", codec.create_session(params)?);
        }
        Command::Inspect {
            session_secret,
            token,
        } => {
            let codec = SessionCodec::new(session_secret.as_bytes());
            let session = codec.verify_session(&token)?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        Command::Session {
            mailbox,
            email,
            hmac_secret,
            value,
            current_token,
        } => {
            let identity = match (email, hmac_secret) {
                (Some(email), Some(secret)) => Some(email_hash_payload(
                    &email,
                    &secret,
                    current_timestamp_millis(),
                )?),
                (Some(_), None) => bail!("--email requires --hmac-secret"),
                (None, _) => None,
            };
            let body = session_request_body(&mailbox, identity, value, current_token);

            let url = config.api_url("/api/widget/session")?;
            info!("Requesting session for mailbox {} from {}", mailbox, url);

            let client = Client::builder()
                .timeout(config.request_timeout)
                .build()
                .context("Failed to build HTTP client")?;
            let response = client
                .post(url)
                .json(&body)
                .send()
                .await
                .context("Session request failed")?;
            print_response(response).await?;
        }
        Command::Webhook {
            mailbox,
            hmac_secret,
            event,
            data,
        } => {
            let data: Value = serde_json::from_str(&data).context("--data must be JSON")?;
            let body = serde_json::to_vec(&json!({ "event": event, "data": data }))?;

            let url = config.api_url(&format!("/api/mailboxes/{}/webhook", mailbox))?;
            info!("Sending {} to {}", event, url);

            let client = Client::builder()
                .timeout(config.request_timeout)
                .build()
                .context("Failed to build HTTP client")?;
            let mut request = client
                .post(url)
                .header("content-type", "application/json");
            for (name, value) in signature_headers(&hmac_secret, current_timestamp_secs(), &body)? {
                request = request.header(name, value);
            }
            let response = request
                .body(body)
                .send()
                .await
                .context("Webhook request failed")?;
            print_response(response).await?;
        }
    }

    Ok(())
}

/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, defaulting to info
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("wgctl v{}", env!("CARGO_PKG_VERSION"));

    run(args).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use widget_gate_common::signature::{verify_email_hash, verify_timestamped_hmac};

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbose_forces_debug_filter() {
        assert_eq!(log_filter(true).to_string(), "debug");
    }

    #[test]
    fn test_config_from_args() {
        let args = parse(&["wgctl", "--endpoint", "https://example.com/dev", "secret"]);

        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.endpoint.as_str(), "https://example.com/dev/");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(
            config.api_url("/api/widget/session").unwrap().as_str(),
            "https://example.com/dev/api/widget/session"
        );
    }

    #[test]
    fn test_config_rejects_bad_endpoint() {
        let args = parse(&["wgctl", "--endpoint", "not a url", "secret"]);
        assert!(Config::from_args(&args).is_err());

        let args = parse(&["wgctl", "--endpoint", "wss://example.com", "secret"]);
        assert!(Config::from_args(&args).is_err());
    }

    #[test]
    fn test_parse_mint_command() {
        let args = parse(&[
            "wgctl",
            "mint",
            "--session-secret",
            "s",
            "--mailbox",
            "acme",
            "--email",
            "a@example.com",
            "--whitelabel",
        ]);

        match args.command {
            Command::Mint {
                mailbox,
                email,
                whitelabel,
                hide_widget,
                ..
            } => {
                assert_eq!(mailbox, "acme");
                assert_eq!(email.as_deref(), Some("a@example.com"));
                assert!(whitelabel);
                assert!(!hide_widget);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_mint_rejects_email_with_anonymous_id() {
        let result = Args::try_parse_from([
            "wgctl",
            "mint",
            "--session-secret",
            "s",
            "--mailbox",
            "acme",
            "--email",
            "a@example.com",
            "--anonymous-id",
            "550e8400-e29b-41d4-a716-446655440000",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_email_hash_payload_verifies() {
        let payload = email_hash_payload("a@example.com", "mailbox-secret", 1_760_000_000_000).unwrap();

        assert_eq!(payload["email"], "a@example.com");
        assert_eq!(payload["timestamp"], 1_760_000_000_000i64);
        verify_email_hash(
            "a@example.com",
            payload["emailHash"].as_str().unwrap(),
            1_760_000_000_000,
            "mailbox-secret",
            1_760_000_000_000,
            3600,
        )
        .unwrap();
    }

    #[test]
    fn test_signature_headers_verify() {
        let body = br#"{"event":"ping","data":{}}"#;
        let [(sig_name, signature), (ts_name, timestamp)] =
            signature_headers("mailbox-secret", 1_760_000_000, body).unwrap();

        assert_eq!(sig_name, "x-helper-signature");
        assert_eq!(ts_name, "x-helper-timestamp");
        verify_timestamped_hmac(
            body,
            Some(&signature),
            Some(&timestamp),
            "mailbox-secret",
            1_760_000_000,
        )
        .unwrap();
    }

    #[test]
    fn test_minted_token_inspects() {
        let codec = SessionCodec::new(b"local-secret");
        let params = session_params("acme", None, None, true, false);
        let token = codec.create_session(params).unwrap();

        let session = codec.verify_session(&token).unwrap();
        assert_eq!(session.mailbox_slug, "acme");
        assert!(session.is_anonymous);
        assert!(!session.show_widget);
    }

    #[test]
    fn test_session_request_body() {
        let identity = email_hash_payload("a@example.com", "s", 1).unwrap();
        let body = session_request_body("acme", Some(identity), Some(42.0), Some("tok".into()));

        assert_eq!(body["mailboxSlug"], "acme");
        assert_eq!(body["email"], "a@example.com");
        assert_eq!(body["timestamp"], 1);
        assert_eq!(body["customerMetadata"], json!({"value": 42.0}));
        assert_eq!(body["currentToken"], "tok");

        let anonymous = session_request_body("acme", None, None, None);
        assert_eq!(anonymous, json!({"mailboxSlug": "acme"}));
    }
}
