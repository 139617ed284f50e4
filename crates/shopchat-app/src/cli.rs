use clap::Parser;
use shopchat_api::ApiConfig;

/// CLI arguments for shopchat
#[derive(Debug, Parser)]
#[command(name = "shopchat")]
#[command(about = "Terminal client for the WebScraper AI shopping assistant")]
#[command(version)]
pub struct Cli {
    /// Backend origin (e.g., http://localhost:8000)
    #[arg(long, env = "SHOPCHAT_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Log in with this email at startup
    #[arg(long, env = "SHOPCHAT_EMAIL", value_name = "EMAIL")]
    pub email: Option<String>,

    /// Password for --email
    #[arg(long, env = "SHOPCHAT_PASSWORD", value_name = "PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Open this session instead of waiting for /new or /open
    #[arg(long, value_name = "ID")]
    pub session: Option<String>,

    /// Log request and response bodies
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn api_config(&self) -> ApiConfig {
        let config = match &self.api_url {
            Some(url) => ApiConfig::new(url),
            None => ApiConfig::from_env(),
        };
        let verbose = config.verbose || self.verbose;
        config.with_verbose(verbose)
    }

    /// Startup credentials, only when both halves are present
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}
