use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::Secret;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub razorpay: RazorpayConfig,
    pub service_name: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct RazorpayConfig {
    /// Public key ID, safe to hand to checkout frontends.
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub api_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("CHECKOUT_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("CHECKOUT_SERVICE_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("CHECKOUT_SERVICE_PORT must be a valid port number")?;

        let key_id = env::var("RAZORPAY_KEY_ID").context("RAZORPAY_KEY_ID must be set")?;
        let key_secret =
            env::var("RAZORPAY_KEY_SECRET").context("RAZORPAY_KEY_SECRET must be set")?;
        let api_base_url = env::var("RAZORPAY_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            razorpay: RazorpayConfig {
                key_id,
                key_secret: Secret::new(key_secret),
                api_base_url,
            },
            service_name: "checkout-service".to_string(),
        })
    }
}
