//! Razorpay payment provider client.
//!
//! Implements order creation against Razorpay's Orders API and
//! HMAC signature verification for payment confirmation.

use crate::config::RazorpayConfig;
use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;

/// Fixed settlement currency for created orders.
pub const CURRENCY: &str = "INR";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors surfaced by the provider client.
///
/// A signature mismatch is NOT an error; `verify_payment_signature`
/// reports it as `Ok(false)`. These variants cover the cases where the
/// provider could not be asked at all or answered with garbage.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Razorpay rejected the request: {code} - {description}")]
    Api { code: String, description: String },

    #[error("Razorpay unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected Razorpay response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("signing key rejected by HMAC")]
    InvalidKey,
}

/// Razorpay client for interacting with the Razorpay API.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    config: RazorpayConfig,
}

/// Request to create a Razorpay order.
#[derive(Debug, Serialize)]
pub struct CreateOrderRequest {
    /// Amount in smallest currency unit (paise for INR).
    pub amount: u64,
    /// Currency code (e.g., "INR").
    pub currency: String,
    /// 1 = capture automatically once the payment succeeds.
    pub payment_capture: u8,
}

/// Response from Razorpay order creation.
#[derive(Debug, Deserialize)]
pub struct RazorpayOrder {
    /// Razorpay order ID.
    pub id: String,
    /// Amount in smallest currency unit.
    pub amount: u64,
    /// Currency code.
    pub currency: String,
    /// Order status.
    pub status: String,
}

/// Razorpay API error response.
#[derive(Debug, Deserialize)]
pub struct RazorpayError {
    pub error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayErrorDetail {
    pub code: String,
    pub description: String,
}

/// Payment verification parameters.
#[derive(Debug)]
pub struct PaymentVerification {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

impl RazorpayClient {
    /// Create a new Razorpay client.
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Public key ID, as handed to checkout frontends.
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    /// Create a new order in Razorpay.
    ///
    /// # Arguments
    /// * `amount` - Amount in smallest currency unit (paise for INR)
    pub async fn create_order(&self, amount: u64) -> Result<RazorpayOrder, ProviderError> {
        let request = CreateOrderRequest {
            amount,
            currency: CURRENCY.to_string(),
            payment_capture: 1,
        };

        let url = format!("{}/orders", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, body = %body, "Razorpay create_order response");

        if status.is_success() {
            let order: RazorpayOrder = serde_json::from_str(&body)?;
            tracing::info!(
                order_id = %order.id,
                amount = order.amount,
                currency = %order.currency,
                "Razorpay order created"
            );
            Ok(order)
        } else {
            let error: RazorpayError =
                serde_json::from_str(&body).unwrap_or_else(|_| RazorpayError {
                    error: RazorpayErrorDetail {
                        code: "UNKNOWN".to_string(),
                        description: body.clone(),
                    },
                });
            tracing::error!(
                code = %error.error.code,
                description = %error.error.description,
                "Razorpay order creation failed"
            );
            Err(ProviderError::Api {
                code: error.error.code,
                description: error.error.description,
            })
        }
    }

    /// Verify payment signature from Razorpay checkout.
    ///
    /// The signature is computed as:
    /// `HMAC-SHA256(order_id + "|" + payment_id, key_secret)`
    pub fn verify_payment_signature(
        &self,
        verification: &PaymentVerification,
    ) -> Result<bool, ProviderError> {
        let payload = format!(
            "{}|{}",
            verification.razorpay_order_id, verification.razorpay_payment_id
        );

        let expected_signature = self.compute_signature(&payload)?;

        let is_valid = expected_signature == verification.razorpay_signature;

        if is_valid {
            tracing::info!(
                order_id = %verification.razorpay_order_id,
                payment_id = %verification.razorpay_payment_id,
                "Payment signature verified successfully"
            );
        } else {
            tracing::warn!(
                order_id = %verification.razorpay_order_id,
                payment_id = %verification.razorpay_payment_id,
                "Payment signature verification failed"
            );
        }

        Ok(is_valid)
    }

    /// Compute HMAC-SHA256 signature over `payload` with the key secret.
    fn compute_signature(&self, payload: &str) -> Result<String, ProviderError> {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac =
            HmacSha256::new_from_slice(self.config.key_secret.expose_secret().as_bytes())
                .map_err(|_| ProviderError::InvalidKey)?;
        mac.update(payload.as_bytes());
        let result = mac.finalize();
        Ok(hex::encode(result.into_bytes()))
    }
}
