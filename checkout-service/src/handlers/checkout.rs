//! Order creation and payment verification endpoints.
//!
//! Thin facade over the Razorpay Orders API: no local persistence, every
//! order-creation call is forwarded to the provider and the response
//! normalized for the checkout frontend.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::services::razorpay::{PaymentVerification, ProviderError};
use crate::AppState;

/// Request to create a new Razorpay order.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    /// Amount in major currency units (rupees); converted to paise downstream.
    #[validate(range(min = 1))]
    pub amount: u64,
}

/// Response after creating a Razorpay order.
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    /// Razorpay order ID (use this in frontend checkout).
    pub order_id: String,
    /// Amount in smallest currency unit, as reported by Razorpay.
    pub amount: u64,
    /// Currency code.
    pub currency: String,
    /// Public key ID for frontend checkout initialization.
    pub key: String,
}

/// Request to verify a payment after checkout. Fields default to empty so
/// a partial body still reaches the handler and yields `success: false`
/// instead of a client error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Response after verifying a payment.
#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
}

/// Create a new Razorpay order.
///
/// The client should use the returned `order_id` and `key` to initiate
/// checkout.
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    tracing::info!(amount = payload.amount, "Creating Razorpay order");

    // Razorpay expects the smallest currency unit (paise).
    let amount_paise = payload
        .amount
        .checked_mul(100)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("amount out of range")))?;

    let order = state.razorpay.create_order(amount_paise).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create Razorpay order");
        match e {
            ProviderError::Api { .. } | ProviderError::Transport(_) => {
                AppError::BadGateway("Failed to create payment order".to_string())
            }
            other => AppError::InternalError(anyhow::Error::new(other)),
        }
    })?;

    metrics::counter!("checkout_orders_created_total").increment(1);

    Ok(Json(CreateOrderResponse {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key: state.razorpay.key_id().to_string(),
    }))
}

/// Verify payment after Razorpay checkout completion.
///
/// Always responds 200: any mismatch, missing field, or provider error
/// collapses to `success: false`. The root cause is only visible in
/// server-side logs.
pub async fn verify_payment(
    State(state): State<AppState>,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Json<VerifyPaymentResponse> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Unreadable verify-payment body");
            metrics::counter!("checkout_payment_verifications_total", "outcome" => "invalid_input")
                .increment(1);
            return Json(VerifyPaymentResponse { success: false });
        }
    };

    if payload.razorpay_order_id.is_empty()
        || payload.razorpay_payment_id.is_empty()
        || payload.razorpay_signature.is_empty()
    {
        tracing::warn!("verify-payment request missing required fields");
        metrics::counter!("checkout_payment_verifications_total", "outcome" => "invalid_input")
            .increment(1);
        return Json(VerifyPaymentResponse { success: false });
    }

    let verification = PaymentVerification {
        razorpay_order_id: payload.razorpay_order_id,
        razorpay_payment_id: payload.razorpay_payment_id,
        razorpay_signature: payload.razorpay_signature,
    };

    let success = match state.razorpay.verify_payment_signature(&verification) {
        Ok(valid) => valid,
        Err(e) => {
            // Provider-side fault, distinct from a signature mismatch.
            tracing::error!(error = %e, "Payment signature verification errored");
            false
        }
    };

    let outcome = if success { "verified" } else { "rejected" };
    metrics::counter!("checkout_payment_verifications_total", "outcome" => outcome).increment(1);

    Json(VerifyPaymentResponse { success })
}
