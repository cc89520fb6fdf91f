//! `POST /create-payment-intent`
//!
//! Always answers 200; failures are reported in the body.

use super::AppState;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Extension, Json, Router};
use rumbo_tools::commerce::{PaymentIntentRequest, Price};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Request body; `amount` is in major units (e.g. 1250.50)
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub description: String,
    pub payment_method: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub success: bool,
    pub payment_id: Option<String>,
    pub error: Option<String>,
}

impl PaymentResponse {
    fn ok(payment_id: String) -> Json<Self> {
        Json(Self {
            success: true,
            payment_id: Some(payment_id),
            error: None,
        })
    }

    fn failed(error: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: false,
            payment_id: None,
            error: Some(error.into()),
        })
    }
}

pub fn payments_routes() -> Router {
    Router::new().route("/create-payment-intent", post(create_payment_intent))
}

async fn create_payment_intent(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<PaymentRequest>, JsonRejection>,
) -> Json<PaymentResponse> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return PaymentResponse::failed(rejection.body_text()),
    };

    let currency = request
        .currency
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.payments.default_currency.clone());

    let amount = match Price::from_decimal(request.amount, &currency) {
        Ok(amount) => amount,
        Err(e) => return PaymentResponse::failed(e.to_string()),
    };

    let intent_request = PaymentIntentRequest {
        amount,
        description: request.description,
        payment_method: request.payment_method,
        return_url: state.payments.return_url.clone(),
    };

    match state.commerce.create_payment_intent(&intent_request).await {
        Ok(intent) => {
            info!(payment_id = %intent.id, status = %intent.status, "Payment intent created");
            PaymentResponse::ok(intent.id)
        }
        Err(e) => {
            error!(provider = state.commerce.name(), error = %e, "Payment intent failed");
            PaymentResponse::failed(e.to_string())
        }
    }
}
