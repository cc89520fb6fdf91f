//! Stripe - REST provider for products, payment links and payment intents
//!
//! Talks to the Stripe API with form-encoded requests and bearer auth.

use super::price::Price;
use super::{CommerceError, CommerceProvider, PaymentIntent, PaymentIntentRequest, ProductSpec};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Stripe API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com/v1";

/// Configuration for the Stripe client
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_...`)
    pub secret_key: String,
    /// API base URL
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &mask_secret(&self.secret_key))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StripeConfig {
    /// Creates a configuration for the live API
    #[must_use]
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets a custom base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn mask_secret(key: &str) -> String {
    if key.len() <= 8 || !key.is_ascii() {
        return "****".to_string();
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct PaymentLinkResponse {
    url: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Stripe API client
pub struct StripeClient {
    http: reqwest::Client,
    config: StripeConfig,
}

impl StripeClient {
    /// Creates a client.
    ///
    /// # Errors
    /// Fails when the secret key is blank or the HTTP client cannot be built.
    pub fn new(config: StripeConfig) -> Result<Self, CommerceError> {
        if config.secret_key.trim().is_empty() {
            return Err(CommerceError::NotConfigured(
                "STRIPE_SECRET_KEY is empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CommerceError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Client configuration
    #[must_use]
    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, CommerceError> {
        let url = format!("{}/{}", self.config.base_url, path);
        debug!(url = %url, "Stripe request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(params)
            .send()
            .await
            .map_err(|e| CommerceError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CommerceError::Http(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error.message.or(envelope.error.kind))
                .unwrap_or_else(|| format!("request to {} failed", path));
            warn!(status = status.as_u16(), error = %message, "Stripe request rejected");
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| CommerceError::InvalidResponse(e.to_string()))
    }

    /// Create a product; returns its id
    pub async fn create_product(
        &self,
        name: &str,
        description: &str,
    ) -> Result<String, CommerceError> {
        let mut params = vec![("name", name.to_string())];
        if !description.is_empty() {
            params.push(("description", description.to_string()));
        }
        let product: IdResponse = self.post_form("products", &params).await?;
        Ok(product.id)
    }

    /// Create a one-time price for a product; returns its id
    pub async fn create_price(&self, product_id: &str, price: &Price) -> Result<String, CommerceError> {
        let params = [
            ("product", product_id.to_string()),
            ("unit_amount", price.minor_units.to_string()),
            ("currency", price.currency.clone()),
        ];
        let created: IdResponse = self.post_form("prices", &params).await?;
        Ok(created.id)
    }

    /// Create a payment link for one unit of a price; returns its URL
    pub async fn create_payment_link(&self, price_id: &str) -> Result<String, CommerceError> {
        let params = [
            ("line_items[0][price]", price_id.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
        ];
        let link: PaymentLinkResponse = self.post_form("payment_links", &params).await?;
        Ok(link.url)
    }
}

#[async_trait::async_trait]
impl CommerceProvider for StripeClient {
    fn name(&self) -> &str {
        "stripe"
    }

    #[instrument(skip(self, product), fields(product = %product.name))]
    async fn publish_product(&self, product: &ProductSpec) -> Result<String, CommerceError> {
        let product_id = self
            .create_product(&product.name, &product.description)
            .await?;
        let price_id = self.create_price(&product_id, &product.price).await?;
        self.create_payment_link(&price_id).await
    }

    #[instrument(skip(self, request), fields(amount = request.amount.minor_units, currency = %request.amount.currency))]
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, CommerceError> {
        let mut params = vec![
            ("amount", request.amount.minor_units.to_string()),
            ("currency", request.amount.currency.clone()),
            ("payment_method", request.payment_method.clone()),
            ("description", request.description.clone()),
            ("confirm", "true".to_string()),
        ];
        if let Some(return_url) = &request.return_url {
            params.push(("return_url", return_url.clone()));
        }
        self.post_form("payment_intents", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Form;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;

    type Params = Form<HashMap<String, String>>;

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "Bearer sk_test_1234567890")
    }

    async fn spawn_stub() -> String {
        let app = Router::new()
            .route(
                "/v1/products",
                post(|headers: HeaderMap, Form(form): Params| async move {
                    assert!(authorized(&headers));
                    Json(serde_json::json!({"id": format!("prod_{}", form["name"].len())}))
                }),
            )
            .route(
                "/v1/prices",
                post(|Form(form): Params| async move {
                    Json(serde_json::json!({
                        "id": format!("price_{}_{}", form["product"], form["unit_amount"])
                    }))
                }),
            )
            .route(
                "/v1/payment_links",
                post(|Form(form): Params| async move {
                    assert_eq!(form["line_items[0][quantity]"], "1");
                    Json(serde_json::json!({
                        "id": "plink_1",
                        "url": format!("https://buy.stripe.test/{}", form["line_items[0][price]"])
                    }))
                }),
            )
            .route(
                "/v1/payment_intents",
                post(|Form(form): Params| async move {
                    if form["payment_method"] == "pm_card_chargeDeclined" {
                        return (
                            StatusCode::PAYMENT_REQUIRED,
                            Json(serde_json::json!({
                                "error": {"type": "card_error", "message": "Your card was declined."}
                            })),
                        );
                    }
                    assert_eq!(form["confirm"], "true");
                    (
                        StatusCode::OK,
                        Json(serde_json::json!({
                            "id": format!("pi_{}_{}", form["amount"], form["currency"]),
                            "status": "succeeded"
                        })),
                    )
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    async fn client() -> StripeClient {
        let base_url = spawn_stub().await;
        StripeClient::new(StripeConfig::new("sk_test_1234567890").with_base_url(base_url)).unwrap()
    }

    #[test]
    fn test_blank_key_is_rejected() {
        assert!(matches!(
            StripeClient::new(StripeConfig::new("  ")),
            Err(CommerceError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_config_debug_masks_key() {
        let debug = format!("{:?}", StripeConfig::new("sk_test_51HxyzSECRETabcd"));
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("sk_t...abcd"));
    }

    #[tokio::test]
    async fn test_publish_product_runs_product_price_link() {
        let stripe = client().await;
        let link = stripe
            .publish_product(&ProductSpec {
                name: "Vuelo a Roma".to_string(),
                description: "Vuelo redondo a Roma".to_string(),
                price: Price::new(45000, "usd"),
            })
            .await
            .unwrap();

        assert_eq!(link, "https://buy.stripe.test/price_prod_12_45000");
    }

    #[tokio::test]
    async fn test_payment_intent() {
        let stripe = client().await;
        let intent = stripe
            .create_payment_intent(&PaymentIntentRequest {
                amount: Price::new(150000, "mxn"),
                description: "Paquete completo a Roma".to_string(),
                payment_method: "pm_card_visa".to_string(),
                return_url: Some("https://example.com/payment-success".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(intent.id, "pi_150000_mxn");
        assert_eq!(intent.status, "succeeded");
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let stripe = client().await;
        let result = stripe
            .create_payment_intent(&PaymentIntentRequest {
                amount: Price::new(1000, "usd"),
                description: "test".to_string(),
                payment_method: "pm_card_chargeDeclined".to_string(),
                return_url: None,
            })
            .await;

        match result {
            Err(CommerceError::Api { status, message }) => {
                assert_eq!(status, 402);
                assert_eq!(message, "Your card was declined.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
