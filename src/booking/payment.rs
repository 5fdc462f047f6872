//! Hand-off of a priced booking to the payment-intent service.
//!
//! The payment service creates the intent and, once paid, the booking row.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use super::calculators::BookingCalculation;
use super::dates::DateRange;
use super::insurance::InsuranceTier;
use super::BookingError;

/// Payload sent to the payment-intent endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentBookingData {
    pub equipment_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount: Decimal,
    pub insurance_type: InsuranceTier,
    #[serde(with = "rust_decimal::serde::str")]
    pub insurance_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub deposit_amount: Decimal,
    pub currency: String,
}

impl PaymentBookingData {
    /// `end_date` is the exclusive checkout date, so a same-day rental
    /// is stored as holding its one night.
    pub fn from_calculation(
        equipment_id: Uuid,
        range: &DateRange,
        insurance_type: InsuranceTier,
        calculation: &BookingCalculation,
        currency: &str,
    ) -> Self {
        Self {
            equipment_id,
            start_date: range.start_string(),
            end_date: range.end_exclusive_string(),
            total_amount: calculation.total,
            insurance_type,
            insurance_cost: calculation.insurance,
            deposit_amount: calculation.deposit,
            currency: currency.to_string(),
        }
    }
}

/// Intent returned by the payment service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub client_secret: String,
    pub payment_intent_id: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(&self, data: &PaymentBookingData) -> Result<PaymentIntent, BookingError>;
}

/// Gateway calling the payment-intent endpoint over HTTP
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpPaymentGateway {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_payment_intent(&self, data: &PaymentBookingData) -> Result<PaymentIntent, BookingError> {
        let mut request = self.client.post(&self.endpoint).json(data);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| {
            error!("Payment intent request failed: {}", e);
            BookingError::Payment("payment service unreachable".to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(
                "Payment intent for equipment {} rejected with status {}",
                data.equipment_id, status
            );
            return Err(BookingError::Payment(format!(
                "payment service returned {}",
                status.as_u16()
            )));
        }

        let intent = response.json::<PaymentIntent>().await.map_err(|e| {
            error!("Malformed payment intent response: {}", e);
            BookingError::Payment("malformed payment service response".to_string())
        })?;

        info!(
            "Created payment intent {} for equipment {}",
            intent.payment_intent_id, data.equipment_id
        );
        Ok(intent)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payload_from_calculation() {
        let equipment_id = Uuid::new_v4();
        let range = DateRange::parse("2024-07-01", "2024-07-04").unwrap();
        let calc = BookingCalculation {
            subtotal: dec!(150),
            service_fee: dec!(7.50),
            insurance: dec!(15.00),
            deposit: dec!(100),
            total: dec!(172.50),
            days: 3,
        };

        let data = PaymentBookingData::from_calculation(equipment_id, &range, InsuranceTier::Basic, &calc, "USD");

        assert_eq!(data.start_date, "2024-07-01");
        assert_eq!(data.end_date, "2024-07-04");
        assert_eq!(data.total_amount, dec!(172.50));
        assert_eq!(data.insurance_cost, dec!(15.00));
        assert_eq!(data.deposit_amount, dec!(100));

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["total_amount"], "172.50");
        assert_eq!(json["insurance_type"], "basic");
        assert_eq!(json["deposit_amount"], "100");
    }

    fn sample_payload() -> PaymentBookingData {
        PaymentBookingData {
            equipment_id: Uuid::new_v4(),
            start_date: "2024-07-01".to_string(),
            end_date: "2024-07-04".to_string(),
            total_amount: dec!(172.50),
            insurance_type: InsuranceTier::Basic,
            insurance_cost: dec!(15.00),
            deposit_amount: dec!(100),
            currency: "USD".to_string(),
        }
    }

    /// Serve `router` on an ephemeral port and return the intent endpoint URL
    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}/create-payment-intent", addr)
    }

    #[tokio::test]
    async fn test_http_gateway_sends_bearer_and_payload() {
        use axum::{http::HeaderMap, http::StatusCode, routing::post, Json};
        use serde_json::{json, Value};

        let router = axum::Router::new().route(
            "/create-payment-intent",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let authorized = headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer sk_test");
                if !authorized || body["total_amount"] != "172.50" {
                    return (StatusCode::UNAUTHORIZED, Json(json!({})));
                }
                (
                    StatusCode::OK,
                    Json(json!({ "client_secret": "cs_9", "payment_intent_id": "pi_9" })),
                )
            }),
        );
        let gateway = HttpPaymentGateway::new(serve(router).await, Some("sk_test".to_string()));

        let intent = gateway.create_payment_intent(&sample_payload()).await.unwrap();
        assert_eq!(intent.client_secret, "cs_9");
        assert_eq!(intent.payment_intent_id, "pi_9");
    }

    #[tokio::test]
    async fn test_http_gateway_maps_failures() {
        use axum::{http::StatusCode, routing::post};

        let router = axum::Router::new()
            .route("/create-payment-intent", post(|| async { StatusCode::UNPROCESSABLE_ENTITY }));
        let gateway = HttpPaymentGateway::new(serve(router).await, None);
        let err = gateway.create_payment_intent(&sample_payload()).await.unwrap_err();
        assert!(matches!(err, BookingError::Payment(ref msg) if msg == "payment service returned 422"));

        let router = axum::Router::new().route("/create-payment-intent", post(|| async { "not json" }));
        let gateway = HttpPaymentGateway::new(serve(router).await, None);
        let err = gateway.create_payment_intent(&sample_payload()).await.unwrap_err();
        assert!(matches!(err, BookingError::Payment(ref msg) if msg == "malformed payment service response"));
    }
}
