// In crates/api-client/src/lib.rs

use app_config::types::BinanceSettings;
use chrono::Utc;
use core_types::{OrderRequest, Symbol};
use hmac::{Hmac, Mac};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use sha2::Sha256;
// Create a type alias for the HMAC-SHA256 implementation.
type HmacSha256 = Hmac<Sha256>;

pub mod error;
pub mod exchange;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use exchange::Exchange;
pub use types::*;

impl ApiClient {
    /// Constructs a new ApiClient from BinanceSettings.
    pub fn new(settings: &BinanceSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;
        Ok(ApiClient {
            http_client,
            api_key: settings.api_key.clone(),
            secret_key: settings.secret_key.clone(),
            base_url: settings.rest_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Generates an HMAC-SHA256 signature for a given query string.
    ///
    /// # Arguments
    ///
    /// * `query_string`: The URL-encoded query string to be signed.
    ///
    /// # Returns
    ///
    /// A hexadecimal string representation of the signature.
    pub fn sign(&self, query_string: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(query_string.as_bytes());
        let result = mac.finalize();
        hex::encode(result.into_bytes())
    }

    /// Appends the current millisecond timestamp and the signature to `params`.
    fn create_signed_query(&self, params: &mut String) {
        self.create_signed_query_at(params, Utc::now().timestamp_millis());
    }

    /// Appends `timestamp` and the signature over everything before it.
    pub fn create_signed_query_at(&self, params: &mut String, timestamp: i64) {
        if !params.is_empty() {
            params.push('&');
        }
        params.push_str(&format!("timestamp={}", timestamp));

        let signature = self.sign(params);
        params.push_str(&format!("&signature={}", signature));
    }

    /// Sends an authenticated request; every parameter travels in the query string.
    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        mut params: String,
    ) -> Result<T> {
        self.create_signed_query(&mut params);
        let url = format!("{}{}?{}", self.base_url, endpoint, params);

        let response = self
            .http_client
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        Self::parse_response(response).await
    }

    /// Sends an unauthenticated market-data request.
    async fn send_public<T: DeserializeOwned>(&self, endpoint: &str, params: &str) -> Result<T> {
        let url = if params.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, params)
        };

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        Self::parse_response(response).await
    }

    /// Turns a non-2xx status into `Error::ApiError`, otherwise decodes the body.
    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await.map_err(Error::RequestFailed)?;

        if !status.is_success() {
            return Err(Error::ApiError {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(Error::DeserializationFailed)
    }

    /// Checks connectivity. Corresponds to `GET /fapi/v1/ping`.
    pub async fn ping(&self) -> Result<()> {
        let _: serde_json::Value = self.send_public("/fapi/v1/ping", "").await?;
        Ok(())
    }

    /// Corresponds to `GET /fapi/v1/ticker/price`.
    pub async fn get_ticker_price(&self, symbol: &Symbol) -> Result<TickerPrice> {
        self.send_public("/fapi/v1/ticker/price", &format!("symbol={}", symbol.0))
            .await
    }

    /// Corresponds to `GET /fapi/v1/ticker/24hr`.
    pub async fn get_24hr_ticker(&self, symbol: &Symbol) -> Result<Ticker24h> {
        self.send_public("/fapi/v1/ticker/24hr", &format!("symbol={}", symbol.0))
            .await
    }

    /// Fetches the futures account balance summary.
    ///
    /// This corresponds to the `GET /fapi/v2/account` endpoint.
    pub async fn get_account_state(&self) -> Result<AccountState> {
        self.send_signed(Method::GET, "/fapi/v2/account", String::new())
            .await
    }

    /// Corresponds to `POST /fapi/v1/leverage`.
    pub async fn set_leverage(&self, symbol: &Symbol, leverage: u8) -> Result<()> {
        let params = format!("symbol={}&leverage={}", symbol.0, leverage);
        let _: serde_json::Value = self
            .send_signed(Method::POST, "/fapi/v1/leverage", params)
            .await?;
        Ok(())
    }

    /// Places a new market order.
    /// Corresponds to `POST /fapi/v1/order`.
    ///
    /// The account is assumed to be in one-way mode, so no `positionSide` is sent.
    pub async fn place_market_order(&self, order: &OrderRequest) -> Result<NewOrderResponse> {
        let quantity_str = format!("{:.3}", order.quantity);

        let mut params = format!(
            "symbol={}&side={}&type=MARKET&quantity={}",
            order.symbol.0,
            order.side.as_str(),
            quantity_str
        );
        if order.reduce_only {
            params.push_str("&reduceOnly=true");
        }

        self.send_signed(Method::POST, "/fapi/v1/order", params).await
    }

    /// Corresponds to `GET /fapi/v2/positionRisk`.
    pub async fn get_position_risk(&self) -> Result<Vec<PositionRisk>> {
        self.send_signed(Method::GET, "/fapi/v2/positionRisk", String::new())
            .await
    }
}

// Free function to allow api_client::new usage
pub fn new(settings: &BinanceSettings) -> Result<ApiClient> {
    ApiClient::new(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::OrderSide;
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    fn client(base_url: &str, secret: &str) -> ApiClient {
        ApiClient::new(&BinanceSettings {
            api_key: "test-key".to_string(),
            secret_key: secret.to_string(),
            rest_base_url: base_url.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn signature_matches_binance_reference_vector() {
        // Example from the Binance API documentation.
        let client = client(
            "http://localhost",
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j",
        );
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            client.sign(query),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn signed_query_appends_timestamp_then_signature() {
        let client = client("http://localhost", "secret");
        let mut params = "symbol=BTCUSDT&leverage=5".to_string();
        client.create_signed_query_at(&mut params, 1_700_000_000_000);

        let (unsigned, signature) = params.split_once("&signature=").unwrap();
        assert_eq!(unsigned, "symbol=BTCUSDT&leverage=5&timestamp=1700000000000");
        assert_eq!(signature, client.sign(unsigned));
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn signed_query_without_params_starts_with_timestamp() {
        let client = client("http://localhost", "secret");
        let mut params = String::new();
        client.create_signed_query_at(&mut params, 42);
        assert!(params.starts_with("timestamp=42&signature="));
    }

    #[tokio::test]
    async fn non_success_status_becomes_api_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/fapi/v2/positionRisk")
            .match_query(Matcher::Any)
            .match_header("x-mbx-apikey", "test-key")
            .with_status(401)
            .with_body(r#"{"code":-2015,"msg":"Invalid API-key, IP, or permissions for action."}"#)
            .create_async()
            .await;

        let client = client(&server.url(), "secret");
        let err = client.get_position_risk().await.unwrap_err();
        match err {
            Error::ApiError { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("-2015"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn position_risk_is_signed_and_parsed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/fapi/v2/positionRisk")
            .match_query(Matcher::AllOf(vec![
                Matcher::Regex("timestamp=\\d+".into()),
                Matcher::Regex("signature=[0-9a-f]{64}".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[
                    {"symbol":"BTCUSDT","positionAmt":"0.002","entryPrice":"50000.0","markPrice":"50500.0",
                     "unRealizedProfit":"1.0","notional":"101.0","leverage":"5","positionSide":"BOTH"},
                    {"symbol":"ETHUSDT","positionAmt":"0.000","entryPrice":"0.0","markPrice":"3000.0",
                     "unRealizedProfit":"0.0","notional":"0","leverage":"20","positionSide":"BOTH"}
                ]"#,
            )
            .create_async()
            .await;

        let client = client(&server.url(), "secret");
        let records = client.get_position_risk().await.unwrap();
        assert_eq!(records.len(), 2);

        let positions: Vec<_> = records.into_iter().filter_map(PositionRisk::into_position).collect();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol, Symbol::from("BTCUSDT"));
        assert_eq!(positions[0].amount, dec!(0.002));
        assert_eq!(positions[0].leverage, 5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn reduce_only_market_order_parameters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/fapi/v1/order")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbol".into(), "ETHUSDT".into()),
                Matcher::UrlEncoded("side".into(), "BUY".into()),
                Matcher::UrlEncoded("type".into(), "MARKET".into()),
                Matcher::UrlEncoded("quantity".into(), "1.250".into()),
                Matcher::UrlEncoded("reduceOnly".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"orderId":7,"symbol":"ETHUSDT","status":"FILLED","side":"BUY","type":"MARKET",
                    "avgPrice":"3000.10","executedQty":"1.250","cumQuote":"3750.125","reduceOnly":true}"#,
            )
            .create_async()
            .await;

        let client = client(&server.url(), "secret");
        let order = OrderRequest {
            symbol: Symbol::from("ETHUSDT"),
            side: OrderSide::Buy,
            quantity: dec!(1.25),
            leverage: 3,
            reduce_only: true,
        };
        let response = client.place_market_order(&order).await.unwrap();
        assert_eq!(response.order_id, 7);
        assert_eq!(response.avg_price, dec!(3000.10));
        assert!(response.reduce_only);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn ping_reports_connectivity() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/fapi/v1/ping")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = client(&server.url(), "secret");
        assert!(Exchange::test_connection(&client).await);
    }

    #[tokio::test]
    async fn unreachable_exchange_fails_connectivity_check() {
        // Nothing listens on port 9 on the loopback interface.
        let client = client("http://127.0.0.1:9", "secret");
        assert!(!Exchange::test_connection(&client).await);
    }
}
