use super::CrossPlatformHttpClient;
use crate::error::WalletError;
use cashlet_core::primitives::{CashuErrorResponse, ERROR_CODE_QUOTE_NOT_PAID};
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Response, StatusCode,
};
use tracing::debug;
use url::Url;

impl Default for CrossPlatformHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossPlatformHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn extract_response_data<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, WalletError> {
        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| WalletError::MintUnreachable(e.to_string()))?;

        if status == StatusCode::OK {
            if let Ok(data) = serde_json::from_str::<T>(&response_text) {
                return Ok(data);
            }
        }
        debug!("mint responded with status {status}: {response_text}");
        Err(map_error_response(&response_text))
    }

    pub async fn do_get<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
    ) -> Result<T, WalletError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| WalletError::MintUnreachable(e.to_string()))?;
        Self::extract_response_data::<T>(resp).await
    }

    pub async fn do_post<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<T, WalletError> {
        let resp = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_str("application/json")?)
            .body(serde_json::to_string(body)?)
            .send()
            .await
            .map_err(|e| WalletError::MintUnreachable(e.to_string()))?;
        Self::extract_response_data::<T>(resp).await
    }
}

fn map_error_response(response_text: &str) -> WalletError {
    match serde_json::from_str::<CashuErrorResponse>(response_text) {
        Ok(data) if is_quote_not_paid(&data) => WalletError::QuoteNotPaid(data.detail),
        Ok(data) => WalletError::MintError {
            code: data.code,
            detail: data.detail,
        },
        Err(_) => WalletError::UnexpectedResponse(response_text.to_owned()),
    }
}

fn is_quote_not_paid(response: &CashuErrorResponse) -> bool {
    response.code == ERROR_CODE_QUOTE_NOT_PAID
        || response.detail == "Lightning invoice not paid yet."
        || response.detail.to_lowercase().contains("quote not paid")
        || response.detail.to_lowercase().contains("quote is not paid")
}

#[cfg(test)]
mod tests {
    use super::map_error_response;
    use crate::error::WalletError;

    #[test]
    fn test_map_quote_not_paid() {
        let err = map_error_response(r#"{"code": 20001, "detail": "quote is not paid"}"#);
        assert!(matches!(err, WalletError::QuoteNotPaid(_)));

        let err = map_error_response(r#"{"code": 0, "detail": "Lightning invoice not paid yet."}"#);
        assert!(matches!(err, WalletError::QuoteNotPaid(_)));
    }

    #[test]
    fn test_map_mint_error() {
        let err = map_error_response(r#"{"code": 11001, "detail": "Token already spent."}"#);
        assert!(matches!(err, WalletError::MintError { code: 11001, .. }));
    }

    #[test]
    fn test_map_unexpected_response() {
        let err = map_error_response("<html>502 Bad Gateway</html>");
        assert!(matches!(err, WalletError::UnexpectedResponse(_)));
    }
}
