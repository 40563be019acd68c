//! Shared HTTP response checks for the Soil Data Access client.

use crate::error::SoilError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`SoilError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`SoilError::Api`] with status code and
///   response body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, SoilError> {
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(SoilError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        return Err(SoilError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[test]
    fn retry_after_defaults_to_a_minute() {
        let resp = reqwest::Response::from(
            ::http::Response::builder()
                .status(429)
                .header("Retry-After", "soon")
                .body("")
                .unwrap(),
        );
        assert_eq!(parse_retry_after(&resp), 60);
    }

    #[tokio::test]
    async fn rate_limit_is_reported() {
        let resp = reqwest::Response::from(
            ::http::Response::builder()
                .status(429)
                .header("Retry-After", "15")
                .body("")
                .unwrap(),
        );
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(err, SoilError::RateLimited { retry_after_secs: 15 }));
    }

    #[tokio::test]
    async fn server_errors_carry_the_body() {
        let err = check_response(mock_response(500, "Invalid query"))
            .await
            .unwrap_err();
        assert!(matches!(err, SoilError::Api { status: 500, ref message } if message == "Invalid query"));
    }

    #[tokio::test]
    async fn success_passes_through() {
        assert!(check_response(mock_response(200, "{}")).await.is_ok());
    }
}
