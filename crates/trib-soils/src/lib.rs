//! # trib-soils
//!
//! Hydrologic soil group lookup against the USDA Soil Data Access tabular
//! service.
//!
//! - [`SoilDataClient`] posts one SQL query per chunk of map unit symbols
//!   and returns one [`SoilRecord`] per requested symbol, in request order.
//! - [`apply`] fills blank `HSG` attributes of a soils layer from records.
//! - [`scheduler`] runs lookups as abortable tasks keyed by symbol set and
//!   discards results from superseded requests.
//!
//! Lookup failures are never fatal: the caller logs them and leaves the soil
//! group blank, which the completeness check then reports.

pub mod apply;
pub mod query;
pub mod scheduler;

mod error;
mod http;

pub use error::SoilError;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use trib_config::SoilsConfig;

use crate::http::check_response;

/// Map unit record returned by the lookup. Blank fields mean "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilRecord {
    pub musym: String,
    #[serde(default)]
    pub muname: String,
    #[serde(default)]
    pub hsg: String,
}

/// Anything that can resolve map unit symbols to soil records.
pub trait HsgSource: Send + Sync + 'static {
    /// Look up `symbols` within `area_symbol`.
    fn lookup(
        &self,
        area_symbol: &str,
        symbols: &[String],
    ) -> impl Future<Output = Result<Vec<SoilRecord>, SoilError>> + Send;
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    format: &'a str,
}

/// HTTP client for the Soil Data Access tabular endpoint.
pub struct SoilDataClient {
    http: reqwest::Client,
    endpoint: String,
    chunk_size: usize,
}

impl Default for SoilDataClient {
    fn default() -> Self {
        Self::new(&SoilsConfig::default())
    }
}

impl SoilDataClient {
    /// Create a client from the `[soils]` configuration section.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(config: &SoilsConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent("tributary/0.1")
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("reqwest client should build"),
            endpoint: config.endpoint.clone(),
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Run one SQL query and parse its table.
    async fn run_sql(&self, sql: &str) -> Result<Vec<SoilRecord>, SoilError> {
        let body = QueryBody {
            query: sql,
            format: "JSON+COLUMNNAME",
        };
        let resp = check_response(self.http.post(&self.endpoint).json(&body).send().await?).await?;
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| SoilError::Parse(e.to_string()))?;
        query::parse_table(&value)
    }

    /// Look up hydrologic soil groups for `symbols` in `area_symbol`.
    ///
    /// Symbols are trimmed, upper-cased and de-duplicated first. An empty
    /// area symbol or symbol list returns no records without a request.
    ///
    /// # Errors
    ///
    /// Returns [`SoilError`] if any chunk request fails or its response
    /// cannot be parsed.
    pub async fn lookup_symbols(
        &self,
        area_symbol: &str,
        symbols: &[String],
    ) -> Result<Vec<SoilRecord>, SoilError> {
        let symbols = query::normalize_symbols(symbols);
        if area_symbol.trim().is_empty() || symbols.is_empty() {
            return Ok(Vec::new());
        }

        let mut fetched = Vec::new();
        for (i, chunk) in symbols.chunks(self.chunk_size).enumerate() {
            let sql = query::build_sql(area_symbol, chunk);
            let rows = self.run_sql(&sql).await?;
            tracing::debug!(chunk = i, requested = chunk.len(), returned = rows.len(), "soil data access chunk");
            fetched.extend(rows);
        }

        let ordered = query::order_results(&symbols, fetched);
        tracing::info!(
            area_symbol,
            symbols = ordered.len(),
            resolved = ordered.iter().filter(|r| !r.hsg.is_empty()).count(),
            "soil lookup finished"
        );
        Ok(ordered)
    }
}

impl HsgSource for SoilDataClient {
    fn lookup(
        &self,
        area_symbol: &str,
        symbols: &[String],
    ) -> impl Future<Output = Result<Vec<SoilRecord>, SoilError>> + Send {
        self.lookup_symbols(area_symbol, symbols)
    }
}
