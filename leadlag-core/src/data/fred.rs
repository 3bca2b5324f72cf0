//! FRED macro series client.
//!
//! With an API key the JSON observations endpoint is used and an empty result
//! is an error. Without one, the public `fredgraph.csv` download is used and
//! filtered to `start` locally. FRED marks missing readings with `"."`.

use super::circuit_breaker::CircuitBreaker;
use super::normalize::{coerce_number, parse_timestamp};
use super::provider::{DataError, ObservationProvider, RawObservation};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const FRED_JSON_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
pub const FRED_CSV_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.csv";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "FRED_API_KEY";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<JsonObservation>,
}

#[derive(Debug, Deserialize)]
struct JsonObservation {
    date: String,
    value: String,
}

pub struct FredProvider {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl FredProvider {
    /// A blank key counts as no key.
    pub fn new(
        api_key: Option<String>,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            circuit_breaker,
        })
    }

    /// Reads the key from `FRED_API_KEY`.
    pub fn from_env(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        Self::new(std::env::var(API_KEY_VAR).ok(), circuit_breaker)
    }

    pub fn uses_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn get(&self, code: &str, request: reqwest::blocking::RequestBuilder) -> Result<String, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let resp = request
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            self.circuit_breaker.trip();
            return Err(DataError::CircuitBreakerTripped);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.circuit_breaker.record_failure();
            return Err(DataError::RateLimited { retry_after_secs: 60 });
        }
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: code.to_string(),
            });
        }
        if !status.is_success() {
            self.circuit_breaker.record_failure();
            return Err(DataError::Other(format!("HTTP {status} for {code}")));
        }

        let body = resp
            .text()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        self.circuit_breaker.record_success();
        Ok(body)
    }

    fn fetch_json(&self, code: &str, start: NaiveDate, api_key: &str) -> Result<Vec<RawObservation>, DataError> {
        let start = start.format("%Y-%m-%d").to_string();
        let request = self.client.get(FRED_JSON_URL).query(&[
            ("series_id", code),
            ("api_key", api_key),
            ("file_type", "json"),
            ("observation_start", start.as_str()),
        ]);
        let body = self.get(code, request)?;
        parse_json_observations(code, &body)
    }

    fn fetch_csv(&self, code: &str, start: NaiveDate) -> Result<Vec<RawObservation>, DataError> {
        let request = self.client.get(FRED_CSV_URL).query(&[("id", code)]);
        let body = self.get(code, request)?;
        parse_csv_observations(code, &body, start)
    }
}

impl ObservationProvider for FredProvider {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch_observations(
        &self,
        code: &str,
        start: NaiveDate,
    ) -> Result<Vec<RawObservation>, DataError> {
        match &self.api_key {
            Some(key) => self.fetch_json(code, start, key),
            None => self.fetch_csv(code, start),
        }
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

/// Parse a JSON observations payload. An empty list is an error.
pub fn parse_json_observations(code: &str, body: &str) -> Result<Vec<RawObservation>, DataError> {
    let resp: ObservationsResponse = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("{code}: {e}")))?;

    if resp.observations.is_empty() {
        return Err(DataError::EmptyResponse {
            code: code.to_string(),
        });
    }

    Ok(resp
        .observations
        .into_iter()
        .map(|o| RawObservation {
            ts: o.date,
            value: coerce_number(&o.value),
        })
        .collect())
}

/// Parse a `fredgraph.csv` download: a date column (`DATE` or
/// `observation_date`) and a column named after the code. Rows before `start`
/// are skipped.
pub fn parse_csv_observations(
    code: &str,
    body: &str,
    start: NaiveDate,
) -> Result<Vec<RawObservation>, DataError> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| DataError::ResponseFormatChanged(format!("{code}: {e}")))?
        .clone();

    let date_col = headers
        .iter()
        .position(|h| h == "DATE" || h == "observation_date");
    let value_col = headers.iter().position(|h| h == code);
    let (Some(date_col), Some(value_col)) = (date_col, value_col) else {
        return Err(DataError::ResponseFormatChanged(format!(
            "FRED CSV for {code} is missing the date or value column"
        )));
    };

    let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DataError::ResponseFormatChanged(format!("{code}: {e}")))?;
        let ts = record.get(date_col).unwrap_or_default();
        if parse_timestamp(ts).is_some_and(|t| t < start_ts) {
            continue;
        }
        rows.push(RawObservation {
            ts: ts.to_string(),
            value: record.get(value_col).and_then(coerce_number),
        });
    }
    Ok(rows)
}
