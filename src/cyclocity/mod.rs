//! Client for the Cyclocity account API, which serves a rider's trip history.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, COOKIE};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.cyclocity.fr";

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The API answered with something other than 200
    #[error("unexpected status {status} from the trips endpoint")]
    Status { status: u16, body: String },
    /// The API answered 200 with a body that is not JSON
    #[error("trips response is not valid JSON")]
    InvalidBody {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

/// Session cookies copied from a logged-in browser.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub auth_session_id: String,
    pub ingress_cookie: String,
}

impl Credentials {
    pub fn cookie_header(&self) -> String {
        format!(
            "AUTH_SESSION_ID={}; INGRESSCOOKIE={}",
            self.auth_session_id, self.ingress_cookie
        )
    }
}

pub fn trips_url(base_url: &str, contract: &str, account: &str) -> String {
    format!(
        "{}/contracts/{}/accounts/{}/trips",
        base_url.trim_end_matches('/'),
        contract,
        account
    )
}

pub fn create_client(timeout_secs: u64) -> Result<Client, Error> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Fetch the trip export for an account.
pub fn fetch_trips(client: &Client, url: &str, credentials: &Credentials) -> Result<Value, Error> {
    let response = client
        .get(url)
        .header(ACCEPT, "application/json")
        .header(COOKIE, credentials.cookie_header())
        .send()?;
    let status = response.status().as_u16();
    log::info!("Trips endpoint answered with status {}", status);
    let body = response.text()?;
    parse_export(status, &body)
}

/// Check the status and decode the body of a trips response.
pub fn parse_export(status: u16, body: &str) -> Result<Value, Error> {
    if status != 200 {
        return Err(Error::Status {
            status,
            body: body.to_string(),
        });
    }
    serde_json::from_str(body).map_err(|e| Error::InvalidBody {
        source: e,
        body: body.to_string(),
    })
}

/// Log the start and end station of every trip in an export.
///
/// Returns how many trips were listed.
pub fn log_trip_endpoints(export: &Value) -> usize {
    let trips = match export.get("trips").and_then(Value::as_array) {
        Some(trips) => trips,
        None => return 0,
    };
    for trip in trips {
        log::info!(
            "Start: {} | End: {}",
            trip.get("startStation").unwrap_or(&Value::Null),
            trip.get("endStation").unwrap_or(&Value::Null)
        );
    }
    trips.len()
}
