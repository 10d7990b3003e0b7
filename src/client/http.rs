//! Blocking REST clients for the GA4 Data and Admin APIs.
//!
//! Authentication is a pre-obtained OAuth2 bearer token passed through
//! verbatim; acquiring or refreshing tokens is outside this tool.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{
    Account, AdminClient, DataClient, PropertySummary, RunReportRequest, RunReportResponse,
};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One authenticated client serving both capability traits.
pub struct HttpClients {
    http: reqwest::blocking::Client,
    token: String,
    data_endpoint: String,
    admin_endpoint: String,
}

impl HttpClients {
    pub fn new(token: String, data_endpoint: String, admin_endpoint: String) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            token,
            data_endpoint: data_endpoint.trim_end_matches('/').to_string(),
            admin_endpoint: admin_endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .with_context(|| format!("GA4 API request failed: GET {url}"))?;
        check_status(url, response)?
            .json()
            .with_context(|| format!("Failed to decode GA4 API response from {url}"))
    }
}

fn check_status(
    url: &str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        bail!("GA4 API returned {status} for {url}: {body}");
    }
    Ok(response)
}

impl DataClient for HttpClients {
    fn run_report(
        &self,
        property_id: &str,
        request: &RunReportRequest,
    ) -> Result<RunReportResponse> {
        let url = format!(
            "{}/v1beta/properties/{property_id}:runReport",
            self.data_endpoint
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .with_context(|| format!("GA4 Data API request failed for property {property_id}"))?;
        check_status(&url, response)?
            .json()
            .context("Failed to decode runReport response")
    }
}

impl AdminClient for HttpClients {
    fn list_accounts(&self) -> Result<Vec<Account>> {
        #[derive(Deserialize, Default)]
        #[serde(rename_all = "camelCase", default)]
        struct Page {
            accounts: Vec<Account>,
            next_page_token: String,
        }

        let url = format!("{}/v1beta/accounts", self.admin_endpoint);
        let mut accounts = Vec::new();
        let mut page_token = String::new();
        loop {
            let page: Page = self.get_json(&url, &[("pageToken", page_token.as_str())])?;
            accounts.extend(page.accounts);
            if page.next_page_token.is_empty() {
                return Ok(accounts);
            }
            page_token = page.next_page_token;
        }
    }

    fn list_properties(&self, account_name: &str) -> Result<Vec<PropertySummary>> {
        #[derive(Deserialize, Default)]
        #[serde(rename_all = "camelCase", default)]
        struct Page {
            properties: Vec<PropertySummary>,
            next_page_token: String,
        }

        let url = format!("{}/v1beta/properties", self.admin_endpoint);
        let filter = format!("parent:{account_name}");
        let mut properties = Vec::new();
        let mut page_token = String::new();
        loop {
            let page: Page = self.get_json(
                &url,
                &[
                    ("filter", filter.as_str()),
                    ("pageToken", page_token.as_str()),
                ],
            )?;
            properties.extend(page.properties);
            if page.next_page_token.is_empty() {
                return Ok(properties);
            }
            page_token = page.next_page_token;
        }
    }
}
