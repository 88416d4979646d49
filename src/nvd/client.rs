// file: src/nvd/client.rs
// description: NVD CVE API 2.0 client for known vulnerabilities by platform identifier
// reference: https://nvd.nist.gov/developers/vulnerabilities

use crate::config::NvdConfig;
use crate::error::{PipelineError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct CveResponse {
    #[serde(rename = "totalResults", default)]
    total_results: u32,
    #[serde(default)]
    vulnerabilities: Vec<CveEntry>,
}

#[derive(Debug, Deserialize)]
struct CveEntry {
    cve: CveItem,
}

#[derive(Debug, Deserialize)]
struct CveItem {
    id: String,
    #[serde(default)]
    published: Option<String>,
    #[serde(default)]
    descriptions: Vec<CveDescription>,
}

#[derive(Debug, Deserialize)]
struct CveDescription {
    lang: String,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vulnerability {
    pub id: String,
    pub description: String,
    pub published: Option<String>,
}

pub struct NvdClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    results_per_page: u32,
}

impl NvdClient {
    pub fn new(config: &NvdConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                PipelineError::Vulnerability(format!("Failed to build NVD client: {}", e))
            })?;

        if config.api_key.is_none() {
            warn!("No NVD API key configured, requests are subject to the public rate limit");
        }

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            results_per_page: config.results_per_page,
        })
    }

    pub async fn lookup(&self, cpe: &str) -> Result<Vec<Vulnerability>> {
        debug!("Querying NVD for {}", cpe);

        let mut request = self.client.get(&self.api_url).query(&[
            ("virtualMatchString", cpe.to_string()),
            ("resultsPerPage", self.results_per_page.to_string()),
        ]);
        if let Some(api_key) = &self.api_key {
            request = request.header("apiKey", api_key);
        }

        let response = request.send().await.map_err(|e| {
            PipelineError::Vulnerability(format!("Failed to send NVD request: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Vulnerability(format!(
                "NVD request failed with status {}: {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(|e| {
            PipelineError::Vulnerability(format!("Failed to read NVD response: {}", e))
        })?;

        parse_response(&body)
    }
}

/// Extracts id and English description of every CVE in an API 2.0 body.
pub fn parse_response(body: &str) -> Result<Vec<Vulnerability>> {
    let response: CveResponse = serde_json::from_str(body).map_err(|e| {
        PipelineError::Vulnerability(format!("Failed to parse NVD response: {}", e))
    })?;

    debug!(
        "NVD reported {} results, {} in this page",
        response.total_results,
        response.vulnerabilities.len()
    );

    Ok(response
        .vulnerabilities
        .into_iter()
        .map(|entry| {
            let description = entry
                .cve
                .descriptions
                .iter()
                .find(|d| d.lang == "en")
                .or_else(|| entry.cve.descriptions.first())
                .map(|d| d.value.clone())
                .unwrap_or_default();

            Vulnerability {
                id: entry.cve.id,
                description,
                published: entry.cve.published,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const SAMPLE: &str = r#"{
        "resultsPerPage": 2,
        "startIndex": 0,
        "totalResults": 2,
        "format": "NVD_CVE",
        "version": "2.0",
        "vulnerabilities": [
            {
                "cve": {
                    "id": "CVE-2021-41773",
                    "published": "2021-10-05T09:15:07.593",
                    "descriptions": [
                        {"lang": "es", "value": "Se encontró un fallo"},
                        {"lang": "en", "value": "A flaw was found in a change made to path normalization in Apache HTTP Server 2.4.49."}
                    ]
                }
            },
            {
                "cve": {
                    "id": "CVE-2021-42013",
                    "descriptions": []
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_response() {
        let vulns = parse_response(SAMPLE).unwrap();

        assert_eq!(vulns.len(), 2);
        assert_eq!(vulns[0].id, "CVE-2021-41773");
        assert!(vulns[0].description.starts_with("A flaw was found"));
        assert_eq!(vulns[0].published.as_deref(), Some("2021-10-05T09:15:07.593"));
        assert_eq!(vulns[1].description, "");
    }

    #[test]
    fn test_parse_empty_and_invalid() {
        assert!(parse_response(r#"{"totalResults": 0, "vulnerabilities": []}"#)
            .unwrap()
            .is_empty());

        let err = parse_response("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, PipelineError::Vulnerability(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_lookup_error() {
        let mut config = Config::default_config().nvd;
        config.api_url = "http://127.0.0.1:9/rest/json/cves/2.0".to_string();
        config.timeout_secs = 2;
        let client = NvdClient::new(&config).unwrap();

        let err = client
            .lookup("cpe:2.3:a:apache:http_server:2.4.49:*:*:*:*:*:*:*")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Vulnerability(_)));
    }
}
