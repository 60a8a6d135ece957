//! Loki URL advertised by the logging relation.

use serde::Deserialize;

use super::RelationData;

#[derive(Debug, Default, Deserialize)]
struct LokiEndpoint {
    url: Option<String>,
}

/// View over the data of one unit of the `logging` relation. Any unit will
/// do, the URL is the same across the Loki application.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LokiUrl {
    data: RelationData,
}

impl LokiUrl {
    pub fn new(data: RelationData) -> Self {
        Self { data }
    }

    /// The push-api URL, `None` while the sink has not advertised one yet.
    pub fn url(&self) -> Option<String> {
        let raw = self.data.get("endpoint").map(String::as_str).unwrap_or("{}");
        let endpoint: LokiEndpoint = match serde_json::from_str(raw) {
            Ok(endpoint) => endpoint,
            Err(error) => {
                tracing::warn!(%error, "ignoring malformed logging endpoint relation field");
                return None;
            }
        };
        match endpoint.url {
            Some(url) => {
                tracing::debug!(%url, "found Loki URL in relation data");
                Some(url)
            }
            None => {
                tracing::warn!("Loki URL was not found in relation data");
                None
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url().is_some()
    }
}
