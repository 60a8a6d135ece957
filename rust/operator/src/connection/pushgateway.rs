//! Endpoint of the Prometheus pushgateway metrics sink.

use serde::Deserialize;

use super::RelationData;

#[derive(Debug, Deserialize)]
struct PushEndpoint {
    url: Option<String>,
}

/// View over the data of the `cos` relation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PushGatewayInfo {
    data: RelationData,
}

impl PushGatewayInfo {
    pub fn new(data: RelationData) -> Self {
        Self { data }
    }

    /// Address of the pushgateway, without URL scheme.
    pub fn endpoint(&self) -> Option<String> {
        let raw = self.data.get("push-endpoint")?;
        let endpoint: PushEndpoint = match serde_json::from_str(raw) {
            Ok(endpoint) => endpoint,
            Err(error) => {
                tracing::warn!(%error, "ignoring malformed push-endpoint relation field");
                return None;
            }
        };
        endpoint
            .url
            .map(|url| url.replace("https://", "").replace("http://", ""))
    }

    /// True once the pushgateway advertised a usable address.
    pub fn is_configured(&self) -> bool {
        self.endpoint().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pushgateway(raw: &str) -> PushGatewayInfo {
        PushGatewayInfo::new(RelationData::from([(
            "push-endpoint".to_string(),
            raw.to_string(),
        )]))
    }

    #[test]
    fn test_endpoint_strips_scheme() {
        assert_eq!(
            pushgateway(r#"{"url": "http://push.example.com:9091"}"#).endpoint(),
            Some("push.example.com:9091".to_string())
        );
        assert_eq!(
            pushgateway(r#"{"url": "https://push.example.com:9091"}"#).endpoint(),
            Some("push.example.com:9091".to_string())
        );
    }

    #[test]
    fn test_endpoint_absent() {
        assert_eq!(PushGatewayInfo::default().endpoint(), None);
        assert_eq!(pushgateway(r#"{}"#).endpoint(), None);
        assert_eq!(pushgateway("not-json").endpoint(), None);
        assert!(!pushgateway("not-json").is_configured());
    }
}
