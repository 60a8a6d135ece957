//! Assembly of the desired Spark properties from the currently-known
//! integrations. Pure except for the S3 credential check, which is injected.

use std::collections::BTreeMap;

use const_format::concatcp;

use crate::{
    connection::{
        azure::AzureStorageConnectionInfo, pushgateway::PushGatewayInfo, s3::S3ConnectionInfo,
    },
    credentials::CredentialsVerifier,
};

pub const DEFAULT_S3_ENDPOINT: &str = "https://s3.amazonaws.com";

// spark properties written by the S3 section
pub const EVENT_LOG_ENABLED: &str = "spark.eventLog.enabled";
pub const EVENT_LOG_DIR: &str = "spark.eventLog.dir";
pub const HISTORY_LOG_DIR: &str = "spark.history.fs.logDirectory";
pub const S3A_PATH_STYLE_ACCESS: &str = "spark.hadoop.fs.s3a.path.style.access";
pub const S3A_ENDPOINT: &str = "spark.hadoop.fs.s3a.endpoint";
pub const S3A_ACCESS_KEY: &str = "spark.hadoop.fs.s3a.access.key";
pub const S3A_SECRET_KEY: &str = "spark.hadoop.fs.s3a.secret.key";
pub const S3A_CREDENTIALS_PROVIDER: &str = "spark.hadoop.fs.s3a.aws.credentials.provider";
pub const S3A_SSL_ENABLED: &str = "spark.hadoop.fs.s3a.connection.ssl.enabled";
pub const SIMPLE_CREDENTIALS_PROVIDER: &str =
    "org.apache.hadoop.fs.s3a.SimpleAWSCredentialsProvider";
// azure account keys are per storage account, see [`azure_account_key`]
pub const AZURE_ACCOUNT_KEY_PREFIX: &str = "spark.hadoop.fs.azure.account.key.";
// pushgateway sink, all static apart from the address
const PROMETHEUS_SINK_PREFIX: &str = "spark.metrics.conf.*.sink.prometheus.";
pub const METRICS_SINK_ADDRESS: &str = concatcp!(PROMETHEUS_SINK_PREFIX, "pushgateway-address");
pub const METRICS_SINK_CLASS: &str = concatcp!(PROMETHEUS_SINK_PREFIX, "class");
pub const METRICS_SINK_DROPWIZARD: &str =
    concatcp!(PROMETHEUS_SINK_PREFIX, "enable-dropwizard-collector");
pub const METRICS_SINK_PERIOD: &str = concatcp!(PROMETHEUS_SINK_PREFIX, "period");
pub const METRICS_SINK_NAME_CAPTURE: &str =
    concatcp!(PROMETHEUS_SINK_PREFIX, "metrics-name-capture-regex");
pub const METRICS_SINK_NAME_REPLACEMENT: &str =
    concatcp!(PROMETHEUS_SINK_PREFIX, "metrics-name-replacement");
pub const PROMETHEUS_SINK_CLASS: &str =
    "org.apache.spark.banzaicloud.metrics.sink.PrometheusSink";
pub const METRICS_NAME_CAPTURE_REGEX: &str = "([a-z0-9]*_[a-z0-9]*_[a-z0-9]*_)(.+)";
// log forwarding
pub const EXECUTOR_LOKI_URL: &str = "spark.executorEnv.LOKI_URL";
pub const DRIVER_LOKI_URL: &str = "spark.kubernetes.driverEnv.LOKI_URL";

/// Builder for the desired configuration of one reconciliation pass.
///
/// Sections are merged lowest precedence first: storage backend, metrics
/// sink, user overrides, log forwarding. Log-forwarding keys deliberately win
/// over user overrides. When both storage backends are configured neither
/// contributes anything; the conflict is surfaced through status instead.
#[derive(Default)]
pub struct HubConfig<'a> {
    s3: Option<&'a S3ConnectionInfo>,
    azure_storage: Option<&'a AzureStorageConnectionInfo>,
    pushgateway: Option<&'a PushGatewayInfo>,
    user_properties: BTreeMap<String, String>,
    loki_url: Option<String>,
}

impl<'a> HubConfig<'a> {
    pub fn new(
        s3: Option<&'a S3ConnectionInfo>,
        azure_storage: Option<&'a AzureStorageConnectionInfo>,
        pushgateway: Option<&'a PushGatewayInfo>,
        user_properties: BTreeMap<String, String>,
        loki_url: Option<String>,
    ) -> Self {
        Self {
            s3,
            azure_storage,
            pushgateway,
            user_properties,
            loki_url,
        }
    }

    /// Default-secure policy: SSL counts as enabled unless the endpoint is
    /// explicitly plain http without port 443.
    fn ssl_enabled(endpoint: Option<&str>) -> &'static str {
        match endpoint {
            None => "true",
            Some(endpoint) if endpoint.starts_with("https:") || endpoint.contains(":443") => "true",
            Some(_) => "false",
        }
    }

    fn s3_section(&self, verifier: &dyn CredentialsVerifier) -> BTreeMap<String, String> {
        let Some(s3) = self.s3.filter(|s3| s3.is_configured()) else {
            return BTreeMap::new();
        };
        if !verifier.verify(s3) {
            return BTreeMap::new();
        }
        BTreeMap::from([
            (S3A_PATH_STYLE_ACCESS.to_string(), "true".to_string()),
            (EVENT_LOG_ENABLED.to_string(), "true".to_string()),
            (
                S3A_ENDPOINT.to_string(),
                s3.endpoint().unwrap_or(DEFAULT_S3_ENDPOINT).to_string(),
            ),
            (S3A_ACCESS_KEY.to_string(), s3.access_key().to_string()),
            (S3A_SECRET_KEY.to_string(), s3.secret_key().to_string()),
            (EVENT_LOG_DIR.to_string(), s3.log_dir()),
            (HISTORY_LOG_DIR.to_string(), s3.log_dir()),
            (
                S3A_CREDENTIALS_PROVIDER.to_string(),
                SIMPLE_CREDENTIALS_PROVIDER.to_string(),
            ),
            (
                S3A_SSL_ENABLED.to_string(),
                Self::ssl_enabled(s3.endpoint()).to_string(),
            ),
        ])
    }

    fn azure_section(&self) -> BTreeMap<String, String> {
        let Some(azure) = self.azure_storage.filter(|azure| azure.is_configured()) else {
            return BTreeMap::new();
        };
        let mut section = BTreeMap::from([
            (EVENT_LOG_ENABLED.to_string(), "true".to_string()),
            (EVENT_LOG_DIR.to_string(), azure.log_dir()),
            (HISTORY_LOG_DIR.to_string(), azure.log_dir()),
        ]);
        if let Some(protocol) = azure.connection_protocol() {
            section.insert(
                format!(
                    "{AZURE_ACCOUNT_KEY_PREFIX}{}.{}",
                    azure.storage_account(),
                    protocol.host_suffix()
                ),
                azure.secret_key().to_string(),
            );
        }
        section
    }

    fn pushgateway_section(&self) -> BTreeMap<String, String> {
        let Some(address) = self.pushgateway.and_then(|pg| pg.endpoint()) else {
            return BTreeMap::new();
        };
        BTreeMap::from([
            (METRICS_SINK_ADDRESS.to_string(), address),
            (METRICS_SINK_CLASS.to_string(), PROMETHEUS_SINK_CLASS.to_string()),
            (METRICS_SINK_DROPWIZARD.to_string(), "true".to_string()),
            (METRICS_SINK_PERIOD.to_string(), "5".to_string()),
            (
                METRICS_SINK_NAME_CAPTURE.to_string(),
                METRICS_NAME_CAPTURE_REGEX.to_string(),
            ),
            (METRICS_SINK_NAME_REPLACEMENT.to_string(), "$2".to_string()),
        ])
    }

    fn loki_section(&self) -> BTreeMap<String, String> {
        let Some(url) = &self.loki_url else {
            return BTreeMap::new();
        };
        BTreeMap::from([
            (EXECUTOR_LOKI_URL.to_string(), url.clone()),
            (DRIVER_LOKI_URL.to_string(), url.clone()),
        ])
    }

    fn storage_conflict(&self) -> bool {
        self.s3.is_some_and(|s3| s3.is_configured())
            && self
                .azure_storage
                .is_some_and(|azure| azure.is_configured())
    }

    /// Merge all sections into the desired property mapping.
    pub fn build(&self, verifier: &dyn CredentialsVerifier) -> BTreeMap<String, String> {
        let mut properties = BTreeMap::new();
        if !self.storage_conflict() {
            properties.extend(self.s3_section(verifier));
            properties.extend(self.azure_section());
        }
        properties.extend(self.pushgateway_section());
        properties.extend(self.user_properties.clone());
        properties.extend(self.loki_section());
        properties
    }

    /// Canonical serialized form: `key=value` lines, keys sorted ascending,
    /// entries with empty values dropped.
    pub fn contents(properties: &BTreeMap<String, String>) -> String {
        properties
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;
    use crate::{connection::RelationData, credentials::AcceptAll};

    fn s3_info() -> S3ConnectionInfo {
        S3ConnectionInfo::new(RelationData::from([
            ("endpoint".to_string(), "https://s3.example.com".to_string()),
            ("access-key".to_string(), "AK".to_string()),
            ("secret-key".to_string(), "SK".to_string()),
            ("bucket".to_string(), "b".to_string()),
            ("path".to_string(), "p".to_string()),
        ]))
    }

    fn azure_info() -> AzureStorageConnectionInfo {
        AzureStorageConnectionInfo::new(RelationData::from([
            ("secret-key".to_string(), "ASK".to_string()),
            ("path".to_string(), "events".to_string()),
            ("container".to_string(), "logs".to_string()),
            ("storage-account".to_string(), "acct".to_string()),
            ("connection-protocol".to_string(), "abfss".to_string()),
        ]))
    }

    struct RejectAll;

    impl CredentialsVerifier for RejectAll {
        fn verify(&self, _info: &S3ConnectionInfo) -> bool {
            false
        }
    }

    #[rstest]
    #[case(None, "true")]
    #[case(Some("https://s3.example.com"), "true")]
    #[case(Some("http://s3.example.com:443"), "true")]
    #[case(Some("http://s3.example.com:9000"), "false")]
    fn test_ssl_enabled(#[case] endpoint: Option<&str>, #[case] expected: &str) {
        assert_eq!(HubConfig::ssl_enabled(endpoint), expected);
    }

    #[test]
    fn test_s3_section_end_to_end() {
        let s3 = s3_info();
        let config = HubConfig::new(Some(&s3), None, None, BTreeMap::new(), None);
        let properties = config.build(&AcceptAll);

        assert_eq!(
            properties.get(S3A_ENDPOINT),
            Some(&"https://s3.example.com".to_string())
        );
        assert_eq!(properties.get(S3A_ACCESS_KEY), Some(&"AK".to_string()));
        assert_eq!(properties.get(EVENT_LOG_DIR), Some(&"s3a://b/p".to_string()));
        assert_eq!(properties.get(S3A_SSL_ENABLED), Some(&"true".to_string()));
    }

    #[rstest]
    #[case::absent(None)]
    #[case::present_but_empty(Some(""))]
    fn test_unset_endpoint_defaults_with_ssl_enabled(#[case] endpoint: Option<&str>) {
        let mut data = RelationData::from([
            ("access-key".to_string(), "AK".to_string()),
            ("secret-key".to_string(), "SK".to_string()),
            ("bucket".to_string(), "b".to_string()),
            ("path".to_string(), "p".to_string()),
        ]);
        if let Some(endpoint) = endpoint {
            data.insert("endpoint".to_string(), endpoint.to_string());
        }
        let s3 = S3ConnectionInfo::new(data);
        let config = HubConfig::new(Some(&s3), None, None, BTreeMap::new(), None);
        let properties = config.build(&AcceptAll);

        assert_eq!(
            properties.get(S3A_ENDPOINT),
            Some(&DEFAULT_S3_ENDPOINT.to_string())
        );
        assert_eq!(properties.get(S3A_SSL_ENABLED), Some(&"true".to_string()));
    }

    #[test]
    fn test_s3_section_requires_verified_credentials() {
        let s3 = s3_info();
        let config = HubConfig::new(Some(&s3), None, None, BTreeMap::new(), None);
        assert!(config.build(&RejectAll).is_empty());
    }

    #[test]
    fn test_incomplete_s3_contributes_nothing() {
        let s3 = S3ConnectionInfo::new(RelationData::from([(
            "bucket".to_string(),
            "b".to_string(),
        )]));
        let config = HubConfig::new(Some(&s3), None, None, BTreeMap::new(), None);
        assert!(config.build(&AcceptAll).is_empty());
    }

    #[test]
    fn test_azure_section() {
        let azure = azure_info();
        let config = HubConfig::new(None, Some(&azure), None, BTreeMap::new(), None);
        let properties = config.build(&AcceptAll);

        assert_eq!(properties.get(EVENT_LOG_ENABLED), Some(&"true".to_string()));
        assert_eq!(
            properties.get(EVENT_LOG_DIR),
            Some(&"abfss://logs@acct.dfs.core.windows.net/events".to_string())
        );
        assert_eq!(
            properties.get("spark.hadoop.fs.azure.account.key.acct.dfs.core.windows.net"),
            Some(&"ASK".to_string())
        );
    }

    #[test]
    fn test_storage_conflict_drops_both_backends() {
        let s3 = s3_info();
        let azure = azure_info();
        let config = HubConfig::new(Some(&s3), Some(&azure), None, BTreeMap::new(), None);
        let properties = config.build(&AcceptAll);

        assert!(!properties.keys().any(|key| key.contains("s3a")));
        assert!(!properties.keys().any(|key| key.contains("azure")));
        assert_eq!(properties.get(EVENT_LOG_DIR), None);
    }

    #[test]
    fn test_pushgateway_section() {
        let pushgateway = PushGatewayInfo::new(RelationData::from([(
            "push-endpoint".to_string(),
            r#"{"url": "http://push.example.com:9091"}"#.to_string(),
        )]));
        let config = HubConfig::new(None, None, Some(&pushgateway), BTreeMap::new(), None);
        let properties = config.build(&AcceptAll);

        assert_eq!(
            properties.get(METRICS_SINK_ADDRESS),
            Some(&"push.example.com:9091".to_string())
        );
        assert_eq!(
            properties.get(METRICS_SINK_CLASS),
            Some(&PROMETHEUS_SINK_CLASS.to_string())
        );
        assert_eq!(properties.get(METRICS_SINK_PERIOD), Some(&"5".to_string()));
    }

    #[test]
    fn test_user_overrides_win_over_sections() {
        let s3 = s3_info();
        let overrides = BTreeMap::from([
            (EVENT_LOG_ENABLED.to_string(), "false".to_string()),
            ("spark.app.name".to_string(), "custom".to_string()),
        ]);
        let config = HubConfig::new(Some(&s3), None, None, overrides, None);
        let properties = config.build(&AcceptAll);

        assert_eq!(properties.get(EVENT_LOG_ENABLED), Some(&"false".to_string()));
        assert_eq!(properties.get("spark.app.name"), Some(&"custom".to_string()));
    }

    #[test]
    fn test_loki_section_wins_over_user_overrides() {
        let overrides = BTreeMap::from([(EXECUTOR_LOKI_URL.to_string(), "elsewhere".to_string())]);
        let config = HubConfig::new(None, None, None, overrides, Some("http://loki".to_string()));
        let properties = config.build(&AcceptAll);

        assert_eq!(
            properties.get(EXECUTOR_LOKI_URL),
            Some(&"http://loki".to_string())
        );
        assert_eq!(properties.get(DRIVER_LOKI_URL), Some(&"http://loki".to_string()));
    }

    #[test]
    fn test_contents_sorted_and_empty_values_dropped() {
        let properties = BTreeMap::from([
            ("b.key".to_string(), "2".to_string()),
            ("a.key".to_string(), "1".to_string()),
            ("empty.key".to_string(), String::new()),
        ]);
        assert_eq!(
            HubConfig::contents(&properties),
            indoc! {"
                a.key=1
                b.key=2"}
        );
    }

    #[test]
    fn test_empty_value_suppression_in_serialized_s3_config() {
        // access-key present but empty: the backend is incomplete, so no
        // s3a line may appear at all
        let s3 = S3ConnectionInfo::new(RelationData::from([
            ("access-key".to_string(), String::new()),
            ("secret-key".to_string(), "SK".to_string()),
            ("bucket".to_string(), "b".to_string()),
            ("path".to_string(), "p".to_string()),
        ]));
        let config = HubConfig::new(Some(&s3), None, None, BTreeMap::new(), None);
        let contents = HubConfig::contents(&config.build(&AcceptAll));
        assert!(!contents.contains("spark.hadoop.fs.s3a.access.key"));
    }
}
