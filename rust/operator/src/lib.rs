//! Reconciliation core for the Spark Integration Hub operator.
//!
//! The hub watches several independently-arriving integrations (S3 or Azure
//! object storage, a Prometheus pushgateway, a Loki log sink, peer-supplied
//! overrides), merges them into one sorted `key=value` Spark properties file,
//! converges the workload onto it and fans the derived properties out to every
//! service-account client. The surrounding operator runtime delivers events
//! one at a time and owns relation/secret storage and process supervision;
//! everything it provides is reached through the traits in [`workload`],
//! [`credentials`], [`k8s`], [`provider`] and [`events`].

pub mod actions;
pub mod config;
pub mod connection;
pub mod context;
pub mod controller;
pub mod credentials;
pub mod events;
pub mod k8s;
pub mod peer;
pub mod provider;
pub mod status;
pub mod workload;

use const_format::concatcp;

pub const APP_NAME: &str = "integration-hub";
pub const CONTAINER_NAME: &str = "integration-hub";
pub const SERVICE_NAME: &str = "integration-hub";
// relation names
pub const PEER_RELATION_NAME: &str = "hub";
pub const S3_RELATION_NAME: &str = "s3-credentials";
pub const AZURE_STORAGE_RELATION_NAME: &str = "azure-storage-credentials";
pub const PUSHGATEWAY_RELATION_NAME: &str = "cos";
pub const LOGGING_RELATION_NAME: &str = "logging";
pub const SERVICE_ACCOUNT_RELATION_NAME: &str = "spark-service-account";
// workload paths
pub const CONF_DIR: &str = "/etc/hub/conf";
pub const ENV_FILE: &str = "/etc/hub/environment";
pub const SPARK_PROPERTIES_FILE: &str = "spark-properties.conf";
pub const SPARK_PROPERTIES_ENV: &str = "SPARK_PROPERTIES_FILE";
// resources managed on behalf of clients
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by=integration-hub";
pub const SECRET_CLEANUP_COMMAND: &str = concatcp!(
    "kubectl delete secret -l ",
    MANAGED_BY_LABEL,
    " --all-namespaces"
);
pub const ACCOUNT_REGISTRY_COMMAND: &str = "python3 -m spark8t.cli.service_account_registry";
