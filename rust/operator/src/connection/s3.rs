//! Credentials and endpoints used to reach an S3 bucket.

use super::RelationData;

/// View over the data of the `s3-credentials` relation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct S3ConnectionInfo {
    data: RelationData,
}

impl S3ConnectionInfo {
    pub fn new(data: RelationData) -> Self {
        Self { data }
    }

    fn field(&self, key: &str) -> &str {
        self.data.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Endpoint of the S3 service. A present-but-empty value counts as
    /// unset, like every other relation field.
    pub fn endpoint(&self) -> Option<&str> {
        self.data
            .get("endpoint")
            .map(String::as_str)
            .filter(|endpoint| !endpoint.is_empty())
    }

    pub fn access_key(&self) -> &str {
        self.field("access-key")
    }

    pub fn secret_key(&self) -> &str {
        self.field("secret-key")
    }

    pub fn bucket(&self) -> &str {
        self.field("bucket")
    }

    pub fn path(&self) -> &str {
        self.field("path")
    }

    pub fn region(&self) -> &str {
        self.field("region")
    }

    /// CA chain for TLS endpoints, transported as a JSON list of PEM blocks.
    pub fn tls_ca_chain(&self) -> Option<Vec<String>> {
        let raw = self.data.get("tls-ca-chain")?;
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str(raw) {
            Ok(chain) => Some(chain),
            Err(error) => {
                tracing::warn!(%error, "ignoring malformed tls-ca-chain relation field");
                None
            }
        }
    }

    /// Directory Spark writes its event logs into.
    pub fn log_dir(&self) -> String {
        format!("s3a://{}/{}", self.bucket(), self.path())
    }

    /// Base path for file uploads done by clients (eg. Kyuubi).
    pub fn file_upload_path(&self) -> String {
        format!("s3a://{}/", self.bucket())
    }

    /// Path used as the SQL warehouse.
    pub fn warehouse_path(&self) -> String {
        format!("s3a://{}/warehouse", self.bucket())
    }

    /// True once every field the hub consumes is populated.
    pub fn is_configured(&self) -> bool {
        !self.access_key().is_empty()
            && !self.secret_key().is_empty()
            && !self.bucket().is_empty()
            && !self.path().is_empty()
    }
}
