//! Credentials and endpoints used to reach an Azure Storage container.

use std::str::FromStr;

use strum::{Display, EnumString};

use super::RelationData;

/// Protocols the Azure integrator may hand out. Data-Lake protocols resolve
/// against `dfs` hostnames, Blob protocols against `blob` hostnames.
#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConnectionProtocol {
    Abfs,
    Abfss,
    Wasb,
    Wasbs,
}

impl ConnectionProtocol {
    /// Hostname suffix of the storage-account endpoint for this protocol.
    pub fn host_suffix(&self) -> &'static str {
        match self {
            ConnectionProtocol::Abfs | ConnectionProtocol::Abfss => "dfs.core.windows.net",
            ConnectionProtocol::Wasb | ConnectionProtocol::Wasbs => "blob.core.windows.net",
        }
    }
}

/// View over the data of the `azure-storage-credentials` relation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AzureStorageConnectionInfo {
    data: RelationData,
}

impl AzureStorageConnectionInfo {
    pub fn new(data: RelationData) -> Self {
        Self { data }
    }

    fn field(&self, key: &str) -> &str {
        self.data.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn secret_key(&self) -> &str {
        self.field("secret-key")
    }

    pub fn path(&self) -> &str {
        self.field("path")
    }

    pub fn container(&self) -> &str {
        self.field("container")
    }

    pub fn storage_account(&self) -> &str {
        self.field("storage-account")
    }

    /// Parsed protocol, `None` when unset or unknown. An unknown protocol is
    /// a not-configured signal, not an error.
    pub fn connection_protocol(&self) -> Option<ConnectionProtocol> {
        ConnectionProtocol::from_str(self.field("connection-protocol")).ok()
    }

    /// Endpoint of the container, empty when the protocol is unknown.
    pub fn endpoint(&self) -> String {
        match self.connection_protocol() {
            Some(protocol) => format!(
                "{protocol}://{}@{}.{}",
                self.container(),
                self.storage_account(),
                protocol.host_suffix()
            ),
            None => String::new(),
        }
    }

    /// Directory Spark writes its event logs into.
    pub fn log_dir(&self) -> String {
        match self.endpoint().as_str() {
            "" => String::new(),
            endpoint => format!("{endpoint}/{}", self.path()),
        }
    }

    /// Base path for file uploads done by clients (eg. Kyuubi).
    pub fn file_upload_path(&self) -> String {
        match self.endpoint().as_str() {
            "" => String::new(),
            endpoint => format!("{endpoint}/"),
        }
    }

    /// Path used as the SQL warehouse.
    pub fn warehouse_path(&self) -> String {
        match self.endpoint().as_str() {
            "" => String::new(),
            endpoint => format!("{endpoint}/warehouse"),
        }
    }

    /// True once every field the hub consumes is populated.
    pub fn is_configured(&self) -> bool {
        !self.storage_account().is_empty()
            && !self.container().is_empty()
            && !self.secret_key().is_empty()
            && !self.field("connection-protocol").is_empty()
    }
}
