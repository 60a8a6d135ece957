//! Per-pass snapshot of everything the relations currently expose. Built by
//! the runtime at event-delivery time; never cached across passes.

use std::collections::BTreeMap;

use crate::{
    config::HubConfig,
    connection::{
        azure::AzureStorageConnectionInfo, logging::LokiUrl, pushgateway::PushGatewayInfo,
        s3::S3ConnectionInfo, BackendState,
    },
    credentials::CredentialsVerifier,
    peer::PeerConfig,
    provider::ServiceAccount,
};

#[derive(Clone, Debug, Default)]
pub struct Context {
    pub s3: Option<S3ConnectionInfo>,
    pub azure_storage: Option<AzureStorageConnectionInfo>,
    pub pushgateway: Option<PushGatewayInfo>,
    pub loki: Option<LokiUrl>,
    /// `None` until the peer relation exists.
    pub peer_config: Option<PeerConfig>,
    /// All client relations that requested a service account.
    pub clients: Vec<ServiceAccount>,
}

impl Context {
    /// Both object-storage backends configured at once. The hub must flag
    /// this rather than silently pick one.
    pub fn storage_conflict(&self) -> bool {
        self.s3.as_ref().is_some_and(|s3| s3.is_configured())
            && self
                .azure_storage
                .as_ref()
                .is_some_and(|azure| azure.is_configured())
    }

    pub fn s3_state(&self, verifier: &dyn CredentialsVerifier) -> BackendState {
        match &self.s3 {
            None => BackendState::Absent,
            Some(s3) if !s3.is_configured() => BackendState::Incomplete,
            Some(s3) if !verifier.verify(s3) => BackendState::Invalid,
            Some(_) => BackendState::Configured,
        }
    }

    pub fn azure_state(&self) -> BackendState {
        match &self.azure_storage {
            None => BackendState::Absent,
            Some(azure) if !azure.is_configured() => BackendState::Incomplete,
            Some(_) => BackendState::Configured,
        }
    }

    /// The unescaped user overrides, empty while the peer relation is absent.
    pub fn user_properties(&self) -> BTreeMap<String, String> {
        self.peer_config
            .as_ref()
            .map(PeerConfig::properties)
            .unwrap_or_default()
    }

    pub fn loki_url(&self) -> Option<String> {
        self.loki.as_ref().and_then(LokiUrl::url)
    }

    /// Assemble the configuration builder for this snapshot.
    pub fn hub_config(&self) -> HubConfig<'_> {
        HubConfig::new(
            self.s3.as_ref(),
            self.azure_storage.as_ref(),
            self.pushgateway.as_ref(),
            self.user_properties(),
            self.loki_url(),
        )
    }
}
