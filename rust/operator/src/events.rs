//! Routing of runtime notifications through the reconciliation pipeline:
//! readiness gate, convergence, status resolution, status publication. The
//! runtime guarantees at most one event is in flight at a time.

use snafu::{ResultExt, Snafu};
use strum::Display;

use crate::{
    connection::BackendState,
    context::Context,
    controller::{self, HubController},
    credentials::CredentialsVerifier,
    k8s::TrustChecker,
    provider::{self, ClientChannel, ServiceAccount},
    status::{self, Status, StatusSignals},
    workload::{self, HubPaths, HubWorkload},
    SECRET_CLEANUP_COMMAND,
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("malformed service-account request"))]
    MalformedAccountRequest { source: provider::Error },

    #[snafu(display("impossible to create service account {username} in namespace {namespace}"))]
    CreateServiceAccount {
        source: workload::Error,
        namespace: String,
        username: String,
    },

    #[snafu(display("failed to delete service account {username} in namespace {namespace}"))]
    DeleteServiceAccount {
        source: workload::Error,
        namespace: String,
        username: String,
    },

    #[snafu(display("reconciliation failed"))]
    Reconcile { source: controller::Error },

    #[snafu(display("failed to clean up managed secrets"))]
    SecretCleanup { source: workload::Error },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// Notifications delivered by the runtime.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum HubEvent {
    WorkloadReady,
    ConfigChanged,
    UpdateStatus,
    Install,
    Stop,
    S3CredentialsChanged,
    S3CredentialsGone,
    AzureStorageChanged,
    AzureStorageGone,
    MetricsEndpointChanged,
    MetricsEndpointGone,
    LoggingChanged,
    LoggingGone,
    PeerConfigChanged,
    AccountRequested {
        relation_id: u32,
        account: String,
        skip_creation: bool,
    },
    AccountReleased {
        account: String,
        skip_creation: bool,
    },
}

impl HubEvent {
    /// Events that only recompute and publish status, bypassing the gate.
    fn is_status_only(&self) -> bool {
        matches!(self, HubEvent::UpdateStatus | HubEvent::Install)
    }
}

/// What became of one delivered event.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The pass ran to completion and this status was published.
    Completed(Status),
    /// The workload was not ready; the runtime must redeliver the event.
    Deferred,
    /// Teardown ran; no status is published on the way out.
    Stopped,
}

/// Destination for resolved statuses. The unit channel is always written;
/// the application channel only by the leader.
#[cfg_attr(test, mockall::automock)]
pub trait StatusPublisher {
    fn publish_unit(&mut self, status: &Status);
    fn publish_app(&mut self, status: &Status);
}

pub struct EventRouter<'a> {
    workload: &'a dyn HubWorkload,
    verifier: &'a dyn CredentialsVerifier,
    trust: &'a dyn TrustChecker,
    paths: &'a HubPaths,
    app_name: &'a str,
}

impl<'a> EventRouter<'a> {
    pub fn new(
        workload: &'a dyn HubWorkload,
        verifier: &'a dyn CredentialsVerifier,
        trust: &'a dyn TrustChecker,
        paths: &'a HubPaths,
        app_name: &'a str,
    ) -> Self {
        Self {
            workload,
            verifier,
            trust,
            paths,
            app_name,
        }
    }

    /// Process one event. `leader` is queried from the runtime at delivery
    /// time and passed through, never cached here.
    pub fn handle(
        &self,
        ctx: &Context,
        event: &HubEvent,
        leader: bool,
        channel: &mut dyn ClientChannel,
        statuses: &mut dyn StatusPublisher,
    ) -> Result<Outcome> {
        tracing::info!(%event, leader, "handling event");

        if event.is_status_only() {
            return Ok(self.complete(ctx, leader, statuses));
        }

        if let HubEvent::Stop = event {
            self.workload
                .exec(SECRET_CLEANUP_COMMAND)
                .context(SecretCleanupSnafu)?;
            return Ok(Outcome::Stopped);
        }

        // gate: no side effect may run before the workload can be talked to
        if !self.workload.ready() {
            tracing::debug!(%event, "workload not ready, deferring");
            return Ok(Outcome::Deferred);
        }

        match event {
            HubEvent::AccountRequested {
                relation_id,
                account,
                skip_creation,
            } => {
                if leader {
                    self.grant_account(*relation_id, account, *skip_creation, channel)?;
                }
            }
            HubEvent::AccountReleased {
                account,
                skip_creation,
            } => {
                if leader {
                    self.release_account(account, *skip_creation)?;
                }
            }
            _ => {}
        }

        HubController::new(self.workload, self.verifier, self.paths)
            .reconcile(ctx, leader, channel)
            .context(ReconcileSnafu)?;

        Ok(self.complete(ctx, leader, statuses))
    }

    fn grant_account(
        &self,
        relation_id: u32,
        account: &str,
        skip_creation: bool,
        channel: &mut dyn ClientChannel,
    ) -> Result<()> {
        let account = ServiceAccount::parse(relation_id, account, skip_creation)
            .context(MalformedAccountRequestSnafu)?;
        tracing::info!(
            namespace = %account.namespace,
            username = %account.username,
            "service account requested"
        );

        if !account.skip_creation {
            self.workload
                .create_service_account(&account.namespace, &account.username)
                .context(CreateServiceAccountSnafu {
                    namespace: account.namespace.clone(),
                    username: account.username.clone(),
                })?;
        }

        if let Err(error) = channel.grant_account(relation_id, &account.name()) {
            // the relation data is not writable yet; the grant is replayed
            // when the runtime redelivers the request
            tracing::error!(%error, "could not record granted account");
        }
        Ok(())
    }

    fn release_account(&self, account: &str, skip_creation: bool) -> Result<()> {
        let (namespace, username) =
            ServiceAccount::split(account).context(MalformedAccountRequestSnafu)?;
        tracing::info!(namespace, username, "service account released");

        if !skip_creation {
            self.workload
                .delete_service_account(namespace, username)
                .context(DeleteServiceAccountSnafu {
                    namespace,
                    username,
                })?;
        }
        Ok(())
    }

    /// Resolve the status from fresh signals and publish it.
    fn complete(&self, ctx: &Context, leader: bool, statuses: &mut dyn StatusPublisher) -> Outcome {
        let signals = StatusSignals {
            workload_ready: self.workload.ready(),
            trusted: self.trust.trusted(self.app_name),
            storage_conflict: ctx.storage_conflict(),
            s3_credentials_invalid: ctx.s3_state(self.verifier) == BackendState::Invalid,
            workload_active: self.workload.active(),
        };
        let status = status::resolve(self.app_name, signals);
        tracing::debug!(?status, "resolved status");

        statuses.publish_unit(&status);
        if leader {
            statuses.publish_app(&status);
        }
        Outcome::Completed(status)
    }
}
