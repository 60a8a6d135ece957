//! Convergence of the workload and the client channels onto the desired
//! configuration. Exclusively owns the properties file and the environment
//! pointer; client channels are only written by the leader.

use std::collections::BTreeMap;

use snafu::{ResultExt, Snafu};

use crate::{
    config::HubConfig,
    context::Context,
    credentials::CredentialsVerifier,
    provider::ClientChannel,
    workload::{self, HubPaths, HubWorkload},
    SPARK_PROPERTIES_ENV,
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to read current workload configuration"))]
    ReadConfig { source: workload::Error },

    #[snafu(display("failed to write workload configuration"))]
    WriteConfig { source: workload::Error },

    #[snafu(display("failed to point the workload at its configuration file"))]
    SetEnvironment { source: workload::Error },

    #[snafu(display("failed to restart the workload"))]
    Restart { source: workload::Error },
}

type Result<T, E = Error> = std::result::Result<T, E>;

pub struct HubController<'a> {
    workload: &'a dyn HubWorkload,
    verifier: &'a dyn CredentialsVerifier,
    paths: &'a HubPaths,
}

impl<'a> HubController<'a> {
    pub fn new(
        workload: &'a dyn HubWorkload,
        verifier: &'a dyn CredentialsVerifier,
        paths: &'a HubPaths,
    ) -> Self {
        Self {
            workload,
            verifier,
            paths,
        }
    }

    /// One convergence pass: rebuild the desired configuration, rewrite and
    /// restart the workload only when it changed, then (leader only) publish
    /// the fresh mapping to every client whose last snapshot differs.
    pub fn reconcile(
        &self,
        ctx: &Context,
        leader: bool,
        channel: &mut dyn ClientChannel,
    ) -> Result<()> {
        let properties = ctx.hub_config().build(self.verifier);
        let contents = HubConfig::contents(&properties);

        self.converge_workload(&contents)?;
        if leader {
            self.fan_out(ctx, &properties, channel);
        }
        Ok(())
    }

    fn converge_workload(&self, contents: &str) -> Result<()> {
        let path = self.paths.spark_properties();
        let current = match self.workload.read_config(&path) {
            Ok(current) => current,
            Err(workload::Error::ConfigNotFound { .. }) => String::new(),
            Err(source) => return Err(source).context(ReadConfigSnafu),
        };

        if current == contents {
            tracing::debug!("workload configuration unchanged, skipping restart");
            return Ok(());
        }

        tracing::info!(path = %path.display(), "workload configuration changed, rewriting");
        self.workload
            .write_config(contents, &path)
            .context(WriteConfigSnafu)?;
        self.workload
            .set_environment(&BTreeMap::from([(
                SPARK_PROPERTIES_ENV.to_string(),
                Some(path.display().to_string()),
            )]))
            .context(SetEnvironmentSnafu)?;
        self.workload.restart().context(RestartSnafu)
    }

    fn fan_out(
        &self,
        ctx: &Context,
        properties: &BTreeMap<String, String>,
        channel: &mut dyn ClientChannel,
    ) {
        for client in &ctx.clients {
            let last = channel.last_published(client.relation_id);
            if last.as_ref() == Some(properties) {
                continue;
            }
            tracing::info!(
                relation_id = client.relation_id,
                account = %client.name(),
                "publishing updated properties to client"
            );
            // a rejected write is retried on the next pass
            if let Err(error) = channel.publish(client.relation_id, properties) {
                tracing::warn!(%error, "skipping client publish for now");
            }
        }
    }
}
