//! Administrative configuration actions. These are direct user-triggered
//! operations expecting synchronous feedback, so violated preconditions fail
//! immediately instead of being deferred.

use std::collections::BTreeMap;

use snafu::{ensure, OptionExt, Snafu};

use crate::{context::Context, peer::PeerConfig, workload::HubWorkload};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Charm is not ready"))]
    NotReady,

    #[snafu(display("Peer relation is not ready"))]
    PeerRelationNotReady,

    #[snafu(display("Configuration {line} cannot be applied"))]
    InvalidConfigLine { line: String },

    #[snafu(display("Configuration {key} is not present"))]
    UnknownKey { key: String },
}

type Result<T, E = Error> = std::result::Result<T, E>;

pub struct ConfigActions<'a> {
    workload: &'a dyn HubWorkload,
}

impl<'a> ConfigActions<'a> {
    pub fn new(workload: &'a dyn HubWorkload) -> Self {
        Self { workload }
    }

    fn peer_config<'c>(&self, ctx: &'c mut Context) -> Result<&'c mut PeerConfig> {
        ensure!(self.workload.ready(), NotReadySnafu);
        ctx.peer_config.as_mut().context(PeerRelationNotReadySnafu)
    }

    /// Store one `key=value` override. Only the first `=` separates key and
    /// value, so values may themselves contain `=`.
    pub fn add_config(&self, ctx: &mut Context, line: &str) -> Result<(String, String)> {
        let (key, value) = line.split_once('=').context(InvalidConfigLineSnafu {
            line: line.to_string(),
        })?;
        let (key, value) = (key.trim().to_string(), value.trim().to_string());
        ensure!(
            !key.is_empty(),
            InvalidConfigLineSnafu {
                line: line.to_string(),
            }
        );

        self.peer_config(ctx)?.set(&key, &value);
        tracing::info!(%key, "stored configuration override");
        Ok((key, value))
    }

    /// Drop one override. Fails when the key was never set.
    pub fn remove_config(&self, ctx: &mut Context, key: &str) -> Result<()> {
        let config = self.peer_config(ctx)?;
        ensure!(
            config.remove(key),
            UnknownKeySnafu {
                key: key.to_string(),
            }
        );
        tracing::info!(%key, "removed configuration override");
        Ok(())
    }

    /// Drop every override.
    pub fn clear_config(&self, ctx: &mut Context) -> Result<()> {
        self.peer_config(ctx)?.clear();
        tracing::info!("cleared configuration overrides");
        Ok(())
    }

    /// The current override mapping, unescaped.
    pub fn list_config(&self, ctx: &Context) -> Result<BTreeMap<String, String>> {
        ensure!(self.workload.ready(), NotReadySnafu);
        let config = ctx.peer_config.as_ref().context(PeerRelationNotReadySnafu)?;
        Ok(config.properties())
    }
}
