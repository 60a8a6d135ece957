//! Control surface of the managed Integration Hub workload. The concrete
//! implementation (container supervisor, filesystem, command execution) lives
//! in the embedding runtime; the core only depends on this trait.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use snafu::Snafu;

use crate::{ACCOUNT_REGISTRY_COMMAND, CONF_DIR, SPARK_PROPERTIES_FILE};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("configuration file {path} not found"))]
    ConfigNotFound { path: String },

    #[snafu(display("failed to read {path}: {message}"))]
    ReadConfig { path: String, message: String },

    #[snafu(display("failed to write {path}: {message}"))]
    WriteConfig { path: String, message: String },

    #[snafu(display("failed to update the workload environment: {message}"))]
    SetEnvironment { message: String },

    #[snafu(display("failed to control the {service} service: {message}"))]
    ServiceControl { service: String, message: String },

    #[snafu(display("command {command:?} failed: {stderr}"))]
    CommandFailed { command: String, stderr: String },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// Well-known paths inside the workload container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubPaths {
    pub conf_dir: PathBuf,
}

impl Default for HubPaths {
    fn default() -> Self {
        Self {
            conf_dir: PathBuf::from(CONF_DIR),
        }
    }
}

impl HubPaths {
    pub fn new(conf_dir: impl Into<PathBuf>) -> Self {
        Self {
            conf_dir: conf_dir.into(),
        }
    }

    /// Path of the Spark properties file the workload is pointed at.
    pub fn spark_properties(&self) -> PathBuf {
        self.conf_dir.join(SPARK_PROPERTIES_FILE)
    }
}

/// Imperative operations on the managed workload.
#[cfg_attr(test, mockall::automock)]
pub trait HubWorkload {
    /// Whether the container can be talked to at all. A false here defers
    /// reconciliation instead of failing it.
    fn ready(&self) -> bool;

    /// Whether the hub service is running and healthy.
    fn active(&self) -> bool;

    fn start(&self) -> Result<()>;

    fn stop(&self) -> Result<()>;

    fn restart(&self) -> Result<()> {
        self.stop()?;
        self.start()
    }

    /// Read a config file; [`Error::ConfigNotFound`] when it does not exist.
    fn read_config(&self, path: &Path) -> Result<String>;

    fn write_config(&self, content: &str, path: &Path) -> Result<()>;

    /// Merge the given variables into the service environment. A `None`
    /// value unsets the variable.
    fn set_environment(&self, env: &BTreeMap<String, Option<String>>) -> Result<()>;

    /// Run a command inside the workload container, returning stdout.
    fn exec(&self, command: &str) -> Result<String>;

    fn create_service_account(&self, namespace: &str, username: &str) -> Result<()> {
        self.exec(&format!(
            "{ACCOUNT_REGISTRY_COMMAND} create --username={username} --namespace={namespace}"
        ))?;
        Ok(())
    }

    fn delete_service_account(&self, namespace: &str, username: &str) -> Result<()> {
        self.exec(&format!(
            "{ACCOUNT_REGISTRY_COMMAND} delete --username={username} --namespace={namespace}"
        ))?;
        Ok(())
    }
}
