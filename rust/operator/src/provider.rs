//! Service-account clients: downstream applications that requested a managed
//! namespace/username pair and receive the derived Spark properties back.

use std::collections::BTreeMap;

use snafu::{ensure, OptionExt, Snafu};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("malformed service account {account:?}, expected namespace:username"))]
    MalformedAccount { account: String },
}

/// A write to a client channel was rejected (typically because the relation
/// data is not writable yet). The publish is retried on the next pass.
#[derive(Debug, Snafu)]
#[snafu(display("channel for relation {relation_id} rejected the write: {message}"))]
pub struct ChannelError {
    pub relation_id: u32,
    pub message: String,
}

/// One client relation that requested a service account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceAccount {
    pub relation_id: u32,
    pub namespace: String,
    pub username: String,
    /// The client manages the Kubernetes service account itself.
    pub skip_creation: bool,
}

impl ServiceAccount {
    /// Split a requested account string into its `namespace:username` pair.
    pub fn split(account: &str) -> Result<(&str, &str), Error> {
        let (namespace, username) = account.split_once(':').context(MalformedAccountSnafu {
            account: account.to_string(),
        })?;
        ensure!(
            !namespace.is_empty() && !username.is_empty() && !username.contains(':'),
            MalformedAccountSnafu {
                account: account.to_string(),
            }
        );
        Ok((namespace, username))
    }

    pub fn parse(relation_id: u32, account: &str, skip_creation: bool) -> Result<Self, Error> {
        let (namespace, username) = Self::split(account)?;
        Ok(Self {
            relation_id,
            namespace: namespace.to_string(),
            username: username.to_string(),
            skip_creation,
        })
    }

    /// The account rendered back to its `namespace:username` form.
    pub fn name(&self) -> String {
        format!("{}:{}", self.namespace, self.username)
    }
}

/// Per-client publication channel, owned by the leader unit.
#[cfg_attr(test, mockall::automock)]
pub trait ClientChannel {
    /// Publish the derived properties to one client.
    fn publish(
        &mut self,
        relation_id: u32,
        properties: &BTreeMap<String, String>,
    ) -> Result<(), ChannelError>;

    /// The snapshot most recently published to that client, `None` when
    /// nothing was ever published.
    fn last_published(&self, relation_id: u32) -> Option<BTreeMap<String, String>>;

    /// Record the granted account name on the relation.
    fn grant_account(&mut self, relation_id: u32, account: &str) -> Result<(), ChannelError>;
}
