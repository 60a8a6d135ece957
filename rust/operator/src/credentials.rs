//! Network-backed verification of object-storage credentials.

use crate::connection::s3::S3ConnectionInfo;

/// Checks that the advertised S3 credentials actually grant access to the
/// bucket. The check is a black box from the core's perspective; it is
/// re-evaluated on every reconciliation pass, never cached.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialsVerifier {
    fn verify(&self, info: &S3ConnectionInfo) -> bool;
}

/// Verifier that accepts everything. Useful where no network check is wanted.
pub struct AcceptAll;

impl CredentialsVerifier for AcceptAll {
    fn verify(&self, _info: &S3ConnectionInfo) -> bool {
        true
    }
}
