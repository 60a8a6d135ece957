//! Kubernetes trust probe.

/// Whether the application was deployed with enough RBAC permissions to
/// manage service accounts. The concrete probe issues a
/// SelfSubjectAccessReview; any API failure counts as not trusted.
#[cfg_attr(test, mockall::automock)]
pub trait TrustChecker {
    fn trusted(&self, app_name: &str) -> bool;
}
