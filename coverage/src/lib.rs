//! Committer coverage
//!
//! # Overview
//!
//! GitHub Advanced Security is licensed per active committer: anyone who pushed to a covered repository in the last 90 days.
//! Library collects the commit authors of a set of repositories over that window and compares them with the committers the
//! enterprise's billing data already counts.
//!
//! Commit authors are deduplicated by their linked GitHub login, or by their commit email when no account is linked.
//! Authors with neither are ignored.
//! Repositories can be given one by one or expanded from an organization, in which case archived repositories and forks are skipped.
//! The result lists every committer whose key is not among the licensed usernames, next to the full licensed population.

pub mod api;
#[cfg(feature = "collector")]
pub mod collector;
#[cfg(feature = "collector")]
pub mod entitlement;
pub mod identity;
#[cfg(feature = "collector")]
pub mod pagination;
pub mod reconciler;

#[cfg(feature = "collector")]
pub use collector::{CommitterCollector, OrganizationExpander, RepositoryCommitters};
#[cfg(feature = "collector")]
pub use entitlement::{EntitlementFetcher, Entitlements};
pub use identity::{CommitterSet, EntitlementSet, Identity, ResolvedKey};
pub use reconciler::{reconcile, CoverageResult};
