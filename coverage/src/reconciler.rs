use crate::identity::{CommitterSet, EntitlementSet, Identity};

/// Committers compared against the licensed population.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageResult {
    pub total_committers: usize,
    pub total_entitled: usize,
    /// Committers without a license, ordered by resolved key.
    pub uncovered: Vec<Identity>,
    /// Every licensed identity, ordered by username, whether or not it committed.
    pub entitled: Vec<Identity>,
}

/// Returns the committers whose resolved key is not a licensed username.
pub fn reconcile(committers: &CommitterSet, entitlements: &EntitlementSet) -> CoverageResult {
    let uncovered = committers
        .iter()
        .filter(|(key, _)| !entitlements.contains(key.as_str()))
        .map(|(_, identity)| identity.clone())
        .collect();
    let entitled = entitlements.iter().map(|(_, identity)| identity.clone()).collect();
    CoverageResult {
        total_committers: committers.len(),
        total_entitled: entitlements.len(),
        uncovered,
        entitled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BillingCommitter, CommitAuthor};
    use crate::identity::ResolvedKey;
    use std::collections::BTreeSet;

    fn committers(keys: &[&str]) -> CommitterSet {
        keys.iter()
            .map(|key| match key.contains('@') {
                true => CommitAuthor::new(None, None, Some(key.to_string())),
                false => CommitAuthor::new(Some(key.to_string()), None, None),
            })
            .collect()
    }

    fn entitlements(logins: &[&str]) -> EntitlementSet {
        logins
            .iter()
            .map(|login| BillingCommitter::new(login.to_string(), None, None))
            .collect()
    }

    fn key_strings(identities: &[Identity]) -> Vec<String> {
        identities.iter().map(|identity| identity.key().to_string()).collect()
    }

    #[test]
    fn reports_unlicensed_committers() {
        let result = reconcile(&committers(&["alice", "bob@x.com"]), &entitlements(&["alice"]));
        assert_eq!(key_strings(&result.uncovered), vec!["bob@x.com"]);
        assert_eq!(result.total_committers, 2);
        assert_eq!(result.total_entitled, 1);
        assert_eq!(key_strings(&result.entitled), vec!["alice"]);
    }

    #[test]
    fn entitled_includes_licenses_without_commits() {
        let result = reconcile(&committers(&["alice"]), &entitlements(&["zoe", "alice", "mike"]));
        assert!(result.uncovered.is_empty());
        assert_eq!(key_strings(&result.entitled), vec!["alice", "mike", "zoe"]);
    }

    #[test]
    fn uncovered_is_set_difference() {
        let cases: [(&[&str], &[&str]); 4] = [
            (&["alice", "bob@x.com", "carol", "dan@x.com"], &["carol", "erin"]),
            (&[], &["alice"]),
            (&["alice"], &[]),
            (&["alice", "bob"], &["alice", "bob"]),
        ];
        for (committer_keys, entitled_keys) in cases {
            let committers = committers(committer_keys);
            let entitlements = entitlements(entitled_keys);
            let result = reconcile(&committers, &entitlements);

            let all: BTreeSet<String> = committers.keys().map(ResolvedKey::to_string).collect();
            let uncovered: BTreeSet<String> = key_strings(&result.uncovered).into_iter().collect();
            let covered: BTreeSet<String> = all.iter().filter(|key| entitlements.contains(key)).cloned().collect();

            assert!(uncovered.iter().all(|key| !entitlements.contains(key)));
            assert_eq!(uncovered.union(&covered).cloned().collect::<BTreeSet<_>>(), all);
        }
    }

    #[test]
    fn reconcile_is_deterministic() {
        let committers = committers(&["zed@x.com", "mallory", "alice", "bob@x.com"]);
        let entitlements = entitlements(&["mallory", "trent"]);
        let first = reconcile(&committers, &entitlements);
        let second = reconcile(&committers, &entitlements);
        assert_eq!(first, second);
        assert_eq!(key_strings(&first.uncovered), vec!["alice", "bob@x.com", "zed@x.com"]);
    }
}
