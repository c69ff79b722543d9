use crate::api::{Client, Error, Result, SeatCounters, MAX_PAGE_SIZE};
use crate::identity::EntitlementSet;
use crate::pagination::{link_pages, Termination};
use futures::{pin_mut, TryStreamExt};
use log::{debug, info};
use std::sync::Arc;

/// Licensed committers of an enterprise together with its seat usage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entitlements {
    pub committers: EntitlementSet,
    pub counters: SeatCounters,
}

pub struct EntitlementFetcher<CLIENT>
where
    CLIENT: Client,
{
    client: Arc<CLIENT>,
}

impl<CLIENT> EntitlementFetcher<CLIENT>
where
    CLIENT: Client,
{
    pub fn new(client: Arc<CLIENT>) -> Self {
        EntitlementFetcher { client }
    }

    /// Reads the Advanced Security billing listing of `enterprise`.
    pub async fn fetch(&self, enterprise: Option<&str>) -> Result<Entitlements> {
        let enterprise = enterprise
            .map(str::trim)
            .filter(|enterprise| !enterprise.is_empty())
            .ok_or_else(|| Error::Configuration("Enterprise name is required for billing data".to_string()))?;

        let client = self.client.as_ref();
        let pages = link_pages(Termination::NextLink, |page| {
            client.advanced_security_page(enterprise, page, MAX_PAGE_SIZE)
        });
        pin_mut!(pages);

        let mut entitlements = Entitlements::default();
        while let Some(page) = pages.try_next().await? {
            for repo in page.items {
                if repo.committers == 0 {
                    debug!("Skipping {} without Advanced Security committers", repo.name);
                    continue;
                }
                for committer in repo.breakdown {
                    entitlements.committers.insert_committer(committer);
                }
            }
            // every page repeats the same totals
            entitlements.counters = page.meta;
        }
        info!(
            "Found {} licensed committers in {} ({} of {} seats used)",
            entitlements.committers.len(),
            enterprise,
            entitlements.counters.total_advanced_security_committers,
            entitlements.counters.purchased_seats
        );
        Ok(entitlements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BillingCommitter, BillingRepository};
    use crate::collector::tests::FakeClient;

    fn committer(login: &str) -> BillingCommitter {
        BillingCommitter::new(login.to_string(), Some(format!("{}@x.com", login)), None)
    }

    #[tokio::test]
    async fn missing_enterprise_is_configuration_error() {
        let fetcher = EntitlementFetcher::new(Arc::new(FakeClient::default()));
        assert!(matches!(fetcher.fetch(None).await, Err(Error::Configuration(_))));
        assert!(matches!(fetcher.fetch(Some("  ")).await, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn collects_breakdowns_and_keeps_last_counters() {
        let client = Arc::new(FakeClient {
            billing_pages: vec![
                (
                    vec![
                        BillingRepository::new("acme/widgets".to_string(), 2, vec![committer("alice"), committer("")]),
                        BillingRepository::new("acme/idle".to_string(), 0, vec![committer("ghost")]),
                    ],
                    SeatCounters::new(3, 3, 10, 5),
                ),
                (
                    vec![BillingRepository::new(
                        "acme/gadgets".to_string(),
                        2,
                        vec![committer("alice"), committer("dave")],
                    )],
                    SeatCounters::new(3, 3, 10, 5),
                ),
            ],
            ..Default::default()
        });
        let fetcher = EntitlementFetcher::new(client.clone());

        let entitlements = fetcher.fetch(Some("acme-corp")).await.unwrap();

        let logins: Vec<&str> = entitlements.committers.iter().map(|(login, _)| login.as_str()).collect();
        assert_eq!(logins, vec!["alice", "dave"]);
        assert_eq!(entitlements.counters, SeatCounters::new(3, 3, 10, 5));
        assert_eq!(entitlements.counters.remaining_seats(), 2);
        assert_eq!(*client.requested_billing_pages.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn counters_are_not_summed_across_pages() {
        let client = Arc::new(FakeClient {
            billing_pages: vec![
                (Vec::new(), SeatCounters::new(1, 1, 1, 1)),
                (Vec::new(), SeatCounters::new(7, 2, 9, 4)),
            ],
            ..Default::default()
        });
        let entitlements = EntitlementFetcher::new(client).fetch(Some("acme-corp")).await.unwrap();
        assert!(entitlements.committers.is_empty());
        assert_eq!(entitlements.counters, SeatCounters::new(7, 2, 9, 4));
        assert_eq!(entitlements.counters.remaining_seats(), -3);
    }
}
