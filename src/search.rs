//! One search request: resolve, query, present.
//!
//! Each request runs with its own [`RequestContext`]. Starting a new request
//! through the same [`RequestTracker`] supersedes every earlier one, and a
//! superseded request stops at its next stage boundary without publishing.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::ExplorerConfig;
use crate::error::ExplorerError;
use crate::identifier::{CanonicalAddress, Identifier, TypeFilter};
use crate::presenter::{AirdropRecord, Presenter};
use crate::query::ObjectQuery;
use crate::resolver::{Resolver, SuiNsRest, SuiNsRpc};
use crate::rpc::{http_client, RpcClient};

/// Hands out request generations; the newest one is the only live request.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: Arc<AtomicU64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `raw`, superseding all earlier ones.
    pub fn begin(&self, raw: &str) -> RequestContext {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RequestContext {
            raw: raw.to_string(),
            generation,
            latest: Arc::clone(&self.latest),
        }
    }
}

/// Per-request state carried through the pipeline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    raw: String,
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl RequestContext {
    /// A context not tied to any tracker; it can never be superseded.
    pub fn detached(raw: &str) -> Self {
        RequestTracker::new().begin(raw)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }

    fn ensure_current(&self) -> Result<(), ExplorerError> {
        if self.is_current() {
            Ok(())
        } else {
            tracing::debug!(generation = self.generation, query = %self.raw, "Dropping superseded search");
            Err(ExplorerError::Superseded {
                generation: self.generation,
            })
        }
    }
}

/// Successful outcome of a search. `records` may be empty.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub address: CanonicalAddress,
    pub via_domain: bool,
    pub records: Vec<AirdropRecord>,
}

impl SearchReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> String {
        let n = self.records.len();
        match (n, self.via_domain) {
            (0, true) => format!(
                "No WAL Airdrops were found for {} ({})",
                self.query,
                self.address.short()
            ),
            (0, false) => format!(
                "No WAL Airdrops were found for address: {}",
                self.address.short()
            ),
            (1, _) => "Found 1 airdrop".to_string(),
            (n, _) => format!("Found {} airdrops", n),
        }
    }
}

/// Resolver, object query and presenter wired to one set of endpoints.
///
/// Holds no per-request state; concurrent searches share only the HTTP pool.
pub struct Explorer {
    resolver: Resolver<SuiNsRpc, SuiNsRest>,
    query: ObjectQuery,
    presenter: Presenter,
    airdrop_type: TypeFilter,
    rpc: Arc<RpcClient>,
}

impl Explorer {
    pub fn from_config(config: &ExplorerConfig) -> Result<Self, reqwest::Error> {
        let http = http_client(config.timeout())?;
        let rpc = Arc::new(RpcClient::new(config.rpc_url.clone(), http.clone()));

        Ok(Self {
            resolver: Resolver::new(
                SuiNsRpc::new(Arc::clone(&rpc)),
                SuiNsRest::new(&config.name_fallback_url, http),
            ),
            query: ObjectQuery::new(Arc::clone(&rpc)),
            presenter: Presenter::new(config.amount_policy()),
            airdrop_type: config.airdrop_type.clone(),
            rpc,
        })
    }

    pub fn airdrop_type(&self) -> &TypeFilter {
        &self.airdrop_type
    }

    pub fn rpc(&self) -> &Arc<RpcClient> {
        &self.rpc
    }

    /// Run the pipeline for `ctx`. Nothing partial is returned on error.
    ///
    /// The context is checked before resolution and after every network
    /// stage. Once superseded, the outcome is always `Superseded`, even if the
    /// stage itself failed.
    pub async fn search(&self, ctx: &RequestContext) -> Result<SearchReport, ExplorerError> {
        let identifier = Identifier::parse(ctx.raw())?;
        tracing::info!(generation = ctx.generation(), query = %identifier, domain = identifier.is_domain(), "Search started");

        ctx.ensure_current()?;
        let resolved = self.resolver.resolve(&identifier).await;
        ctx.ensure_current()?;
        let address = resolved?;

        let fetched = self
            .query
            .fetch_owned_objects(&address, &self.airdrop_type)
            .await;
        ctx.ensure_current()?;
        let objects = fetched?;

        let records = self.presenter.present(&objects);

        Ok(SearchReport {
            query: identifier.as_str().to_string(),
            address,
            via_domain: identifier.is_domain(),
            records,
        })
    }

    /// Convenience for one-shot callers without a tracker.
    pub async fn search_once(&self, raw: &str) -> Result<SearchReport, ExplorerError> {
        self.search(&RequestContext::detached(raw)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(query: &str, via_domain: bool, n: usize) -> SearchReport {
        let record = AirdropRecord {
            object_id: "0x1".into(),
            short_object_id: "0x1".into(),
            name: "Test".into(),
            description: "d".into(),
            image_url: "i".into(),
            amount: 1,
            display_amount: "1".into(),
        };
        SearchReport {
            query: query.into(),
            address: CanonicalAddress::new("0x1234567890abcdef1234").unwrap(),
            via_domain,
            records: vec![record; n],
        }
    }

    #[test]
    fn test_newer_request_supersedes() {
        let tracker = RequestTracker::new();
        let first = tracker.begin("a.sui");
        assert!(first.is_current());

        let second = tracker.begin("b.sui");
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.generation() > first.generation());
        assert!(matches!(
            first.ensure_current(),
            Err(ExplorerError::Superseded { .. })
        ));
    }

    #[test]
    fn test_detached_contexts_are_independent() {
        let a = RequestContext::detached("x");
        let b = RequestContext::detached("y");
        assert!(a.is_current());
        assert!(b.is_current());
    }

    #[test]
    fn test_summaries() {
        assert_eq!(
            report("example.sui", true, 0).summary(),
            "No WAL Airdrops were found for example.sui (0x1234...1234)"
        );
        assert_eq!(
            report("0x1234567890abcdef1234", false, 0).summary(),
            "No WAL Airdrops were found for address: 0x1234...1234"
        );
        assert_eq!(report("q", false, 1).summary(), "Found 1 airdrop");
        assert_eq!(report("q", false, 3).summary(), "Found 3 airdrops");
    }
}
