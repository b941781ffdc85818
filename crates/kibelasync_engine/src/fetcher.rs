//! Cursor-chained page retrieval.

use crate::context::CallContext;
use crate::error::{ResultExt, SyncResult};
use crate::remote::decode;
use crate::transport::GraphqlTransport;
use kibelasync_protocol::response::NoteEdges;
use kibelasync_protocol::{PagePlan, Payload};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Executes a [`PagePlan`] one page at a time.
///
/// The cursor of the last edge of each page is sent with the next request.
/// A page with fewer edges than requested means the server has nothing more,
/// so the loop ends there and returns what it has. Any failure aborts the
/// whole sequence.
pub struct PaginatedFetcher<'a, T: GraphqlTransport + ?Sized> {
    transport: &'a T,
    ctx: &'a CallContext,
}

impl<'a, T: GraphqlTransport + ?Sized> PaginatedFetcher<'a, T> {
    /// Creates a fetcher bound to one transport and call context.
    pub fn new(transport: &'a T, ctx: &'a CallContext) -> Self {
        Self { transport, ctx }
    }

    /// Fetches every page and accumulates the nodes in server order.
    pub fn fetch<N, Q>(&self, plan: &PagePlan, query: Q) -> SyncResult<Vec<N>>
    where
        N: DeserializeOwned,
        Q: Fn(usize, &str) -> Payload,
    {
        let mut items = Vec::with_capacity(plan.total());
        self.for_each_page::<N, _, _>(plan, query, |nodes| {
            items.extend(nodes);
            Ok(())
        })?;
        Ok(items)
    }

    /// Fetches every page, handing each page's nodes to `sink` before the
    /// next request is issued. Returns the number of nodes received.
    pub fn for_each_page<N, Q, S>(&self, plan: &PagePlan, query: Q, mut sink: S) -> SyncResult<usize>
    where
        N: DeserializeOwned,
        Q: Fn(usize, &str) -> Payload,
        S: FnMut(Vec<N>) -> SyncResult<()>,
    {
        let pages = plan.pages();
        let mut cursor = String::new();
        let mut received_total = 0;

        for (index, &take) in pages.iter().enumerate() {
            let page = index + 1;
            let payload = query(take, &cursor);
            let operation = payload.operation_name().to_string();

            let edges = self
                .transport
                .execute(self.ctx, &payload)
                .and_then(|data| decode::<NoteEdges<N>>(&operation, &data))
                .with_context(|| format!("page {page} of {}", pages.len()))?
                .notes
                .edges;

            let received = edges.len();
            if let Some(last) = edges.last() {
                cursor = last.cursor.clone();
            }
            debug!(page, requested = take, received, "fetched page");

            received_total += received;
            sink(edges.into_iter().map(|e| e.node).collect())
                .with_context(|| format!("page {page} of {}", pages.len()))?;

            if received < take {
                if page < pages.len() {
                    warn!(
                        page,
                        requested = take,
                        received,
                        "server returned a short page; stopping early"
                    );
                }
                break;
            }
        }

        Ok(received_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::transport::MockTransport;
    use kibelasync_protocol::query::{self, ListingScope};
    use kibelasync_protocol::response::NoteStub;

    fn page_json(start: u64, count: u64) -> String {
        let edges: Vec<String> = (start..start + count)
            .map(|n| {
                format!(
                    r#"{{"node": {{"id": "{}", "updatedAt": "2024-01-01T00:00:00Z"}}, "cursor": "c{n}"}}"#,
                    kibelasync_protocol::Identifier::note(n)
                )
            })
            .collect();
        format!(r#"{{"notes": {{"edges": [{}]}}}}"#, edges.join(","))
    }

    fn scope() -> ListingScope {
        ListingScope::default()
    }

    #[test]
    fn multi_page_plan_carries_cursor() {
        let transport = MockTransport::new();
        transport.push_response(page_json(0, 3200));
        transport.push_response(page_json(3200, 1800));

        let ctx = CallContext::new();
        let plan = PagePlan::for_listing(5000, 0);
        assert_eq!(plan.pages(), &[3200, 1800]);

        let fetcher = PaginatedFetcher::new(&transport, &ctx);
        let stubs: Vec<NoteStub> = fetcher
            .fetch(&plan, |take, after| query::list_notes_page(take, after, &scope()))
            .unwrap();
        assert_eq!(stubs.len(), 5000);
        assert_eq!(stubs[3200].id.number().unwrap(), 3200);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].variables["after"].is_null());
        assert_eq!(requests[1].variables["after"], "c3199");
        assert_eq!(requests[1].variables["first"], 1800);
    }

    #[test]
    fn short_page_stops_without_retry() {
        let transport = MockTransport::new();
        transport.push_response(page_json(0, 3000));

        let ctx = CallContext::new();
        let plan = PagePlan::for_listing(6000, 0);
        assert_eq!(plan.pages().len(), 2);

        let fetcher = PaginatedFetcher::new(&transport, &ctx);
        let stubs: Vec<NoteStub> = fetcher
            .fetch(&plan, |take, after| query::list_notes_page(take, after, &scope()))
            .unwrap();
        assert_eq!(stubs.len(), 3000);
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn failure_names_page_and_discards_results() {
        let transport = MockTransport::new();
        transport.push_response(page_json(0, 3200));
        transport.push_error("rate limited");

        let ctx = CallContext::new();
        let plan = PagePlan::for_listing(10_500, 0);
        let fetcher = PaginatedFetcher::new(&transport, &ctx);
        let err = fetcher
            .fetch::<NoteStub, _>(&plan, |take, after| {
                query::list_notes_page(take, after, &scope())
            })
            .unwrap_err();

        assert!(err.to_string().starts_with("page 2 of 4"));
        assert!(matches!(err.root(), SyncError::RemoteCallFailed { .. }));
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn shape_mismatch_is_unmarshal_error() {
        let transport = MockTransport::new();
        transport.push_response(r#"{"notes": {"nodes": []}}"#);

        let ctx = CallContext::new();
        let plan = PagePlan::for_listing(6000, 0);
        let fetcher = PaginatedFetcher::new(&transport, &ctx);
        let err = fetcher
            .fetch::<NoteStub, _>(&plan, |take, after| {
                query::list_notes_page(take, after, &scope())
            })
            .unwrap_err();
        assert!(matches!(err.root(), SyncError::UnmarshalFailed { .. }));
    }

    #[test]
    fn cancellation_aborts() {
        let transport = MockTransport::new();
        let ctx = CallContext::new();
        ctx.cancel();

        let plan = PagePlan::for_listing(6000, 0);
        let fetcher = PaginatedFetcher::new(&transport, &ctx);
        let err = fetcher
            .fetch::<NoteStub, _>(&plan, |take, after| {
                query::list_notes_page(take, after, &scope())
            })
            .unwrap_err();
        assert!(err.is_cancellation());
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn empty_plan_issues_no_request() {
        let transport = MockTransport::new();
        let ctx = CallContext::new();
        let fetcher = PaginatedFetcher::new(&transport, &ctx);
        let stubs: Vec<NoteStub> = fetcher
            .fetch(&PagePlan::for_listing(0, 0), |take, after| {
                query::list_notes_page(take, after, &scope())
            })
            .unwrap();
        assert!(stubs.is_empty());
        assert!(transport.requests().is_empty());
    }
}
