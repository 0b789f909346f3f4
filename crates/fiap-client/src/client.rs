//! The FIAP client: paginated fetch, writes, and trap subscriptions

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fiap_core::{
    merge_body, ok_transport, point_list, point_map, validate_transport, Body, Error, Key, Point,
    PointMap, Query, Transport,
};
use fiap_transport::{not_implemented, Channel, Dispatcher, FiapListener, ListenerHandle, TcpChannel};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::scheduler::{ScheduledTask, Scheduler};
use crate::store::{PointStore, TrapStore};

/// Pagination policy for [`FiapClient::fetch`].
///
/// The protocol itself imposes no iteration bound; a server that always
/// returns a cursor loops forever. `max_pages` caps that: when set, a
/// fetch that would request yet another page past the cap fails with
/// [`ClientError::PageLimitExceeded`] instead of silently truncating.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchPolicy {
    pub max_pages: Option<usize>,
}

/// Cancellation policy for trap waits.
///
/// By default a wait that times out abandons the listener: it keeps
/// accepting pushes and self-stops when the subscription TTL elapses,
/// unobserved. `cancel_on_timeout` stops the listener and aborts the
/// expiry timer as soon as the caller's wait fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapPolicy {
    pub cancel_on_timeout: bool,
}

/// Client for one remote FIAP storage endpoint.
pub struct FiapClient {
    channel: Arc<dyn Channel>,
    scheduler: Scheduler,
    fetch_policy: FetchPolicy,
    trap_policy: TrapPolicy,
}

impl FiapClient {
    /// Client over an already-built channel.
    ///
    /// Must be called within a tokio runtime; the trap scheduler is
    /// taken from the current runtime unless replaced with
    /// [`with_scheduler`](Self::with_scheduler).
    pub fn new(channel: Arc<dyn Channel>) -> Self {
        Self {
            channel,
            scheduler: Scheduler::new(),
            fetch_policy: FetchPolicy::default(),
            trap_policy: TrapPolicy::default(),
        }
    }

    /// Client over a TCP channel to a `host:port` endpoint.
    pub fn connect(endpoint: &str) -> ClientResult<Self> {
        let channel = TcpChannel::from_endpoint(endpoint)?;
        Ok(Self::new(Arc::new(channel)))
    }

    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.fetch_policy = policy;
        self
    }

    pub fn with_trap_policy(mut self, policy: TrapPolicy) -> Self {
        self.trap_policy = policy;
        self
    }

    // ------------------------------------------------------------------
    // Pull

    /// Drive the paginated fetch loop to completion.
    ///
    /// Each cycle sends the query, validates the response, merges its
    /// body into the accumulator and follows the continuation query the
    /// server echoes back, until that query is absent or carries no
    /// cursor. All-or-nothing: a failing page discards everything merged
    /// so far.
    pub async fn fetch(&self, query: Query) -> ClientResult<Body> {
        let mut accumulator = Body::new();
        let mut query = query;
        let mut pages = 0usize;

        loop {
            let mut res = self.channel.query(Transport::for_query(query)).await?;
            validate_transport(&res)?;

            let body = res.body.take().ok_or(Error::NoBody)?;
            merge_body(
                Some(&mut accumulator.points),
                Some(&mut accumulator.point_sets),
                body,
            );
            pages += 1;

            match res.header.and_then(|h| h.query) {
                Some(next) if next.cursor.is_some() => {
                    if let Some(max) = self.fetch_policy.max_pages {
                        if pages >= max {
                            warn!(pages, max, "fetch exceeded page limit");
                            return Err(ClientError::PageLimitExceeded { pages });
                        }
                    }
                    debug!(pages, "following continuation cursor");
                    query = next;
                }
                _ => break,
            }
        }

        debug!(
            pages,
            points = accumulator.points.len(),
            point_sets = accumulator.point_sets.len(),
            "fetch complete"
        );
        Ok(accumulator)
    }

    /// Fetch the given keys from storage and flatten the resulting
    /// points into an id -> (timestamp -> value) map.
    pub async fn fetch_points(&self, keys: Vec<Key>) -> ClientResult<PointMap> {
        let body = self.fetch(Query::storage(keys)).await?;
        Ok(point_map(&body.points))
    }

    // ------------------------------------------------------------------
    // Write

    /// Write a body to the remote storage through the `data` operation.
    pub async fn write(&self, body: Body) -> ClientResult<()> {
        let res = self.channel.data(Transport::for_body(body)).await?;
        validate_transport(&res)?;
        Ok(())
    }

    /// Write an id -> (timestamp -> value) map as points.
    pub async fn write_points(&self, point_values: &PointMap) -> ClientResult<()> {
        self.write(Body {
            points: point_list(point_values),
            point_sets: Vec::new(),
        })
        .await
    }

    // ------------------------------------------------------------------
    // Push (trap)

    /// Register a subscription and collect pushes until its TTL expires.
    ///
    /// The query must be STREAM-shaped: its `ttl` and `callback_data`
    /// tell the remote storage how long to push and where. Returns the
    /// points accumulated by the time the TTL fires, or
    /// [`ClientError::Timeout`] if `overall_timeout` elapses first.
    pub async fn trap(&self, query: Query, overall_timeout: Duration) -> ClientResult<Vec<Point>> {
        let ttl_secs = query
            .ttl
            .ok_or(ClientError::InvalidTrapQuery("query has no ttl"))?;
        let callback_addr = query
            .callback_data
            .clone()
            .ok_or(ClientError::InvalidTrapQuery("query has no callback address"))?;

        self.trap_query(query).await?;

        let store = Arc::new(PointStore::new());
        let wait = self
            .trap_data(store, &callback_addr, Duration::from_secs(ttl_secs))
            .await?;
        let store = wait.wait(overall_timeout).await?;
        Ok(store.snapshot())
    }

    /// [`trap`](Self::trap) over a fresh STREAM query built from keys.
    pub async fn trap_keys(
        &self,
        keys: Vec<Key>,
        callback_addr: &str,
        ttl_secs: u64,
        overall_timeout: Duration,
    ) -> ClientResult<Vec<Point>> {
        self.trap(Query::stream(keys, callback_addr, ttl_secs), overall_timeout)
            .await
    }

    /// Send a subscription registration and validate the response.
    pub async fn trap_query(&self, query: Query) -> ClientResult<()> {
        info!(query_id = %query.id, "registering trap subscription");
        let res = self.channel.query(Transport::for_query(query)).await?;
        validate_transport(&res)?;
        Ok(())
    }

    /// Stand up the inbound side of a trap: a listener at
    /// `callback_addr` merging every pushed body into `store`, plus a
    /// deferred expiry that stops the listener after `ttl` and resolves
    /// the returned wait with the store.
    ///
    /// Callers that registered with a caller-owned store keep access to
    /// it even if the wait later times out.
    pub async fn trap_data<S>(
        &self,
        store: Arc<S>,
        callback_addr: &str,
        ttl: Duration,
    ) -> ClientResult<TrapWait<S>>
    where
        S: TrapStore + 'static,
    {
        let dispatcher = {
            let store = store.clone();
            Dispatcher::new(
                not_implemented(),
                Arc::new(move |req: Transport| {
                    let body = req.body.clone().ok_or(Error::NoBody)?;
                    store.accept(body)?;
                    Ok(ok_transport(Some(req)))
                }),
            )
        };

        let listener = Arc::new(FiapListener::bind_endpoint(callback_addr, dispatcher).await?);
        info!(addr = %listener.local_addr(), ?ttl, "trap listener up");

        let (result_tx, result_rx) = oneshot::channel();
        let expiry_listener = listener.clone();
        let expiry = self.scheduler.schedule_once(ttl, async move {
            expiry_listener.stop().await;
            // The receiver may be gone if the caller's wait already
            // timed out; the store is still theirs to inspect.
            let _ = result_tx.send(store);
        });

        Ok(TrapWait {
            result: result_rx,
            expiry,
            listener,
            cancel_on_timeout: self.trap_policy.cancel_on_timeout,
        })
    }
}

/// The caller's side of one running trap window.
pub struct TrapWait<S> {
    result: oneshot::Receiver<Arc<S>>,
    expiry: ScheduledTask,
    listener: Arc<ListenerHandle>,
    cancel_on_timeout: bool,
}

impl<S> TrapWait<S> {
    /// Address the listener actually bound, which differs from the
    /// requested callback address when port 0 was asked for.
    pub fn callback_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Wait for the TTL expiry to resolve the trap, up to
    /// `overall_timeout`.
    ///
    /// On timeout the listener/expiry pair is left running unless the
    /// client's [`TrapPolicy`] says to cancel it; either way the wait
    /// itself fails with [`ClientError::Timeout`].
    pub async fn wait(self, overall_timeout: Duration) -> ClientResult<Arc<S>> {
        match tokio::time::timeout(overall_timeout, self.result).await {
            Ok(Ok(store)) => Ok(store),
            Ok(Err(_)) => Err(ClientError::Cancelled),
            Err(_) => {
                if self.cancel_on_timeout {
                    info!(addr = %self.listener.local_addr(), "cancelling trap after wait timeout");
                    self.expiry.abort();
                    self.listener.stop().await;
                } else {
                    warn!(
                        addr = %self.listener.local_addr(),
                        "trap wait timed out; listener runs on until its ttl"
                    );
                }
                Err(ClientError::Timeout {
                    waited: overall_timeout,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{PointMapStore, PointQueue};
    use chrono::{FixedOffset, TimeZone};
    use fiap_core::{error_transport, Fault, Header, PointSet, QueryType, Timestamp, Value};
    use fiap_transport::MethodHandler;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn ts(secs: i64) -> Timestamp {
        FixedOffset::east_opt(0)
            .unwrap()
            .timestamp_opt(secs, 0)
            .unwrap()
    }

    fn point(id: &str, secs: i64, value: &str) -> Point {
        Point::new(id, vec![Value::new(ts(secs), value)])
    }

    /// Response envelope a storage server would produce: OK marker, the
    /// request query echoed back with the given cursor, and a body.
    fn page_response(req: Transport, cursor: Option<&str>, body: Body) -> Transport {
        let mut query = req.header.and_then(|h| h.query);
        if let Some(q) = query.as_mut() {
            q.cursor = cursor.map(str::to_string);
        }
        Transport {
            header: Some(Header {
                query,
                ok: true,
                error: None,
            }),
            body: Some(body),
        }
    }

    /// Fake storage endpoint serving one canned body per page.
    async fn storage_server(
        pages: Vec<Body>,
        requests: Arc<AtomicUsize>,
    ) -> fiap_transport::ListenerHandle {
        let on_query: MethodHandler = Arc::new(move |req| {
            let n = requests.fetch_add(1, Ordering::SeqCst);
            let body = pages.get(n).cloned().unwrap_or_default();
            let cursor = if n + 1 < pages.len() {
                Some(format!("cursor-{n}"))
            } else {
                None
            };
            Ok(page_response(req, cursor.as_deref(), body))
        });

        FiapListener::bind("127.0.0.1:0".parse().unwrap(), Dispatcher::new(on_query, not_implemented()))
            .await
            .unwrap()
    }

    fn client_for(handle: &fiap_transport::ListenerHandle) -> FiapClient {
        FiapClient::new(Arc::new(TcpChannel::new(handle.local_addr())))
    }

    #[tokio::test]
    async fn flat_fetch_is_a_single_cycle() {
        let requests = Arc::new(AtomicUsize::new(0));
        let body = Body {
            points: vec![point("A", 0, "1")],
            point_sets: vec![],
        };
        let server = storage_server(vec![body.clone()], requests.clone()).await;

        let got = client_for(&server)
            .fetch(Query::storage(vec![Key::new("A")]))
            .await
            .unwrap();

        assert_eq!(got, body);
        assert_eq!(requests.load(Ordering::SeqCst), 1);
        server.stop().await;
    }

    #[tokio::test]
    async fn pagination_merges_all_pages() {
        let requests = Arc::new(AtomicUsize::new(0));
        let pages = vec![
            Body {
                points: vec![point("p", 0, "a")],
                point_sets: vec![PointSet::new("s")],
            },
            Body {
                points: vec![point("p", 10, "b")],
                point_sets: vec![],
            },
            Body {
                points: vec![point("q", 0, "c")],
                point_sets: vec![],
            },
        ];
        let server = storage_server(pages, requests.clone()).await;

        let got = client_for(&server)
            .fetch(Query::storage(vec![]))
            .await
            .unwrap();

        assert_eq!(requests.load(Ordering::SeqCst), 3);
        assert_eq!(got.points.len(), 2);
        assert_eq!(got.points[0].id, "p");
        assert_eq!(got.points[0].values.len(), 2);
        assert_eq!(got.point_sets.len(), 1);
        server.stop().await;
    }

    #[tokio::test]
    async fn fetch_points_merges_duplicate_ids_across_pages() {
        let requests = Arc::new(AtomicUsize::new(0));
        let pages = vec![
            Body {
                points: vec![point("p1", 1, "v1")],
                point_sets: vec![],
            },
            Body {
                points: vec![point("p1", 2, "v2")],
                point_sets: vec![],
            },
        ];
        let server = storage_server(pages, requests.clone()).await;

        let map = client_for(&server)
            .fetch_points(vec![Key::new("p1")])
            .await
            .unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map["p1"][&ts(1)], "v1");
        assert_eq!(map["p1"][&ts(2)], "v2");
        server.stop().await;
    }

    #[tokio::test]
    async fn remote_error_aborts_fetch() {
        let on_query: MethodHandler = Arc::new(|req| {
            Ok(error_transport(Some(req), "PointNotFound", "no such point"))
        });
        let server = FiapListener::bind(
            "127.0.0.1:0".parse().unwrap(),
            Dispatcher::new(on_query, not_implemented()),
        )
        .await
        .unwrap();

        let err = client_for(&server)
            .fetch(Query::storage(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Envelope(Error::Remote { ref kind, .. }) if kind == "PointNotFound"
        ));
        server.stop().await;
    }

    #[tokio::test]
    async fn response_without_body_fails() {
        let on_query: MethodHandler = Arc::new(|req| Ok(ok_transport(Some(req))));
        let server = FiapListener::bind(
            "127.0.0.1:0".parse().unwrap(),
            Dispatcher::new(on_query, not_implemented()),
        )
        .await
        .unwrap();

        let err = client_for(&server)
            .fetch(Query::storage(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Envelope(Error::NoBody)));
        server.stop().await;
    }

    #[tokio::test]
    async fn response_without_markers_fails() {
        let on_query: MethodHandler = Arc::new(|req| {
            // A broken server echoing the request untouched: header
            // present, neither OK nor error.
            Ok(req)
        });
        let server = FiapListener::bind(
            "127.0.0.1:0".parse().unwrap(),
            Dispatcher::new(on_query, not_implemented()),
        )
        .await
        .unwrap();

        let err = client_for(&server)
            .fetch(Query::storage(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Envelope(Error::MissingSuccessMarker)
        ));
        server.stop().await;
    }

    #[tokio::test]
    async fn page_limit_stops_adversarial_cursor() {
        // Always returns a cursor: unbounded without a policy cap.
        let on_query: MethodHandler =
            Arc::new(|req| Ok(page_response(req, Some("again"), Body::new())));
        let server = FiapListener::bind(
            "127.0.0.1:0".parse().unwrap(),
            Dispatcher::new(on_query, not_implemented()),
        )
        .await
        .unwrap();

        let client = client_for(&server).with_fetch_policy(FetchPolicy {
            max_pages: Some(5),
        });
        let err = client.fetch(Query::storage(vec![])).await.unwrap_err();
        assert!(matches!(err, ClientError::PageLimitExceeded { pages: 5 }));
        server.stop().await;
    }

    #[tokio::test]
    async fn write_sends_body_and_validates() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = seen.clone();
        let on_data: MethodHandler = Arc::new(move |req| {
            let body = req.body.clone().ok_or(Error::NoBody)?;
            seen2.fetch_add(body.points.len(), Ordering::SeqCst);
            Ok(ok_transport(Some(req)))
        });
        let server = FiapListener::bind(
            "127.0.0.1:0".parse().unwrap(),
            Dispatcher::new(not_implemented(), on_data),
        )
        .await
        .unwrap();

        let client = client_for(&server);
        let mut map = PointMap::new();
        map.entry("p1".into()).or_default().insert(ts(0), "1".into());
        map.entry("p2".into()).or_default().insert(ts(0), "2".into());
        client.write_points(&map).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        server.stop().await;
    }

    #[tokio::test]
    async fn trap_expiry_with_no_pushes_returns_empty_store() {
        let client = FiapClient::new(Arc::new(TcpChannel::new(
            "127.0.0.1:1".parse().unwrap(), // never dialed in this test
        )));

        let started = Instant::now();
        let wait = client
            .trap_data(
                Arc::new(PointStore::new()),
                "127.0.0.1:0",
                Duration::from_millis(300),
            )
            .await
            .unwrap();
        let addr = wait.callback_addr();
        let store = wait.wait(Duration::from_secs(5)).await.unwrap();

        // Resolved by the ttl, not the overall timeout.
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(store.snapshot().is_empty());

        // Listener is down by now.
        let channel = TcpChannel::new(addr);
        assert!(channel.data(Transport::default()).await.is_err());
    }

    #[tokio::test]
    async fn trap_overall_timeout_beats_longer_ttl() {
        let client = FiapClient::new(Arc::new(TcpChannel::new("127.0.0.1:1".parse().unwrap())));

        let started = Instant::now();
        let wait = client
            .trap_data(
                Arc::new(PointStore::new()),
                "127.0.0.1:0",
                Duration::from_secs(10),
            )
            .await
            .unwrap();
        let err = wait.wait(Duration::from_millis(200)).await.unwrap_err();

        assert!(matches!(err, ClientError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn trap_timeout_leaves_listener_running_by_default() {
        let client = FiapClient::new(Arc::new(TcpChannel::new("127.0.0.1:1".parse().unwrap())));

        let store = Arc::new(PointStore::new());
        let wait = client
            .trap_data(store.clone(), "127.0.0.1:0", Duration::from_secs(10))
            .await
            .unwrap();
        let addr = wait.callback_addr();
        wait.wait(Duration::from_millis(100)).await.unwrap_err();

        // Dangling listener still accepts pushes into the caller-owned
        // store after the wait has failed.
        let channel = TcpChannel::new(addr);
        let res = channel
            .data(Transport::for_body(Body {
                points: vec![point("late", 0, "v")],
                point_sets: vec![],
            }))
            .await
            .unwrap();
        assert!(validate_transport(&res).is_ok());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn trap_cancel_on_timeout_stops_listener() {
        let client = FiapClient::new(Arc::new(TcpChannel::new("127.0.0.1:1".parse().unwrap())))
            .with_trap_policy(TrapPolicy {
                cancel_on_timeout: true,
            });

        let wait = client
            .trap_data(
                Arc::new(PointStore::new()),
                "127.0.0.1:0",
                Duration::from_secs(10),
            )
            .await
            .unwrap();
        let addr = wait.callback_addr();
        wait.wait(Duration::from_millis(100)).await.unwrap_err();

        let channel = TcpChannel::new(addr);
        assert!(channel.data(Transport::default()).await.is_err());
    }

    #[tokio::test]
    async fn trap_accumulates_pushes_until_ttl() {
        let client = FiapClient::new(Arc::new(TcpChannel::new("127.0.0.1:1".parse().unwrap())));

        let store = Arc::new(PointStore::new());
        let wait = client
            .trap_data(store.clone(), "127.0.0.1:0", Duration::from_millis(500))
            .await
            .unwrap();
        let channel = TcpChannel::new(wait.callback_addr());

        for (secs, value) in [(0, "a"), (10, "b")] {
            let res = channel
                .data(Transport::for_body(Body {
                    points: vec![point("p", secs, value)],
                    point_sets: vec![],
                }))
                .await
                .unwrap();
            assert!(validate_transport(&res).is_ok());
        }

        let store = wait.wait(Duration::from_secs(5)).await.unwrap();
        let points = store.snapshot();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].values.len(), 2);
    }

    #[tokio::test]
    async fn trap_listener_rejects_query_operation() {
        let client = FiapClient::new(Arc::new(TcpChannel::new("127.0.0.1:1".parse().unwrap())));

        let wait = client
            .trap_data(
                Arc::new(PointQueue::new()),
                "127.0.0.1:0",
                Duration::from_millis(500),
            )
            .await
            .unwrap();
        let channel = TcpChannel::new(wait.callback_addr());

        let res = channel.query(Transport::default()).await.unwrap();
        assert!(matches!(
            validate_transport(&res),
            Err(Error::Remote { ref kind, .. }) if kind == "NotImplemented"
        ));

        wait.wait(Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test]
    async fn trap_push_without_body_gets_error_envelope() {
        let client = FiapClient::new(Arc::new(TcpChannel::new("127.0.0.1:1".parse().unwrap())));

        let wait = client
            .trap_data(
                Arc::new(PointStore::new()),
                "127.0.0.1:0",
                Duration::from_millis(400),
            )
            .await
            .unwrap();
        let channel = TcpChannel::new(wait.callback_addr());

        let res = channel.data(Transport::default()).await.unwrap();
        assert!(matches!(
            validate_transport(&res),
            Err(Error::Remote { ref kind, .. }) if kind == "NoBody"
        ));

        let store = wait.wait(Duration::from_secs(5)).await.unwrap();
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn trap_map_store_shape() {
        let client = FiapClient::new(Arc::new(TcpChannel::new("127.0.0.1:1".parse().unwrap())));

        let store = Arc::new(PointMapStore::new());
        let wait = client
            .trap_data(store, "127.0.0.1:0", Duration::from_millis(400))
            .await
            .unwrap();
        let channel = TcpChannel::new(wait.callback_addr());

        for value in ["old", "new"] {
            channel
                .data(Transport::for_body(Body {
                    points: vec![point("p", 0, value)],
                    point_sets: vec![],
                }))
                .await
                .unwrap();
        }

        let store = wait.wait(Duration::from_secs(5)).await.unwrap();
        assert_eq!(store.snapshot()["p"][&ts(0)], "new");
    }

    #[tokio::test]
    async fn trap_registers_stream_query_then_collects() {
        // End-to-end: registration goes to the storage endpoint, the
        // listener window runs out with no pushes.
        let seen_stream = Arc::new(AtomicUsize::new(0));
        let seen = seen_stream.clone();
        let on_query: MethodHandler = Arc::new(move |req: Transport| {
            let query = req
                .header
                .as_ref()
                .and_then(|h| h.query.as_ref())
                .ok_or(Error::MissingHeader)?;
            if query.query_type == QueryType::Stream && query.ttl == Some(1) {
                seen.fetch_add(1, Ordering::SeqCst);
            }
            Ok(ok_transport(Some(req)))
        });
        let server = FiapListener::bind(
            "127.0.0.1:0".parse().unwrap(),
            Dispatcher::new(on_query, not_implemented()),
        )
        .await
        .unwrap();

        let client = client_for(&server);
        let points = client
            .trap_keys(
                vec![Key::trap("http://host/p")],
                "127.0.0.1:0",
                1,
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert!(points.is_empty());
        assert_eq!(seen_stream.load(Ordering::SeqCst), 1);
        server.stop().await;
    }

    #[tokio::test]
    async fn trap_query_without_ttl_is_rejected() {
        let client = FiapClient::new(Arc::new(TcpChannel::new("127.0.0.1:1".parse().unwrap())));

        let mut query = Query::stream(vec![], "127.0.0.1:0", 1);
        query.ttl = None;
        let err = client.trap(query, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidTrapQuery(_)));
    }

    #[tokio::test]
    async fn failed_registration_skips_listener() {
        let on_query: MethodHandler =
            Arc::new(|req| Ok(error_transport(Some(req), "Forbidden", "no")));
        let server = FiapListener::bind(
            "127.0.0.1:0".parse().unwrap(),
            Dispatcher::new(on_query, not_implemented()),
        )
        .await
        .unwrap();

        let client = client_for(&server);
        let err = client
            .trap_keys(vec![], "127.0.0.1:0", 1, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Envelope(Error::Remote { ref kind, .. }) if kind == "Forbidden"
        ));
        server.stop().await;
    }

    #[test]
    fn fault_display_includes_kind_and_message() {
        let fault = Fault::new("PointNotFound", "no such point");
        let err = Error::Remote {
            kind: fault.kind,
            message: fault.value,
        };
        assert_eq!(err.to_string(), "remote error [PointNotFound] no such point");
    }
}
