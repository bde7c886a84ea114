// Connection handling module
// Accepts a single TCP connection and serves it with hyper

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::{AppState, PerformanceConfig};
use crate::handler;
use crate::logger;

/// Accept and process a connection, enforcing the connection limit.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    if state.access_log_enabled() {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve one connection in its own task.
///
/// A request in progress is never cut short, however long the upstream takes.
/// Three timers bound a connection:
/// - `read_timeout`: time to receive request headers
/// - `keep_alive_timeout`: idle time between requests
/// - `write_timeout`: time for a closing connection to flush
///
/// The counter is decremented on every exit path.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let perf = state.config.performance.clone();
        let activity = Arc::new(Activity::new());

        let mut builder = http1::Builder::new();
        builder.timer(TokioTimer::new());
        builder.keep_alive(perf.keep_alive_timeout > 0);
        builder.header_read_timeout(
            (perf.read_timeout > 0).then(|| Duration::from_secs(perf.read_timeout)),
        );

        let service = {
            let activity = Arc::clone(&activity);
            service_fn(move |req| {
                let guard = activity.begin();
                let state = Arc::clone(&state);
                async move {
                    let resp = handler::handle_request(req, state, peer_addr).await;
                    drop(guard);
                    resp
                }
            })
        };

        let conn = builder.serve_connection(io, service);
        tokio::pin!(conn);

        let result = tokio::select! {
            res = conn.as_mut() => res,
            () = activity.idle_for(idle_limit(&perf)) => {
                logger::log_connection_idle(&peer_addr);
                conn.as_mut().graceful_shutdown();
                match tokio::time::timeout(Duration::from_secs(perf.write_timeout), conn.as_mut()).await {
                    Ok(res) => res,
                    Err(_) => {
                        logger::log_warning(&format!(
                            "Connection from {peer_addr} did not close within {} seconds",
                            perf.write_timeout
                        ));
                        Ok(())
                    }
                }
            }
        };

        if let Err(err) = result {
            logger::log_connection_error(&err);
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Idle bound between requests, `None` when keep-alive is off
fn idle_limit(perf: &PerformanceConfig) -> Option<Duration> {
    (perf.keep_alive_timeout > 0).then(|| Duration::from_secs(perf.keep_alive_timeout))
}

/// Tracks requests in flight on one connection and when the last one ended
struct Activity {
    opened: Instant,
    in_flight: AtomicUsize,
    /// Milliseconds after `opened`
    last_done: AtomicU64,
}

/// Marks a request as in flight until dropped
struct InFlight(Arc<Activity>);

impl Drop for InFlight {
    fn drop(&mut self) {
        let elapsed = u64::try_from(self.0.opened.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.0.last_done.store(elapsed, Ordering::SeqCst);
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Activity {
    fn new() -> Self {
        Self {
            opened: Instant::now(),
            in_flight: AtomicUsize::new(0),
            last_done: AtomicU64::new(0),
        }
    }

    fn begin(self: &Arc<Self>) -> InFlight {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlight(Arc::clone(self))
    }

    /// Instant the connection becomes idle for `limit`, `None` while a request runs
    fn idle_deadline(&self, limit: Duration) -> Option<Instant> {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            return None;
        }
        let last_done = Duration::from_millis(self.last_done.load(Ordering::SeqCst));
        Some(self.opened + last_done + limit)
    }

    /// Resolve once no request has run for `limit`; never resolves for `None`
    async fn idle_for(&self, limit: Option<Duration>) {
        let Some(limit) = limit else {
            return std::future::pending().await;
        };

        loop {
            match self.idle_deadline(limit) {
                Some(deadline) if deadline <= Instant::now() => return,
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => tokio::time::sleep(limit).await,
            }
        }
    }
}
