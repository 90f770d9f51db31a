//! Release archive download.
//!
//! Provides a trait-based abstraction for fetching archive bytes so the
//! install pipeline can be exercised without network access. Fetches are
//! bounded by a [`FetchContext`]: an optional deadline plus a cancellation
//! token. The transfer runs on a worker thread while the caller polls the
//! context, so a cancel or an expired deadline returns promptly even when the
//! connection has stalled.

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

/// How often a waiting fetch re-checks its context.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Bytes read from the response body between cancellation checks.
const CHUNK_SIZE: usize = 64 * 1024;

/// A shareable flag that asks in-flight fetches to stop.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every fetch observing this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Report whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Deadline and cancellation state for one fetch.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use gosdk::artefact::download::FetchContext;
///
/// let ctx = FetchContext::new().with_timeout(Duration::from_secs(300));
/// assert!(ctx.remaining().is_some());
/// assert!(!ctx.cancel_token().is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    deadline: Option<Instant>,
    cancel: CancelToken,
}

impl FetchContext {
    /// Create a context with no deadline and a fresh token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the fetch to finish within `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now().checked_add(timeout);
        Self { deadline, ..self }
    }

    /// Bound the fetch to finish before `deadline`.
    #[must_use]
    pub fn with_deadline(self, deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..self
        }
    }

    /// Observe `token` instead of the context's own token.
    #[must_use]
    pub fn with_cancel_token(self, token: CancelToken) -> Self {
        Self {
            cancel: token,
            ..self
        }
    }

    /// Return the token this context observes.
    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Return the deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Return the time left before the deadline, if one is set.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail if the fetch of `url` has been cancelled or has run out of time.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Cancelled`] or [`DownloadError::TimedOut`].
    pub fn check(&self, url: &str) -> Result<(), DownloadError> {
        if self.cancel.is_cancelled() {
            return Err(DownloadError::Cancelled {
                url: url.to_owned(),
            });
        }
        if self.remaining().is_some_and(|left| left.is_zero()) {
            return Err(DownloadError::TimedOut {
                url: url.to_owned(),
            });
        }
        Ok(())
    }
}

/// Trait for fetching release archives.
///
/// Abstractions allow tests to stub HTTP behaviour without network access.
///
/// # Examples
///
/// ```
/// use gosdk::artefact::download::HttpDownloader;
///
/// let downloader = HttpDownloader::new();
/// // Use downloader.fetch(&ctx, url) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveDownloader {
    /// Fetch the whole body served at `url`.
    ///
    /// The returned buffer is complete; a failed or interrupted transfer never
    /// yields partial bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or `ctx` cancels or expires before the body has
    /// been read.
    fn fetch(&self, ctx: &FetchContext, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Errors arising from archive downloads.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The request failed or the server returned an error status.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested archive was not found (HTTP 404).
    #[error("archive not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The fetch was cancelled through its [`CancelToken`].
    #[error("download cancelled: {url}")]
    Cancelled {
        /// The URL being fetched.
        url: String,
    },

    /// The fetch did not finish before its deadline.
    #[error("download timed out: {url}")]
    TimedOut {
        /// The URL being fetched.
        url: String,
    },
}

impl DownloadError {
    /// Return the URL the failed fetch was for.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::HttpError { url, .. }
            | Self::NotFound { url }
            | Self::Cancelled { url }
            | Self::TimedOut { url } => url,
        }
    }
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDownloader;

impl HttpDownloader {
    /// Create a downloader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveDownloader for HttpDownloader {
    fn fetch(&self, ctx: &FetchContext, url: &str) -> Result<Vec<u8>, DownloadError> {
        ctx.check(url)?;
        debug!("fetching {url}");

        let (sender, receiver) = mpsc::channel();
        let agent = http_agent(ctx.remaining());
        let worker_ctx = ctx.clone();
        let worker_url = url.to_owned();
        thread::Builder::new()
            .name("gosdk-fetch".to_owned())
            .spawn(move || {
                let result = read_body(&agent, &worker_ctx, &worker_url);
                if sender.send(result).is_err() {
                    // The caller gave up after a cancel or an expired deadline.
                }
            })
            .map_err(|e| DownloadError::HttpError {
                url: url.to_owned(),
                reason: format!("cannot start download worker: {e}"),
            })?;

        // An abandoned worker exits once its connection fails or the context
        // check between chunks trips; its buffer is dropped with it.
        loop {
            match receiver.recv_timeout(POLL_INTERVAL) {
                Ok(result) => return result,
                Err(RecvTimeoutError::Timeout) => ctx.check(url)?,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(DownloadError::HttpError {
                        url: url.to_owned(),
                        reason: "download worker exited without a result".to_owned(),
                    });
                }
            }
        }
    }
}

/// Issue the request and read the whole body, checking `ctx` between chunks.
fn read_body(agent: &ureq::Agent, ctx: &FetchContext, url: &str) -> Result<Vec<u8>, DownloadError> {
    let response = agent.get(url).call().map_err(|e| map_ureq_error(url, &e))?;

    let mut body = response.into_body();
    let mut reader = body.as_reader();
    let mut buffer = Vec::new();
    let mut chunk = vec![0_u8; CHUNK_SIZE];
    loop {
        ctx.check(url)?;
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_read_error(url, &e)),
        };
        buffer.extend_from_slice(chunk.get(..read).unwrap_or_default());
        trace!("read {} bytes from {url}", buffer.len());
    }

    debug!("fetched {} bytes from {url}", buffer.len());
    Ok(buffer)
}

/// Build a `ureq` agent whose overall timeout matches the fetch deadline.
fn http_agent(timeout: Option<Duration>) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(timeout)
        .build();
    ureq::Agent::new_with_config(config)
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::Timeout(_) => DownloadError::TimedOut {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// Map an I/O error raised while reading the body.
fn map_read_error(url: &str, err: &std::io::Error) -> DownloadError {
    if err.kind() == std::io::ErrorKind::TimedOut {
        return DownloadError::TimedOut {
            url: url.to_owned(),
        };
    }
    DownloadError::HttpError {
        url: url.to_owned(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response on a loopback port and return its base
    /// URL.
    fn serve_once(response: Vec<u8>) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut line = String::new();
            while reader.read_line(&mut line).expect("read request") > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let mut stream = stream;
            if stream.write_all(&response).is_err() {
                // The client may hang up once it has the status line.
            }
        });
        (format!("http://{addr}"), handle)
    }

    fn http_response(status: &str, body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    #[test]
    fn fetch_returns_complete_body() {
        let body = vec![7_u8; CHUNK_SIZE * 2 + 11];
        let (base, server) = serve_once(http_response("200 OK", &body));

        let fetched = HttpDownloader::new()
            .fetch(&FetchContext::new(), &format!("{base}/dl/go.tar.gz"))
            .expect("fetch");

        assert_eq!(fetched, body);
        server.join().expect("server thread");
    }

    #[test]
    fn fetch_maps_404_to_not_found() {
        let (base, server) = serve_once(http_response("404 Not Found", b"missing"));
        let url = format!("{base}/dl/go0.0.linux-amd64.tar.gz");

        let err = HttpDownloader::new()
            .fetch(&FetchContext::new(), &url)
            .expect_err("404");

        assert!(matches!(err, DownloadError::NotFound { .. }), "got {err:?}");
        assert_eq!(err.url(), url);
        server.join().expect("server thread");
    }

    /// Serve headers and the first bytes of a longer body, then hold the
    /// connection open until `release` fires.
    fn serve_stalled(release: mpsc::Receiver<()>) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut line = String::new();
            while reader.read_line(&mut line).expect("read request") > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let head = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nabc";
            if stream.write_all(head.as_bytes()).is_err() {
                return;
            }
            if stream.flush().is_err() {
                return;
            }
            if release.recv_timeout(Duration::from_secs(30)).is_err() {
                // Test finished without releasing; close anyway.
            }
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn cancel_interrupts_a_stalled_body() {
        let (release, stalled) = mpsc::channel();
        let (base, server) = serve_stalled(stalled);
        let token = CancelToken::new();
        let ctx = FetchContext::new().with_cancel_token(token.clone());
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            token.cancel();
        });

        let started = Instant::now();
        let err = HttpDownloader::new()
            .fetch(&ctx, &format!("{base}/dl/go1.17.1.linux-amd64.tar.gz"))
            .expect_err("cancelled");
        let elapsed = started.elapsed();

        assert!(matches!(err, DownloadError::Cancelled { .. }), "got {err:?}");
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
        canceller.join().expect("canceller thread");
        release.send(()).expect("release server");
        server.join().expect("server thread");
    }

    #[test]
    fn deadline_interrupts_a_stalled_body() {
        let (release, stalled) = mpsc::channel();
        let (base, server) = serve_stalled(stalled);
        let ctx = FetchContext::new().with_timeout(Duration::from_millis(300));

        let started = Instant::now();
        let err = HttpDownloader::new()
            .fetch(&ctx, &format!("{base}/dl/go1.17.1.linux-amd64.tar.gz"))
            .expect_err("timed out");
        let elapsed = started.elapsed();

        assert!(matches!(err, DownloadError::TimedOut { .. }), "got {err:?}");
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
        release.send(()).expect("release server");
        server.join().expect("server thread");
    }

    #[test]
    fn cancelled_context_fails_before_connecting() {
        let ctx = FetchContext::new();
        ctx.cancel_token().cancel();

        let err = HttpDownloader::new()
            .fetch(&ctx, "http://127.0.0.1:9/dl/go1.16.linux-amd64.tar.gz")
            .expect_err("cancelled");

        assert!(matches!(err, DownloadError::Cancelled { .. }));
    }

    #[test]
    fn expired_deadline_times_out() {
        let ctx = FetchContext::new().with_deadline(Instant::now());
        let err = ctx.check("https://go.dev/dl/x").expect_err("expired");
        assert!(matches!(err, DownloadError::TimedOut { .. }));
    }

    #[test]
    fn shared_token_cancels_every_clone() {
        let token = CancelToken::new();
        let ctx = FetchContext::new().with_cancel_token(token.clone());
        assert!(ctx.check("https://go.dev/dl/x").is_ok());

        token.cancel();
        assert!(ctx.cancel_token().is_cancelled());
        assert!(ctx.check("https://go.dev/dl/x").is_err());
    }

    #[test]
    fn context_without_deadline_has_no_remaining_time() {
        let ctx = FetchContext::new();
        assert_eq!(ctx.deadline(), None);
        assert_eq!(ctx.remaining(), None);
    }

    #[test]
    fn map_ureq_error_maps_404_to_not_found() {
        let err = ureq::Error::StatusCode(404);
        let mapped = map_ureq_error("https://go.dev/dl/go.tar.gz", &err);
        assert!(matches!(mapped, DownloadError::NotFound { .. }));
    }

    #[test]
    fn map_ureq_error_maps_other_status_to_http_error() {
        let err = ureq::Error::StatusCode(500);
        let mapped = map_ureq_error("https://go.dev/dl/go.tar.gz", &err);
        assert!(matches!(mapped, DownloadError::HttpError { .. }));
        assert!(mapped.to_string().contains("https://go.dev/dl/go.tar.gz"));
    }

    #[test]
    fn read_timeout_maps_to_timed_out() {
        let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        let mapped = map_read_error("https://go.dev/dl/go.tar.gz", &err);
        assert!(matches!(mapped, DownloadError::TimedOut { .. }));
    }
}
