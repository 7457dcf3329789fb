//! Rate-limited input fetching.
//!
//! One request per missing day, strictly sequential. The client owns the
//! cooldown: every request starts a fixed minimum interval, measured from
//! the *start* of the previous request, and a caller arriving early blocks
//! until it elapses. No automatic retries; failures are classified so the
//! sync loop can decide what survives the run.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::calendar::{Day, Year};
use crate::error::Transience;

/// Minimum spacing between request starts. Be nice to the server.
pub const REQUEST_DELAY: Duration = Duration::from_millis(500);

const BASE_URL: &str = "https://adventofcode.com";
const USER_AGENT: &str = concat!("aocx/", env!("CARGO_PKG_VERSION"));

/// Transport-level failure, before any HTTP status is available.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Other(String),
}

/// Minimal response surface the client classifies on.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Seam between the client and the network. The real implementation is
/// [`HttpTransport`]; tests substitute stubs.
pub trait Transport {
    fn get(&mut self, url: &str) -> Result<TransportResponse, TransportError>;
}

/// Classified fetch failure. Surfaced distinctly so the caller can skip,
/// abort, or retry; never collapsed into one error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FetchError {
    /// The server has no input for this day yet. Skip and continue.
    #[error("input for {year} day {day} is not available yet")]
    NotYetAvailable { year: Year, day: Day },

    /// Credential rejected. Every further request in the run will fail
    /// identically, so the run must abort.
    #[error("request for {year} day {day} rejected: session cookie invalid or expired")]
    AuthenticationInvalid { year: Year, day: Day },

    /// Connectivity/timeout class. The caller may retry the day, outside
    /// the rate limiter's cooldown.
    #[error("network failure fetching {year} day {day}: {source}")]
    Transient {
        year: Year,
        day: Day,
        #[source]
        source: TransportError,
    },

    /// Any other non-success status, with context.
    #[error("unexpected HTTP {status} fetching {year} day {day}")]
    UnexpectedStatus { year: Year, day: Day, status: u16 },
}

impl FetchError {
    /// Whether retrying this fetch may succeed.
    pub fn transience(&self) -> Transience {
        match self {
            FetchError::Transient { .. } => Transience::Retryable,
            FetchError::NotYetAvailable { .. } => Transience::Unknown,
            FetchError::AuthenticationInvalid { .. } | FetchError::UnexpectedStatus { .. } => {
                Transience::Permanent
            }
        }
    }

    /// True when continuing the run would only burn rate-limited slots.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, FetchError::AuthenticationInvalid { .. })
    }
}

/// Monotonic time source; swapped for a test clock in unit tests.
pub trait Clock {
    fn now_ms(&self) -> u64;
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `Instant`.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Deterministic clock for tests: sleeping advances time, nothing else
/// does (requests are instantaneous from the clock's point of view).
#[derive(Clone, Default)]
pub struct TestClock {
    now: Arc<AtomicU64>,
}

impl TestClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) {
        self.now
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }
}

/// Fetch client with cooperative backpressure.
///
/// Two effective states: idle, and cooling until `last_start + delay`.
/// There is exactly one in-flight request at a time by construction; the
/// sync loop is sequential per day.
pub struct RateLimitedClient<T, C = SystemClock> {
    transport: T,
    clock: C,
    delay: Duration,
    last_start_ms: Option<u64>,
}

impl<T: Transport, C: Clock> RateLimitedClient<T, C> {
    pub fn with_clock(transport: T, clock: C, delay: Duration) -> Self {
        Self {
            transport,
            clock,
            delay,
            last_start_ms: None,
        }
    }

    /// Fetch one day's input. Blocks through the cooldown, issues exactly
    /// one request, and classifies the outcome. Touches neither the
    /// lockfile nor the filesystem.
    pub fn fetch(&mut self, year: Year, day: Day) -> Result<String, FetchError> {
        self.wait_for_cooldown();
        self.last_start_ms = Some(self.clock.now_ms());

        let url = format!("{BASE_URL}/{year}/day/{}/input", day.as_u8());
        tracing::debug!(%year, %day, "fetching input");

        let response = self
            .transport
            .get(&url)
            .map_err(|source| FetchError::Transient { year, day, source })?;

        match response.status {
            200..=299 => Ok(response.body),
            404 => Err(FetchError::NotYetAvailable { year, day }),
            400 => Err(FetchError::AuthenticationInvalid { year, day }),
            status => Err(FetchError::UnexpectedStatus { year, day, status }),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn wait_for_cooldown(&mut self) {
        let Some(last_start) = self.last_start_ms else {
            return;
        };
        let elapsed = self.clock.now_ms().saturating_sub(last_start);
        let delay_ms = self.delay.as_millis() as u64;
        if elapsed < delay_ms {
            self.clock.sleep(Duration::from_millis(delay_ms - elapsed));
        }
    }
}

impl<T: Transport> RateLimitedClient<T, SystemClock> {
    pub fn new(transport: T) -> Self {
        Self::with_clock(transport, SystemClock::new(), REQUEST_DELAY)
    }
}

/// Real transport over a blocking reqwest client, authenticated with the
/// session cookie.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    session: String,
}

impl HttpTransport {
    pub fn new(session: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self {
            client,
            session: session.into(),
        })
    }
}

impl Transport for HttpTransport {
    fn get(&mut self, url: &str) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::COOKIE, format!("session={}", self.session))
            .send()
            .map_err(classify_reqwest)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(classify_reqwest)?;
        Ok(TransportResponse { status, body })
    }
}

fn classify_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stub transport that records the clock reading at each request.
    struct RecordingTransport {
        clock: TestClock,
        status: u16,
        requests: Vec<u64>,
    }

    impl RecordingTransport {
        fn new(clock: TestClock, status: u16) -> Self {
            Self {
                clock,
                status,
                requests: Vec::new(),
            }
        }
    }

    impl Transport for RecordingTransport {
        fn get(&mut self, _url: &str) -> Result<TransportResponse, TransportError> {
            self.requests.push(self.clock.now_ms());
            Ok(TransportResponse {
                status: self.status,
                body: "1721\n979\n".into(),
            })
        }
    }

    fn coord(year: u16, day: u8) -> (Year, Day) {
        (Year::new(year).unwrap(), Day::new(day).unwrap())
    }

    #[test]
    fn sequential_fetches_respect_minimum_interval() {
        let clock = TestClock::new(0);
        let transport = RecordingTransport::new(clock.clone(), 200);
        let mut client =
            RateLimitedClient::with_clock(transport, clock, Duration::from_millis(500));

        let (year, day) = coord(2020, 1);
        for _ in 0..5 {
            client.fetch(year, day).unwrap();
        }

        let starts = &client.transport.requests;
        assert_eq!(starts.len(), 5);
        for pair in starts.windows(2) {
            assert!(
                pair[1] - pair[0] >= 500,
                "requests at {} and {} closer than 500ms",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn first_fetch_does_not_wait() {
        let clock = TestClock::new(7_000);
        let transport = RecordingTransport::new(clock.clone(), 200);
        let mut client =
            RateLimitedClient::with_clock(transport, clock, Duration::from_millis(500));
        let (year, day) = coord(2020, 1);
        client.fetch(year, day).unwrap();
        assert_eq!(client.transport.requests, vec![7_000]);
    }

    #[test]
    fn not_found_classifies_as_not_yet_available() {
        let clock = TestClock::new(0);
        let transport = RecordingTransport::new(clock.clone(), 404);
        let mut client =
            RateLimitedClient::with_clock(transport, clock, Duration::from_millis(500));
        let (year, day) = coord(2024, 25);
        let err = client.fetch(year, day).unwrap_err();
        assert!(matches!(err, FetchError::NotYetAvailable { .. }));
        assert!(!err.is_fatal_for_run());
    }

    #[test]
    fn bad_request_classifies_as_auth_invalid_and_is_fatal() {
        let clock = TestClock::new(0);
        let transport = RecordingTransport::new(clock.clone(), 400);
        let mut client =
            RateLimitedClient::with_clock(transport, clock, Duration::from_millis(500));
        let (year, day) = coord(2024, 1);
        let err = client.fetch(year, day).unwrap_err();
        assert!(matches!(err, FetchError::AuthenticationInvalid { .. }));
        assert!(err.is_fatal_for_run());
        assert_eq!(err.transience(), Transience::Permanent);
    }

    #[test]
    fn server_error_surfaces_status() {
        let clock = TestClock::new(0);
        let transport = RecordingTransport::new(clock.clone(), 503);
        let mut client =
            RateLimitedClient::with_clock(transport, clock, Duration::from_millis(500));
        let (year, day) = coord(2024, 1);
        match client.fetch(year, day).unwrap_err() {
            FetchError::UnexpectedStatus { status, .. } => assert_eq!(status, 503),
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn get(&mut self, _url: &str) -> Result<TransportResponse, TransportError> {
            Err(TransportError::Timeout)
        }
    }

    #[test]
    fn transport_failure_is_transient_and_retryable() {
        let mut client = RateLimitedClient::with_clock(
            FailingTransport,
            TestClock::new(0),
            Duration::from_millis(500),
        );
        let (year, day) = coord(2024, 1);
        let err = client.fetch(year, day).unwrap_err();
        assert!(matches!(err, FetchError::Transient { .. }));
        assert!(err.transience().is_retryable());
    }
}
