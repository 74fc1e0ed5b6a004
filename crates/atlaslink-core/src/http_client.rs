use std::collections::{BTreeMap, VecDeque};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Minimal HTTP method set needed for redirect resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
}

/// HTTP request envelope used by transport calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: 5_000,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Head, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// HTTP response head. Bodies are never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lowercased.
    pub headers: BTreeMap<String, String>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
        }
    }

    /// A `302 Found` pointing at `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(302).with_header("location", location)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Non-empty `Location` header value.
    pub fn location(&self) -> Option<&str> {
        self.header("location")
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub const fn is_redirect(&self) -> bool {
        self.status >= 300 && self.status < 400
    }
}

/// Category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    Timeout,
    Connect,
    Other,
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    kind: HttpErrorKind,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: HttpErrorKind::Other,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: HttpErrorKind::Timeout,
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: HttpErrorKind::Connect,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn kind(&self) -> HttpErrorKind {
        self.kind
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Transport contract used by the link extractor.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a>;
}

/// Production HTTP client using reqwest. Redirects are never followed so the
/// caller can read the `Location` header of the first hop.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("atlaslink/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| HttpError::new(format!("failed to build http client: {e}")))?;
        Ok(Self::with_client(client))
    }

    /// Wrap a preconfigured reqwest client. It should not follow redirects.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Head => self.client.head(&request.url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            builder = builder.timeout(Duration::from_millis(request.timeout_ms));

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::timeout(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::connect(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let mut head = HttpResponse::new(response.status().as_u16());
            for (name, value) in response.headers() {
                if let Ok(value) = value.to_str() {
                    head = head.with_header(name.as_str(), value);
                }
            }
            Ok(head)
        })
    }
}

/// One canned reply of a [`ScriptedHttpClient`].
#[derive(Debug, Clone)]
pub struct ScriptedReply {
    pub delay: Duration,
    pub outcome: Result<HttpResponse, HttpError>,
}

/// Offline transport that replays scripted replies in order and records
/// every request it receives. Once the script runs out it answers `404`.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: HttpResponse) -> Self {
        self.push(Duration::ZERO, Ok(response))
    }

    pub fn fail(self, error: HttpError) -> Self {
        self.push(Duration::ZERO, Err(error))
    }

    pub fn respond_after(self, delay: Duration, response: HttpResponse) -> Self {
        self.push(delay, Ok(response))
    }

    fn push(self, delay: Duration, outcome: Result<HttpResponse, HttpError>) -> Self {
        self.replies
            .lock()
            .expect("scripted replies lock is not poisoned")
            .push_back(ScriptedReply { delay, outcome });
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("scripted requests lock is not poisoned")
            .clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        self.requests
            .lock()
            .expect("scripted requests lock is not poisoned")
            .push(request);
        let reply = self
            .replies
            .lock()
            .expect("scripted replies lock is not poisoned")
            .pop_front();

        Box::pin(async move {
            let Some(reply) = reply else {
                return Ok(HttpResponse::new(404));
            };
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            reply.outcome
        })
    }
}
