//! HTTP/1.1 client implementation for FReD nodes

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::header::CONTENT_TYPE;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::types::{encode_segment, ItemData, Resource, TriggerHost};

/// Configuration options for the FReD client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host name or address of the node (default: localhost).
    /// IPv6 literals may be given with or without brackets.
    pub host: String,
    /// Port of the node's HTTP interface (default: 9001)
    pub port: String,
    /// Optional API version segment prefixed to every path, e.g. `v0`
    pub api_version: Option<String>,
    /// Optional bound on a whole request/response exchange, in milliseconds.
    /// No timeout is applied when unset.
    pub timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: "9001".to_string(),
            api_version: None,
            timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Base URL of the form `http://{host}:{port}[/{api_version}]`
    ///
    /// IPv6 literals are bracketed when given bare. The host must be a plain
    /// name or address, the port a number, and the API version made of plain
    /// path segments; anything that would move the request elsewhere is
    /// rejected with [`Error::InvalidUrl`].
    pub fn base_url(&self) -> Result<String> {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let port: u16 = self
            .port
            .trim()
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("Invalid port {:?}: {}", self.port, e)))?;

        let mut base = format!("http://{}:{}", host, port);

        let url = Url::parse(&base).map_err(|e| Error::InvalidUrl(format!("{}: {}", base, e)))?;
        if url.path() != "/"
            || url.query().is_some()
            || url.fragment().is_some()
            || !url.username().is_empty()
            || url.password().is_some()
            || url.port_or_known_default() != Some(port)
        {
            return Err(Error::InvalidUrl(format!(
                "Invalid host {:?}: expected a bare name or address",
                self.host
            )));
        }

        if let Some(version) = self.api_version.as_deref() {
            for segment in version.split('/').filter(|s| !s.is_empty()) {
                if segment == "." || segment == ".." || encode_segment(segment) != segment {
                    return Err(Error::InvalidUrl(format!(
                        "Invalid API version {:?}: segment {:?} is not a plain path segment",
                        version, segment
                    )));
                }
                base.push('/');
                base.push_str(segment);
            }
        }

        Ok(base)
    }
}

/// Async client for a FReD node's HTTP interface
///
/// Every operation issues exactly one request and hands back the raw response
/// body. Any non-2xx status is returned as [`Error::Status`]; nothing is retried.
///
/// # Example
/// ```rust,no_run
/// use fred_client::Client;
///
/// #[tokio::main]
/// async fn main() -> Result<(), fred_client::Error> {
///     // Unversioned API on http://localhost:9001
///     let client = Client::new("localhost", 9001)?;
///
///     // Every path prefixed with /v0
///     let client = Client::with_api_version("localhost", "9001", "v0")?;
///
///     // Full configuration
///     let client = Client::with_config(fred_client::ClientConfig {
///         host: "10.0.0.5".to_string(),
///         timeout_ms: Some(5000),
///         ..Default::default()
///     })?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    base_url: Arc<str>,
    http_client: HttpClient<HttpConnector, Full<Bytes>>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.config.timeout_ms)
            .finish()
    }
}

impl Client {
    /// Create a client for `http://{host}:{port}`
    ///
    /// The port may be given as a string or a number.
    ///
    /// # Errors
    /// Returns [`Error::InvalidUrl`] if host and port do not form a valid URL
    pub fn new(host: &str, port: impl fmt::Display) -> Result<Self> {
        Self::with_config(ClientConfig {
            host: host.to_string(),
            port: port.to_string(),
            ..Default::default()
        })
    }

    /// Create a client for `http://{host}:{port}/{api_version}`
    pub fn with_api_version(
        host: &str,
        port: impl fmt::Display,
        api_version: &str,
    ) -> Result<Self> {
        Self::with_config(ClientConfig {
            host: host.to_string(),
            port: port.to_string(),
            api_version: Some(api_version.to_string()),
            ..Default::default()
        })
    }

    /// Create a new client with custom configuration
    ///
    /// No I/O happens here; connections are opened lazily by the first request.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        let http_client = HttpClient::builder(TokioExecutor::new()).build_http();

        Ok(Self {
            config: Arc::new(config),
            base_url: base_url.into(),
            http_client,
        })
    }

    /// Get the base URL every request path is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the configuration this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Internal request method
    async fn request(
        &self,
        method: &Method,
        resource: Resource<'_>,
        body: Option<Bytes>,
    ) -> Result<Bytes> {
        let path = resource.path();
        let url = format!("{}{}", self.base_url, path);
        let uri: Uri = url
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("Invalid request URL: {}", e)))?;

        let builder = Request::builder().method(method.clone()).uri(uri);
        let req = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Full::new(body)),
            None => builder.body(Full::new(Bytes::new())),
        };
        let req = req.map_err(|e| Error::InvalidRequest(format!("Failed to build request: {}", e)))?;

        debug!("Sending request: {} {}", method, path);

        let exchange = async {
            let response = self
                .http_client
                .request(req)
                .await
                .map_err(|e| Error::Connection(format!("Request failed: {}", e)))?;
            let status = response.status();
            let body = Self::read_body_to_bytes(response.into_body()).await?;
            Ok::<(StatusCode, Bytes), Error>((status, body))
        };

        let (status, body) = match self.config.timeout_ms {
            Some(ms) => tokio::time::timeout(Duration::from_millis(ms), exchange)
                .await
                .map_err(|_| Error::Timeout(ms))??,
            None => exchange.await?,
        };

        debug!("{} {} -> {}", method, path, status);

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body)
    }

    /// Serialize a JSON request body
    fn json_body<T: Serialize>(value: &T) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(value)?))
    }

    /// Read response body to bytes
    async fn read_body_to_bytes(body: Incoming) -> Result<Bytes> {
        let collected = body
            .collect()
            .await
            .map_err(|e| Error::InvalidResponse(format!("Failed to read body: {}", e)))?;
        Ok(collected.to_bytes())
    }

    /// Create a keygroup
    ///
    /// # Example
    /// ```rust,no_run
    /// # use fred_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), fred_client::Error> {
    /// # let client = Client::new("localhost", 9001)?;
    /// let body = client.create_keygroup("kg").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_keygroup(&self, keygroup: &str) -> Result<Bytes> {
        self.request(&Method::POST, Resource::Keygroup { keygroup }, None)
            .await
    }

    /// Delete a keygroup
    pub async fn delete_keygroup(&self, keygroup: &str) -> Result<Bytes> {
        self.request(&Method::DELETE, Resource::Keygroup { keygroup }, None)
            .await
    }

    /// Read an item
    ///
    /// # Returns
    /// The response body exactly as the node sent it
    ///
    /// # Example
    /// ```rust,no_run
    /// # use fred_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), fred_client::Error> {
    /// # let client = Client::new("localhost", 9001)?;
    /// let body = client.read("kg", "1").await?;
    /// println!("{}", String::from_utf8_lossy(&body));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn read(&self, keygroup: &str, id: &str) -> Result<Bytes> {
        self.request(&Method::GET, Resource::Item { keygroup, id }, None)
            .await
    }

    /// Read an item as text (convenience method)
    pub async fn read_str(&self, keygroup: &str, id: &str) -> Result<String> {
        let body = self.read(keygroup, id).await?;
        String::from_utf8(body.to_vec())
            .map_err(|e| Error::InvalidResponse(format!("Invalid UTF-8: {}", e)))
    }

    /// Store `data` under `id`, sent as `{"data": data}`
    ///
    /// # Example
    /// ```rust,no_run
    /// # use fred_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), fred_client::Error> {
    /// # let client = Client::new("localhost", 9001)?;
    /// client.put("kg", "1", "hi!").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn put(&self, keygroup: &str, id: &str, data: &str) -> Result<Bytes> {
        let body = Self::json_body(&ItemData::new(data))?;
        self.request(&Method::PUT, Resource::Item { keygroup, id }, Some(body))
            .await
    }

    /// Delete an item
    pub async fn delete(&self, keygroup: &str, id: &str) -> Result<Bytes> {
        self.request(&Method::DELETE, Resource::Item { keygroup, id }, None)
            .await
    }

    /// Store `data` under an id chosen by the node
    ///
    /// # Returns
    /// The response body, which carries the assigned id
    pub async fn append(&self, keygroup: &str, data: &str) -> Result<Bytes> {
        let body = Self::json_body(&ItemData::new(data))?;
        self.request(&Method::POST, Resource::Items { keygroup }, Some(body))
            .await
    }

    /// List the nodes replicating a keygroup
    pub async fn keygroup_replicas(&self, keygroup: &str) -> Result<Bytes> {
        self.request(&Method::GET, Resource::Replicas { keygroup }, None)
            .await
    }

    /// Add a replica node to a keygroup
    pub async fn add_keygroup_replica(&self, keygroup: &str, node: &str) -> Result<Bytes> {
        self.request(&Method::POST, Resource::Replica { keygroup, node }, None)
            .await
    }

    /// Remove a replica node from a keygroup
    pub async fn remove_keygroup_replica(&self, keygroup: &str, node: &str) -> Result<Bytes> {
        self.request(&Method::DELETE, Resource::Replica { keygroup, node }, None)
            .await
    }

    /// List the trigger nodes of a keygroup
    pub async fn keygroup_triggers(&self, keygroup: &str) -> Result<Bytes> {
        self.request(&Method::GET, Resource::Triggers { keygroup }, None)
            .await
    }

    /// Register a trigger node reachable at `host` (`host:port`)
    pub async fn add_keygroup_trigger(
        &self,
        keygroup: &str,
        trigger: &str,
        host: &str,
    ) -> Result<Bytes> {
        let body = Self::json_body(&TriggerHost::new(host))?;
        self.request(
            &Method::POST,
            Resource::Trigger { keygroup, trigger },
            Some(body),
        )
        .await
    }

    /// Unregister a trigger node
    pub async fn remove_keygroup_trigger(&self, keygroup: &str, trigger: &str) -> Result<Bytes> {
        self.request(
            &Method::DELETE,
            Resource::Trigger { keygroup, trigger },
            None,
        )
        .await
    }
}
