// API client module: a small blocking HTTP client for the OneFS platform
// and namespace APIs, plus the traits the workflows are written against so
// they can run against an in-memory cluster in tests.

use crate::error::{Result, ToolError};
use crate::model::{NamespaceEntry, NewQuota, Quota, QuotaQuery, Thresholds};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quota operations the workflows need from the cluster.
pub trait QuotaAuthority {
    fn find(&self, query: &QuotaQuery) -> Result<Vec<Quota>>;
    fn create(&self, spec: &NewQuota) -> Result<Quota>;
    /// Replace the threshold triple of quota `id`. All or nothing.
    fn update(&self, id: &str, thresholds: &Thresholds) -> Result<()>;
}

/// Directory listing used by the audit workflow.
pub trait NamespaceAuthority {
    fn list_children(&self, path: &str) -> Result<Vec<NamespaceEntry>>;
}

/// Username and password for the session handshake.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Connection settings, resolved from the command line and config file.
#[derive(Debug, Clone)]
pub struct Connection {
    /// `https` against a cluster; plain `http` only for local stubs
    pub scheme: String,
    pub hostname: String,
    pub port: u16,
    pub insecure: bool,
    pub timeout: Duration,
}

/// Client for one cluster. Holds the reqwest client (with its cookie store
/// carrying the session id) and the CSRF token handed out at login.
pub struct IsilonClient {
    client: Client,
    base_url: String,
    csrf: Option<String>,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    username: &'a str,
    password: &'a str,
    services: [&'a str; 2],
}

#[derive(Deserialize)]
struct QuotaPage {
    #[serde(default)]
    quotas: Vec<Quota>,
    resume: Option<String>,
}

#[derive(Deserialize)]
struct CreatedQuota {
    id: String,
}

#[derive(Serialize)]
struct QuotaUpdate<'a> {
    thresholds: &'a Thresholds,
}

#[derive(Deserialize)]
struct DirectoryPage {
    #[serde(default)]
    children: Vec<DirectoryChild>,
    resume: Option<String>,
}

#[derive(Deserialize)]
struct DirectoryChild {
    name: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorItem>,
    /// The session endpoint reports a single top-level message instead.
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorItem {
    message: String,
}

impl IsilonClient {
    pub fn new(conn: &Connection) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(conn.insecure)
            .timeout(conn.timeout)
            .build()?;
        Ok(IsilonClient {
            client,
            base_url: format!("{}://{}:{}", conn.scheme, conn.hostname, conn.port),
            csrf: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a session. The session id lands in the cookie store; the CSRF
    /// cookie must also be echoed back as a header on every later call.
    pub fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        let url = format!("{}/session/1/session", self.base_url);
        debug!("POST {}", url);
        let body = SessionRequest {
            username: &credentials.username,
            password: &credentials.password,
            services: ["platform", "namespace"],
        };
        let res = self.client.post(&url).json(&body).send()?;
        if !res.status().is_success() {
            return Err(match check(res) {
                Err(ToolError::Api { status, messages }) if messages.is_empty() => {
                    ToolError::Auth(format!("HTTP {}", status))
                }
                Err(ToolError::Api { messages, .. }) => ToolError::Auth(messages.join("; ")),
                Err(other) => other,
                Ok(_) => ToolError::Auth("unexpected response".into()),
            });
        }
        self.csrf = res
            .cookies()
            .find(|c| c.name() == "isicsrf")
            .map(|c| c.value().to_string());
        debug!("session established, csrf token present: {}", self.csrf.is_some());
        Ok(())
    }

    fn session_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.csrf {
            if let Ok(val) = HeaderValue::from_str(token) {
                headers.insert("X-CSRF-Token", val);
            }
            if let Ok(val) = HeaderValue::from_str(&self.base_url) {
                headers.insert(REFERER, val);
            }
        }
        headers
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.client.request(method, url).headers(self.session_headers())
    }

    /// `/namespace<path>` with every path segment percent-encoded, so names
    /// holding `#`, `?` or spaces stay inside the path.
    fn namespace_url(&self, path: &str) -> Result<Url> {
        let invalid = || ToolError::Validation(format!("cannot build a URL from {}", self.base_url));
        let mut url = Url::parse(&format!("{}/namespace", self.base_url)).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }
}

/// Pass successful responses through; turn anything else into an API error
/// carrying the cluster's messages.
fn check(res: Response) -> Result<Response> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status().as_u16();
    let txt = res.text().unwrap_or_default();
    let messages = error_messages(&txt);
    debug!("HTTP {} {:?}", status, messages);
    Err(ToolError::Api { status, messages })
}

/// Messages from a platform API error body: every `errors[].message`, else
/// the top-level `message`, else the raw body text.
fn error_messages(txt: &str) -> Vec<String> {
    let raw = || match txt.trim() {
        "" => Vec::new(),
        trimmed => vec![trimmed.to_string()],
    };
    match serde_json::from_str::<ErrorBody>(txt) {
        Ok(body) if !body.errors.is_empty() => body.errors.into_iter().map(|e| e.message).collect(),
        Ok(ErrorBody { message: Some(message), .. }) => vec![message],
        _ => raw(),
    }
}

impl QuotaAuthority for IsilonClient {
    fn find(&self, query: &QuotaQuery) -> Result<Vec<Quota>> {
        let mut quotas = Vec::new();
        let mut resume: Option<String> = None;
        loop {
            let req = self.request(Method::GET, "/platform/1/quota/quotas");
            // A resume token replaces the original query parameters.
            let req = match &resume {
                Some(token) => req.query(&[("resume", token)]),
                None => req.query(&query.params()),
            };
            let page: QuotaPage = check(req.send()?)?.json()?;
            quotas.extend(page.quotas);
            match page.resume {
                Some(token) => resume = Some(token),
                None => break,
            }
        }
        debug!("found {} quotas for {:?}", quotas.len(), query);
        Ok(quotas)
    }

    fn create(&self, spec: &NewQuota) -> Result<Quota> {
        let req = self.request(Method::POST, "/platform/1/quota/quotas").json(spec);
        let created: CreatedQuota = check(req.send()?)?.json()?;
        debug!("created quota {} for {}", created.id, spec.path);
        self.find(&QuotaQuery::path(&spec.path))?
            .into_iter()
            .find(|q| q.id == created.id)
            .ok_or_else(|| ToolError::NotFound(spec.path.clone()))
    }

    fn update(&self, id: &str, thresholds: &Thresholds) -> Result<()> {
        let path = format!("/platform/1/quota/quotas/{}", id);
        let req = self.request(Method::PUT, &path).json(&QuotaUpdate { thresholds });
        check(req.send()?)?;
        Ok(())
    }
}

impl NamespaceAuthority for IsilonClient {
    fn list_children(&self, path: &str) -> Result<Vec<NamespaceEntry>> {
        let parent = path.trim_end_matches('/');
        let mut entries = Vec::new();
        let mut resume: Option<String> = None;
        let url = self.namespace_url(parent)?;
        loop {
            debug!("GET {}", url);
            let req = self.client.get(url.clone()).headers(self.session_headers());
            let req = match &resume {
                Some(token) => req.query(&[("resume", token)]),
                None => req,
            };
            let page: DirectoryPage = check(req.send()?)?.json()?;
            entries.extend(page.children.into_iter().map(|child| NamespaceEntry {
                path: format!("{}/{}", parent, child.name),
            }));
            match page.resume {
                Some(token) => resume = Some(token),
                None => break,
            }
        }
        Ok(entries)
    }
}
