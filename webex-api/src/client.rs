use crate::ApiError;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, LINK, RETRY_AFTER};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://webexapis.com/v1";

/// Pause used when a 429 response carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(15);
/// Longest pause honoured from a `Retry-After` header.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

/// Connection settings for a `WebexClient`.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout: Duration,
    /// How many times a request answered with 429 Too Many Requests is resent.
    pub max_retries: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(10),
            max_retries: 6,
        }
    }
}

/// Every list endpoint of the Webex API wraps its results in an `items` array.
/// Webex documentation: https://developer.webex.com/docs/basics#pagination
#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Error body returned by the Webex API on failed requests.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: String,
    tracking_id: Option<String>,
}

/// A sequential, blocking Webex API client authenticated with a bearer token.
pub struct WebexClient {
    http: Client,
    base_url: Url,
    max_retries: u32,
}

impl WebexClient {
    pub fn new(token: &str, options: ClientOptions) -> Result<Self, ApiError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| ApiError::InvalidToken)?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()?;

        // Url::join drops the last path segment unless the base ends with a slash
        let mut base = options.base_url.trim_end_matches('/').to_owned();
        base.push('/');
        let base_url = Url::parse(&base).map_err(|_| ApiError::InvalidUrl(options.base_url))?;

        Ok(Self {
            http,
            base_url,
            max_retries: options.max_retries,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Accepts either a path relative to the base URL or an absolute URL,
    /// as found in pagination links.
    fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(path)
            .or_else(|_| self.base_url.join(path))
            .map_err(|_| ApiError::InvalidUrl(path.to_owned()))
    }

    /// Sends a request, sleeping and resending whenever the API answers 429.
    fn execute(
        &self,
        method: Method,
        url: Url,
        configure: impl Fn(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, ApiError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let request = configure(self.http.request(method.clone(), url.clone()));
            let response = request.send()?;
            let status = response.status();
            tracing::debug!(%method, %url, %status, "Webex API response");

            match status {
                status if status.is_success() => return Ok(response),
                StatusCode::UNAUTHORIZED => return Err(ApiError::Unauthorized),
                StatusCode::TOO_MANY_REQUESTS if attempts <= self.max_retries => {
                    let pause = retry_after(response.headers());
                    tracing::warn!(
                        "Received 429 Too Many Requests from {}, retrying in {:?} (attempt {}/{})",
                        url,
                        pause,
                        attempts,
                        self.max_retries + 1
                    );
                    std::thread::sleep(pause);
                }
                StatusCode::TOO_MANY_REQUESTS => return Err(ApiError::RateLimited { attempts }),
                status => return Err(status_error(status, response)),
            }
        }
    }

    /// GETs a single JSON document.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = with_query(self.resolve(path)?, query);
        let response = self.execute(Method::GET, url, |builder| builder)?;
        decode(response)
    }

    /// GETs every page of a list endpoint, following `Link: <...>; rel="next"` headers.
    pub fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let mut items = vec![];
        let mut next = Some(with_query(self.resolve(path)?, query));
        while let Some(url) = next.take() {
            let response = self.execute(Method::GET, url.clone(), |builder| builder)?;
            next = match next_link(response.headers()) {
                Some(link) => Some(self.resolve(&link)?).filter(|next_url| *next_url != url),
                None => None,
            };
            let page: Page<T> = decode(response)?;
            tracing::debug!("Fetched {} items from {}", page.items.len(), url);
            items.extend(page.items);
        }
        Ok(items)
    }

    /// PUTs a JSON body and decodes the JSON response.
    pub fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.resolve(path)?;
        let response = self.execute(Method::PUT, url, |builder| builder.json(body))?;
        decode(response)
    }
}

fn with_query(mut url: Url, query: &[(&str, String)]) -> Url {
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    url
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text()?;
    Ok(serde_json::from_str(&body)?)
}

fn status_error(status: StatusCode, response: Response) -> ApiError {
    let body: ErrorBody = response
        .text()
        .ok()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default();
    let message = if body.message.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_owned()
    } else {
        body.message
    };
    ApiError::Status {
        status,
        message,
        tracking_id: body.tracking_id,
    }
}

fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
        .min(MAX_RETRY_AFTER)
}

/// Extracts the target of the `rel="next"` entry of an RFC 8288 `Link` header.
fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|link| {
            let mut parts = link.split(';');
            let target = parts.next()?.trim().strip_prefix('<')?.strip_suffix('>')?;
            parts
                .any(|param| {
                    let param = param.trim().replace(' ', "");
                    param == "rel=\"next\"" || param == "rel=next"
                })
                .then(|| target.to_owned())
        })
}
