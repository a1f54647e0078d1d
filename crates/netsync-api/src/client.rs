// Hand-crafted async HTTP client for the NetBox REST API.
//
// Base path: /api/
// Auth: `Authorization: Token <token>` header

use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::resource::{Page, RecordId, Resource};
use crate::transport::TransportConfig;

/// Page size requested on list calls. NetBox caps it at `MAX_PAGE_SIZE`.
const PAGE_SIZE: &str = "250";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the NetBox REST API.
///
/// Generic over [`Resource`]: every entity kind shares the same five
/// verbs, addressed by `R::ENDPOINT`.
pub struct NetboxClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NetboxClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a token and transport config.
    pub fn new(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(token)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/api/`.
    ///
    /// Accepts `https://netbox.example.com`, `.../api` and `.../api/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    /// The normalized `/api/` base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    fn record_url<R: Resource>(&self, id: RecordId) -> Result<Url, Error> {
        self.url(&format!("{}{id}/", R::ENDPOINT))
    }

    // ── Resource verbs ───────────────────────────────────────────────

    /// Every record matching `params`, following `next` links.
    pub async fn list<R: Resource>(&self, params: &[(&str, String)]) -> Result<Vec<R>, Error> {
        let mut url = self.url(R::ENDPOINT)?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("limit", PAGE_SIZE);

        let mut records = Vec::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            debug!("GET {url}");
            let resp = self.http.get(url).send().await?;
            let page: Page<R> = self.handle_response(resp).await?;
            records.extend(page.results);
            next = page.next.as_deref().map(Url::parse).transpose()?;
        }
        Ok(records)
    }

    /// At most one record matching `query`.
    pub async fn find<R: Resource>(&self, query: &R::Query) -> Result<Option<R>, Error> {
        let mut found = self.list::<R>(&R::query_params(query)).await?;
        match found.len() {
            0 | 1 => Ok(found.pop()),
            count => Err(Error::Ambiguous {
                endpoint: R::ENDPOINT,
                count,
            }),
        }
    }

    /// A record by id, `None` on 404.
    pub async fn fetch<R: Resource>(&self, id: RecordId) -> Result<Option<R>, Error> {
        let url = self.record_url::<R>(id)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        match self.handle_response(resp).await {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create<R: Resource>(&self, draft: &R::Draft) -> Result<R, Error> {
        let url = self.url(R::ENDPOINT)?;
        self.send_json(self.http.post(url.clone()), "POST", &url, draft)
            .await
    }

    pub async fn update<R: Resource>(&self, id: RecordId, patch: &R::Patch) -> Result<R, Error> {
        let url = self.record_url::<R>(id)?;
        self.send_json(self.http.patch(url.clone()), "PATCH", &url, patch)
            .await
    }

    pub async fn delete<R: Resource>(&self, id: RecordId) -> Result<(), Error> {
        let url = self.record_url::<R>(id)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn send_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        builder: reqwest::RequestBuilder,
        verb: &str,
        url: &Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("{verb} {url}");
        let resp = builder.json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.detail);

        // Validation failures come back as `{"field": ["reason", ...]}`.
        let message = detail.unwrap_or_else(|| {
            if raw.is_empty() {
                status.to_string()
            } else {
                raw.chars().take(500).collect()
            }
        });

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            Error::InvalidToken { message }
        } else {
            Error::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_api_suffix() {
        let client =
            NetboxClient::from_reqwest("https://netbox.example.com", reqwest::Client::new())
                .unwrap();
        assert_eq!(client.base_url().as_str(), "https://netbox.example.com/api/");
    }

    #[test]
    fn base_url_keeps_existing_api_suffix() {
        let client =
            NetboxClient::from_reqwest("https://host/netbox/api", reqwest::Client::new())
                .unwrap();
        assert_eq!(client.base_url().as_str(), "https://host/netbox/api/");
    }
}
