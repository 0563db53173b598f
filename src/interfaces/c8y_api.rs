use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use ureq::http::Response;
use ureq::tls::{TlsConfig, TlsProvider};
use ureq::Body;
use url::Url;

use crate::config::TenantCredentials;
use crate::constants::defaults;
use crate::models::{ExternalId, ManagedObject, Record, RecordKind};

use super::pages::PageIter;
use super::platform::{Paged, Platform, PlatformError};

const MANAGED_OBJECTS_PATH: [&str; 2] = ["inventory", "managedObjects"];
const MANAGED_OBJECTS_KEY: &str = "managedObjects";
const EXTERNAL_IDS_KEY: &str = "externalIds";

const JSON: &str = "application/json";
const REFERENCE_CONTENT_TYPE: &str = "application/vnd.com.nsn.cumulocity.managedObjectReference+json";

/// Authenticated session against one tenant's REST API
pub struct C8yClient {
    agent: ureq::Agent,
    base_url: Url,
    authorization: String,
    page_size: usize,
    response_limit: u64,
}

fn get_ureq_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .tls_config(TlsConfig::builder().provider(TlsProvider::NativeTls).build())
        .timeout_global(Some(defaults::API_REQUEST_TIMEOUT))
        .http_status_as_error(false)
        .build()
        .into()
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
}

impl C8yClient {
    pub fn new(credentials: &TenantCredentials, page_size: usize) -> C8yClient {
        let base_url = credentials.url.clone();
        log::debug!("Session for {} as {}", base_url, credentials.username);
        C8yClient {
            agent: get_ureq_agent(),
            base_url,
            authorization: basic_auth(&credentials.username, &credentials.password),
            page_size,
            response_limit: response_limit(page_size),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(super) fn page_size(&self) -> usize {
        self.page_size
    }

    /// Resource URL below the tenant base URL. Every segment is percent-encoded, so IDs
    /// containing `/`, `?` or `#` stay a single path segment.
    pub(super) fn url<'s>(
        &self,
        segments: impl IntoIterator<Item = &'s str>,
    ) -> Result<Url, PlatformError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(super) fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        query: &[(&str, String)],
    ) -> Result<T, PlatformError> {
        log::debug!("GET {url} {query:?}");
        let mut request = self
            .agent
            .get(url.as_str())
            .header("Authorization", self.authorization.as_str())
            .header("Accept", JSON);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let resp = request.call().map_err(|source| PlatformError::Transport {
            url: url.to_string(),
            source,
        })?;
        decode(url, &read_body(url, resp, self.response_limit)?)
    }

    fn post<B: Serialize>(
        &self,
        url: &Url,
        content_type: &str,
        body: &B,
    ) -> Result<String, PlatformError> {
        let payload = serde_json::to_vec(body).map_err(PlatformError::Encode)?;
        log::debug!("POST {url} ({} bytes)", payload.len());
        let resp = self
            .agent
            .post(url.as_str())
            .header("Authorization", self.authorization.as_str())
            .header("Accept", JSON)
            .header("Content-Type", content_type)
            .send(payload.as_slice())
            .map_err(|source| PlatformError::Transport {
                url: url.to_string(),
                source,
            })?;
        read_body(url, resp, self.response_limit)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<T, PlatformError> {
        decode(url, &self.post(url, JSON, body)?)
    }

    fn paged<'s, T: DeserializeOwned + 'static>(
        &self,
        segments: impl IntoIterator<Item = &'s str>,
        key: &'static str,
        filter: Vec<(&'static str, String)>,
    ) -> Paged<'_, T> {
        match self.url(segments) {
            Ok(url) => Box::new(PageIter::new(self, url, key, filter)),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}

/// Largest response body accepted for requests of `page_size` elements
fn response_limit(page_size: usize) -> u64 {
    (page_size as u64)
        .saturating_mul(defaults::RESPONSE_BYTES_PER_ELEMENT)
        .max(defaults::MIN_RESPONSE_LIMIT)
}

fn read_body(url: &Url, mut resp: Response<Body>, limit: u64) -> Result<String, PlatformError> {
    let status = resp.status();
    let body = resp
        .body_mut()
        .with_config()
        .limit(limit)
        .read_to_string()
        .map_err(|source| PlatformError::Transport {
            url: url.to_string(),
            source,
        })?;
    if !status.is_success() {
        return Err(PlatformError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn decode<T: DeserializeOwned>(url: &Url, body: &str) -> Result<T, PlatformError> {
    serde_json::from_str(body).map_err(|source| PlatformError::Decode {
        url: url.to_string(),
        source,
    })
}

impl Platform for C8yClient {
    fn get_managed_object(&self, id: &str) -> Result<ManagedObject, PlatformError> {
        let url = self.url(["inventory", "managedObjects", id])?;
        self.get_json(&url, &[])
    }

    fn managed_objects_by_fragment_type(&self, fragment_type: &str) -> Paged<'_, ManagedObject> {
        self.paged(
            MANAGED_OBJECTS_PATH,
            MANAGED_OBJECTS_KEY,
            vec![("fragmentType", fragment_type.to_string())],
        )
    }

    fn external_ids_of(&self, managed_object_id: &str) -> Paged<'_, ExternalId> {
        self.paged(
            ["identity", "globalIds", managed_object_id, "externalIds"],
            EXTERNAL_IDS_KEY,
            Vec::new(),
        )
    }

    fn records_by_source(&self, kind: RecordKind, source_id: &str) -> Paged<'_, Record> {
        self.paged(
            kind.path().split('/'),
            kind.collection_key(),
            vec![("source", source_id.to_string())],
        )
    }

    fn create_managed_object(&self, object: &ManagedObject) -> Result<ManagedObject, PlatformError> {
        let url = self.url(MANAGED_OBJECTS_PATH)?;
        self.post_json(&url, object)
    }

    fn create_external_id(&self, external_id: &ExternalId) -> Result<ExternalId, PlatformError> {
        let owner = external_id.managed_object.as_ref().ok_or_else(|| {
            PlatformError::MissingReference(format!(
                "external ID {}/{}",
                external_id.id_type, external_id.external_id
            ))
        })?;
        let url = self.url(["identity", "globalIds", owner.id.as_str(), "externalIds"])?;
        let body = json!({
            "type": external_id.id_type,
            "externalId": external_id.external_id,
        });
        self.post_json(&url, &body)
    }

    fn create_record(&self, kind: RecordKind, record: &Record) -> Result<Record, PlatformError> {
        let url = self.url(kind.path().split('/'))?;
        self.post_json(&url, record)
    }

    fn add_child_device(&self, parent_id: &str, child_id: &str) -> Result<(), PlatformError> {
        let url = self.url(["inventory", "managedObjects", parent_id, "childDevices"])?;
        let body = json!({ "managedObject": { "id": child_id } });
        self.post(&url, REFERENCE_CONTENT_TYPE, &body)?;
        Ok(())
    }
}
