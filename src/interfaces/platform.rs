use thiserror::Error;

use crate::models::{ExternalId, ManagedObject, Record, RecordKind};

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("response from {url} has no '{key}' collection")]
    MissingCollection { url: String, key: &'static str },
    #[error("{0} has no managed object reference")]
    MissingReference(String),
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Lazily fetched, exhaustive sequence of query results. Consumed once.
pub type Paged<'a, T> = Box<dyn Iterator<Item = Result<T, PlatformError>> + 'a>;

/// Operations the copy needs from one tenant of the IoT platform
pub trait Platform {
    fn get_managed_object(&self, id: &str) -> Result<ManagedObject, PlatformError>;

    fn managed_objects_by_fragment_type(&self, fragment_type: &str) -> Paged<'_, ManagedObject>;

    fn external_ids_of(&self, managed_object_id: &str) -> Paged<'_, ExternalId>;

    fn records_by_source(&self, kind: RecordKind, source_id: &str) -> Paged<'_, Record>;

    /// Returns the object as stored, including the identity assigned by the platform
    fn create_managed_object(&self, object: &ManagedObject) -> Result<ManagedObject, PlatformError>;

    /// Binds `external_id` to the managed object it references
    fn create_external_id(&self, external_id: &ExternalId) -> Result<ExternalId, PlatformError>;

    fn create_record(&self, kind: RecordKind, record: &Record) -> Result<Record, PlatformError>;

    fn add_child_device(&self, parent_id: &str, child_id: &str) -> Result<(), PlatformError>;
}
