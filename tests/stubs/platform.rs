use std::cell::{Cell, RefCell};

use serde_json::json;
use tenant_copy::interfaces::{Paged, Platform, PlatformError};
use tenant_copy::models::{
    ExternalId, ManagedObject, ObjectRef, ObjectReference, Record, RecordKind, ReferenceCollection,
};

/// In-memory tenant. IDs are handed out as `<prefix><n>` so objects of the source and
/// target tenant can never be confused.
pub struct MockPlatform {
    prefix: &'static str,
    next_id: Cell<u32>,
    pub objects: RefCell<Vec<ManagedObject>>,
    pub external_ids: RefCell<Vec<ExternalId>>,
    pub records: RefCell<Vec<(RecordKind, Record)>>,
    pub child_links: RefCell<Vec<(String, String)>>,
    /// Bodies exactly as handed to `create_managed_object`
    pub create_requests: RefCell<Vec<ManagedObject>>,
    fail_after_records: Cell<Option<usize>>,
}

fn not_found(path: String) -> PlatformError {
    PlatformError::Status {
        url: path,
        status: 404,
        body: "Not Found".into(),
    }
}

impl MockPlatform {
    pub fn new(prefix: &'static str) -> Self {
        MockPlatform {
            prefix,
            next_id: Cell::new(1),
            objects: RefCell::new(Vec::new()),
            external_ids: RefCell::new(Vec::new()),
            records: RefCell::new(Vec::new()),
            child_links: RefCell::new(Vec::new()),
            create_requests: RefCell::new(Vec::new()),
            fail_after_records: Cell::new(None),
        }
    }

    fn assign_id(&self) -> String {
        let n = self.next_id.get();
        self.next_id.set(n + 1);
        format!("{}{n}", self.prefix)
    }

    /// Refuse every record creation once `n` records have been stored
    pub fn fail_after_records(&self, n: usize) {
        self.fail_after_records.set(Some(n));
    }

    pub fn add_device(&self, name: &str, device_marker: bool) -> String {
        let id = self.assign_id();
        let mut object: ManagedObject = serde_json::from_value(json!({
            "id": id,
            "self": format!("https://{}.example.com/inventory/managedObjects/{id}", self.prefix),
            "lastUpdated": "2024-02-01T10:00:00.000Z",
            "creationTime": "2023-01-01T10:00:00.000Z",
            "name": name,
            "type": "c8y_Device",
        }))
        .unwrap();
        if device_marker {
            object.fragments.insert("c8y_IsDevice".into(), json!({}));
        }
        self.objects.borrow_mut().push(object);
        id
    }

    pub fn add_child(&self, parent: &str, child: &str) {
        let mut objects = self.objects.borrow_mut();
        let parent = objects
            .iter_mut()
            .find(|o| o.id.as_deref() == Some(parent))
            .unwrap();
        parent
            .child_devices
            .get_or_insert_with(ReferenceCollection::default)
            .references
            .push(ObjectReference {
                managed_object: ObjectRef::to(child),
            });
    }

    pub fn add_external_id(&self, owner: &str, id_type: &str, value: &str) {
        self.external_ids.borrow_mut().push(ExternalId {
            external_id: value.into(),
            id_type: id_type.into(),
            managed_object: Some(ObjectRef::to(owner)),
            self_link: Some(format!("https://{}.example.com/identity/externalIds/{id_type}/{value}", self.prefix)),
        });
    }

    pub fn add_records(&self, kind: RecordKind, source: &str, count: usize) {
        for i in 0..count {
            let record: Record = serde_json::from_value(json!({
                "id": self.assign_id(),
                "source": {"id": source},
                "time": "2024-02-01T10:00:00.000Z",
                "type": format!("test_{kind}"),
                "text": format!("{kind} {i} of {source}"),
            }))
            .unwrap();
            self.records.borrow_mut().push((kind, record));
        }
    }

    pub fn object(&self, id: &str) -> Option<ManagedObject> {
        self.objects
            .borrow()
            .iter()
            .find(|o| o.id.as_deref() == Some(id))
            .cloned()
    }

    pub fn name_of(&self, id: &str) -> String {
        self.object(id)
            .and_then(|o| o.fragments.get("name").and_then(|n| n.as_str().map(String::from)))
            .unwrap_or_default()
    }

    /// IDs of all objects with the given name
    pub fn ids_named(&self, name: &str) -> Vec<String> {
        self.objects
            .borrow()
            .iter()
            .filter(|o| o.fragments.get("name").and_then(|n| n.as_str()) == Some(name))
            .filter_map(|o| o.id.clone())
            .collect()
    }

    pub fn record_count(&self, kind: RecordKind) -> usize {
        self.records.borrow().iter().filter(|(k, _)| *k == kind).count()
    }
}

impl Platform for MockPlatform {
    fn get_managed_object(&self, id: &str) -> Result<ManagedObject, PlatformError> {
        self.object(id)
            .ok_or_else(|| not_found(format!("/inventory/managedObjects/{id}")))
    }

    fn managed_objects_by_fragment_type(&self, fragment_type: &str) -> Paged<'_, ManagedObject> {
        let matching = self
            .objects
            .borrow()
            .iter()
            .filter(|o| o.fragments.contains_key(fragment_type))
            .cloned()
            .collect::<Vec<_>>();
        Box::new(matching.into_iter().map(Ok))
    }

    fn external_ids_of(&self, managed_object_id: &str) -> Paged<'_, ExternalId> {
        let matching = self
            .external_ids
            .borrow()
            .iter()
            .filter(|e| e.managed_object.as_ref().map(|m| m.id.as_str()) == Some(managed_object_id))
            .cloned()
            .collect::<Vec<_>>();
        Box::new(matching.into_iter().map(Ok))
    }

    fn records_by_source(&self, kind: RecordKind, source_id: &str) -> Paged<'_, Record> {
        let matching = self
            .records
            .borrow()
            .iter()
            .filter(|(k, r)| *k == kind && r.source.as_ref().map(|s| s.id.as_str()) == Some(source_id))
            .map(|(_, r)| r.clone())
            .collect::<Vec<_>>();
        Box::new(matching.into_iter().map(Ok))
    }

    fn create_managed_object(&self, object: &ManagedObject) -> Result<ManagedObject, PlatformError> {
        self.create_requests.borrow_mut().push(object.clone());
        let mut created = object.clone();
        created.id = Some(self.assign_id());
        created.last_updated = Some("2024-03-01T08:00:00.000Z".into());
        self.objects.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn create_external_id(&self, external_id: &ExternalId) -> Result<ExternalId, PlatformError> {
        let owner = external_id
            .managed_object
            .as_ref()
            .ok_or_else(|| PlatformError::MissingReference(external_id.external_id.clone()))?;
        if self.object(&owner.id).is_none() {
            return Err(not_found(format!("/identity/globalIds/{}/externalIds", owner.id)));
        }
        self.external_ids.borrow_mut().push(external_id.clone());
        Ok(external_id.clone())
    }

    fn create_record(&self, kind: RecordKind, record: &Record) -> Result<Record, PlatformError> {
        if let Some(limit) = self.fail_after_records.get() {
            if self.records.borrow().len() >= limit {
                return Err(PlatformError::Status {
                    url: format!("/{}", kind.path()),
                    status: 500,
                    body: "Internal Server Error".into(),
                });
            }
        }
        let mut created = record.clone();
        created.id = Some(self.assign_id());
        self.records.borrow_mut().push((kind, created.clone()));
        Ok(created)
    }

    fn add_child_device(&self, parent_id: &str, child_id: &str) -> Result<(), PlatformError> {
        if self.object(parent_id).is_none() || self.object(child_id).is_none() {
            return Err(not_found(format!("/inventory/managedObjects/{parent_id}/childDevices")));
        }
        self.child_links
            .borrow_mut()
            .push((parent_id.to_string(), child_id.to_string()));
        Ok(())
    }
}
