use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fragments the platform assigns or maintains itself. They are dropped before an
/// object is recreated since they describe the object's place in the source tenant.
const SERVER_MANAGED_FRAGMENTS: [&str; 6] = [
    "creationTime",
    "childAssets",
    "childAdditions",
    "assetParents",
    "deviceParents",
    "additionParents",
];

/// Reference to a managed object, as embedded in other records
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ObjectRef {
    pub id: String,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

impl ObjectRef {
    pub fn to(id: impl Into<String>) -> Self {
        ObjectRef {
            id: id.into(),
            self_link: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    pub managed_object: ObjectRef,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ReferenceCollection {
    #[serde(default)]
    pub references: Vec<ObjectReference>,
}

/// A device or asset in the inventory. Everything apart from the identity,
/// timestamps and child references is kept verbatim in `fragments`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_devices: Option<ReferenceCollection>,
    #[serde(flatten)]
    pub fragments: Map<String, Value>,
}

impl ManagedObject {
    /// IDs of the child devices referenced by this object, in source order
    pub fn child_device_ids(&self) -> Vec<&str> {
        self.child_devices
            .as_ref()
            .map(|c| {
                c.references
                    .iter()
                    .map(|r| r.managed_object.id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Copy of this object suitable for creation on another tenant: no identity,
    /// no modification timestamp, no references into the source tenant.
    pub fn to_create(&self) -> ManagedObject {
        let mut fragments = self.fragments.clone();
        for key in SERVER_MANAGED_FRAGMENTS {
            fragments.remove(key);
        }
        ManagedObject {
            id: None,
            self_link: None,
            last_updated: None,
            child_devices: None,
            fragments,
        }
    }
}

/// Secondary identifier (e.g. a serial number) bound to a managed object
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalId {
    pub external_id: String,
    #[serde(rename = "type")]
    pub id_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_object: Option<ObjectRef>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

impl ExternalId {
    pub fn rebind(&self, target_id: &str) -> ExternalId {
        ExternalId {
            external_id: self.external_id.clone(),
            id_type: self.id_type.clone(),
            managed_object: Some(ObjectRef::to(target_id)),
            self_link: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Measurement,
    Event,
    Alarm,
}

impl RecordKind {
    /// REST collection path, relative to the tenant base URL
    pub fn path(self) -> &'static str {
        match self {
            RecordKind::Measurement => "measurement/measurements",
            RecordKind::Event => "event/events",
            RecordKind::Alarm => "alarm/alarms",
        }
    }

    /// Name of the array holding the elements in a collection response
    pub fn collection_key(self) -> &'static str {
        match self {
            RecordKind::Measurement => "measurements",
            RecordKind::Event => "events",
            RecordKind::Alarm => "alarms",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_key())
    }
}

/// A measurement, event or alarm. All three share the same envelope: an identity,
/// a source object and a free-form payload.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ObjectRef>,
    #[serde(flatten)]
    pub fragments: Map<String, Value>,
}

impl Record {
    pub fn rebind(&self, target_id: &str) -> Record {
        Record {
            id: None,
            self_link: None,
            source: Some(ObjectRef::to(target_id)),
            fragments: self.fragments.clone(),
        }
    }
}
