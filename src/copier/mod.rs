//! Depth-first copy of device trees from a source tenant to a target tenant.
//!
//! For every device the copier creates the object on the target, then its external
//! IDs, measurements, alarms and events, and finally recurses into the child devices,
//! linking each created child to its newly created parent. Nothing is retried or
//! rolled back: the first platform error ends the run and whatever was created
//! before stays on the target.

use thiserror::Error;

use crate::config::AlarmRoute;
use crate::constants::defaults;
use crate::interfaces::{Platform, PlatformError};
use crate::models::{ManagedObject, RecordKind};

mod stats;

pub use stats::CopyStats;

#[derive(Error, Debug)]
pub enum CopyError {
    #[error("could not list devices on the source tenant: {0}")]
    List(#[source] PlatformError),
    #[error("copying device {device} failed: {source}")]
    Platform {
        device: String,
        #[source]
        source: PlatformError,
    },
    #[error("{side} tenant returned a managed object without id{}", context_suffix(.device))]
    MissingId {
        side: &'static str,
        device: Option<String>,
    },
}

fn context_suffix(device: &Option<String>) -> String {
    device
        .as_ref()
        .map(|d| format!(" (copy of {d})"))
        .unwrap_or_default()
}

fn failed(device: &str) -> impl FnOnce(PlatformError) -> CopyError + '_ {
    move |source| CopyError::Platform {
        device: device.to_string(),
        source,
    }
}

/// A device created on the target together with everything created for its subtree
#[derive(Debug)]
pub struct CopiedDevice {
    pub id: String,
    pub object: ManagedObject,
    pub stats: CopyStats,
}

pub struct Copier<'a> {
    source: &'a dyn Platform,
    target: &'a dyn Platform,
    alarm_route: AlarmRoute,
    stats: CopyStats,
}

impl<'a> Copier<'a> {
    pub fn new(source: &'a dyn Platform, target: &'a dyn Platform, alarm_route: AlarmRoute) -> Self {
        Copier {
            source,
            target,
            alarm_route,
            stats: CopyStats::default(),
        }
    }

    /// Totals of the run so far, including work done before a failure
    pub fn stats(&self) -> CopyStats {
        self.stats
    }

    /// Copy the device `device_id` with its descendants, or every object carrying the
    /// device fragment when no ID is given.
    pub fn copy_device_tree(&mut self, device_id: Option<&str>) -> Result<CopyStats, CopyError> {
        let source = self.source;
        match device_id {
            Some(id) => {
                let device = source.get_managed_object(id).map_err(failed(id))?;
                self.copy_device(&device)?;
            }
            None => {
                for device in source.managed_objects_by_fragment_type(defaults::DEVICE_FRAGMENT) {
                    let device = device.map_err(CopyError::List)?;
                    self.copy_device(&device)?;
                }
            }
        }
        Ok(self.stats)
    }

    pub fn copy_device(&mut self, device: &ManagedObject) -> Result<CopiedDevice, CopyError> {
        let before = self.stats;
        let source_id = device.id.as_deref().ok_or(CopyError::MissingId {
            side: "source",
            device: None,
        })?;

        let object = self
            .target
            .create_managed_object(&device.to_create())
            .map_err(failed(source_id))?;
        let target_id = object.id.clone().ok_or_else(|| CopyError::MissingId {
            side: "target",
            device: Some(source_id.to_string()),
        })?;
        self.stats.devices += 1;
        log::info!("Created device {target_id} as copy of {source_id}");

        self.copy_external_ids(source_id, &target_id)?;
        self.copy_records(RecordKind::Measurement, source_id, &target_id)?;
        self.copy_records(RecordKind::Alarm, source_id, &target_id)?;
        self.copy_records(RecordKind::Event, source_id, &target_id)?;
        self.copy_children(device, source_id, &target_id)?;

        Ok(CopiedDevice {
            id: target_id,
            object,
            stats: self.stats - before,
        })
    }

    fn copy_external_ids(&mut self, source_id: &str, target_id: &str) -> Result<(), CopyError> {
        let source = self.source;
        for external_id in source.external_ids_of(source_id) {
            let external_id = external_id.map_err(failed(source_id))?;
            self.target
                .create_external_id(&external_id.rebind(target_id))
                .map_err(failed(source_id))?;
            self.stats.external_ids += 1;
            log::debug!(
                "Copied external ID {}/{} to {target_id}",
                external_id.id_type,
                external_id.external_id
            );
        }
        Ok(())
    }

    fn copy_records(
        &mut self,
        kind: RecordKind,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), CopyError> {
        let endpoint = match kind {
            RecordKind::Alarm => self.alarm_route.kind(),
            other => other,
        };
        let source = self.source;
        for record in source.records_by_source(kind, source_id) {
            let record = record.map_err(failed(source_id))?;
            self.target
                .create_record(endpoint, &record.rebind(target_id))
                .map_err(failed(source_id))?;

            let count = self.stats.add_record(kind);
            if count % defaults::PROGRESS_INTERVAL == 0 {
                println!("Processed {count} {kind}");
            }
        }
        Ok(())
    }

    fn copy_children(
        &mut self,
        device: &ManagedObject,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), CopyError> {
        for child_id in device.child_device_ids() {
            let child = self
                .source
                .get_managed_object(child_id)
                .map_err(failed(child_id))?;
            let copied = self.copy_device(&child)?;
            self.target
                .add_child_device(target_id, &copied.id)
                .map_err(failed(source_id))?;
            log::debug!("Linked {} as child of {target_id}", copied.id);
        }
        Ok(())
    }
}
