use std::path::PathBuf;

#[derive(Debug)]
pub struct CopyArgs {
    pub config_path: PathBuf,
    /// Copy only this device and its descendants
    pub device_id: Option<String>,
}
