use std::time::Duration;

pub const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const CONFIG_PATH: &str = "./config.properties";
pub const LOG_LEVEL: &str = "warn";
pub const PAGE_SIZE: usize = 2000;

// Fragment that marks a managed object as a device
pub const DEVICE_FRAGMENT: &str = "c8y_IsDevice";

// A progress line is printed every time a record counter reaches a multiple of this
pub const PROGRESS_INTERVAL: u64 = 100;

// Response bodies are read up to this many bytes per requested page element, and never
// less than MIN_RESPONSE_LIMIT
pub const RESPONSE_BYTES_PER_ELEMENT: u64 = 64 * 1024;
pub const MIN_RESPONSE_LIMIT: u64 = 10 * 1024 * 1024;
