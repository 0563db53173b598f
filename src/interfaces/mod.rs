mod c8y_api;
mod pages;
mod platform;

pub use c8y_api::C8yClient;
pub use platform::{Paged, Platform, PlatformError};
