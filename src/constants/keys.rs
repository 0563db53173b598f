// Keys in config.properties
pub const SOURCE_URL: &str = "sourceUrl";
pub const SOURCE_USERNAME: &str = "sourceUsername";
pub const SOURCE_PASSWORD: &str = "sourcePassword";
pub const TARGET_URL: &str = "targetUrl";
pub const TARGET_USERNAME: &str = "targetUsername";
pub const TARGET_PASSWORD: &str = "targetPassword";

// Optional keys
pub const ALARM_ENDPOINT: &str = "alarmEndpoint";
pub const PAGE_SIZE: &str = "pageSize";
