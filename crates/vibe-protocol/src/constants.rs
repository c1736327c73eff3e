/// Requests admitted per identifier per UTC day.
pub const DAILY_LIMIT: u32 = 10;

/// Separates the stable fingerprint from the volatile storage token.
pub const TOKEN_DELIMITER: char = '-';

/// Persisted document file names, relative to the data directory.
pub const FINGERPRINT_DOCUMENT: &str = "device_fingerprints.json";
pub const NAME_DOCUMENT: &str = "ip_names.json";
pub const QUOTA_DOCUMENT: &str = "rate_limit.json";
pub const EVENT_LOG_FILE: &str = "meme_logs.ndjson";

/// Rejection text returned once an identifier has spent its daily budget.
pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "You have hit your daily meme limit. Come back tomorrow 👀";

/// Rejection text for an upload without image bytes.
pub const MISSING_IMAGE_MESSAGE: &str = "No image uploaded";

/// Number of words in a generated display name.
pub const NAME_WORDS: usize = 2;
