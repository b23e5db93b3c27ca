/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Username reserved for the `/users/me` endpoint (compared case-insensitively)
pub const RESERVED_USERNAME: &str = "me";

/// Earliest release year accepted for a title
pub const MIN_TITLE_YEAR: i32 = 1900;
