// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Sieve";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "sieve";

// =============================================================================
// Configuration Files
// =============================================================================

/// Profile folder under the home directory
pub const APP_DOT_FOLDER: &str = ".sieve";

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "sieve.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "SIEVE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "SIEVE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "SIEVE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "SIEVE_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

/// Request body limit for query endpoints
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

// =============================================================================
// Environment Variables - Query
// =============================================================================

/// Environment variable for the maximum page size
pub const ENV_MAX_PAGE_SIZE: &str = "SIEVE_MAX_PAGE_SIZE";

/// Environment variable for the maximum number of columns per request
pub const ENV_MAX_COLUMNS: &str = "SIEVE_MAX_COLUMNS";

/// Environment variable for the store's identifier field
pub const ENV_ID_FIELD: &str = "SIEVE_ID_FIELD";

/// Environment variable for the store's identifier type
pub const ENV_ID_KIND: &str = "SIEVE_ID_KIND";

// =============================================================================
// Query Defaults
// =============================================================================

/// Maximum number of columns accepted in one request
pub const DEFAULT_MAX_COLUMNS: usize = 50;
