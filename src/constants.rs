// Proxy configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3001";
pub const DEFAULT_UPSTREAM_URL: &str = "http://212.220.105.29:8079";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";
pub const MAX_PROXY_BODY_BYTES: usize = 64 * 1024 * 1024;

// Client defaults
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PRESENT_PAGES: u32 = 100;
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";

// Validation limits
pub const MIN_PASSWORD_LENGTH: usize = 4;
pub const MIN_GIFT_PRICE: u32 = 1;
pub const MAX_GIFT_PRICE: u32 = 9999;
pub const MIN_GIFT_STOCK: u32 = 1;
pub const MAX_GIFT_STOCK: u32 = 999;
pub const MAX_GIFT_IMAGES: usize = 8;
pub const MIN_PARTICIPANT_QUERY_LENGTH: usize = 3;

// Error messages
pub const ERR_PROXY: &str = "Proxy error";
pub const ERR_TOO_MANY_IMAGES: &str = "At most 8 images are allowed";
pub const ERR_UNSUPPORTED_IMAGE: &str = "Only JPEG, PNG, HEIC, HEIF and WebP images are allowed";
