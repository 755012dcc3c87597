//! Identifiers shared between the draft store, the assembler and the gateway.

/// Persisted-storage key holding the whole draft.
pub const DRAFT_STORAGE_KEY: &str = "registration-storage";

pub const FIRST_STEP: u8 = 1;
pub const TOTAL_STEPS: u8 = 6;

// Multipart part names expected by the registration endpoint.
pub const LOGO_PART: &str = "logo";
pub const COMMERCIAL_REGISTRATION_PART: &str = "commercial_registration_image";
pub const TAX_FRONT_PART: &str = "tax_image";
pub const TAX_BACK_PART: &str = "tax_image_back";

/// Request header carrying the client fingerprint used for rate limiting.
pub const BROWSER_SIGNATURE_HEADER: &str = "x-browser-signature";
pub const UNKNOWN_SIGNATURE: &str = "unknown";
pub const NO_EMAIL: &str = "no-email";

/// HTTP status reported for rate-limited submissions.
pub const TOO_MANY_REQUESTS: u16 = 429;
