//! Small helpers every wizard crate may depend on: layered config loading, client
//! signatures for rate limiting, and attachment ids.
//!
//! ## Attachment ids
//! ```rust
//! # use mkp_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Config loading
//! ```rust,no_run
//! use mkp_kernel::config::load_config;
//! use mkp_kernel::domain::config::WizardConfig;
//!
//! let cfg: WizardConfig = load_config(Some("config/wizard.toml")).unwrap();
//! println!("{}", cfg.gateway.base_url);
//! ```
pub mod config;
pub mod security;

/// Id alphabet without look-alike characters (`I`, `O`, `l`, `0`, `1`).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use mkp_domain as domain;
pub use nanoid::nanoid;

/// 12-character id (or `$size`) drawn from [`SAFE_ALPHABET`].
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
