//! Provider scope shared by integration tests that address volume URLs.
//!
//! Kept apart from `test_constants.rs` so test crates that only need the API
//! token do not compile unused items:
//!
//! ```rust
//! #[path = "common/scope_constants.rs"]
//! mod scope_constants;
//! ```

/// Project every test volume lives in.
pub const PROJECT_ID: u64 = 1;

/// Region every test volume lives in.
pub const REGION_ID: u64 = 2;
