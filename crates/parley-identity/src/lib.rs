//! `parley-identity`: adapter for the hosted identity and profile service.
//!
//! Parley does not own accounts. Sign-up, sign-in, magic links and the
//! single `profiles` row per user are delegated to an external
//! backend-as-a-service; this crate is the only place that talks to it.
//!
//! # Architecture
//!
//! ```text
//! IdentityProvider (trait)
//!     │
//!     ├── RestIdentityProvider    ← GoTrue-style /auth/v1 + /rest/v1/profiles
//!     │
//!     └── MemoryIdentityProvider  ← in-process accounts for local use and tests
//!
//! SessionCell  ← current session + broadcast of SessionChange,
//!                shared by both providers
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use parley_identity::{IdentityProvider, MemoryIdentityProvider, SignUpAttributes};
//!
//! let provider = MemoryIdentityProvider::new();
//! let mut changes = provider.subscribe();
//!
//! provider.sign_up("ada@example.com", "hunter22", SignUpAttributes::default()).await?;
//! provider.sign_in_with_password("ada@example.com", "hunter22").await?;
//!
//! let change = changes.recv().await?;
//! assert!(change.session.is_some());
//! ```

pub mod error;
pub mod memory;
pub mod provider;
pub mod rest;
pub mod session;
pub mod types;

pub use error::IdentityError;
pub use memory::MemoryIdentityProvider;
pub use provider::IdentityProvider;
pub use rest::RestIdentityProvider;
pub use session::SessionCell;
pub use types::{
    AuthEvent, AuthSession, NewProfile, Profile, SessionChange, SignUpAttributes, SignUpOutcome,
    User,
};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, IdentityError>;
