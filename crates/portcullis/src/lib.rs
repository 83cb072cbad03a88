//! # Portcullis
//!
//! Embeddable role-based authorization checks for Rust applications:
//! register named role predicates once, then answer "may this user do
//! this?" per action with a chainable evaluation builder.
//!
//! ## Overview
//!
//! The portcullis crate handles:
//! - **Registry** ([`AccessControl`]): role name → predicate mapping plus
//!   the default user source and callbacks
//! - **Evaluations** ([`Evaluation`]): one authorization check, built with
//!   `only(role)` chains and answered by `allowed()`
//! - **User sources** ([`UserSource`]): a plain user value or a resolver
//!   closure invoked once per evaluation
//! - **Callbacks**: `granted`/`denied` hooks that turn a check's outcome
//!   into the caller's result type
//!
//! ## Flow
//!
//! ```text
//! AccessControl                 one per authorization domain
//!   ├─ roles:     name → predicate
//!   ├─ user:      default value or resolver
//!   └─ callbacks: granted / denied
//!         │
//!         │  evaluation() / evaluation_for(user)   snapshots user + callbacks
//!         ▼
//! Evaluation ─ only("admin") ─ only("editor")      captures predicates
//!         │
//!         │  allowed()                             checks in declaration order
//!         ▼
//!   Ok(granted())        every required role passed
//!   denied(reason)       first false predicate, result returned as-is
//!   Err(UnknownRole)     required name never registered
//!   Err(MissingUser)     role check with no user
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use portcullis::AccessControl;
//!
//! // Register roles once, at startup
//! let mut control = AccessControl::new();
//! control.add_role("admin", |user: &String| user == "root");
//! control.add_role("editor", |user: &String| user != "guest");
//!
//! // Per action: who is asking, which roles must hold?
//! let granted = control
//!     .evaluation_for("root".to_string())
//!     .only("admin")
//!     .allowed()
//!     .unwrap();
//! assert!(granted);
//!
//! // Denials raise by default
//! let denied = control
//!     .evaluation_for("guest".to_string())
//!     .only("admin")
//!     .allowed();
//! assert!(denied.is_err());
//! ```
//!
//! ## Callback precedence
//!
//! Three tiers, most specific wins:
//! 1. Per-call [`Overrides`] passed to [`Evaluation::allowed_with`]
//! 2. Builder callbacks set with [`Evaluation::with_granted`] /
//!    [`Evaluation::with_denied`]
//! 3. Registry defaults, snapshotted when the evaluation is created
//!
//! ## Concurrency
//!
//! An [`AccessControl`] is configured up front (`&mut self`) and then
//! shared; evaluations borrow it immutably, so any number can run at once.
//! Reconfiguring while an evaluation is alive is rejected at compile time.

pub mod error;
pub mod evaluation;
pub mod registry;
pub mod user;

// Re-export main types for convenience
pub use error::{AccessError, AccessResult};
pub use evaluation::{Evaluation, Overrides};
pub use registry::{AccessControl, DeniedCallback, GrantedCallback, Predicate};
pub use user::UserSource;
