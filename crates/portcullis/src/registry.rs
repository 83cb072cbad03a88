//! # Access control registry
//!
//! The registry is the configuration object for one authorization domain:
//! it maps role names to predicates and holds the default user source and
//! granted/denied callbacks that new evaluations snapshot.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{AccessError, AccessResult};
use crate::evaluation::Evaluation;
use crate::user::{ResolvedUser, UserSource};

/// A role predicate: does this user hold the role?
pub type Predicate<U> = Arc<dyn Fn(&U) -> bool + Send + Sync>;

/// Callback invoked when every required role passes. Its return value is the
/// success result of the evaluation.
pub type GrantedCallback<R> = Arc<dyn Fn() -> R + Send + Sync>;

/// Callback invoked with a human-readable reason when a required role fails.
///
/// Returning `Err` models the raising default; returning `Ok` makes the
/// value the immediate result of the evaluation (a non-raising sentinel).
pub type DeniedCallback<R> = Arc<dyn Fn(&str) -> AccessResult<R> + Send + Sync>;

/// Role registry and evaluation defaults for one authorization domain.
///
/// An `AccessControl` owns the role-name → predicate mapping plus the default
/// user source and granted/denied callbacks. Each call to [`evaluation`] or
/// [`evaluation_for`] snapshots those defaults into a fresh [`Evaluation`];
/// construct one registry per authorization domain rather than sharing
/// process-wide mutable state.
///
/// `U` is the caller's user type; `R` is the callback result type and
/// defaults to `bool`, where the built-in callbacks make a passing
/// evaluation return `true` and a failing one return
/// [`AccessError::NotAuthorized`].
///
/// # Examples
///
/// ```
/// use portcullis::AccessControl;
///
/// let mut control = AccessControl::new();
/// control.add_role("admin", |user: &String| user == "root");
///
/// let granted = control
///     .evaluation_for("root".to_string())
///     .only("admin")
///     .allowed()
///     .unwrap();
/// assert!(granted);
///
/// let denied = control
///     .evaluation_for("guest".to_string())
///     .only("admin")
///     .allowed();
/// assert!(denied.is_err());
/// ```
///
/// [`evaluation`]: AccessControl::evaluation
/// [`evaluation_for`]: AccessControl::evaluation_for
pub struct AccessControl<U, R = bool> {
    /// Default user source for evaluations that don't supply one.
    user: Option<UserSource<U>>,
    /// Registered role predicates, keyed by role name.
    pub(crate) roles: HashMap<String, Predicate<U>>,
    /// Default success callback.
    pub(crate) granted: GrantedCallback<R>,
    /// Default failure callback.
    pub(crate) denied: DeniedCallback<R>,
}

impl<U> AccessControl<U> {
    /// Create a registry with the built-in callbacks.
    ///
    /// The defaults make `allowed` return `Ok(true)` when every required
    /// role passes and `Err(AccessError::NotAuthorized)` on the first
    /// failure, discarding the reason string.
    pub fn new() -> Self {
        Self {
            user: None,
            roles: HashMap::new(),
            granted: Arc::new(|| true),
            denied: Arc::new(|_| Err(AccessError::NotAuthorized)),
        }
    }
}

impl<U> Default for AccessControl<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U, R> AccessControl<U, R> {
    /// Create a registry with explicit default callbacks.
    ///
    /// This is the entry point for result types other than `bool`: both
    /// callbacks fix `R` up front and can later be replaced with
    /// [`set_granted`] / [`set_denied`].
    ///
    /// # Arguments
    ///
    /// * `granted` - Invoked with no arguments when every required role passes
    /// * `denied` - Invoked with the failure reason on the first failing role
    ///
    /// # Examples
    ///
    /// ```
    /// use portcullis::AccessControl;
    ///
    /// let mut control = AccessControl::with_callbacks(
    ///     || "authorized".to_string(),
    ///     |reason: &str| Ok(reason.to_string()),
    /// );
    /// control.add_role("admin", |user: &String| user == "root");
    ///
    /// let outcome = control
    ///     .evaluation_for("guest".to_string())
    ///     .only("admin")
    ///     .allowed()
    ///     .unwrap();
    /// assert_eq!(outcome, "User is not admin");
    /// ```
    ///
    /// [`set_granted`]: AccessControl::set_granted
    /// [`set_denied`]: AccessControl::set_denied
    pub fn with_callbacks(
        granted: impl Fn() -> R + Send + Sync + 'static,
        denied: impl Fn(&str) -> AccessResult<R> + Send + Sync + 'static,
    ) -> Self {
        Self {
            user: None,
            roles: HashMap::new(),
            granted: Arc::new(granted),
            denied: Arc::new(denied),
        }
    }

    /// Register a role predicate.
    ///
    /// Registering an existing name silently replaces its predicate for all
    /// future lookups. References already snapshotted by an `only` call on a
    /// live evaluation keep the predicate they captured.
    ///
    /// # Arguments
    ///
    /// * `name` - The role name
    /// * `predicate` - Returns `true` when the user holds the role
    pub fn add_role(
        &mut self,
        name: impl Into<String>,
        predicate: impl Fn(&U) -> bool + Send + Sync + 'static,
    ) {
        self.roles.insert(name.into(), Arc::new(predicate));
    }

    /// Remove a registered role.
    ///
    /// # Arguments
    ///
    /// * `name` - The role name to remove
    ///
    /// # Returns
    ///
    /// `true` if the role was registered, `false` otherwise
    pub fn remove_role(&mut self, name: &str) -> bool {
        self.roles.remove(name).is_some()
    }

    /// Check if a role is registered.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    /// Get the registered role names, sorted alphabetically.
    pub fn role_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered roles.
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    /// Set the default user source.
    ///
    /// Accepts a plain value via `From`, or a [`UserSource::resolver`] that
    /// is invoked once per evaluation created without an explicit user.
    ///
    /// # Arguments
    ///
    /// * `user` - The default user value or resolver
    pub fn set_user(&mut self, user: impl Into<UserSource<U>>) {
        self.user = Some(user.into());
    }

    /// Replace the default granted callback.
    pub fn set_granted(&mut self, granted: impl Fn() -> R + Send + Sync + 'static) {
        self.granted = Arc::new(granted);
    }

    /// Replace the default denied callback.
    pub fn set_denied(&mut self, denied: impl Fn(&str) -> AccessResult<R> + Send + Sync + 'static) {
        self.denied = Arc::new(denied);
    }

    /// Create an evaluation using the registry's default user.
    ///
    /// The registry's callbacks are snapshotted and a configured resolver is
    /// invoked exactly once, now. If no default user is set the evaluation
    /// has no user: it still grants with zero required roles and fails with
    /// [`AccessError::MissingUser`] as soon as a role must be checked.
    pub fn evaluation(&self) -> Evaluation<'_, U, R> {
        let user = self.user.as_ref().map(UserSource::resolve_ref);
        Evaluation::new(self, user)
    }

    /// Create an evaluation for an explicit user, overriding the default.
    ///
    /// A resolver source is invoked exactly once, now; the resolved user is
    /// reused for every role check and repeated `allowed` calls.
    ///
    /// # Arguments
    ///
    /// * `user` - The user value or resolver for this evaluation
    ///
    /// # Examples
    ///
    /// ```
    /// use portcullis::{AccessControl, UserSource};
    ///
    /// let mut control = AccessControl::new();
    /// control.add_role("admin", |user: &String| user == "root");
    ///
    /// let from_resolver = control
    ///     .evaluation_for(UserSource::resolver(|| "root".to_string()))
    ///     .only("admin")
    ///     .allowed()
    ///     .unwrap();
    /// assert!(from_resolver);
    /// ```
    pub fn evaluation_for(&self, user: impl Into<UserSource<U>>) -> Evaluation<'_, U, R> {
        let user = ResolvedUser::Owned(user.into().resolve());
        Evaluation::new(self, Some(user))
    }
}

impl<U, R> fmt::Debug for AccessControl<U, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessControl")
            .field("roles", &self.role_names())
            .field("user", &self.user)
            .field("granted", &"[callback]")
            .field("denied", &"[callback]")
            .finish()
    }
}
