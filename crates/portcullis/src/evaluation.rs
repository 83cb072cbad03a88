//! # Evaluation builder
//!
//! Chainable, per-action authorization checks. An [`Evaluation`] snapshots
//! its user and callbacks from the registry at creation, accumulates
//! required roles with [`only`], and answers with [`allowed`].
//!
//! [`only`]: Evaluation::only
//! [`allowed`]: Evaluation::allowed

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{AccessError, AccessResult};
use crate::registry::{AccessControl, DeniedCallback, GrantedCallback, Predicate};
use crate::user::ResolvedUser;

/// One role requirement: the name as declared and the predicate captured
/// from the registry when `only` ran (`None` if it was not registered).
struct RequiredRole<U> {
    name: String,
    predicate: Option<Predicate<U>>,
}

/// A single authorization check in progress.
///
/// Created by [`AccessControl::evaluation`] or
/// [`AccessControl::evaluation_for`], which snapshot the registry's user and
/// callbacks. Role requirements accumulate through [`only`] and are checked
/// in declaration order by [`allowed`], stopping at the first failure.
///
/// An evaluation borrows its registry, so the registry cannot be
/// reconfigured while the evaluation is alive; let the evaluation go
/// before calling the registry's `&mut self` methods.
///
/// # Examples
///
/// ```
/// use portcullis::AccessControl;
///
/// let mut control = AccessControl::new();
/// control.add_role("admin", |user: &String| user == "root");
/// control.add_role("editor", |user: &String| user != "guest");
///
/// let granted = control
///     .evaluation_for("root".to_string())
///     .only("editor")
///     .only("admin")
///     .allowed()
///     .unwrap();
/// assert!(granted);
/// ```
///
/// [`only`]: Evaluation::only
/// [`allowed`]: Evaluation::allowed
pub struct Evaluation<'a, U, R = bool> {
    control: &'a AccessControl<U, R>,
    user: Option<ResolvedUser<'a, U>>,
    required: Vec<RequiredRole<U>>,
    granted: GrantedCallback<R>,
    denied: DeniedCallback<R>,
}

impl<'a, U, R> Evaluation<'a, U, R> {
    /// Snapshot the registry's callbacks and pair them with the resolved user.
    pub(crate) fn new(control: &'a AccessControl<U, R>, user: Option<ResolvedUser<'a, U>>) -> Self {
        Self {
            control,
            user,
            required: Vec::new(),
            granted: Arc::clone(&control.granted),
            denied: Arc::clone(&control.denied),
        }
    }

    /// Require a role for this evaluation.
    ///
    /// The predicate registered under `role` is captured now; replacing the
    /// registration later does not change what this evaluation checks. An
    /// unregistered name is accepted here and reported by [`allowed`] as
    /// [`AccessError::UnknownRole`] when its turn comes.
    ///
    /// Requiring the same name twice keeps its original position and
    /// refreshes the captured predicate rather than adding a duplicate
    /// check.
    ///
    /// # Arguments
    ///
    /// * `role` - The role name to require
    ///
    /// # Examples
    ///
    /// ```
    /// use portcullis::AccessControl;
    ///
    /// let mut control = AccessControl::new();
    /// control.add_role("admin", |user: &String| user == "root");
    /// control.add_role("editor", |user: &String| !user.is_empty());
    ///
    /// let evaluation = control
    ///     .evaluation_for("root".to_string())
    ///     .only("editor")
    ///     .only("admin")
    ///     .only("editor");
    /// assert_eq!(evaluation.required_roles(), vec!["editor", "admin"]);
    /// ```
    ///
    /// [`allowed`]: Evaluation::allowed
    pub fn only(mut self, role: impl Into<String>) -> Self {
        let name = role.into();
        let predicate = self.control.roles.get(&name).cloned();
        if predicate.is_none() {
            warn!(role = %name, "requiring unregistered role");
        }
        match self.required.iter().position(|required| required.name == name) {
            Some(index) => self.required[index].predicate = predicate,
            None => self.required.push(RequiredRole { name, predicate }),
        }
        self
    }

    /// Replace the granted callback for this evaluation.
    ///
    /// Applies to every later [`allowed`] call on this evaluation; the
    /// registry's default is untouched.
    ///
    /// [`allowed`]: Evaluation::allowed
    pub fn with_granted(mut self, granted: impl Fn() -> R + Send + Sync + 'static) -> Self {
        self.granted = Arc::new(granted);
        self
    }

    /// Replace the denied callback for this evaluation.
    ///
    /// Returning `Ok` from the callback turns a failed check into a
    /// non-raising result.
    ///
    /// # Examples
    ///
    /// ```
    /// use portcullis::AccessControl;
    ///
    /// let mut control = AccessControl::new();
    /// control.add_role("admin", |user: &String| user == "root");
    ///
    /// let outcome = control
    ///     .evaluation_for("guest".to_string())
    ///     .only("admin")
    ///     .with_denied(|_| Ok(false))
    ///     .allowed()
    ///     .unwrap();
    /// assert!(!outcome);
    /// ```
    pub fn with_denied(
        mut self,
        denied: impl Fn(&str) -> AccessResult<R> + Send + Sync + 'static,
    ) -> Self {
        self.denied = Arc::new(denied);
        self
    }

    /// Run the check: every required role, in declaration order.
    ///
    /// Stops at the first requirement that does not hold:
    ///
    /// * an unregistered role fails with [`AccessError::UnknownRole`]
    /// * a role check without a user fails with [`AccessError::MissingUser`]
    /// * a false predicate invokes the denied callback with
    ///   `"User is not <role>"` and returns its result directly, so an
    ///   `Ok` from the callback is the evaluation's result
    ///
    /// With no failures (including the zero-requirement case) the granted
    /// callback supplies the `Ok` value. The evaluation is not consumed;
    /// calling again re-runs every predicate.
    pub fn allowed(&self) -> AccessResult<R> {
        self.evaluate(&self.granted, &self.denied)
    }

    /// Run the check with callbacks overridden for this call only.
    ///
    /// Callbacks absent from `overrides` fall back to the evaluation's own;
    /// nothing is remembered afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use portcullis::{AccessControl, Overrides};
    ///
    /// let mut control = AccessControl::new();
    /// control.add_role("admin", |user: &String| user == "root");
    ///
    /// let evaluation = control.evaluation_for("guest".to_string()).only("admin");
    ///
    /// let soft = evaluation.allowed_with(Overrides::new().denied(|_| Ok(false)));
    /// assert!(!soft.unwrap());
    ///
    /// // The evaluation's own callbacks are untouched.
    /// assert!(evaluation.allowed().is_err());
    /// ```
    pub fn allowed_with(&self, overrides: Overrides<R>) -> AccessResult<R> {
        let granted = overrides.granted.as_ref().unwrap_or(&self.granted);
        let denied = overrides.denied.as_ref().unwrap_or(&self.denied);
        self.evaluate(granted, denied)
    }

    /// Get the user this evaluation checks roles against, if any.
    pub fn user(&self) -> Option<&U> {
        self.user.as_ref().map(ResolvedUser::get)
    }

    /// Get the required role names in declaration order.
    pub fn required_roles(&self) -> Vec<&str> {
        self.required.iter().map(|required| required.name.as_str()).collect()
    }

    fn evaluate(&self, granted: &GrantedCallback<R>, denied: &DeniedCallback<R>) -> AccessResult<R> {
        for required in &self.required {
            let predicate = match &required.predicate {
                Some(predicate) => predicate,
                None => {
                    debug!(role = %required.name, "access check failed: role not registered");
                    return Err(AccessError::UnknownRole(required.name.clone()));
                }
            };
            let user = match &self.user {
                Some(user) => user.get(),
                None => {
                    warn!(role = %required.name, "access check requires a user but none is available");
                    return Err(AccessError::MissingUser);
                }
            };
            if !predicate(user) {
                let reason = format!("User is not {}", required.name);
                debug!(role = %required.name, "access denied");
                return denied(&reason);
            }
        }
        debug!(roles = self.required.len(), "access granted");
        Ok(granted())
    }
}

impl<U, R> fmt::Debug for Evaluation<'_, U, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluation")
            .field("required", &self.required_roles())
            .field("has_user", &self.user.is_some())
            .finish()
    }
}

/// Per-call callback overrides for [`Evaluation::allowed_with`].
///
/// Build with the chainable [`granted`] and [`denied`] setters; any callback
/// left unset falls back to the evaluation's own.
///
/// [`granted`]: Overrides::granted
/// [`denied`]: Overrides::denied
pub struct Overrides<R = bool> {
    granted: Option<GrantedCallback<R>>,
    denied: Option<DeniedCallback<R>>,
}

impl<R> Overrides<R> {
    /// Create an empty override set.
    pub fn new() -> Self {
        Self {
            granted: None,
            denied: None,
        }
    }

    /// Override the granted callback for one call.
    pub fn granted(mut self, granted: impl Fn() -> R + Send + Sync + 'static) -> Self {
        self.granted = Some(Arc::new(granted));
        self
    }

    /// Override the denied callback for one call.
    pub fn denied(mut self, denied: impl Fn(&str) -> AccessResult<R> + Send + Sync + 'static) -> Self {
        self.denied = Some(Arc::new(denied));
        self
    }
}

impl<R> Default for Overrides<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Overrides<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("granted", &self.granted.is_some())
            .field("denied", &self.denied.is_some())
            .finish()
    }
}
