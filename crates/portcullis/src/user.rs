//! User sources for evaluations
//!
//! A user can be supplied to the registry or to an individual evaluation
//! either as a plain value or as a zero-argument resolver closure. This
//! module models that choice as an explicit sum type instead of inspecting
//! values at runtime.

use std::fmt;

/// Where an evaluation gets its user from.
///
/// A `Value` is used as-is; a `Resolver` is invoked exactly once, at
/// evaluation-builder creation time, and the returned user is reused for
/// every role check of that evaluation (and for repeated `allowed` calls).
///
/// # Examples
///
/// ```
/// use portcullis::UserSource;
///
/// let direct: UserSource<String> = UserSource::from("alice".to_string());
/// assert_eq!(direct.resolve(), "alice");
///
/// let lazy = UserSource::resolver(|| "bob".to_string());
/// assert_eq!(lazy.resolve(), "bob");
/// ```
pub enum UserSource<U> {
    /// A user value supplied directly.
    Value(U),

    /// A closure producing the user on demand.
    ///
    /// Invoked once per evaluation created from it, never per role check.
    Resolver(Box<dyn Fn() -> U + Send + Sync>),
}

impl<U> UserSource<U> {
    /// Wrap a plain user value.
    pub fn value(user: U) -> Self {
        UserSource::Value(user)
    }

    /// Wrap a resolver closure.
    ///
    /// Construction does not invoke the closure; resolution happens when an
    /// evaluation is created from this source.
    ///
    /// # Arguments
    ///
    /// * `resolver` - Zero-argument closure producing the user
    pub fn resolver(resolver: impl Fn() -> U + Send + Sync + 'static) -> Self {
        UserSource::Resolver(Box::new(resolver))
    }

    /// Check if this source is a plain value.
    pub fn is_value(&self) -> bool {
        matches!(self, UserSource::Value(_))
    }

    /// Check if this source is a resolver closure.
    pub fn is_resolver(&self) -> bool {
        matches!(self, UserSource::Resolver(_))
    }

    /// Resolve the source into a user, consuming it.
    ///
    /// For a `Value` this is a move; for a `Resolver` the closure is invoked.
    pub fn resolve(self) -> U {
        match self {
            UserSource::Value(user) => user,
            UserSource::Resolver(resolver) => resolver(),
        }
    }

    /// Resolve without consuming, borrowing a `Value` and invoking a
    /// `Resolver` for an owned user.
    pub(crate) fn resolve_ref(&self) -> ResolvedUser<'_, U> {
        match self {
            UserSource::Value(user) => ResolvedUser::Borrowed(user),
            UserSource::Resolver(resolver) => ResolvedUser::Owned(resolver()),
        }
    }
}

impl<U> From<U> for UserSource<U> {
    fn from(user: U) -> Self {
        UserSource::Value(user)
    }
}

impl<U> fmt::Debug for UserSource<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserSource::Value(_) => f.write_str("UserSource::Value(..)"),
            UserSource::Resolver(_) => f.write_str("UserSource::Resolver(..)"),
        }
    }
}

/// A user resolved at evaluation creation: borrowed from the registry's
/// configured value, or owned when produced by a resolver or supplied
/// per evaluation.
pub(crate) enum ResolvedUser<'a, U> {
    Borrowed(&'a U),
    Owned(U),
}

impl<U> ResolvedUser<'_, U> {
    pub(crate) fn get(&self) -> &U {
        match self {
            ResolvedUser::Borrowed(user) => user,
            ResolvedUser::Owned(user) => user,
        }
    }
}
