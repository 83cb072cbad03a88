//! End-to-End tests for the authorization check workflow.
//!
//! These tests drive the registry and evaluation builder the way an
//! application would: roles registered once at startup, then per-request
//! evaluations against a variety of users, callbacks, and result types.
//!
//! Test workflows:
//! 1. request_cycle: one registry, many users, grant and deny paths
//! 2. multi_role_chain: every required role must hold, first failure wins
//! 3. denied_reason_reporting: reason strings reach the denied callback
//! 4. soft_denial: per-call overrides map failures to plain values
//! 5. session_resolver: default user resolved from a session store
//! 6. reconfiguration: registry changes apply to later evaluations
//! 7. http_adapter: errors map onto status codes for a web front end

use std::sync::{Arc, Mutex};

use portcullis::{AccessControl, AccessResult, Overrides, UserSource};

/// Test user with the fields the role predicates inspect.
#[derive(Clone)]
struct Account {
    username: String,
    admin: bool,
    suspended: bool,
    teams: Vec<String>,
}

/// Test fixture with the role vocabulary of a small publishing app.
struct TestFixture {
    control: AccessControl<Account>,
}

impl TestFixture {
    /// Create a registry with the app's roles, as startup code would.
    fn new() -> Self {
        let mut control = AccessControl::new();
        control.add_role("admin", |account: &Account| account.admin);
        control.add_role("active", |account: &Account| !account.suspended);
        control.add_role("owner", |account: &Account| account.username == "root");
        control.add_role("publisher", |account: &Account| {
            account.teams.iter().any(|team| team == "publishing")
        });
        Self { control }
    }
}

/// The site operator: every role holds.
fn root_account() -> Account {
    Account {
        username: "root".to_string(),
        admin: true,
        suspended: false,
        teams: vec!["publishing".to_string()],
    }
}

/// A regular publishing-team member.
fn contributor_account() -> Account {
    Account {
        username: "maya".to_string(),
        admin: false,
        suspended: false,
        teams: vec!["publishing".to_string()],
    }
}

/// An administrator whose account is currently suspended.
fn suspended_admin_account() -> Account {
    Account {
        username: "iris".to_string(),
        admin: true,
        suspended: true,
        teams: Vec::new(),
    }
}

/// Map an evaluation result onto an HTTP status, as a web layer would.
fn to_http_status<R>(result: AccessResult<R>) -> u16 {
    match result {
        Ok(_) => 200,
        Err(err) => err.status_code(),
    }
}

#[test]
fn test_request_cycle_with_mixed_users() {
    let fixture = TestFixture::new();

    // The operator publishes: both roles hold.
    let granted = fixture
        .control
        .evaluation_for(root_account())
        .only("active")
        .only("publisher")
        .allowed()
        .unwrap();
    assert!(granted);

    // A contributor publishes too, but may not administer.
    let evaluation = fixture.control.evaluation_for(contributor_account());
    assert_eq!(evaluation.user().map(|account| account.username.as_str()), Some("maya"));
    assert!(evaluation.only("publisher").allowed().unwrap());

    let admin_check = fixture
        .control
        .evaluation_for(contributor_account())
        .only("admin")
        .allowed();
    assert!(admin_check.is_err());
}

#[test]
fn test_multi_role_chain_requires_every_role() {
    let fixture = TestFixture::new();

    // Admin alone is not enough while the account is suspended.
    let result = fixture
        .control
        .evaluation_for(suspended_admin_account())
        .only("admin")
        .only("active")
        .allowed();
    assert!(result.is_err());

    // The same chain passes once every requirement holds.
    let granted = fixture
        .control
        .evaluation_for(root_account())
        .only("admin")
        .only("active")
        .only("owner")
        .allowed()
        .unwrap();
    assert!(granted);
}

#[test]
fn test_denied_reason_reporting() {
    let mut control = AccessControl::with_callbacks(
        || "authorized".to_string(),
        |reason: &str| Ok(reason.to_string()),
    );
    control.add_role("admin", |account: &Account| account.admin);

    let outcome = control
        .evaluation_for(contributor_account())
        .only("admin")
        .allowed()
        .unwrap();
    assert_eq!(outcome, "User is not admin");

    let outcome = control
        .evaluation_for(root_account())
        .only("admin")
        .allowed()
        .unwrap();
    assert_eq!(outcome, "authorized");
}

#[test]
fn test_soft_denial_via_overrides() {
    let fixture = TestFixture::new();
    let evaluation = fixture
        .control
        .evaluation_for(contributor_account())
        .only("admin");

    // One call maps the failure to `false`; the raising default survives.
    let soft = evaluation.allowed_with(Overrides::new().denied(|_| Ok(false)));
    assert!(!soft.unwrap());
    assert!(evaluation.allowed().is_err());
}

#[test]
fn test_session_resolver_supplies_default_user() {
    let mut fixture = TestFixture::new();

    let session = Arc::new(Mutex::new(contributor_account()));
    let store = Arc::clone(&session);
    fixture
        .control
        .set_user(UserSource::resolver(move || store.lock().unwrap().clone()));

    // The contributor is signed in.
    let result = fixture.control.evaluation().only("admin").allowed();
    assert!(result.is_err());

    // The operator signs in; the next evaluation resolves the new session.
    *session.lock().unwrap() = root_account();
    let granted = fixture.control.evaluation().only("admin").allowed().unwrap();
    assert!(granted);
}

#[test]
fn test_reconfiguration_applies_to_later_evaluations() {
    let mut fixture = TestFixture::new();

    assert!(fixture
        .control
        .evaluation_for(contributor_account())
        .only("publisher")
        .allowed()
        .unwrap());

    // Publishing is frozen: the role is removed outright.
    assert!(fixture.control.remove_role("publisher"));
    let frozen = fixture
        .control
        .evaluation_for(contributor_account())
        .only("publisher")
        .allowed();
    assert_eq!(to_http_status(frozen), 500);

    // It comes back restricted to administrators.
    fixture
        .control
        .add_role("publisher", |account: &Account| account.admin);
    let restricted = fixture
        .control
        .evaluation_for(contributor_account())
        .only("publisher")
        .allowed();
    assert!(restricted.is_err());
    assert!(fixture
        .control
        .evaluation_for(root_account())
        .only("publisher")
        .allowed()
        .unwrap());
}

#[test]
fn test_http_adapter_maps_outcomes_to_status_codes() {
    let fixture = TestFixture::new();

    let ok = fixture
        .control
        .evaluation_for(root_account())
        .only("admin")
        .allowed();
    assert_eq!(to_http_status(ok), 200);

    let forbidden = fixture
        .control
        .evaluation_for(contributor_account())
        .only("admin")
        .allowed();
    assert_eq!(to_http_status(forbidden), 403);

    let unknown = fixture
        .control
        .evaluation_for(root_account())
        .only("superuser")
        .allowed();
    assert_eq!(to_http_status(unknown), 500);

    // No session at all: the check itself needs a user.
    let anonymous = fixture.control.evaluation().only("admin").allowed();
    assert_eq!(to_http_status(anonymous), 401);
}

#[test]
fn test_error_details_for_logging() {
    let fixture = TestFixture::new();

    let err = fixture
        .control
        .evaluation_for(contributor_account())
        .only("admin")
        .allowed()
        .unwrap_err();
    assert!(err.is_denial());
    assert_eq!(err.error_code(), "NOT_AUTHORIZED");
    assert_eq!(err.to_string(), "Not authorized");

    let err = fixture
        .control
        .evaluation_for(root_account())
        .only("superuser")
        .allowed()
        .unwrap_err();
    assert!(!err.is_denial());
    assert_eq!(err.error_code(), "UNKNOWN_ROLE");
    assert_eq!(err.to_string(), "Unknown role: superuser");

    let err = fixture.control.evaluation().only("admin").allowed().unwrap_err();
    assert!(!err.is_denial());
    assert_eq!(err.error_code(), "MISSING_USER");
    assert_eq!(err.to_string(), "No user available for evaluation");
}
