use std::sync::Arc;

use eduadmin::identity::{FileKv, Role, SessionStore, ROLES_KEY, TOKEN_KEY};
use eduadmin::routing::{login_path_with_return, GuardDecision, RouteGuard};

fn file_store(dir: &tempfile::TempDir) -> SessionStore {
    SessionStore::new(Arc::new(FileKv::new(dir.path().join("state").join("session.json"))))
}

#[test]
fn session_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    file_store(&dir).set_session("tok", ["TEACHER", "STUDENT"], None).unwrap();

    let reopened = file_store(&dir);
    let s = reopened.get_session();
    assert_eq!(s.token.as_deref(), Some("tok"));
    assert_eq!(s.known_roles(), vec![Role::Teacher, Role::Student]);
    assert_eq!(RouteGuard::new(reopened).landing(), "/teacher/dashboard");

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("state/session.json")).unwrap()).unwrap();
    assert_eq!(raw[TOKEN_KEY], "tok");
    assert!(raw[ROLES_KEY].as_str().unwrap().contains("TEACHER"));
}

#[test]
fn guard_sees_session_changes_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let sessions = file_store(&dir);
    let guard = RouteGuard::new(sessions.clone());

    let first = guard.navigate("/admin/access");
    assert_eq!(first.next_path().as_deref(), Some(login_path_with_return("/admin/access").as_str()));

    sessions.set_session("t", ["ADMIN"], None).unwrap();
    assert_eq!(guard.navigate("/admin/access"), GuardDecision::Allow);
    assert_eq!(guard.after_login(&first.next_path().unwrap()), "/admin/access");

    sessions.clear_session().unwrap();
    assert!(!guard.navigate("/admin/access").is_allowed());
    assert_eq!(guard.landing(), "/login");
}

#[test]
fn return_path_is_dropped_when_not_admitted() {
    let sessions = SessionStore::in_memory();
    let guard = RouteGuard::new(sessions.clone());
    let login = login_path_with_return("/admin/grades");

    sessions.set_session("t", ["STUDENT"], None).unwrap();
    assert_eq!(guard.after_login(&login), "/student/dashboard");
    assert_eq!(guard.after_login("/login"), "/student/dashboard");
    assert_eq!(guard.after_login("/login?from=https%3A%2F%2Fevil.example"), "/student/dashboard");
}

#[test]
fn corrupt_session_file_reads_as_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("state")).unwrap();
    std::fs::write(dir.path().join("state/session.json"), "{not json").unwrap();
    let sessions = file_store(&dir);
    assert!(!sessions.get_session().is_authenticated());
    assert_eq!(RouteGuard::new(sessions.clone()).landing(), "/login");

    sessions.set_session("fresh", ["STUDENT"], None).unwrap();
    assert!(file_store(&dir).get_session().is_authenticated());
}
