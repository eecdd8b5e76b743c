use super::*;

use crate::gateway::ApiGateway;
use crate::identity::SessionStore;

fn console(sessions: SessionStore) -> Console {
    let base = reqwest::Url::parse("http://127.0.0.1:9").unwrap();
    Console::new(AcademicApi::new(ApiGateway::new(base, reqwest::Client::new(), sessions)), true)
}

#[test]
fn parses_simple_commands() {
    assert_eq!("status".parse::<Command>().unwrap(), Command::Status);
    assert_eq!("QUIT".parse::<Command>().unwrap(), Command::Quit);
    assert_eq!("open /admin/grades".parse::<Command>().unwrap(), Command::Open("/admin/grades".into()));
    assert_eq!(
        "login  alice  s3cret ".parse::<Command>().unwrap(),
        Command::Login { username: "alice".into(), password: "s3cret".into() }
    );
}

#[test]
fn free_text_arguments_keep_spacing_inside() {
    assert_eq!("ask  when is the exam?".parse::<Command>().unwrap(), Command::Ask("when is the exam?".into()));
    assert_eq!(
        "grade reject 12 needs  recount".parse::<Command>().unwrap(),
        Command::GradeReview { grade_id: 12, approve: false, comment: Some("needs  recount".into()) }
    );
    assert_eq!("grade submit 3".parse::<Command>().unwrap(), Command::GradeSubmit { grade_id: 3, comment: None });
}

#[test]
fn numeric_arguments_are_checked() {
    let err = "grade set 1 2 x 80 90".parse::<Command>().unwrap_err();
    assert_eq!(err.code_str(), "bad_argument");
    let err = "grade publish".parse::<Command>().unwrap_err();
    assert_eq!(err.code_str(), "missing_argument");
    assert_eq!("frobnicate".parse::<Command>().unwrap_err().code_str(), "unknown_command");
}

#[test]
fn login_lines_stay_out_of_history_in_any_case() {
    assert!(!keep_in_history("login alice pw"));
    assert!(!keep_in_history("LOGIN alice pw"));
    assert!(!keep_in_history("  Login\talice pw"));
    assert!(!keep_in_history("login"));
    assert!(keep_in_history("logout"));
    assert!(keep_in_history("open /login"));
    assert!(!keep_in_history("   "));
}

#[test]
fn class_picker_rule_follows_the_form() {
    assert_eq!(
        "classes 5".parse::<Command>().unwrap(),
        Command::ClassOptions { course_id: 5, rule: ClassMatch::ClassMajorTerm }
    );
    assert_eq!(
        "classes 5 exam".parse::<Command>().unwrap(),
        Command::ClassOptions { course_id: 5, rule: ClassMatch::ClassMajorTerm }
    );
    assert_eq!("classes 5 Grade".parse::<Command>().unwrap(), Command::ClassOptions { course_id: 5, rule: ClassMatch::ClassMajor });
    assert_eq!("classes 5 enroll".parse::<Command>().unwrap(), Command::ClassOptions { course_id: 5, rule: ClassMatch::MajorTerm });
    assert_eq!("classes 5 roster".parse::<Command>().unwrap_err().code_str(), "usage");
    assert_eq!("classes".parse::<Command>().unwrap_err().code_str(), "missing_argument");
    assert_eq!("courses".parse::<Command>().unwrap(), Command::Courses(None));
    assert_eq!("courses 3".parse::<Command>().unwrap(), Command::Courses(Some(3)));
}

#[test]
fn schedule_add_takes_optional_class_and_room() {
    match "schedule add 5 2 1 2 7".parse::<Command>().unwrap() {
        Command::ScheduleAdd(input) => {
            assert_eq!(input.course_id, Some(5));
            assert_eq!(input.weekday, Some(2));
            assert_eq!(input.class_id, Some(7));
            assert_eq!(input.room_id, None);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn anonymous_console_starts_at_login_and_is_redirected() {
    let c = console(SessionStore::in_memory());
    assert_eq!(c.location(), "/login");
    assert_eq!(c.follow("/admin/grades").unwrap(), "/login?from=%2Fadmin%2Fgrades");
}

#[test]
fn signed_in_console_follows_redirects_to_landing() {
    let sessions = SessionStore::in_memory();
    sessions.set_session("tok", ["TEACHER"], None).unwrap();
    let c = console(sessions);
    assert_eq!(c.location(), "/teacher/dashboard");
    assert_eq!(c.follow("/teacher").unwrap(), "/teacher/dashboard");
    assert_eq!(c.follow("/teacher/unknown").unwrap(), "/teacher/dashboard");
    assert_eq!(c.follow("/admin/grades").unwrap(), "/login");
}

#[tokio::test]
async fn local_commands_run_without_network() {
    let sessions = SessionStore::in_memory();
    sessions.set_session("tok", ["STUDENT"], None).unwrap();
    let mut c = console(sessions.clone());
    assert_eq!(c.run_line("  ").await.unwrap(), Flow::Continue);
    assert_eq!(c.run_line("# note").await.unwrap(), Flow::Continue);
    assert_eq!(c.run_line("nav").await.unwrap(), Flow::Continue);
    assert_eq!(c.run_line("logout").await.unwrap(), Flow::Continue);
    assert!(!sessions.get_session().is_authenticated());
    assert_eq!(c.location(), "/login");
    assert_eq!(c.run_line("quit").await.unwrap(), Flow::Quit);
}

#[tokio::test]
async fn invalid_grades_never_reach_the_api() {
    let mut c = console(SessionStore::in_memory());
    let err = c.run_line("grade set 1 2 3 80 101").await.unwrap_err();
    assert_eq!(err.code_str(), "out_of_range");
    let err = c.run_line("schedule add 1 8 1 2").await.unwrap_err();
    assert_eq!(err.code_str(), "out_of_range");
}
