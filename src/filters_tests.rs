use super::*;

fn class(id: i64, major: Option<i64>, term: Option<i64>) -> ClassItem {
    ClassItem { id, code: format!("C{}", id), name: format!("Class {}", id), major_id: major, term_id: term, grade_year: None, advisor_name: None }
}

fn course(class_id: Option<i64>, major: Option<i64>, term: Option<i64>) -> Course {
    Course { id: 100, code: "CS101".into(), name: "Intro".into(), class_id, major_id: major, term_id: term, ..Default::default() }
}

fn room(code: &str, name: &str, building: Option<&str>) -> Room {
    Room { id: 1, code: code.into(), name: name.into(), building: building.map(str::to_string), capacity: None, room_type: None, features: None, active: true }
}

#[test]
fn no_selected_course_disables_nothing() {
    let c = class(1, Some(1), Some(1));
    for rule in [ClassMatch::MajorTerm, ClassMatch::ClassMajor, ClassMatch::ClassMajorTerm] {
        assert!(!class_option_disabled(&c, None, rule));
    }
}

#[test]
fn enrollment_rule_checks_major_and_term_only() {
    let sel = course(Some(9), Some(1), Some(2));
    assert!(!class_option_disabled(&class(1, Some(1), Some(2)), Some(&sel), ClassMatch::MajorTerm));
    assert!(class_option_disabled(&class(1, Some(3), Some(2)), Some(&sel), ClassMatch::MajorTerm));
    assert!(class_option_disabled(&class(1, Some(1), Some(5)), Some(&sel), ClassMatch::MajorTerm));
    assert!(class_option_disabled(&class(1, None, Some(2)), Some(&sel), ClassMatch::MajorTerm));
}

#[test]
fn grade_rule_ignores_term() {
    let sel = course(Some(4), Some(1), Some(2));
    assert!(!class_option_disabled(&class(4, Some(1), Some(99)), Some(&sel), ClassMatch::ClassMajor));
    assert!(class_option_disabled(&class(5, Some(1), Some(2)), Some(&sel), ClassMatch::ClassMajor));
}

#[test]
fn schedule_rule_checks_all_three() {
    let sel = course(Some(4), Some(1), Some(2));
    assert!(!class_option_disabled(&class(4, Some(1), Some(2)), Some(&sel), ClassMatch::ClassMajorTerm));
    assert!(class_option_disabled(&class(4, Some(1), Some(3)), Some(&sel), ClassMatch::ClassMajorTerm));
    let open = course(None, None, None);
    assert!(!class_option_disabled(&class(4, None, None), Some(&open), ClassMatch::ClassMajorTerm));
}

#[test]
fn class_options_carry_labels() {
    let sel = course(None, Some(1), None);
    let opts = class_options(&[class(1, Some(1), None), class(2, Some(2), None)], Some(&sel), ClassMatch::MajorTerm);
    assert_eq!(opts[0], SelectOption { value: 1, label: "Class 1 (1)".into(), disabled: false });
    assert!(opts[1].disabled);
}

#[test]
fn term_filter_and_teacher_picker() {
    let courses = vec![course(Some(1), None, Some(1)), course(None, None, Some(2))];
    assert_eq!(courses_in_term(&courses, Some(2)).len(), 1);
    assert_eq!(courses_in_term(&courses, None).len(), 2);
    assert!(!teacher_course_option_disabled(&courses[0]));
    assert!(teacher_course_option_disabled(&courses[1]));
}

#[test]
fn published_grades_lock_actions() {
    let mut g = Grade {
        id: 1, student_id: 1, course_id: 1, term_id: 1, usual_score: None, final_score: None, total_score: None,
        status: "submitted".into(), reviewer: None, course: None, term: None, student: None,
    };
    assert!(!grade_actions_disabled(&g));
    g.status = "published".into();
    assert!(grade_actions_disabled(&g));
}

#[test]
fn room_labels() {
    assert_eq!(format_room_label(None), "-");
    assert_eq!(format_room_label(Some(&room("A101", "Lecture Hall", Some("Main")))), "Lecture Hall (A101) - Main");
    assert_eq!(format_room_label(Some(&room("A101", "A101", None))), "A101");
    assert_eq!(format_room_label(Some(&room("B2", "", Some("East")))), "B2 - East");
}

#[test]
fn grade_scores_must_be_in_range() {
    let mut g = GradeUpsert { student_id: 1, course_id: 1, term_id: 1, usual_score: 80.0, final_score: 100.0, status: None };
    assert!(validate_grade(&g).is_ok());
    g.final_score = 100.5;
    assert_eq!(validate_grade(&g).unwrap_err().code_str(), "out_of_range");
    g.final_score = f64::NAN;
    assert!(validate_grade(&g).is_err());
}

#[test]
fn schedule_checks() {
    let ok = ScheduleInput { course_id: Some(1), weekday: Some(7), start_slot: Some(1), end_slot: Some(12), ..Default::default() };
    assert!(validate_schedule(&ok, true).is_ok());

    let missing = ScheduleInput { weekday: Some(1), ..Default::default() };
    assert_eq!(validate_schedule(&missing, true).unwrap_err().message(), "course_id is required");
    assert!(validate_schedule(&missing, false).is_ok());

    let bad_day = ScheduleInput { weekday: Some(0), ..Default::default() };
    assert!(validate_schedule(&bad_day, false).is_err());

    let reversed = ScheduleInput { start_slot: Some(5), end_slot: Some(3), ..Default::default() };
    assert_eq!(validate_schedule(&reversed, false).unwrap_err().code_str(), "invalid_slots");
}

#[test]
fn current_term_lookup() {
    let terms = vec![
        Term { id: 1, name: "2024 Fall".into(), start_date: None, end_date: None, is_current: false },
        Term { id: 2, name: "2025 Spring".into(), start_date: None, end_date: None, is_current: true },
    ];
    assert_eq!(current_term(&terms).map(|t| t.id), Some(2));
}
