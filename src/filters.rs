//! Client-side conveniences applied to option lists and forms before anything is sent:
//! which class options conflict with the selected course, which grade actions are still
//! available, and the per-field range checks the forms enforce.

use crate::api::types::{ClassItem, Course, Grade, GradeUpsert, Room, ScheduleInput, Term, GRADE_PUBLISHED};
use crate::error::{AppError, AppResult};

pub const WEEKDAY_RANGE: (u8, u8) = (1, 7);
pub const SLOT_RANGE: (u8, u8) = (1, 12);
pub const SCORE_RANGE: (f64, f64) = (0.0, 100.0);

/// Which attributes of the selected course a class option must agree with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassMatch {
    /// Enrollment forms: major and term.
    MajorTerm,
    /// Grade filters: the course's own class and major.
    ClassMajor,
    /// Schedule and exam forms: class, major and term.
    ClassMajorTerm,
}

/// Whether `class` should be shown disabled given the currently selected course.
/// An unset attribute on the course never conflicts.
pub fn class_option_disabled(class: &ClassItem, course: Option<&Course>, rule: ClassMatch) -> bool {
    let Some(course) = course else { return false };
    let class_conflict = course.class_id.map(|id| id != class.id).unwrap_or(false);
    let major_conflict = course.major_id.map(|m| Some(m) != class.major_id).unwrap_or(false);
    let term_conflict = course.term_id.map(|t| Some(t) != class.term_id).unwrap_or(false);
    match rule {
        ClassMatch::MajorTerm => major_conflict || term_conflict,
        ClassMatch::ClassMajor => class_conflict || major_conflict,
        ClassMatch::ClassMajorTerm => class_conflict || major_conflict || term_conflict,
    }
}

/// Option entry as shown in a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: i64,
    pub label: String,
    pub disabled: bool,
}

pub fn class_options(classes: &[ClassItem], course: Option<&Course>, rule: ClassMatch) -> Vec<SelectOption> {
    classes
        .iter()
        .map(|c| SelectOption {
            value: c.id,
            label: format!("{} ({})", c.name, c.id),
            disabled: class_option_disabled(c, course, rule),
        })
        .collect()
}

/// Courses offered in `term_id`; no term selected keeps all of them.
pub fn courses_in_term(courses: &[Course], term_id: Option<i64>) -> Vec<&Course> {
    courses.iter().filter(|c| term_id.is_none() || c.term_id == term_id).collect()
}

/// Grade-entry course picker for teachers: courses without a class cannot take grades.
pub fn teacher_course_option_disabled(course: &Course) -> bool {
    course.class_id.is_none()
}

/// Submit/approve/reject are unavailable once a grade is published.
pub fn grade_actions_disabled(grade: &Grade) -> bool {
    grade.status == GRADE_PUBLISHED
}

/// `name (code) - building`; the code is shown only when it differs from the name.
pub fn format_room_label(room: Option<&Room>) -> String {
    let Some(room) = room else { return "-".to_string() };
    let main = if room.name.is_empty() { &room.code } else { &room.name };
    let code_part = if !room.name.is_empty() && !room.code.is_empty() && room.name != room.code {
        format!(" ({})", room.code)
    } else {
        String::new()
    };
    let building_part = room.building.as_deref().filter(|b| !b.is_empty()).map(|b| format!(" - {}", b)).unwrap_or_default();
    format!("{}{}{}", main, code_part, building_part)
}

pub fn current_term(terms: &[Term]) -> Option<&Term> {
    terms.iter().find(|t| t.is_current)
}

fn out_of_range(field: &str, lo: impl std::fmt::Display, hi: impl std::fmt::Display) -> AppError {
    AppError::user("out_of_range".to_string(), format!("{} must be between {} and {}", field, lo, hi))
}

fn check_score(field: &str, v: f64) -> AppResult<()> {
    if !v.is_finite() || v < SCORE_RANGE.0 || v > SCORE_RANGE.1 {
        return Err(out_of_range(field, SCORE_RANGE.0, SCORE_RANGE.1));
    }
    Ok(())
}

pub fn validate_grade(input: &GradeUpsert) -> AppResult<()> {
    check_score("usual_score", input.usual_score)?;
    check_score("final_score", input.final_score)
}

/// Range checks for a schedule entry; `creating` additionally requires course, weekday and slots.
pub fn validate_schedule(input: &ScheduleInput, creating: bool) -> AppResult<()> {
    if creating {
        for (field, present) in [
            ("course_id", input.course_id.is_some()),
            ("weekday", input.weekday.is_some()),
            ("start_slot", input.start_slot.is_some()),
            ("end_slot", input.end_slot.is_some()),
        ] {
            if !present {
                return Err(AppError::user("required".to_string(), format!("{} is required", field)));
            }
        }
    }
    if let Some(d) = input.weekday {
        if d < WEEKDAY_RANGE.0 || d > WEEKDAY_RANGE.1 {
            return Err(out_of_range("weekday", WEEKDAY_RANGE.0, WEEKDAY_RANGE.1));
        }
    }
    for (field, slot) in [("start_slot", input.start_slot), ("end_slot", input.end_slot)] {
        if let Some(s) = slot {
            if s < SLOT_RANGE.0 || s > SLOT_RANGE.1 {
                return Err(out_of_range(field, SLOT_RANGE.0, SLOT_RANGE.1));
            }
        }
    }
    if let (Some(a), Some(b)) = (input.start_slot, input.end_slot) {
        if a > b {
            return Err(AppError::user("invalid_slots".to_string(), "start_slot must not be after end_slot".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "filters_tests.rs"]
mod filters_tests;
