use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use crate::identity::UserProfile as User;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub user: User,
    #[serde(default)]
    pub roles: Vec<String>,
}

fn bearer() -> String { "bearer".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeResponse {
    pub user: User,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub path: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuResponse {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub menus: Vec<MenuItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrgUnit {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub unit_type: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Term {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TermInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_current: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Major {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub org_unit_id: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub duration_years: Option<i32>,
    #[serde(default = "yes")]
    pub active: bool,
    #[serde(default)]
    pub description: Option<String>,
}

fn yes() -> bool { true }

/// Body for major create (code and name required) and update (all optional).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MajorInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_unit_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_years: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassItem {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub major_id: Option<i64>,
    #[serde(default)]
    pub term_id: Option<i64>,
    #[serde(default)]
    pub grade_year: Option<i32>,
    #[serde(default)]
    pub advisor_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewClass {
    pub code: String,
    pub name: String,
    pub major_id: i64,
    pub term_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub major_id: Option<i64>,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub term_id: Option<i64>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub course_type: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub credit: Option<f64>,
    #[serde(default)]
    pub weekly_hours: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    pub major_id: i64,
    pub term_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub capacity: Option<i32>,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
    #[serde(default = "yes")]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRoom {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentStatusLog {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: i64,
    pub student_no: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_note: Option<String>,
    pub user: User,
    #[serde(default)]
    pub class_info: Option<ClassItem>,
    #[serde(default)]
    pub status_logs: Vec<StudentStatusLog>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Teacher {
    pub id: i64,
    pub user: User,
    #[serde(default)]
    pub major_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry {
    pub id: i64,
    pub course_id: i64,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub room_id: Option<i64>,
    pub weekday: u8,
    pub start_slot: u8,
    pub end_slot: u8,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub course: Option<Course>,
    #[serde(default)]
    pub class_info: Option<ClassItem>,
    #[serde(default)]
    pub room: Option<Room>,
}

/// Body for schedule create (course, weekday and slots required) and partial update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScheduleInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_slot: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_slot: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exam {
    pub id: i64,
    pub course_id: i64,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub term_id: Option<i64>,
    #[serde(default)]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub exam_type: Option<String>,
    #[serde(default)]
    pub exam_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub invigilators: Option<String>,
    #[serde(default)]
    pub course: Option<Course>,
    #[serde(default)]
    pub class_info: Option<ClassItem>,
    #[serde(default)]
    pub term: Option<Term>,
    #[serde(default)]
    pub room: Option<Room>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewExam {
    pub course_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invigilators: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub term_id: i64,
    #[serde(default)]
    pub usual_score: Option<f64>,
    #[serde(default)]
    pub final_score: Option<f64>,
    #[serde(default)]
    pub total_score: Option<f64>,
    pub status: String,
    #[serde(default)]
    pub reviewer: Option<String>,
    #[serde(default)]
    pub course: Option<Course>,
    #[serde(default)]
    pub term: Option<Term>,
    #[serde(default)]
    pub student: Option<Student>,
}

pub const GRADE_PUBLISHED: &str = "published";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeUpsert {
    pub student_id: i64,
    pub course_id: i64,
    pub term_id: i64,
    pub usual_score: f64,
    pub final_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingPlanItem {
    pub id: i64,
    #[serde(default)]
    pub course_id: Option<i64>,
    pub course: Course,
    pub term_no: i32,
    pub weekly_hours: i32,
    #[serde(default)]
    pub exam_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingPlan {
    pub id: i64,
    pub name: String,
    pub entry_year: i32,
    pub major_id: i64,
    #[serde(default)]
    pub items: Vec<TrainingPlanItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTrainingPlan {
    pub name: String,
    pub entry_year: i32,
    pub major_id: i64,
    #[serde(default)]
    pub item_course_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HomeResponse {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub counters: BTreeMap<String, i64>,
    #[serde(default)]
    pub schedule_preview: Vec<ScheduleEntry>,
    #[serde(default)]
    pub latest_grades: Vec<Grade>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleWithPermissions {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub roles: Vec<RoleInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_unit_id: Option<i64>,
    #[serde(default)]
    pub role_codes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantAnswer {
    pub answer: String,
    #[serde(default)]
    pub used_prompt: String,
}
