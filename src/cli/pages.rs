//! Page loaders: every navigable path maps to the panels its screen shows. Panels of one
//! page are fetched concurrently and fail independently, so one broken endpoint leaves the
//! rest of the page readable.

use std::future::Future;

use futures_util::future::{join_all, BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::types::{ClassItem, Course, Exam, Grade, HomeResponse, ScheduleEntry, Term};
use crate::api::{AcademicApi, CourseQuery, ExamQuery, GradeQuery, PlanQuery, RoomQuery, ScheduleQuery, StudentQuery, UserQuery};
use crate::filters::{
    class_options, courses_in_term, current_term, format_room_label, grade_actions_disabled, teacher_course_option_disabled, ClassMatch,
};
use crate::gateway::ApiError;
use crate::routing::{route_for_path, strip_query};

#[derive(Debug)]
pub struct Panel {
    pub title: &'static str,
    pub result: Result<Value, ApiError>,
}

#[derive(Debug)]
pub struct Page {
    pub path: String,
    pub title: String,
    pub panels: Vec<Panel>,
}

impl Page {
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &ApiError)> {
        self.panels.iter().filter_map(|p| p.result.as_ref().err().map(|e| (p.title, e)))
    }
}

fn panel<'a, T, F>(title: &'static str, fut: F) -> BoxFuture<'a, Panel>
where
    T: Serialize + Send + 'a,
    F: Future<Output = Result<T, ApiError>> + Send + 'a,
{
    async move {
        let result = fut.await.and_then(|v| {
            serde_json::to_value(&v).map_err(|e| ApiError { status: None, message: format!("unencodable response: {}", e) })
        });
        Panel { title, result }
    }
    .boxed()
}

/// Like `panel`, but reshapes the typed response into display rows first.
fn panel_rows<'a, T, F>(title: &'static str, fut: F, rows: fn(T) -> Value) -> BoxFuture<'a, Panel>
where
    T: Send + 'a,
    F: Future<Output = Result<T, ApiError>> + Send + 'a,
{
    async move { Panel { title, result: fut.await.map(rows) } }.boxed()
}

fn mine() -> CourseQuery {
    CourseQuery { mine: Some(true), ..Default::default() }
}

/// Fetches for `path`, or None when the path has no screen.
pub(crate) fn panels_for<'a>(api: &'a AcademicApi, path: &str) -> Option<Vec<BoxFuture<'a, Panel>>> {
    let panels = match strip_query(path).trim_end_matches('/') {
        "/admin/dashboard" => vec![
            panel_rows("Overview", api.home(), counter_rows),
            panel_rows("Current term", api.terms(), current_term_row),
        ],
        "/admin/students" => vec![
            panel("Students", async move { api.students(&StudentQuery::default()).await }),
            panel("Classes", api.classes()),
            panel("Courses", async move { api.courses(&CourseQuery::default()).await }),
            panel("Teachers", api.teachers(None)),
        ],
        "/admin/majors-terms" => vec![
            panel("Majors", api.majors()),
            panel("Terms", api.terms()),
            panel("Org units", api.org_units()),
        ],
        "/admin/schedule" => vec![
            panel_rows("Schedule", async move { api.schedule(&ScheduleQuery::default()).await }, schedule_rows),
            panel("Rooms", async move { api.rooms(&RoomQuery::default()).await }),
        ],
        "/admin/plans" => vec![
            panel("Training plans", async move { api.training_plans(&PlanQuery::default()).await }),
            panel("Majors", api.majors()),
        ],
        "/admin/grades" => vec![
            panel_rows("Grades", async move { api.grades(&GradeQuery::default()).await }, grade_rows),
            panel("Courses", async move { api.courses(&CourseQuery::default()).await }),
        ],
        "/admin/exams" => vec![
            panel_rows("Exams", async move { api.exams(&ExamQuery::default()).await }, exam_rows),
            panel("Rooms", async move { api.rooms(&RoomQuery::default()).await }),
        ],
        "/admin/access" => vec![
            panel("Users", async move { api.users(&UserQuery::default()).await }),
            panel("Roles", api.roles()),
            panel("Permissions", api.permissions()),
        ],
        "/teacher/dashboard" => vec![
            panel_rows("Overview", api.home(), counter_rows),
            panel_rows("Teaching schedule", api.my_schedule(), schedule_rows),
            panel("My courses", async move { api.courses(&mine()).await }),
        ],
        "/teacher/schedule" => vec![
            panel_rows("Teaching schedule", api.my_schedule(), schedule_rows),
            panel_rows("Current term", api.terms(), current_term_row),
        ],
        "/teacher/courses" => vec![panel("My courses", async move { api.courses(&mine()).await })],
        "/teacher/grades" => vec![
            panel_rows("Courses", async move { api.courses(&mine()).await }, grade_entry_course_rows),
            panel_rows(
                "Grades",
                async move { api.grades(&GradeQuery { mine: Some(true), ..Default::default() }).await },
                grade_rows,
            ),
        ],
        "/student/dashboard" => vec![
            panel_rows("Overview", api.home(), counter_rows),
            panel_rows("Timetable", api.my_schedule(), schedule_rows),
            panel_rows("Grades", api.my_grades(None), grade_rows),
        ],
        "/student/schedule" => vec![panel_rows("Timetable", api.my_schedule(), schedule_rows)],
        "/student/grades" => vec![
            panel_rows("Grades", api.my_grades(None), grade_rows),
            panel("Terms", api.terms()),
        ],
        "/student/exams" => vec![panel_rows("Exams", api.my_exams(), exam_rows)],
        // prompt-driven; the console's `ask` command does the fetching
        "/admin/assistant" | "/teacher/assistant" | "/student/assistant" => Vec::new(),
        _ => return None,
    };
    Some(panels)
}

pub fn has_page(path: &str) -> bool {
    page_title(path).is_some()
}

/// Navigation label of the page at `path`; hidden pages are titled by their last segment.
pub fn page_title(path: &str) -> Option<String> {
    let path = strip_query(path).trim_end_matches('/');
    let route = route_for_path(path)?;
    if let Some(item) = route.nav.iter().find(|n| n.path == path) {
        return Some(item.label.clone());
    }
    route
        .hidden
        .iter()
        .find(|h| **h == path)
        .and_then(|h| h.rsplit('/').next())
        .map(|seg| {
            let mut c = seg.chars();
            c.next().map(|f| f.to_uppercase().collect::<String>() + c.as_str()).unwrap_or_default()
        })
}

/// Fetch every panel of the page at `path` concurrently.
pub async fn load_page(api: &AcademicApi, path: &str) -> Option<Page> {
    let title = page_title(path)?;
    let panels = join_all(panels_for(api, path)?).await;
    Some(Page { path: path.to_string(), title, panels })
}

/// Class picker for `course_id` as the form of `rule` shows it: every class, with the ones
/// that conflict with the course marked disabled. An unknown course disables nothing.
pub async fn class_option_listing(api: &AcademicApi, course_id: i64, rule: ClassMatch) -> Result<Value, ApiError> {
    let all = CourseQuery::default();
    let (classes, courses) = tokio::join!(api.classes(), api.courses(&all));
    let (classes, courses) = (classes?, courses?);
    Ok(class_option_rows(&classes, courses.iter().find(|c| c.id == course_id), rule))
}

/// Courses offered in `term_id`, or all of them when no term is given.
pub async fn term_course_listing(api: &AcademicApi, term_id: Option<i64>) -> Result<Value, ApiError> {
    let courses = api.courses(&CourseQuery::default()).await?;
    Ok(Value::Array(
        courses_in_term(&courses, term_id)
            .into_iter()
            .map(|c| json!({"id": c.id, "code": c.code, "name": c.name, "term_id": c.term_id, "class_id": c.class_id}))
            .collect(),
    ))
}

// --- row shaping ---

fn counter_rows(home: HomeResponse) -> Value {
    Value::Array(home.counters.into_iter().map(|(name, value)| json!({"counter": name, "value": value})).collect())
}

fn current_term_row(terms: Vec<Term>) -> Value {
    match current_term(&terms) {
        Some(t) => json!([{"id": t.id, "name": t.name, "start_date": t.start_date, "end_date": t.end_date}]),
        None => json!({"current_term": null}),
    }
}

fn course_name(course: &Option<Course>, id: i64) -> String {
    course.as_ref().map(|c| c.name.clone()).unwrap_or_else(|| format!("#{}", id))
}

fn schedule_rows(entries: Vec<ScheduleEntry>) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|e| {
                let room = match (&e.room, &e.location) {
                    (None, Some(loc)) if !loc.is_empty() => loc.clone(),
                    (room, _) => format_room_label(room.as_ref()),
                };
                json!({
                    "id": e.id,
                    "weekday": e.weekday,
                    "slots": format!("{}-{}", e.start_slot, e.end_slot),
                    "course": course_name(&e.course, e.course_id),
                    "class": e.class_info.as_ref().map(|c| c.name.clone()),
                    "room": room,
                })
            })
            .collect(),
    )
}

fn grade_rows(grades: Vec<Grade>) -> Value {
    Value::Array(
        grades
            .iter()
            .map(|g| {
                json!({
                    "id": g.id,
                    "student": g.student.as_ref().map(|s| s.user.display_name().to_string()).unwrap_or_else(|| format!("#{}", g.student_id)),
                    "course": course_name(&g.course, g.course_id),
                    "term": g.term.as_ref().map(|t| t.name.clone()),
                    "usual": g.usual_score,
                    "final": g.final_score,
                    "total": g.total_score,
                    "status": g.status,
                    "locked": grade_actions_disabled(g),
                })
            })
            .collect(),
    )
}

fn exam_rows(exams: Vec<Exam>) -> Value {
    Value::Array(
        exams
            .iter()
            .map(|e| {
                let room = match (&e.room, &e.location) {
                    (None, Some(loc)) if !loc.is_empty() => loc.clone(),
                    (room, _) => format_room_label(room.as_ref()),
                };
                json!({
                    "id": e.id,
                    "course": course_name(&e.course, e.course_id),
                    "type": e.exam_type,
                    "date": e.exam_date,
                    "start": e.start_time,
                    "minutes": e.duration_minutes,
                    "room": room,
                })
            })
            .collect(),
    )
}

fn class_option_rows(classes: &[ClassItem], course: Option<&Course>, rule: ClassMatch) -> Value {
    Value::Array(
        class_options(classes, course, rule)
            .into_iter()
            .map(|o| json!({"id": o.value, "class": o.label, "disabled": o.disabled}))
            .collect(),
    )
}

fn grade_entry_course_rows(courses: Vec<Course>) -> Value {
    Value::Array(
        courses
            .iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "code": c.code,
                    "name": c.name,
                    "class_id": c.class_id,
                    "grade_entry": if teacher_course_option_disabled(c) { "no class" } else { "open" },
                })
            })
            .collect(),
    )
}
