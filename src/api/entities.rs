use serde::Serialize;
use serde_json::{json, Value};

use crate::gateway::ApiError;

use super::types::*;
use super::AcademicApi;

#[derive(Debug, Clone, Default, Serialize)]
pub struct StudentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_id: Option<i64>,
    /// Only courses taught by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mine: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExamQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GradeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mine: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RoomQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Single optional query parameter; omitted entirely when `value` is `None`.
struct OptionalParam<T> {
    name: &'static str,
    value: Option<T>,
}

impl<T: Serialize> Serialize for OptionalParam<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(None)?;
        if let Some(v) = &self.value {
            map.serialize_entry(self.name, v)?;
        }
        map.end()
    }
}

impl AcademicApi {
    // --- dashboard & reference data ---

    pub async fn home(&self) -> Result<HomeResponse, ApiError> {
        self.gateway.get("/api/home").await
    }

    pub async fn org_units(&self) -> Result<Vec<OrgUnit>, ApiError> {
        self.gateway.get("/api/orgs").await
    }

    pub async fn terms(&self) -> Result<Vec<Term>, ApiError> {
        self.gateway.get("/api/terms").await
    }

    pub async fn create_term(&self, input: &TermInput) -> Result<Term, ApiError> {
        self.gateway.post("/api/terms", input).await
    }

    pub async fn update_term(&self, id: i64, input: &TermInput) -> Result<Term, ApiError> {
        self.gateway.put(&format!("/api/terms/{}", id), input).await
    }

    pub async fn majors(&self) -> Result<Vec<Major>, ApiError> {
        self.gateway.get("/api/majors").await
    }

    pub async fn create_major(&self, input: &MajorInput) -> Result<Major, ApiError> {
        self.gateway.post("/api/majors", input).await
    }

    pub async fn update_major(&self, id: i64, input: &MajorInput) -> Result<Major, ApiError> {
        self.gateway.put(&format!("/api/majors/{}", id), input).await
    }

    // --- enrollment, classes, courses ---

    pub async fn students(&self, query: &StudentQuery) -> Result<Vec<Student>, ApiError> {
        self.gateway.get_with("/api/students", query).await
    }

    pub async fn teachers(&self, major_id: Option<i64>) -> Result<Vec<Teacher>, ApiError> {
        self.gateway.get_with("/api/teachers", &OptionalParam { name: "major_id", value: major_id }).await
    }

    pub async fn classes(&self) -> Result<Vec<ClassItem>, ApiError> {
        self.gateway.get("/api/classes").await
    }

    pub async fn create_class(&self, input: &NewClass) -> Result<ClassItem, ApiError> {
        self.gateway.post("/api/classes", input).await
    }

    pub async fn courses(&self, query: &CourseQuery) -> Result<Vec<Course>, ApiError> {
        self.gateway.get_with("/api/courses", query).await
    }

    pub async fn create_course(&self, input: &NewCourse) -> Result<Course, ApiError> {
        self.gateway.post("/api/courses", input).await
    }

    pub async fn training_plans(&self, query: &PlanQuery) -> Result<Vec<TrainingPlan>, ApiError> {
        self.gateway.get_with("/api/training-plans", query).await
    }

    pub async fn create_training_plan(&self, input: &NewTrainingPlan) -> Result<TrainingPlan, ApiError> {
        self.gateway.post("/api/training-plans", input).await
    }

    pub async fn clone_training_plan(&self, plan_id: i64, entry_year: i32, name: Option<&str>) -> Result<TrainingPlan, ApiError> {
        #[derive(Serialize)]
        struct CloneParams<'a> {
            entry_year: i32,
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<&'a str>,
        }
        let path = format!("/api/training-plans/{}/clone", plan_id);
        self.gateway.post_query(&path, &CloneParams { entry_year, name }).await
    }

    // --- timetabling & rooms ---

    pub async fn schedule(&self, query: &ScheduleQuery) -> Result<Vec<ScheduleEntry>, ApiError> {
        self.gateway.get_with("/api/schedule", query).await
    }

    pub async fn my_schedule(&self) -> Result<Vec<ScheduleEntry>, ApiError> {
        self.gateway.get("/api/schedule/my").await
    }

    pub async fn create_schedule_entry(&self, input: &ScheduleInput) -> Result<ScheduleEntry, ApiError> {
        self.gateway.post("/api/schedule", input).await
    }

    pub async fn update_schedule_entry(&self, id: i64, input: &ScheduleInput) -> Result<ScheduleEntry, ApiError> {
        self.gateway.put(&format!("/api/schedule/{}", id), input).await
    }

    pub async fn delete_schedule_entry(&self, id: i64) -> Result<Value, ApiError> {
        self.gateway.delete(&format!("/api/schedule/{}", id)).await
    }

    pub async fn rooms(&self, query: &RoomQuery) -> Result<Vec<Room>, ApiError> {
        self.gateway.get_with("/api/rooms", query).await
    }

    pub async fn create_room(&self, input: &NewRoom) -> Result<Room, ApiError> {
        self.gateway.post("/api/rooms", input).await
    }

    // --- exams ---

    pub async fn exams(&self, query: &ExamQuery) -> Result<Vec<Exam>, ApiError> {
        self.gateway.get_with("/api/exams", query).await
    }

    pub async fn my_exams(&self) -> Result<Vec<Exam>, ApiError> {
        self.gateway.get("/api/exams/my").await
    }

    pub async fn create_exam(&self, input: &NewExam) -> Result<Exam, ApiError> {
        self.gateway.post("/api/exams", input).await
    }

    // --- grades: entry, submission, review, publication ---

    pub async fn grades(&self, query: &GradeQuery) -> Result<Vec<Grade>, ApiError> {
        self.gateway.get_with("/api/grades", query).await
    }

    pub async fn my_grades(&self, term_id: Option<i64>) -> Result<Vec<Grade>, ApiError> {
        self.gateway.get_with("/api/grades/my", &OptionalParam { name: "term_id", value: term_id }).await
    }

    pub async fn upsert_grade(&self, input: &GradeUpsert) -> Result<Grade, ApiError> {
        self.gateway.post("/api/grades", input).await
    }

    pub async fn submit_grade(&self, grade_id: i64, comment: Option<&str>) -> Result<Value, ApiError> {
        self.gateway.post("/api/grades/submit", &json!({"grade_id": grade_id, "comment": comment})).await
    }

    pub async fn review_grade(&self, grade_id: i64, approve: bool, comment: Option<&str>) -> Result<Value, ApiError> {
        let body = json!({"grade_id": grade_id, "approve": approve, "comment": comment});
        self.gateway.post("/api/grades/review", &body).await
    }

    pub async fn publish_grades(&self, course_id: i64, reviewer: Option<&str>) -> Result<Value, ApiError> {
        self.gateway.post("/api/grades/publish", &json!({"course_id": course_id, "reviewer": reviewer})).await
    }

    // --- accounts, roles, permissions ---

    pub async fn permissions(&self) -> Result<Vec<Permission>, ApiError> {
        self.gateway.get("/api/permissions").await
    }

    pub async fn roles(&self) -> Result<Vec<RoleWithPermissions>, ApiError> {
        self.gateway.get("/api/roles").await
    }

    pub async fn update_role_permissions(&self, role_id: i64, permissions: &[String]) -> Result<RoleWithPermissions, ApiError> {
        let path = format!("/api/roles/{}/permissions", role_id);
        self.gateway.put(&path, &json!({"permissions": permissions})).await
    }

    pub async fn users(&self, query: &UserQuery) -> Result<Vec<UserDetail>, ApiError> {
        self.gateway.get_with("/api/users", query).await
    }

    pub async fn create_user(&self, input: &NewUser) -> Result<UserDetail, ApiError> {
        self.gateway.post("/api/users", input).await
    }

    pub async fn update_user_roles(&self, user_id: i64, role_codes: &[String]) -> Result<UserDetail, ApiError> {
        let path = format!("/api/users/{}/roles", user_id);
        self.gateway.put(&path, &json!({"role_codes": role_codes})).await
    }

    pub async fn reset_user_password(&self, user_id: i64, password: &str) -> Result<Value, ApiError> {
        let path = format!("/api/users/{}/reset-password", user_id);
        self.gateway.post(&path, &json!({"password": password})).await
    }

    // --- assistant ---

    pub async fn ask_assistant(&self, prompt: &str, task: Option<&str>, params: Option<&Value>) -> Result<AssistantAnswer, ApiError> {
        let body = json!({"prompt": prompt, "task": task, "params": params});
        self.gateway.post("/api/ai/assistant", &body).await
    }
}
