//! Typed client for the academic-affairs API. Every call goes through the gateway, so all
//! of them carry the session token and fail with the uniform `ApiError`.

mod auth;
mod entities;
pub mod types;

pub use entities::{
    CourseQuery, ExamQuery, GradeQuery, PlanQuery, RoomQuery, ScheduleQuery, StudentQuery, UserQuery,
};

use crate::gateway::ApiGateway;
use crate::identity::SessionStore;

#[derive(Debug, Clone)]
pub struct AcademicApi {
    gateway: ApiGateway,
}

impl AcademicApi {
    pub fn new(gateway: ApiGateway) -> Self { Self { gateway } }

    pub fn gateway(&self) -> &ApiGateway { &self.gateway }

    pub fn sessions(&self) -> &SessionStore { self.gateway.sessions() }
}
