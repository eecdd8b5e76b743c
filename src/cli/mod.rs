//! Interactive console over the academic-affairs API. A line is parsed into a `Command`,
//! navigation goes through the route guard, and pages render through their loaders.

pub mod outputformatter;
pub mod pages;

use std::str::FromStr;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;
use tracing::debug;

use crate::api::types::{GradeUpsert, ScheduleInput};
use crate::api::AcademicApi;
use crate::error::{AppError, AppResult};
use crate::filters::{validate_grade, validate_schedule, ClassMatch};
use crate::identity::AuthState;
use crate::routing::{nav_for, GuardDecision, RouteGuard, LOGIN_PATH};

use outputformatter::print_result;
use pages::Page;

/// Redirect chains longer than this are reported instead of followed.
const MAX_REDIRECTS: usize = 4;

pub const HELP: &str = "Commands:
  login <user> <password>            authenticate and go to the landing page (or the saved return path)
  logout                             forget the local session
  whoami                             show the stored profile and roles
  me                                 ask the API who the token belongs to
  status                             API base, session state and current location
  nav                                navigation entries for the current roles
  menus                              server-side menu for the current roles
  open <path>                        navigate (guarded) and show the page
  get <api-path>                     raw GET against the API
  ask <prompt>                       send a prompt to the assistant
  courses [term_id]                  courses offered in a term (all when omitted)
  classes <course_id> [schedule|exam|grade|enroll]
                                     class picker for a course, conflicting classes disabled
  grade set <student> <course> <term> <usual> <final>
  grade submit <grade_id> [comment]
  grade approve|reject <grade_id> [comment]
  grade publish <course_id>
  schedule add <course> <weekday> <start_slot> <end_slot> [class] [room]
  schedule rm <entry_id>
  help                               show this help
  quit | exit                        leave the console";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { username: String, password: String },
    Logout,
    WhoAmI,
    Me,
    Status,
    Nav,
    Menus,
    Open(String),
    Get(String),
    Ask(String),
    Courses(Option<i64>),
    ClassOptions { course_id: i64, rule: ClassMatch },
    GradeSet(GradeUpsert),
    GradeSubmit { grade_id: i64, comment: Option<String> },
    GradeReview { grade_id: i64, approve: bool, comment: Option<String> },
    GradePublish { course_id: i64 },
    ScheduleAdd(ScheduleInput),
    ScheduleRemove(i64),
    Help,
    Quit,
}

fn usage(text: &str) -> AppError {
    AppError::user("usage".to_string(), format!("usage: {}", text))
}

fn num<T: FromStr>(word: Option<&&str>, name: &str) -> AppResult<T> {
    let w = word.ok_or_else(|| AppError::user("missing_argument".to_string(), format!("{} is required", name)))?;
    w.parse::<T>()
        .map_err(|_| AppError::user("bad_argument".to_string(), format!("{} must be a number, got '{}'", name, w)))
}

fn class_rule(word: Option<&&str>) -> AppResult<ClassMatch> {
    match word.map(|w| w.to_ascii_lowercase()).as_deref() {
        None | Some("schedule") | Some("exam") => Ok(ClassMatch::ClassMajorTerm),
        Some("grade") => Ok(ClassMatch::ClassMajor),
        Some("enroll") => Ok(ClassMatch::MajorTerm),
        Some(_) => Err(usage("classes <course_id> [schedule|exam|grade|enroll]")),
    }
}

/// Lines whose command word is `login` carry a password and are never written to history.
fn keep_in_history(line: &str) -> bool {
    line.split_whitespace().next().map(|w| !w.eq_ignore_ascii_case("login")).unwrap_or(false)
}

fn rest_after(line: &str, words: usize) -> Option<String> {
    let mut s = line.trim_start();
    for _ in 0..words {
        s = s.trim_start();
        let end = s.find(char::is_whitespace).unwrap_or(s.len());
        s = &s[end..];
    }
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> AppResult<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(head) = parts.first() else { return Err(usage("help")) };
        let cmd = match head.to_ascii_lowercase().as_str() {
            "login" => match (parts.get(1), parts.get(2)) {
                (Some(u), Some(p)) => Command::Login { username: u.to_string(), password: p.to_string() },
                _ => return Err(usage("login <user> <password>")),
            },
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "me" => Command::Me,
            "status" => Command::Status,
            "nav" => Command::Nav,
            "menus" => Command::Menus,
            "open" | "go" => Command::Open(parts.get(1).ok_or_else(|| usage("open <path>"))?.to_string()),
            "get" => Command::Get(parts.get(1).ok_or_else(|| usage("get <api-path>"))?.to_string()),
            "ask" => Command::Ask(rest_after(line, 1).ok_or_else(|| usage("ask <prompt>"))?),
            "courses" => Command::Courses(parts.get(1).map(|_| num(parts.get(1), "term_id")).transpose()?),
            "classes" => {
                Command::ClassOptions { course_id: num(parts.get(1), "course_id")?, rule: class_rule(parts.get(2))? }
            }
            "grade" => match parts.get(1).copied() {
                Some("set") => Command::GradeSet(GradeUpsert {
                    student_id: num(parts.get(2), "student")?,
                    course_id: num(parts.get(3), "course")?,
                    term_id: num(parts.get(4), "term")?,
                    usual_score: num(parts.get(5), "usual")?,
                    final_score: num(parts.get(6), "final")?,
                    status: None,
                }),
                Some("submit") => Command::GradeSubmit { grade_id: num(parts.get(2), "grade_id")?, comment: rest_after(line, 3) },
                Some(verb @ ("approve" | "reject")) => Command::GradeReview {
                    grade_id: num(parts.get(2), "grade_id")?,
                    approve: verb == "approve",
                    comment: rest_after(line, 3),
                },
                Some("publish") => Command::GradePublish { course_id: num(parts.get(2), "course_id")? },
                _ => return Err(usage("grade set|submit|approve|reject|publish ...")),
            },
            "schedule" => match parts.get(1).copied() {
                Some("add") => Command::ScheduleAdd(ScheduleInput {
                    course_id: Some(num(parts.get(2), "course")?),
                    weekday: Some(num(parts.get(3), "weekday")?),
                    start_slot: Some(num(parts.get(4), "start_slot")?),
                    end_slot: Some(num(parts.get(5), "end_slot")?),
                    class_id: parts.get(6).map(|_| num(parts.get(6), "class")).transpose()?,
                    room_id: parts.get(7).map(|_| num(parts.get(7), "room")).transpose()?,
                    ..Default::default()
                }),
                Some("rm") => Command::ScheduleRemove(num(parts.get(2), "entry_id")?),
                _ => return Err(usage("schedule add|rm ...")),
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(AppError::user("unknown_command".to_string(), format!("unknown command '{}'; try 'help'", other))),
        };
        Ok(cmd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Console state: the API client, the guard over the same session, and where the user is.
pub struct Console {
    api: AcademicApi,
    guard: RouteGuard,
    output_json: bool,
    location: String,
}

impl Console {
    pub fn new(api: AcademicApi, output_json: bool) -> Self {
        let guard = RouteGuard::new(api.sessions().clone());
        let location = guard.landing().to_string();
        Self { api, guard, output_json, location }
    }

    pub fn location(&self) -> &str { &self.location }

    pub fn api(&self) -> &AcademicApi { &self.api }

    pub async fn run_line(&mut self, line: &str) -> AppResult<Flow> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }
        let cmd: Command = line.parse()?;
        self.execute(cmd).await
    }

    pub async fn execute(&mut self, cmd: Command) -> AppResult<Flow> {
        match cmd {
            Command::Login { username, password } => {
                let resp = self.api.login(&username, &password).await?;
                println!("logged in as {} [{}]", resp.user.display_name(), resp.roles.join(", "));
                let target = self.guard.after_login(&self.location);
                self.open(&target).await?;
            }
            Command::Logout => {
                self.api.logout()?;
                self.location = LOGIN_PATH.to_string();
                println!("logged out");
            }
            Command::WhoAmI => {
                let session = self.api.sessions().get_session();
                match (&session.profile, session.state()) {
                    (_, AuthState::Anonymous) => println!("anonymous"),
                    (Some(p), AuthState::Authenticated { roles }) => {
                        println!("{} <{}> roles: {}", p.display_name(), p.username, roles.into_iter().collect::<Vec<_>>().join(", "))
                    }
                    (None, AuthState::Authenticated { roles }) => {
                        println!("(no profile) roles: {}", roles.into_iter().collect::<Vec<_>>().join(", "))
                    }
                }
            }
            Command::Me => {
                let me = self.api.me().await?;
                self.show(&serde_json::to_value(&me).map_err(anyhow::Error::from)?);
            }
            Command::Status => {
                let session = self.api.sessions().get_session();
                println!("api: {}", self.api.gateway().base());
                println!("session: {}", if session.is_authenticated() { "authenticated" } else { "anonymous" });
                println!("location: {}", self.location);
            }
            Command::Nav => {
                let roles = self.api.sessions().get_session().known_roles();
                if roles.is_empty() {
                    println!("no navigation available; log in first");
                }
                for role in roles {
                    println!("[{}]", role);
                    for item in nav_for(role) {
                        println!("  {:<24} {}", item.label, item.path);
                    }
                }
            }
            Command::Menus => {
                let menus = self.api.menus().await?;
                self.show(&serde_json::to_value(&menus.menus).map_err(anyhow::Error::from)?);
            }
            Command::Open(path) => {
                self.open(&path).await?;
            }
            Command::Get(path) => {
                let v: Value = self.api.gateway().get(&path).await?;
                self.show(&v);
            }
            Command::Ask(prompt) => {
                let answer = self.api.ask_assistant(&prompt, None, None).await?;
                println!("{}", answer.answer);
            }
            Command::Courses(term_id) => {
                let v = pages::term_course_listing(&self.api, term_id).await?;
                self.show(&v);
            }
            Command::ClassOptions { course_id, rule } => {
                let v = pages::class_option_listing(&self.api, course_id, rule).await?;
                self.show(&v);
            }
            Command::GradeSet(input) => {
                validate_grade(&input)?;
                let g = self.api.upsert_grade(&input).await?;
                println!("grade {} saved (status: {})", g.id, g.status);
            }
            Command::GradeSubmit { grade_id, comment } => {
                let v = self.api.submit_grade(grade_id, comment.as_deref()).await?;
                self.show(&v);
            }
            Command::GradeReview { grade_id, approve, comment } => {
                let v = self.api.review_grade(grade_id, approve, comment.as_deref()).await?;
                self.show(&v);
            }
            Command::GradePublish { course_id } => {
                let reviewer = self.api.sessions().get_session().profile.map(|p| p.username);
                let v = self.api.publish_grades(course_id, reviewer.as_deref()).await?;
                self.show(&v);
            }
            Command::ScheduleAdd(input) => {
                validate_schedule(&input, true)?;
                let e = self.api.create_schedule_entry(&input).await?;
                println!("schedule entry {} created", e.id);
            }
            Command::ScheduleRemove(id) => {
                self.api.delete_schedule_entry(id).await?;
                println!("schedule entry {} removed", id);
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Navigate to `path`, following guard redirects, and render the page reached.
    /// Returns the path the console ended up at.
    pub async fn open(&mut self, path: &str) -> AppResult<String> {
        let target = self.follow(path)?;
        self.location = target.clone();
        if target.starts_with(LOGIN_PATH) {
            if target != path {
                println!("-> {} (log in to continue)", target);
            } else {
                println!("login page: use 'login <user> <password>'");
            }
            return Ok(target);
        }
        match pages::load_page(&self.api, &target).await {
            Some(page) => self.render(&page),
            None => println!("{}: nothing to show", target),
        }
        Ok(target)
    }

    /// Resolve `path` through the guard until it is admitted or lands on login.
    pub fn follow(&self, path: &str) -> AppResult<String> {
        let mut current = path.to_string();
        for _ in 0..=MAX_REDIRECTS {
            match self.guard.navigate(&current) {
                GuardDecision::Allow => return Ok(current),
                decision => {
                    let next = decision.next_path().unwrap_or_else(|| LOGIN_PATH.to_string());
                    debug!(target: "eduadmin::guard", "redirect {} -> {}", current, next);
                    if next.starts_with(LOGIN_PATH) {
                        return Ok(next);
                    }
                    current = next;
                }
            }
        }
        Err(AppError::internal("redirect_loop".to_string(), format!("too many redirects starting at {}", path)))
    }

    fn render(&self, page: &Page) {
        println!("== {} ({}) ==", page.title, page.path);
        if page.panels.is_empty() {
            println!("(interactive page; use 'ask <prompt>')");
        }
        for p in &page.panels {
            println!("-- {} --", p.title);
            match &p.result {
                Ok(v) => self.show(v),
                Err(e) => eprintln!("error: {}", e),
            }
        }
        let failed = page.failures().count();
        if failed > 0 {
            eprintln!("{} of {} panels failed", failed, page.panels.len());
        }
    }

    fn show(&self, v: &Value) {
        print_result(v, self.output_json);
    }

    fn prompt(&self) -> String {
        format!("eduadmin:{}> ", self.location)
    }

    /// Read-eval-print loop. Errors from a command are printed and the loop continues.
    pub fn run_repl(&mut self, rt: &tokio::runtime::Runtime) -> AppResult<()> {
        let mut rl = DefaultEditor::new().map_err(|e| AppError::internal("readline".to_string(), e.to_string()))?;
        println!("eduadmin console. Type 'help' for commands.");
        loop {
            let line = match rl.readline(&self.prompt()) {
                Ok(l) => l,
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(AppError::internal("readline".to_string(), e.to_string())),
            };
            if line.trim().is_empty() { continue; }
            if keep_in_history(&line) {
                let _ = rl.add_history_entry(line.as_str());
            }
            match rt.block_on(self.run_line(&line)) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => eprintln!("error: {}", e.message()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
