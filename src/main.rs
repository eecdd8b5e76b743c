//!
//! eduadmin console
//! ----------------
//! Command-line client for the academic-affairs API. Without a command it starts the
//! interactive console; with `-c` or `--open` it runs one command and exits.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use eduadmin::api::AcademicApi;
use eduadmin::cli::{Console, Flow, HELP};
use eduadmin::config::{ConfigOverrides, ConsoleConfig};
use eduadmin::error::{AppError, AppResult};
use eduadmin::gateway::ApiGateway;
use eduadmin::identity::{FileKv, SessionStore};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [flags]                       # interactive console\n  {program} [flags] -c \"<command>\"        # run one console command\n  {program} [flags] --open <path>          # show one page\n\nFlags:\n  --api <url>              API base URL (default http://localhost:8000, env EDUADMIN_API_BASE)\n  --session-file <path>    Session storage file (default .eduadmin/session.json, env EDUADMIN_SESSION_FILE)\n  --config <path>          JSON config file with the same keys as the settings\n  --json                   Print raw JSON instead of tables (env EDUADMIN_OUTPUT=json)\n  --clear-on-401           Forget the session when the API answers 401 (env EDUADMIN_CLEAR_ON_401)\n  --user <u> --password <p>  Log in before running anything\n  -c, --command <cmd>      Run one console command and exit\n  --open <path>            Same as -c \"open <path>\"\n  -h, --help               Show this help\n\n{HELP}"
    );
}

#[derive(Debug, Default)]
struct Args {
    config_file: Option<PathBuf>,
    flags: ConfigOverrides,
    user: Option<String>,
    password: Option<String>,
    command: Option<String>,
}

fn parse_args(program: &str, args: &[String]) -> AppResult<Args> {
    let mut out = Args::default();
    let mut i = 0;
    let value = |i: usize, flag: &str| -> AppResult<String> {
        args.get(i + 1)
            .cloned()
            .ok_or_else(|| AppError::user("missing_value".to_string(), format!("{} requires a value", flag)))
    };
    while i < args.len() {
        match args[i].as_str() {
            "--api" => { out.flags.api_base = Some(value(i, "--api")?); i += 2; }
            "--session-file" => { out.flags.session_file = Some(PathBuf::from(value(i, "--session-file")?)); i += 2; }
            "--config" => { out.config_file = Some(PathBuf::from(value(i, "--config")?)); i += 2; }
            "--json" => { out.flags.output_json = Some(true); i += 1; }
            "--clear-on-401" => { out.flags.clear_session_on_unauthorized = Some(true); i += 1; }
            "--user" => { out.user = Some(value(i, "--user")?); i += 2; }
            "--password" => { out.password = Some(value(i, "--password")?); i += 2; }
            "-c" | "--command" => { out.command = Some(value(i, "--command")?); i += 2; }
            "--open" => { out.command = Some(format!("open {}", value(i, "--open")?)); i += 2; }
            "-h" | "--help" => { print_usage(program); std::process::exit(0); }
            other => {
                return Err(AppError::user("unknown_flag".to_string(), format!("unknown argument '{}'", other)));
            }
        }
    }
    Ok(out)
}

fn run(program: &str, args: &[String]) -> AppResult<()> {
    let args = parse_args(program, args)?;
    let file_layer = args.config_file.as_deref().map(ConfigOverrides::from_file).transpose()?;
    let cfg = ConsoleConfig::from_layers(file_layer.as_ref(), &ConfigOverrides::from_env(), &args.flags);

    info!(
        target: "eduadmin",
        "eduadmin starting: api='{}', session_file='{}', clear_on_401={}",
        cfg.api_base,
        cfg.session_file.display(),
        cfg.clear_session_on_unauthorized
    );

    let sessions = SessionStore::new(Arc::new(FileKv::new(&cfg.session_file)));
    let api = AcademicApi::new(ApiGateway::from_config(&cfg, sessions)?);

    let rt = tokio::runtime::Runtime::new().map_err(anyhow::Error::from)?;
    if let (Some(user), Some(password)) = (&args.user, &args.password) {
        let resp = rt.block_on(api.login(user, password))?;
        if args.command.is_none() {
            println!("logged in as {}", resp.user.display_name());
        }
    }
    let mut console = Console::new(api, cfg.output_json);
    match args.command {
        Some(cmd) => rt.block_on(console.run_line(&cmd)).map(|_: Flow| ()),
        None => console.run_repl(&rt),
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut args: Vec<String> = env::args().collect();
    let program = if args.is_empty() { "eduadmin".to_string() } else { args.remove(0) };

    if let Err(e) = run(&program, &args) {
        eprintln!("Error: {}", e);
        if matches!(e, AppError::UserInput { .. }) && e.code_str() == "unknown_flag" {
            print_usage(&program);
        }
        std::process::exit(e.exit_code());
    }
}
