//! Developer CLI for the project store.
//!
//! # Responsibility
//! - Drive the store through the same request surface the dashboard uses.
//! - Print response envelopes as pretty JSON for quick local checks.
//!
//! Without `--db` the store is in-memory and lives for one invocation, so
//! multi-step sessions use `replay`.

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use manuscript_core::db::open_db;
use manuscript_core::{
    init_from_config, seed_if_empty, ApiRequest, ApiResponse, ChapterStatus, CreateChapter,
    CreateProject, InMemoryProjectRepository, ProjectApi, ProjectRepository, ProjectService,
    ProjectStatus, ProjectType, SqliteProjectRepository, StoreConfig, UpdateProject,
};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "manuscript", version, about = "Manuscript project store CLI")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// SQLite database file; in-memory store when omitted
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,
    /// Load demo projects into an empty store
    #[arg(long, global = true)]
    seed: bool,
    /// Simulate per-operation network latency
    #[arg(long, global = true)]
    latency: bool,
    /// Absolute directory for rolling log files
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all projects
    List,
    /// Show one project
    Get { id: String },
    /// Create a draft project
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "type", value_enum)]
        kind: KindArg,
    },
    /// Update selected fields of a project
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "type", value_enum)]
        kind: Option<KindArg>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Delete a project
    Delete { id: String },
    /// List the chapters of a project
    Chapters { project_id: String },
    /// Add a chapter to a project
    AddChapter {
        project_id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        order: i64,
        #[arg(long, value_enum, default_value_t = ChapterStatusArg::Draft)]
        status: ChapterStatusArg,
    },
    /// Run `METHOD PATH [JSON]` lines from a file (`-` for stdin)
    Replay { script: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Book,
    Article,
    Guide,
    Whitepaper,
    Other,
}

impl From<KindArg> for ProjectType {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Book => Self::Book,
            KindArg::Article => Self::Article,
            KindArg::Guide => Self::Guide,
            KindArg::Whitepaper => Self::Whitepaper,
            KindArg::Other => Self::Other,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Draft,
    Active,
    Archived,
}

impl From<StatusArg> for ProjectStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Draft => Self::Draft,
            StatusArg::Active => Self::Active,
            StatusArg::Archived => Self::Archived,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ChapterStatusArg {
    Draft,
    NeedsResearch,
    NeedsEdit,
    Final,
}

impl From<ChapterStatusArg> for ChapterStatus {
    fn from(value: ChapterStatusArg) -> Self {
        match value {
            ChapterStatusArg::Draft => Self::Draft,
            ChapterStatusArg::NeedsResearch => Self::NeedsResearch,
            ChapterStatusArg::NeedsEdit => Self::NeedsEdit,
            ChapterStatusArg::Final => Self::Final,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether every executed request succeeded.
fn run(cli: Cli) -> Result<bool, String> {
    let config = load_config(&cli)?;
    init_from_config(&config).map_err(|err| err.to_string())?;

    match config.db_path.clone() {
        Some(path) => {
            let conn = open_db(&path)
                .map_err(|err| format!("failed to open `{}`: {err}", path.display()))?;
            execute(SqliteProjectRepository::new(&conn), &config, cli.command)
        }
        None => execute(InMemoryProjectRepository::new(), &config, cli.command),
    }
}

fn load_config(cli: &Cli) -> Result<StoreConfig, String> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path).map_err(|err| err.to_string())?,
        None => StoreConfig::default(),
    }
    .with_env_overrides()
    .map_err(|err| err.to_string())?;

    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    config.seed_demo_data |= cli.seed;
    config.latency.enabled |= cli.latency;
    Ok(config)
}

fn execute<R: ProjectRepository>(
    mut repo: R,
    config: &StoreConfig,
    command: Command,
) -> Result<bool, String> {
    if config.seed_demo_data {
        seed_if_empty(&mut repo).map_err(|err| format!("failed to seed demo data: {err}"))?;
    }
    let mut api = ProjectApi::new(
        ProjectService::from_config(repo, config),
        config.app_name.clone(),
    );

    let request = match command {
        Command::List => ApiRequest::ListProjects,
        Command::Get { id } => ApiRequest::GetProject { id },
        Command::Create {
            title,
            description,
            kind,
        } => ApiRequest::CreateProject(CreateProject {
            title,
            description,
            kind: kind.into(),
        }),
        Command::Update {
            id,
            title,
            description,
            kind,
            status,
        } => ApiRequest::UpdateProject {
            id,
            patch: UpdateProject {
                title,
                description,
                kind: kind.map(Into::into),
                status: status.map(Into::into),
            },
        },
        Command::Delete { id } => ApiRequest::DeleteProject { id },
        Command::Chapters { project_id } => ApiRequest::ListChapters { project_id },
        Command::AddChapter {
            project_id,
            title,
            content,
            order,
            status,
        } => ApiRequest::CreateChapter {
            project_id,
            input: CreateChapter {
                title,
                content,
                order,
                status: status.into(),
            },
        },
        Command::Replay { script } => return replay(&mut api, &script),
    };

    let response = api.dispatch(request);
    print_response(&response)?;
    Ok(response.is_success())
}

fn replay<R: ProjectRepository>(
    api: &mut ProjectApi<R>,
    script: &Path,
) -> Result<bool, String> {
    let reader: Box<dyn BufRead> = if script.as_os_str() == "-" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = std::fs::File::open(script)
            .map_err(|err| format!("failed to open `{}`: {err}", script.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut all_ok = true;
    let mut executed = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| format!("failed to read line {}: {err}", index + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (method, path, body) = split_request_line(trimmed)
            .ok_or_else(|| format!("line {}: expected `METHOD PATH [JSON]`", index + 1))?;
        println!("> {method} {path}");
        let response = api.handle(method, path, body);
        print_response(&response)?;
        all_ok &= response.is_success();
        executed += 1;
    }

    info!("event=replay_done module=cli status=ok executed={executed} all_ok={all_ok}");
    Ok(all_ok)
}

fn split_request_line(line: &str) -> Option<(&str, &str, Option<&str>)> {
    let (method, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    match rest.split_once(char::is_whitespace) {
        Some((path, body)) => Some((method, path, Some(body.trim()))),
        None if !rest.is_empty() => Some((method, rest, None)),
        None => None,
    }
}

fn print_response(response: &ApiResponse) -> Result<(), String> {
    let body = serde_json::to_string_pretty(&response.body)
        .map_err(|err| format!("failed to render response: {err}"))?;
    println!("{} {body}", response.status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{split_request_line, ChapterStatusArg, Cli, Command};
    use clap::Parser;

    #[test]
    fn request_lines_split_into_method_path_and_body() {
        assert_eq!(
            split_request_line("GET /api/v1/projects"),
            Some(("GET", "/api/v1/projects", None))
        );
        assert_eq!(
            split_request_line(r#"PUT  /api/v1/projects/1 {"status": "active"}"#),
            Some(("PUT", "/api/v1/projects/1", Some(r#"{"status": "active"}"#)))
        );
        assert_eq!(split_request_line("GET"), None);
    }

    #[test]
    fn create_command_parses_type_flag() {
        let cli = Cli::try_parse_from([
            "manuscript",
            "--seed",
            "create",
            "--title",
            "Draft A",
            "--type",
            "whitepaper",
        ])
        .unwrap();
        assert!(cli.seed);
    }

    #[test]
    fn add_chapter_parses_kebab_case_status() {
        let cli = Cli::try_parse_from([
            "manuscript",
            "add-chapter",
            "42",
            "--title",
            "Introduction",
            "--order",
            "-1",
            "--status",
            "needs-research",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::AddChapter {
                order: -1,
                status: ChapterStatusArg::NeedsResearch,
                ..
            }
        ));
    }
}
