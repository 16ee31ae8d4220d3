use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use webllama_application::{PreviewWriter, WebsiteBuilder};
use webllama_core::{BuilderEvent, EventSender, FileKind, StatusLevel};
use webllama_infrastructure::{ConfigStorage, FileKeyValueStorage};
use webllama_interaction::{API_KEY_ENV, OpenRouterApiAgent, SUPPORTED_MODELS};

#[derive(Parser)]
#[command(name = "webllama")]
#[command(about = "WebLlama - AI website generator for the terminal", long_about = None)]
struct Cli {
    /// OpenRouter API key (defaults to $OPENROUTER_API_KEY; never persisted)
    #[arg(long)]
    api_key: Option<String>,

    /// Model identifier (defaults to the configured model)
    #[arg(long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a website from a prompt and export it as a zip archive
    Generate {
        /// Natural-language description of the website
        prompt: String,

        /// Destination directory for the archive
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the models offered out of the box
    Models,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        let commands = [
            "/go", "/enhance", "/stop", "/show", "/tab", "/edit", "/history", "/load", "/delete",
            "/clear", "/export", "/preview", "/open", "/model", "/models", "/help",
        ];
        Self {
            commands: commands.iter().map(|cmd| cmd.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Builds the controller from CLI flags, environment, and config.toml.
fn build_controller(cli: &Cli, events: EventSender) -> Result<Arc<WebsiteBuilder>> {
    let config = ConfigStorage::default_location()?.load()?;

    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .unwrap_or_default();
    let model = cli
        .model
        .clone()
        .unwrap_or_else(|| config.default_model.clone());

    let agent = Arc::new(OpenRouterApiAgent::new(api_key.clone(), &config));
    let storage = Arc::new(FileKeyValueStorage::default_location()?);
    let preview = PreviewWriter::default_location()?;

    Ok(Arc::new(WebsiteBuilder::new(
        agent, storage, preview, api_key, model, events,
    )))
}

/// Renders one controller event to the terminal.
fn render_event(event: BuilderEvent) {
    match event {
        BuilderEvent::Status { level, message } => match level {
            StatusLevel::Error => eprintln!("{}", message.red()),
            StatusLevel::Success => println!("{}", message.green()),
            StatusLevel::Info => println!("{}", message.yellow()),
        },
        BuilderEvent::HistoryChanged => {
            println!("{}", "History updated. Type /history to list it.".bright_black())
        }
        BuilderEvent::BuffersReplaced => {
            println!("{}", "Buffers updated. Type /show to inspect them.".bright_black())
        }
        BuilderEvent::PromptReplaced { prompt } => {
            println!("{}", "Enhanced prompt (use /go to generate with it):".bright_magenta());
            for line in prompt.lines() {
                println!("{}", line.bright_blue());
            }
        }
        BuilderEvent::PreviewUpdated { path } => {
            println!("{}", format!("Preview: {}", path.display()).bright_black())
        }
        BuilderEvent::Cleared => println!("{}", "All local state cleared.".bright_black()),
    }
}

fn print_help() {
    println!("{}", "Type a description to generate a website.".bright_black());
    println!("{}", "  /go                regenerate with the current prompt".bright_black());
    println!("{}", "  /enhance [text]    enhance the prompt with the model".bright_black());
    println!("{}", "  /stop              cancel the in-flight request".bright_black());
    println!("{}", "  /show [html|css|js] print a buffer".bright_black());
    println!("{}", "  /tab <html|css|js> switch the active buffer".bright_black());
    println!("{}", "  /edit <html|css|js> replace a buffer (end input with a lone '.')".bright_black());
    println!("{}", "  /history           list past generations".bright_black());
    println!("{}", "  /load <id>         load a past generation".bright_black());
    println!("{}", "  /delete <id>       delete a past generation".bright_black());
    println!("{}", "  /clear             wipe history and session".bright_black());
    println!("{}", "  /export [dir]      export the buffers as a zip".bright_black());
    println!("{}", "  /preview           refresh the inline preview file".bright_black());
    println!("{}", "  /open              open a detached preview in the browser".bright_black());
    println!("{}", "  /model [id]        show or switch the model".bright_black());
    println!("{}", "  /models            list offered models".bright_black());
    println!("{}", "  quit               exit".bright_black());
}

fn print_history(builder: &WebsiteBuilder) {
    let entries = builder.history_entries();
    if entries.is_empty() {
        println!("{}", "No generation history yet.".bright_black());
        return;
    }
    for entry in entries {
        println!(
            "{}  {} {}  {}",
            entry.id.to_string().bright_cyan(),
            entry.date.bright_black(),
            entry.timestamp.bright_black(),
            entry.prompt
        );
        println!("    {}", entry.model.bright_black());
    }
}

fn parse_id(arg: Option<&str>) -> Option<i64> {
    match arg.map(str::parse) {
        Some(Ok(id)) => Some(id),
        _ => {
            eprintln!("{}", "Expected a numeric history id.".red());
            None
        }
    }
}

/// Reads buffer lines until a lone `.`.
fn read_buffer_lines(rl: &mut Editor<CliHelper, rustyline::history::DefaultHistory>) -> Option<String> {
    let mut lines = Vec::new();
    loop {
        match rl.readline("... ") {
            Ok(line) if line.trim() == "." => break,
            Ok(line) => lines.push(line),
            Err(_) => return None,
        }
    }
    Some(lines.join("\n"))
}

/// One-shot generation for scripting: generate, then export.
async fn run_generate_once(cli: &Cli, prompt: &str, output: Option<PathBuf>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let builder = build_controller(cli, tx)?;

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            render_event(event);
        }
    });

    builder.generate(prompt).await;

    if !builder.files().is_empty() {
        let _ = builder.export_as_archive(output).await;
    }

    drop(builder);
    let _ = printer.await;
    Ok(())
}

/// The interactive REPL.
async fn run_repl(cli: &Cli) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let builder = build_controller(cli, tx)?;

    // Render controller events as they arrive, independent of the input loop.
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            render_event(event);
        }
    });

    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== WebLlama ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Model: {}. Type a description to generate, /help for commands.", builder.model())
            .bright_black()
    );
    println!();

    if builder.restore_session() {
        println!("{}", "Restored your previous session.".bright_black());
    }
    print_history(&builder);

    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if let Some(command) = trimmed.strip_prefix('/') {
                    handle_command(&builder, &mut rl, command);
                } else {
                    // Bare input is a prompt; generate in the background so
                    // /stop stays reachable.
                    let b = Arc::clone(&builder);
                    let prompt = trimmed.to_string();
                    tokio::spawn(async move {
                        b.generate(&prompt).await;
                    });
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    drop(builder);
    let _ = printer.await;
    Ok(())
}

fn handle_command(
    builder: &Arc<WebsiteBuilder>,
    rl: &mut Editor<CliHelper, rustyline::history::DefaultHistory>,
    command: &str,
) {
    let mut parts = command.splitn(2, ' ');
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

    match name {
        "go" => {
            let prompt = builder.current_prompt();
            let b = Arc::clone(builder);
            tokio::spawn(async move {
                b.generate(&prompt).await;
            });
        }
        "enhance" => {
            let prompt = arg
                .map(str::to_string)
                .unwrap_or_else(|| builder.current_prompt());
            let b = Arc::clone(builder);
            tokio::spawn(async move {
                b.enhance_prompt(&prompt).await;
            });
        }
        "stop" => builder.cancel_active(),
        "show" => {
            let kind = match arg {
                Some(arg) => match arg.parse::<FileKind>() {
                    Ok(kind) => kind,
                    Err(err) => {
                        eprintln!("{}", err.red());
                        return;
                    }
                },
                None => builder.active_tab(),
            };
            let files = builder.files();
            let content = files.get(kind);
            if content.is_empty() {
                println!("{}", format!("({kind} buffer is empty)").bright_black());
            } else {
                println!("{content}");
            }
        }
        "tab" => match arg.map(str::parse::<FileKind>) {
            Some(Ok(kind)) => {
                builder.switch_active_tab(kind);
                println!("{}", format!("Active buffer: {kind}").bright_black());
            }
            _ => eprintln!("{}", "Usage: /tab <html|css|js>".red()),
        },
        "edit" => match arg.map(str::parse::<FileKind>) {
            Some(Ok(kind)) => {
                println!(
                    "{}",
                    format!("Enter new {kind} content; finish with a lone '.'").bright_black()
                );
                if let Some(text) = read_buffer_lines(rl) {
                    builder.edit_buffer(kind, text);
                }
            }
            _ => eprintln!("{}", "Usage: /edit <html|css|js>".red()),
        },
        "history" => print_history(builder),
        "load" => {
            if let Some(id) = parse_id(arg) {
                builder.load_history_entry(id);
            }
        }
        "delete" => {
            if let Some(id) = parse_id(arg) {
                builder.delete_history_entry(id);
            }
        }
        "clear" => builder.clear_all(),
        "export" => {
            let dest = arg.map(PathBuf::from);
            let b = Arc::clone(builder);
            tokio::spawn(async move {
                let _ = b.export_as_archive(dest).await;
            });
        }
        "preview" => {
            let _ = builder.preview_inline();
        }
        "open" => {
            let _ = builder.preview_detached(true);
        }
        "model" => match arg {
            Some(model) => {
                builder.set_model(model);
                println!("{}", format!("Model set to {model}").bright_black());
            }
            None => println!("{}", format!("Model: {}", builder.model()).bright_black()),
        },
        "models" => {
            for model in SUPPORTED_MODELS {
                println!("{}", model.bright_blue());
            }
        }
        "help" => print_help(),
        other => eprintln!("{}", format!("Unknown command: /{other}").red()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Models) => {
            for model in SUPPORTED_MODELS {
                println!("{model}");
            }
            Ok(())
        }
        Some(Commands::Generate { prompt, output }) => {
            let prompt = prompt.clone();
            let output = output.clone();
            run_generate_once(&cli, &prompt, output).await
        }
        None => run_repl(&cli).await,
    }
}
