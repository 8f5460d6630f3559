use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use tilewright_editor::{Editor, EditorConfig, EditorError, Result, boot};

const USAGE: &str = "tilewright-editor [--config=PATH] <command>

commands:
  list [--json]            show the game catalog
  filters                  show file dialog filters
  open FILE                open a level and summarize it
  new --game=ID --out=PATH [--level-type=N] [--template=N]
                           create a level from a template and save it";

enum Command {
    List { json: bool },
    Filters,
    Open(PathBuf),
    New {
        game: String,
        out: PathBuf,
        level_type: usize,
        template: usize,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(EditorError::Usage(msg)) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        },
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        },
    }
}

fn run(args: &[String]) -> Result<()> {
    let command = parse_command(args)?;
    let config = match flag(args, "--config") {
        Some(path) => EditorConfig::load_from(Path::new(path)),
        None => EditorConfig::load(),
    };
    let mut editor = boot(config)?;
    execute(&mut editor, command)
}

/// Value of a `--name=value` argument.
fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .find_map(|arg| arg.strip_prefix(name)?.strip_prefix('='))
}

fn index_flag(args: &[String], name: &str) -> Result<usize> {
    match flag(args, name) {
        None => Ok(0),
        Some(value) => value
            .parse()
            .map_err(|_| EditorError::Usage(format!("{name} expects a number, got '{value}'"))),
    }
}

fn parse_command(args: &[String]) -> Result<Command> {
    let positional: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|arg| !arg.starts_with("--"))
        .collect();
    match positional.as_slice() {
        ["list"] => Ok(Command::List {
            json: args.iter().any(|arg| arg == "--json"),
        }),
        ["filters"] => Ok(Command::Filters),
        ["open", file] => Ok(Command::Open(PathBuf::from(*file))),
        ["new"] => {
            let game = flag(args, "--game").ok_or_else(|| EditorError::Usage(USAGE.into()))?;
            let out = flag(args, "--out").ok_or_else(|| EditorError::Usage(USAGE.into()))?;
            Ok(Command::New {
                game: game.to_string(),
                out: PathBuf::from(out),
                level_type: index_flag(args, "--level-type")?,
                template: index_flag(args, "--template")?,
            })
        },
        _ => Err(EditorError::Usage(USAGE.into())),
    }
}

fn execute(editor: &mut Editor, command: Command) -> Result<()> {
    match command {
        Command::List { json: true } => {
            println!("{}", serde_json::to_string_pretty(&editor.listing())?);
        },
        Command::List { json: false } => print!("{}", editor.render_tree()),
        Command::Filters => {
            for filter in editor.registry().file_filters() {
                println!("{filter}");
            }
        },
        Command::Open(path) => {
            let id = editor.session_mut().open_path(&path)?;
            if let Some(open) = editor.session().get(id) {
                println!(
                    "{}: {} ({}), {} items",
                    path.display(),
                    open.document.level_type().type_name(),
                    open.game_id,
                    open.document.level().items().len()
                );
            }
        },
        Command::New {
            game,
            out,
            level_type,
            template,
        } => {
            let session = editor.session_mut();
            let id = session.new_level(&game, level_type, template)?;
            session.save_as(id, &out)?;
            println!("created {}", out.display());
        },
    }
    Ok(())
}
