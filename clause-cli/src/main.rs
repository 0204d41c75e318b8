//! Command-line interface for clause
//! This binary normalizes stored template bodies, renders templates in author or preview mode, and
//! lists the placeholder vocabulary.
//!
//! Usage:
//!   clause normalize `<path>` [--to json|yaml|tag|html]            - Canonicalize stored content
//!   clause render `<record>` [--mode author|preview] [--to html|tag|json]
//!                 [--applicants N] [--currency C] [--discount P]     - Render a template record
//!   clause tokens                                                  - List placeholder families
//!   clause formats                                                 - List document formats
//!
//! Every subcommand accepts `--config <file>` (layered over the built-in defaults) and
//! `--verbose`.

mod commands;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clause_config::{ClauseConfig, Loader};
use commands::{RenderOptions, NORMALIZE_TARGETS, RENDER_TARGETS};

fn main() {
    let matches = Command::new("clause")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for normalizing, rendering and inspecting contract templates")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log which normalization path was taken and other details"),
        )
        .subcommand(
            Command::new("normalize")
                .about("Convert stored template content to a canonical document")
                .arg(
                    Arg::new("path")
                        .help("File holding stored content (.json is read as JSON, anything else as text)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .short('t')
                        .help("Output format")
                        .value_parser(NORMALIZE_TARGETS.to_vec())
                        .default_value("json"),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Render a template record")
                .arg(
                    Arg::new("path")
                        .help("JSON file holding a template record")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .short('m')
                        .help("author keeps placeholders, preview substitutes them")
                        .value_parser(["author", "preview"])
                        .default_value("preview"),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .short('t')
                        .help("Output format (default: [render] format from configuration)")
                        .value_parser(RENDER_TARGETS.to_vec()),
                )
                .arg(
                    Arg::new("applicants")
                        .long("applicants")
                        .help("Number of applicants")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("currency")
                        .long("currency")
                        .help("Currency code or symbol"),
                )
                .arg(
                    Arg::new("discount")
                        .long("discount")
                        .help("Discount percentage, 0 to 100")
                        .value_parser(value_parser!(f64)),
                ),
        )
        .subcommand(Command::new("tokens").about("List placeholder families and their tags"))
        .subcommand(Command::new("formats").about("List available document formats"))
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    let result = match matches.subcommand() {
        Some(("normalize", sub)) => handle_normalize_command(sub),
        Some(("render", sub)) => handle_render_command(sub),
        Some(("tokens", _)) => Ok(commands::list_tokens()),
        Some(("formats", _)) => Ok(commands::list_formats()),
        _ => Err("Unknown command".to_string()),
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    use log::LevelFilter::{Debug, Warn};

    let level = if verbose { Debug } else { Warn };
    let _ = env_logger::builder()
        .filter_module("clause_core", level)
        .filter_module("clause_babel", level)
        .filter_module("clause", level)
        .try_init();
}

fn load_config(matches: &ArgMatches) -> Result<ClauseConfig, String> {
    let loader = match matches.get_one::<String>("config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    loader
        .build()
        .map_err(|e| format!("Configuration error: {}", e))
}

/// Handle the normalize command
fn handle_normalize_command(matches: &ArgMatches) -> Result<String, String> {
    let config = load_config(matches)?;
    let path = required(matches, "path")?;
    let target = required(matches, "to")?;
    commands::normalize_file(path, target, &config)
}

/// Handle the render command
fn handle_render_command(matches: &ArgMatches) -> Result<String, String> {
    let config = load_config(matches)?;
    let path = required(matches, "path")?;
    let options = RenderOptions {
        preview: required(matches, "mode")? == "preview",
        target: matches
            .get_one::<String>("to")
            .cloned()
            .unwrap_or_else(|| config.render.format.as_str().to_string()),
        applicants: matches.get_one::<u32>("applicants").copied(),
        currency: matches.get_one::<String>("currency").cloned(),
        discount: matches.get_one::<f64>("discount").copied(),
    };
    commands::render_record(path, &options, &config)
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, String> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing argument '{}'", name))
}
