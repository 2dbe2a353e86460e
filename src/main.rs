use std::io::Write;
use std::path::{Path, PathBuf};

use halo::{app::App, options::Options};

/// What the binary was asked to do.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// Open the viewer, optionally with options loaded from a preset file.
    Run(Option<PathBuf>),
    /// Write the options JSON Schema to stdout.
    Schema,
    /// Write the preset names found in a directory to stdout.
    Presets(PathBuf),
}

fn parse_args(
    mut args: impl Iterator<Item = String>,
) -> Result<Command, String> {
    match args.next().as_deref() {
        None => Ok(Command::Run(None)),
        Some("--schema") => Ok(Command::Schema),
        Some("--presets") => args
            .next()
            .map(|dir| Command::Presets(PathBuf::from(dir)))
            .ok_or_else(|| "--presets needs a directory".to_owned()),
        Some(flag) if flag.starts_with("--") => {
            Err(format!("unknown flag `{flag}`"))
        }
        Some(path) => Ok(Command::Run(Some(PathBuf::from(path)))),
    }
}

fn load_options(path: Option<&Path>) -> Result<Options, String> {
    let Some(path) = path else {
        return Ok(Options::default());
    };
    let options = Options::load(path).map_err(|e| e.to_string())?;
    log::info!("loaded options from {}", path.display());
    Ok(options)
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Schema => {
            let schema = Options::json_schema();
            writeln!(std::io::stdout().lock(), "{:#}", schema.as_value())
                .map_err(|e| e.to_string())
        }
        Command::Presets(dir) => {
            let mut out = std::io::stdout().lock();
            for name in Options::list_presets(&dir) {
                writeln!(out, "{name}").map_err(|e| e.to_string())?;
            }
            Ok(())
        }
        Command::Run(path) => {
            let options = load_options(path.as_deref())?;
            App::builder()
                .with_options(options)
                .build()
                .run()
                .map_err(|e| e.to_string())
        }
    }
}

fn main() {
    env_logger::init();

    let result = parse_args(std::env::args().skip(1)).and_then(run);
    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        parse_args(args.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn no_arguments_runs_with_defaults() {
        assert_eq!(parse(&[]), Ok(Command::Run(None)));
    }

    #[test]
    fn path_argument_is_a_preset_file() {
        assert_eq!(
            parse(&["presets/glow.toml"]),
            Ok(Command::Run(Some(PathBuf::from("presets/glow.toml"))))
        );
    }

    #[test]
    fn schema_and_presets_flags() {
        assert_eq!(parse(&["--schema"]), Ok(Command::Schema));
        assert_eq!(
            parse(&["--presets", "presets"]),
            Ok(Command::Presets(PathBuf::from("presets")))
        );
        assert!(parse(&["--presets"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }
}
