//! winconsole - open a console window for this process and drive it
//!
//! Opens a console session configured from `~/.winconsole/config.toml` and
//! the command line, reports the visible column count, and waits for Enter
//! before releasing the console.
//!
//! ```text
//! winconsole                     # Defaults from config.toml
//! winconsole -t "Build log"      # Custom title
//! winconsole --top --no-close    # Topmost, close button disabled
//! ```

use std::env;

use tracing::info;
use tracing_subscriber::EnvFilter;

use winconsole::ConsoleConfig;

/// Command-line overrides
#[derive(Debug, Default, PartialEq)]
struct Options {
    /// Window title
    title: Option<String>,
    /// Force always-on-top
    always_on_top: bool,
    /// Disable the close button
    no_close: bool,
}

impl Options {
    fn merge_into(self, config: &mut ConsoleConfig) {
        if self.title.is_some() {
            config.title = self.title;
        }
        if self.always_on_top {
            config.window.always_on_top = true;
        }
        if self.no_close {
            config.window.close_button = false;
        }
    }
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Title used when neither the config nor the command line sets one
#[cfg_attr(not(windows), allow(dead_code))]
const DEFAULT_TITLE: &str = "winconsole";

fn print_help() {
    eprintln!("winconsole {} - Owned Windows console session", VERSION);
    eprintln!();
    eprintln!("Usage: winconsole [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -t, --title <TITLE>   Console window title");
    eprintln!("      --top             Keep the window above other windows");
    eprintln!("      --no-close        Disable the window close button");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.winconsole/config.toml");
    eprintln!("Log file:      ~/.winconsole/winconsole.log (level via WINCONSOLE_LOG)");
}

/// Outcome of argument parsing
#[derive(Debug, PartialEq)]
enum Parsed {
    Run(Options),
    Help,
    Version,
}

fn parse_args(args: &[String]) -> Result<Parsed, String> {
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(Parsed::Help),
            "-v" | "--version" => return Ok(Parsed::Version),
            "-t" | "--title" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing title argument".to_string());
                }
                options.title = Some(args[i].clone());
            }
            "--top" => {
                options.always_on_top = true;
            }
            "--no-close" => {
                options.no_close = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(Parsed::Run(options))
}

/// Log to a file; stdio is about to be redirected under our feet
fn init_logging() {
    let Some(dir) = ConsoleConfig::get_data_dir() else {
        return;
    };
    let _ = std::fs::create_dir_all(&dir);

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("winconsole.log"))
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env("WINCONSOLE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(Parsed::Run(options)) => options,
        Ok(Parsed::Help) => {
            print_help();
            return Ok(());
        }
        Ok(Parsed::Version) => {
            eprintln!("winconsole {}", VERSION);
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("winconsole starting...");

    let mut config = ConsoleConfig::load();
    options.merge_into(&mut config);

    #[cfg(not(windows))]
    {
        let _ = config;
        eprintln!("winconsole only supports Windows consoles.");
        return Ok(());
    }

    #[cfg(windows)]
    {
        run_console(&config)?;
    }

    Ok(())
}

#[cfg(windows)]
fn run_console(config: &ConsoleConfig) -> anyhow::Result<()> {
    use std::io::BufRead;
    use winconsole::{ConsoleBackend, ConsoleSession, Win32Console};

    let title = config.title.as_deref().unwrap_or(DEFAULT_TITLE);

    // Detach from the launching terminal so the session gets a console of
    // its own; closing it later must not take the user's shell with it
    let backend = Win32Console::new();
    if let Err(e) = backend.free() {
        tracing::debug!("No inherited console to release: {}", e);
    }
    let mut console = ConsoleSession::with_backend(backend, Some(title));
    config.apply(&mut console);

    if let Some(e) = console.last_error() {
        tracing::warn!("Console opened with errors, last: {}", e);
    }

    println!("{} {}", title, VERSION);
    println!("Visible columns: {}", console.columns());
    println!("Press Enter to close this console.");

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    console.close();
    info!("winconsole exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("winconsole")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(parse_args(&args(&[])), Ok(Parsed::Run(Options::default())));
    }

    #[test]
    fn test_parse_flags() {
        let parsed = parse_args(&args(&["--top", "-t", "Build log", "--no-close"]));
        assert_eq!(
            parsed,
            Ok(Parsed::Run(Options {
                title: Some("Build log".to_string()),
                always_on_top: true,
                no_close: true,
            }))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&["--title"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert_eq!(parse_args(&args(&["-h", "--bogus"])), Ok(Parsed::Help));
    }

    #[test]
    fn test_options_override_config() {
        let mut config = ConsoleConfig::default();
        config.title = Some("from file".to_string());

        Options {
            title: None,
            always_on_top: true,
            no_close: true,
        }
        .merge_into(&mut config);

        assert_eq!(config.title.as_deref(), Some("from file"));
        assert!(config.window.always_on_top);
        assert!(!config.window.close_button);
    }
}
