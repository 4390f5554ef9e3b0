//! GitHub Actions workflow commands
//!
//! The runner talks to its invoking environment through `::command::` lines
//! on stdout and through the file commands the runner exposes via
//! `GITHUB_*` environment variables.

use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::error::InputError;

/// Severity of a workflow annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Debug => write!(f, "debug"),
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

impl Level {
    /// Map a `log` level onto an annotation, `None` for plain output
    pub fn from_log(level: log::Level) -> Option<Self> {
        match level {
            log::Level::Error => Some(Level::Error),
            log::Level::Warn => Some(Level::Warning),
            log::Level::Info => None,
            log::Level::Debug | log::Level::Trace => Some(Level::Debug),
        }
    }
}

/// A single `::name::message` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    message: String,
}

impl Command {
    pub fn new(name: impl ToString, message: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "::{}::{}", self.name, escape_data(&self.message))
    }
}

pub fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Environment variable an action input named `name` arrives in
pub fn input_key(name: &str) -> String {
    format!("INPUT_{name}").replace(' ', "_").to_uppercase()
}

/// Parse the value of a boolean action input
///
/// Unset and empty both mean the input was not given. `yes`, `true`, `t`,
/// `no`, `false` and `f` are accepted in any case.
pub fn parse_bool_input(name: &str, value: Option<&str>) -> Result<Option<bool>, InputError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" => Ok(Some(true)),
        "no" | "false" | "f" => Ok(Some(false)),
        _ => Err(InputError::InvalidBool {
            input: name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Print a command on stdout where the runner picks it up
pub fn issue(cmd: &Command) {
    println!("{cmd}");
}

/// Whether we are running inside a GitHub Actions job
pub fn is_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Whether step debug logging was requested for this job
pub fn is_debug() -> bool {
    std::env::var("RUNNER_DEBUG").is_ok_and(|v| v.trim() == "1")
}

/// Report the run as failed and exit with code 1
pub fn fail(message: impl fmt::Display) -> ! {
    issue(&Command::new(Level::Error, message));
    std::process::exit(1);
}

/// Prepend `dir` to PATH for the following steps of the job
///
/// Uses the `GITHUB_PATH` file command when available and falls back to the
/// legacy `add-path` stdout command otherwise.
pub fn add_path(dir: &Path) -> std::io::Result<()> {
    match std::env::var_os("GITHUB_PATH") {
        Some(file) => append_line(Path::new(&file), &dir.to_string_lossy()),
        None => {
            issue(&Command::new("add-path", dir.to_string_lossy()));
            Ok(())
        }
    }
}

fn append_line(file: &Path, line: &str) -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)?;
    let mut file = std::io::BufWriter::new(file);
    writeln!(file, "{line}")?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_plain_command() {
        let cmd = Command::new(Level::Warning, "manifest missing");
        assert_eq!(cmd.to_string(), "::warning::manifest missing");
    }

    #[test]
    fn escapes_message() {
        let cmd = Command::new(Level::Error, "50% done\r\nnext");
        assert_eq!(cmd.to_string(), "::error::50%25 done%0D%0Anext");
    }

    #[test]
    fn input_keys_are_upper_case() {
        assert_eq!(input_key("add-path"), "INPUT_ADD-PATH");
        assert_eq!(input_key("validate asset"), "INPUT_VALIDATE_ASSET");
    }

    #[test]
    fn bool_inputs_accept_any_case() {
        for value in ["true", "True", "TRUE", "yes", "T"] {
            assert_eq!(parse_bool_input("cache", Some(value)).unwrap(), Some(true));
        }
        for value in ["false", "False", "NO", "f", " false "] {
            assert_eq!(parse_bool_input("cache", Some(value)).unwrap(), Some(false));
        }
    }

    #[test]
    fn empty_bool_input_is_unset() {
        assert_eq!(parse_bool_input("cache", Some("")).unwrap(), None);
        assert_eq!(parse_bool_input("cache", None).unwrap(), None);
    }

    #[test]
    fn invalid_bool_input_names_the_input() {
        let err = parse_bool_input("add-path", Some("maybe")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "input `add-path` must be a boolean (true/false), got `maybe`"
        );
    }

    #[test]
    fn maps_log_levels() {
        assert_eq!(Level::from_log(log::Level::Warn), Some(Level::Warning));
        assert_eq!(Level::from_log(log::Level::Trace), Some(Level::Debug));
        assert_eq!(Level::from_log(log::Level::Info), None);
    }

    #[test]
    fn append_line_adds_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path_file = dir.path().join("github_path");
        append_line(&path_file, "/opt/one").unwrap();
        append_line(&path_file, "/opt/two").unwrap();
        let contents = std::fs::read_to_string(&path_file).unwrap();
        assert_eq!(contents, "/opt/one\n/opt/two\n");
    }
}
