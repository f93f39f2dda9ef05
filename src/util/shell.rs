//! Centralized shell output.
//!
//! The Shell module provides a unified API for all user-facing output:
//! - Status messages with consistent formatting
//! - Scoped timing spans
//! - JSON output mode for machine-readable output
//!
//! # Design Principles
//!
//! 1. **Commands never manage spacing/indentation directly** - Shell handles all formatting
//! 2. **JSON mode is mutually exclusive** - No human output when JSON mode is enabled
//! 3. **Spans start quietly** - Start message only printed in verbose mode
//! 4. **Timing is always shown** - End messages include duration unless output is suppressed

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shell output mode - Human and Json are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    /// Human-readable output with optional colors.
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    /// Machine-readable JSON output only.
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
        }
    }
}

/// Output verbosity level (Human mode only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// --silent: errors only
    Silent,
    /// --quiet: warnings and errors
    Quiet,
    /// Default: status messages
    #[default]
    Normal,
    /// --verbose: span starts printed immediately, full command lines
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status types for output messages.
///
/// Shell handles all formatting - callers just specify the semantic status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Finished,

    // In-progress statuses (cyan)
    Compiling,
    Linking,
    Archiving,
    Running,
    Testing,

    // Info statuses (blue/default)
    Info,

    // Warning statuses (yellow)
    Skipped,
    Warning,

    // Error status (red)
    Error,
}

impl Status {
    /// Get the display text for this status.
    fn as_str(&self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Compiling => "Compiling",
            Status::Linking => "Linking",
            Status::Archiving => "Archiving",
            Status::Running => "Running",
            Status::Testing => "Testing",
            Status::Info => "Info",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    /// Get the ANSI color code for this status.
    fn color_code(&self) -> &'static str {
        match self {
            // Success: bold green
            Status::Finished => "\x1b[1;32m",
            // In-progress: bold cyan
            Status::Compiling
            | Status::Linking
            | Status::Archiving
            | Status::Running
            | Status::Testing => "\x1b[1;36m",
            // Info: bold blue
            Status::Info => "\x1b[1;34m",
            // Warning: bold yellow
            Status::Skipped | Status::Warning => "\x1b[1;33m",
            // Error: bold red
            Status::Error => "\x1b[1;31m",
        }
    }

    /// Lowest verbosity at which this status is still printed.
    fn min_verbosity(&self) -> Verbosity {
        match self {
            Status::Error => Verbosity::Silent,
            Status::Warning | Status::Skipped => Verbosity::Quiet,
            _ => Verbosity::Normal,
        }
    }

    /// Get the width for alignment (12 characters).
    fn width(&self) -> usize {
        12
    }
}

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
}

impl Shell {
    /// Create a new shell with the given mode.
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell { mode, use_color }
    }

    /// Create a shell from CLI flags with proper precedence.
    ///
    /// JSON mode takes precedence over everything; `silent` over `quiet`
    /// over `verbose`.
    pub fn from_flags(
        silent: bool,
        quiet: bool,
        verbose: bool,
        color: ColorChoice,
        message_format_json: bool,
    ) -> Self {
        let mode = if message_format_json {
            ShellMode::Json
        } else {
            let verbosity = if silent {
                Verbosity::Silent
            } else if quiet {
                Verbosity::Quiet
            } else if verbose {
                Verbosity::Verbose
            } else {
                Verbosity::Normal
            };
            ShellMode::Human { verbosity, color }
        };

        Shell::new(mode)
    }

    /// Get the current shell mode.
    pub fn mode(&self) -> &ShellMode {
        &self.mode
    }

    /// Verbosity in human mode; `None` in JSON mode.
    pub fn verbosity(&self) -> Option<Verbosity> {
        match self.mode {
            ShellMode::Human { verbosity, .. } => Some(verbosity),
            ShellMode::Json => None,
        }
    }

    /// Check if shell suppresses regular status lines.
    pub fn is_quiet(&self) -> bool {
        matches!(self.verbosity(), Some(v) if v < Verbosity::Normal)
    }

    /// Check if shell is in verbose mode.
    pub fn is_verbose(&self) -> bool {
        self.verbosity() == Some(Verbosity::Verbose)
    }

    /// Check if shell is in JSON mode.
    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    /// Check if colors are enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Whether a status line of this kind would be printed.
    pub fn shows(&self, status: Status) -> bool {
        match self.verbosity() {
            Some(v) => v >= status.min_verbosity(),
            None => false,
        }
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`
    ///
    /// In JSON mode, messages are silently ignored (use json_event for JSON output).
    pub fn status(&self, status: Status, msg: impl Display) {
        if !self.shows(status) {
            return;
        }

        let prefix = self.format_status(status);
        eprintln!("{} {}", prefix, msg);
    }

    /// Print an info message.
    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print a warning message.
    ///
    /// In JSON mode, this outputs a JSON warning event.
    pub fn warn(&self, msg: impl Display) {
        if self.is_json() {
            let event = serde_json::json!({
                "reason": "warning",
                "message": msg.to_string()
            });
            self.json_event(&event);
        } else {
            self.status(Status::Warning, msg);
        }
    }

    /// Print an error message.
    ///
    /// In JSON mode, this outputs a JSON error event.
    pub fn error(&self, msg: impl Display) {
        if self.is_json() {
            let event = serde_json::json!({
                "reason": "error",
                "message": msg.to_string()
            });
            self.json_event(&event);
        } else {
            self.status(Status::Error, msg);
        }
    }

    /// Print a JSON event to stdout.
    ///
    /// Only works in JSON mode; silently ignored in human mode.
    pub fn json_event(&self, event: &serde_json::Value) {
        if !self.is_json() {
            return;
        }

        let json_str = serde_json::to_string(event).unwrap_or_default();
        println!("{}", json_str);
        let _ = io::stdout().flush();
    }

    /// Format a status prefix with optional color.
    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        let width = status.width();

        if self.use_color {
            let color = status.color_code();
            format!("{}{:>width$}\x1b[0m", color, text, width = width)
        } else {
            format!("{:>width$}", text, width = width)
        }
    }

    /// Create a scoped span for timing operations.
    ///
    /// The start message is only printed in verbose mode. The end message
    /// with timing is printed unless output is suppressed.
    pub fn span(self: &Arc<Self>, status: Status, msg: impl Display) -> Span {
        Span::new(Arc::clone(self), status, msg.to_string())
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::default())
    }
}

/// A scoped timing span.
///
/// The start message is printed right away only in verbose mode. The end
/// message with the duration is printed by `finish_with_message`, or on drop
/// when the span took longer than the reporting threshold.
pub struct Span {
    shell: Arc<Shell>,
    start: Instant,
    start_printed: bool,
    finished: bool,
}

impl Span {
    /// Spans shorter than this end silently when dropped.
    const DEFAULT_DELAY: Duration = Duration::from_millis(200);

    fn new(shell: Arc<Shell>, status: Status, message: String) -> Self {
        let start_printed = shell.is_verbose();

        // In verbose mode, print start immediately
        if start_printed {
            shell.status(status, &message);
        }

        Span {
            shell,
            start: Instant::now(),
            start_printed,
            finished: false,
        }
    }

    /// Mark the span as finished with a custom message.
    pub fn finish_with_message(mut self, msg: impl Display) {
        self.finished = true;
        let elapsed = self.start.elapsed();
        self.shell.status(
            Status::Finished,
            format!("{} in {}", msg, format_duration(elapsed)),
        );
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let elapsed = self.start.elapsed();
        // Only print if we started or took significant time
        if self.start_printed || elapsed > Self::DEFAULT_DELAY {
            self.shell
                .status(Status::Finished, format!("in {}", format_duration(elapsed)));
        }
    }
}

/// Format a duration in a human-readable way.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn human(verbosity: Verbosity) -> Shell {
        Shell::new(ShellMode::Human {
            verbosity,
            color: ColorChoice::Never,
        })
    }

    #[test]
    fn test_shell_modes() {
        let shell = human(Verbosity::Normal);
        assert!(!shell.is_quiet());
        assert!(!shell.is_verbose());
        assert!(!shell.is_json());

        assert!(human(Verbosity::Quiet).is_quiet());
        assert!(human(Verbosity::Silent).is_quiet());

        let json_shell = Shell::new(ShellMode::Json);
        assert!(json_shell.is_json());
        assert_eq!(json_shell.verbosity(), None);
    }

    #[test]
    fn test_verbosity_filters_statuses() {
        let silent = human(Verbosity::Silent);
        assert!(silent.shows(Status::Error));
        assert!(!silent.shows(Status::Warning));
        assert!(!silent.shows(Status::Compiling));

        let quiet = human(Verbosity::Quiet);
        assert!(quiet.shows(Status::Error));
        assert!(quiet.shows(Status::Warning));
        assert!(!quiet.shows(Status::Finished));

        let normal = human(Verbosity::Normal);
        assert!(normal.shows(Status::Compiling));

        assert!(!Shell::new(ShellMode::Json).shows(Status::Error));
    }

    #[test]
    fn test_color_choice_parse() {
        assert_eq!("auto".parse::<ColorChoice>().unwrap(), ColorChoice::Auto);
        assert_eq!("always".parse::<ColorChoice>().unwrap(), ColorChoice::Always);
        assert_eq!("never".parse::<ColorChoice>().unwrap(), ColorChoice::Never);
        assert!("invalid".parse::<ColorChoice>().is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "0.50s");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn test_status_formatting() {
        let shell = human(Verbosity::Normal);
        let formatted = shell.format_status(Status::Archiving);
        assert_eq!(formatted.trim(), "Archiving");
        assert_eq!(formatted.len(), 12); // Right-aligned to 12 chars
    }

    #[test]
    fn test_from_flags() {
        let shell = Shell::from_flags(false, false, false, ColorChoice::Auto, false);
        assert_eq!(shell.verbosity(), Some(Verbosity::Normal));

        let shell = Shell::from_flags(false, true, false, ColorChoice::Auto, false);
        assert_eq!(shell.verbosity(), Some(Verbosity::Quiet));

        let shell = Shell::from_flags(true, true, false, ColorChoice::Auto, false);
        assert_eq!(shell.verbosity(), Some(Verbosity::Silent));

        let shell = Shell::from_flags(false, false, true, ColorChoice::Auto, false);
        assert!(shell.is_verbose());

        // JSON takes precedence
        let shell = Shell::from_flags(true, true, true, ColorChoice::Auto, true);
        assert!(shell.is_json());
        assert!(!shell.is_quiet());
    }
}
