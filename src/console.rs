use colored::Colorize;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Verbosity levels for console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Only show errors
    Quiet = 0,
    /// Normal output (default)
    #[default]
    Normal = 1,
    /// Verbose output with additional info
    Verbose = 2,
    /// Debug output with detailed information
    Debug = 3,
}

impl fmt::Display for VerbosityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerbosityLevel::Quiet => write!(f, "quiet"),
            VerbosityLevel::Normal => write!(f, "normal"),
            VerbosityLevel::Verbose => write!(f, "verbose"),
            VerbosityLevel::Debug => write!(f, "debug"),
        }
    }
}

impl FromStr for VerbosityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiet" => Ok(VerbosityLevel::Quiet),
            "normal" => Ok(VerbosityLevel::Normal),
            "verbose" => Ok(VerbosityLevel::Verbose),
            "debug" => Ok(VerbosityLevel::Debug),
            other => Err(format!(
                "Invalid verbosity level '{}'. Valid options: quiet, normal, verbose, debug",
                other
            )),
        }
    }
}

/// Terminal output sink. Every method is fire-and-forget.
#[derive(Debug, Clone)]
pub struct Console {
    verbosity: VerbosityLevel,
}

impl Console {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self { verbosity }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    fn should_show(&self, level: VerbosityLevel) -> bool {
        self.verbosity >= level
    }

    pub fn error(&self, message: &str) {
        if self.verbosity > VerbosityLevel::Quiet {
            eprintln!("❌ {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("⚠️  {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("ℹ️  {}", message);
        }
    }

    pub fn success(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("✅ {}", message);
        }
    }

    /// A message with a display title, e.g. `Shutting down...` followed by the reason.
    pub fn titled(&self, title: &str, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("{} {}", title.bold().yellow(), message);
        }
    }

    pub fn command_call(&self, command_name: &str, args_summary: &str) {
        if !self.should_show(VerbosityLevel::Normal) {
            return;
        }
        println!(
            "{} {}{}{}{}",
            "⏺".dimmed(),
            command_name.green(),
            "(".dimmed(),
            args_summary.dimmed(),
            ")".dimmed()
        );
    }

    pub fn command_result(&self, result: &str, max_length: usize) {
        if !self.should_show(VerbosityLevel::Normal) {
            return;
        }

        let truncated = if result.chars().count() > max_length {
            let mut s = result.chars().take(max_length).collect::<String>();
            s.push_str("...");
            s
        } else {
            result.to_string()
        };

        for (i, line) in truncated.lines().enumerate() {
            if i >= 15 {
                println!("  {}", "...".dimmed());
                break;
            }
            let marker = if i == 0 { "⎿" } else { " " };
            println!("  {} {}", marker.dimmed(), line);
        }
    }

    pub fn verbose(&self, message: &str) {
        if self.should_show(VerbosityLevel::Verbose) {
            println!("{}", message);
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show(VerbosityLevel::Debug) {
            println!("🐛 DEBUG: {}", message);
        }
    }

    pub fn plain(&self, message: &str) {
        if self.should_show(VerbosityLevel::Normal) {
            println!("{}", message);
        }
    }
}

static GLOBAL_CONSOLE: OnceLock<Arc<Console>> = OnceLock::new();

pub fn init_console(verbosity: VerbosityLevel) {
    let _ = GLOBAL_CONSOLE.set(Arc::new(Console::new(verbosity)));
}

/// The process-wide console. Falls back to normal verbosity when
/// `init_console` was never called (library use, tests).
pub fn console() -> Arc<Console> {
    GLOBAL_CONSOLE
        .get_or_init(|| Arc::new(Console::default()))
        .clone()
}

impl Default for Console {
    fn default() -> Self {
        Self {
            verbosity: VerbosityLevel::Normal,
        }
    }
}
