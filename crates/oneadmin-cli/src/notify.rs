use colored::Colorize;
use oneadmin_views::{Level, Notifier};

/// Prints page feedback as it happens. Errors and warnings go to stderr.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, level: Level, message: &str) {
        match level {
            Level::Success => println!("{} {}", "✓".green(), message),
            Level::Info => println!("{} {}", "→".cyan(), message),
            Level::Warning => eprintln!("{} {}", "!".yellow(), message.yellow()),
            Level::Error => eprintln!("{} {}", "✗".red(), message.red()),
        }
    }
}
