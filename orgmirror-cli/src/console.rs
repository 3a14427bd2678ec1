//! Colored terminal [`Reporter`].

use colored::Colorize;
use orgmirror_core::Reporter;

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{}", message.blue());
    }

    fn warning(&self, message: &str) {
        println!("{}", message.yellow());
    }

    fn error(&self, message: &str) {
        eprintln!("{}", message.red());
    }

    fn success(&self, message: &str) {
        println!("{}", message.green());
    }
}
