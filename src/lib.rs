pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod error;
pub mod lsp;
pub mod pipeline;
pub mod session;

pub use checker::dictionary::{Dictionary, Level};
pub use checker::SpellChecker;
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::suggestion::{Severity, Suggestion};
pub use pipeline::SuggestionRegistry;
pub use session::Session;

#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub error_count: usize,
    pub fixed_count: usize,
    pub findings: Vec<Finding>,
}

/// One diagnostic, in 1-based file coordinates.
#[derive(Debug, Clone)]
pub struct Finding {
    pub word: String,
    pub message: String,
    pub source: String,
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub context: String,
    pub suggestions: Vec<String>,
}
