use crate::pipeline::suggestion::{PlacedSuggestion, Severity};
use crate::{CheckResult, Finding};
use anyhow::Result;
use colored::*;
use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};
use dialoguer::Select;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonFinding<'a> {
    file: String,
    line: usize,
    column: usize,
    word: &'a str,
    message: &'a str,
    source: &'a str,
    severity: Severity,
    suggestions: &'a [String],
    context: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    files_checked: usize,
    total_errors: usize,
    errors: Vec<JsonFinding<'a>>,
}

pub fn print_text_findings(file_path: &Path, result: &CheckResult, colored_output: bool) {
    if result.findings.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for finding in &result.findings {
        let line_info = format!("{}:{}", finding.line, finding.column);
        let label = if finding.word.is_empty() {
            &finding.message
        } else {
            &finding.word
        };

        if colored_output {
            let label = match finding.severity {
                Severity::Error => label.red().bold(),
                _ => label.yellow().bold(),
            };
            println!(
                "  {} {} {}",
                line_info.blue().bold(),
                label,
                format_context(&finding.context, &finding.word, colored_output)
            );

            if !finding.suggestions.is_empty() {
                let suggestions = finding
                    .suggestions
                    .iter()
                    .map(|s| s.green().to_string())
                    .collect::<Vec<_>>()
                    .join(&", ".dimmed().to_string());
                println!("    {} {}", "→".dimmed(), suggestions);
            }
        } else {
            println!("  {} {} {}", line_info, label, &finding.context);

            if !finding.suggestions.is_empty() {
                println!("    → {}", finding.suggestions.join(", "));
            }
        }
    }
}

/// One JSON document covering every checked file.
pub fn print_json_report(results: &[(PathBuf, CheckResult)]) -> Result<()> {
    let errors: Vec<JsonFinding<'_>> = results
        .iter()
        .flat_map(|(path, result)| {
            result.findings.iter().map(move |f: &Finding| JsonFinding {
                file: path.display().to_string(),
                line: f.line,
                column: f.column,
                word: &f.word,
                message: &f.message,
                source: &f.source,
                severity: f.severity,
                suggestions: &f.suggestions,
                context: &f.context,
            })
        })
        .collect();

    let output = JsonOutput {
        files_checked: results.len(),
        total_errors: errors.len(),
        errors,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored && !word.is_empty() {
        context.replace(word, &word.red().bold().to_string())
    } else {
        context.to_string()
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

pub fn print_check_summary(total_errors: usize, files: usize, colored: bool) {
    println!();
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No spelling errors found!".green().bold());
        } else {
            println!("✓ No spelling errors found!");
        }
    } else {
        let error_word = plural(total_errors, "error", "errors");
        let file_word = plural(files, "file", "files");
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                files,
                file_word
            );
        } else {
            println!("✗ {} {} found in {} {}", total_errors, error_word, files, file_word);
        }
    }
}

pub fn print_fix_summary(total_fixed: usize, words_added: usize, files: usize, colored: bool) {
    println!();
    if total_fixed == 0 && words_added == 0 {
        if colored {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
        return;
    }

    let fix_word = plural(total_fixed, "correction", "corrections");
    let file_word = plural(files, "file", "files");
    if colored {
        println!(
            "{} {} {} applied to {} {}",
            "✓".green().bold(),
            total_fixed.to_string().green().bold(),
            fix_word,
            files,
            file_word
        );
    } else {
        println!("✓ {} {} applied to {} {}", total_fixed, fix_word, files, file_word);
    }

    if words_added > 0 {
        println!(
            "  {} {} added to the dictionary",
            words_added,
            plural(words_added, "word", "words")
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Apply(usize),
    Skip,
    Quit,
}

/// Ask which action to take for a flagged line.
pub fn prompt_action(
    file_path: &Path,
    line: usize,
    text: &str,
    actions: &[PlacedSuggestion],
    colored: bool,
) -> Result<Choice> {
    if colored {
        println!(
            "\n{} {}:{}",
            "Misspelling found:".yellow().bold(),
            file_path.display().to_string().blue(),
            line.to_string().blue()
        );
    } else {
        println!("\nMisspelling found: {}:{}", file_path.display(), line);
    }
    println!("  {}", text);

    let mut items: Vec<String> = actions
        .iter()
        .map(|placed| placed.suggestion.message.clone())
        .collect();
    items.push("Skip line".to_string());
    items.push("Quit".to_string());

    let colorful = ColorfulTheme::default();
    let theme: &dyn Theme = if colored { &colorful } else { &SimpleTheme };

    let selection = Select::with_theme(theme)
        .with_prompt("Choose an action")
        .items(&items)
        .default(0)
        .interact_opt()?;

    Ok(match selection {
        Some(index) if index < actions.len() => Choice::Apply(index),
        Some(index) if index == actions.len() => Choice::Skip,
        _ => Choice::Quit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_plain_context() {
        assert_eq!(format_context("In the begining", "begining", false), "In the begining");
    }
}
