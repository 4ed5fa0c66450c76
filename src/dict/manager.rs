use crate::checker::dictionary::Level;
use crate::session::Session;
use anyhow::Result;
use colored::*;
use std::fs;

pub fn list_entries(session: &Session, level: Option<Level>) -> Result<()> {
    let dictionary = session.dictionary();

    let entries: Vec<_> = dictionary
        .entries()
        .filter(|entry| level.map_or(true, |level| entry.level == level))
        .collect();

    if entries.is_empty() {
        println!("{}", "No dictionary entries.".yellow());
        println!(
            "Run {} to add some.",
            "codexspell dict add <WORDS>...".cyan()
        );
        return Ok(());
    }

    for entry in &entries {
        let marker = match entry.level {
            Level::Verified => "✓".green(),
            Level::VerifiedAuto => "~".cyan(),
            Level::Unverified => "?".yellow(),
        };
        println!(
            "  {} {} {}",
            marker,
            entry.head_word.bold(),
            format!("({})", entry.level).dimmed()
        );
    }

    println!();
    println!(
        "{} {}",
        entries.len(),
        if entries.len() == 1 { "entry" } else { "entries" }
    );

    Ok(())
}

pub fn add_words(session: &mut Session, words: &[String], level: Option<Level>) -> Result<usize> {
    let added = session.add_words(words, level)?;
    let level = level.unwrap_or(session.config().added_word_level);

    println!(
        "{} Added {} of {} {} as {}",
        "✓".green().bold(),
        added.to_string().green().bold(),
        words.len(),
        if words.len() == 1 { "word" } else { "words" },
        level.to_string().cyan()
    );

    Ok(added)
}

pub fn remove_words(session: &mut Session, words: &[String]) -> Result<usize> {
    let mut removed = 0;

    for word in words {
        let count = session.dictionary_mut().remove(word)?;
        if count == 0 {
            println!("  {} {} not in dictionary", "✗".red(), word.yellow());
        } else {
            println!("  {} {}", "✓".green(), word);
        }
        removed += count;
    }

    Ok(removed)
}

pub fn show_info(session: &Session) -> Result<()> {
    let dictionary = session.dictionary();
    let config = session.config();

    println!("{}", "Dictionary".bold());
    println!(
        "  Language: {}",
        config.language.as_deref().unwrap_or("(unscoped)")
    );
    println!("  Words: {}", dictionary.len().to_string().yellow());
    for level in [Level::Verified, Level::VerifiedAuto, Level::Unverified] {
        println!(
            "    {}: {}",
            level,
            dictionary.entries_at_level(&[level]).len()
        );
    }
    println!(
        "  Checking: {}",
        if config.relative_checking {
            "relative (verified and verified_auto accepted)"
        } else {
            "strict (verified only)"
        }
    );

    let sources = dictionary.source_paths();
    if sources.is_empty() {
        println!("  {}", "No backing files (in-memory only)".yellow());
    }
    for path in sources {
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let primary = dictionary.primary_path() == Some(path);
        println!(
            "  File: {} {}{}",
            path.display(),
            format!("{} bytes", size).dimmed(),
            if primary { " (primary)".cyan().to_string() } else { String::new() }
        );
    }

    Ok(())
}

pub fn suggest(session: &Session, word: &str) -> Result<Vec<String>> {
    let checker = session.workspace().checker();

    if !checker.is_correction_needed(word) {
        println!("{} {} is correct", "✓".green().bold(), word.bold());
        return Ok(Vec::new());
    }

    let candidates = checker.check(word);
    if candidates.is_empty() {
        println!("{} No suggestions for {}", "✗".red().bold(), word.yellow());
    } else {
        println!("{} {}", word.red().bold(), "→".dimmed());
        for candidate in &candidates {
            println!("  {}", candidate.green());
        }
    }

    Ok(candidates)
}

pub fn complete(session: &Session, prefix: &str) -> Result<Vec<String>> {
    let completions = session.workspace().checker().complete(prefix);

    if completions.is_empty() {
        println!("{}", "No completions.".yellow());
    }
    for suffix in &completions {
        println!("  {}{}", prefix.dimmed(), suffix.green());
    }

    Ok(completions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use tempfile::tempdir;

    #[test]
    fn test_add_and_remove_persist() {
        let dir = tempdir().unwrap();
        let mut session = Session::open(dir.path(), Config::default()).unwrap();

        let words = vec!["selah".to_string(), "amen".to_string()];
        assert_eq!(add_words(&mut session, &words, Some(Level::Unverified)).unwrap(), 2);
        assert_eq!(remove_words(&mut session, &["amen".to_string()]).unwrap(), 1);

        let reopened = Session::open(dir.path(), Config::default()).unwrap();
        assert!(reopened.dictionary().contains("selah"));
        assert!(!reopened.dictionary().contains("amen"));
    }

    #[test]
    fn test_suggest_correct_word() {
        let dir = tempdir().unwrap();
        let mut session = Session::open(dir.path(), Config::default()).unwrap();
        session.add_words(&["grace"], None).unwrap();

        assert!(suggest(&session, "Grace").unwrap().is_empty());
        assert_eq!(suggest(&session, "grase").unwrap(), vec!["grace".to_string()]);
    }
}
