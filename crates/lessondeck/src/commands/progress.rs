use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use crate::cli::ProgressCommands;
use crate::store::{
    ACHIEVEMENTS_STORE, AchievementRecord, JsonFileStore, LEVELS, PROGRESS_STORE,
    ProgressRecord, Store, record_completion,
};

pub fn run(command: ProgressCommands) -> Result<()> {
    let progress = JsonFileStore::<ProgressRecord>::named(PROGRESS_STORE)?;
    let achievements = JsonFileStore::<AchievementRecord>::named(ACHIEVEMENTS_STORE)?;

    match command {
        ProgressCommands::Show => show(&progress, &achievements),
        ProgressCommands::Complete { level } => complete(&progress, &achievements, &level),
        ProgressCommands::Reset { yes } => {
            if !yes {
                let confirmed = inquire::Confirm::new("Erase all progress and achievements?")
                    .with_default(false)
                    .prompt()?;
                if !confirmed {
                    println!("{}", "Nothing changed.".yellow());
                    return Ok(());
                }
            }
            reset(&progress, &achievements)?;
            println!("{}", "Progress reset.".green().bold());
            Ok(())
        }
    }
}

/// One line per known level with its status.
pub fn level_lines(progress: &ProgressRecord) -> Vec<String> {
    LEVELS
        .iter()
        .map(|level| {
            if progress.is_completed(level) {
                format!("{} {level}", "\u{2713}".green())
            } else if progress.is_unlocked(level) {
                format!("{} {level}", "\u{25CB}".cyan())
            } else {
                format!("{} {}", "-".dimmed(), level.dimmed())
            }
        })
        .collect()
}

fn show(
    progress: &dyn Store<ProgressRecord>,
    achievements: &dyn Store<AchievementRecord>,
) -> Result<()> {
    let record = progress.load()?;
    println!("{}", "Levels".bold());
    for line in level_lines(&record) {
        println!("  {line}");
    }

    let earned = achievements.load()?;
    println!("{}", "Achievements".bold());
    let mut any = false;
    for (id, achievement) in earned.iter().filter(|(_, a)| a.unlocked) {
        any = true;
        match achievement.unlocked_at {
            Some(at) => println!("  {id}  {}", at.format("%Y-%m-%d %H:%M UTC").to_string().dimmed()),
            None => println!("  {id}"),
        }
    }
    if !any {
        println!("  {}", "none yet".dimmed());
    }
    Ok(())
}

fn complete(
    progress: &dyn Store<ProgressRecord>,
    achievements: &dyn Store<AchievementRecord>,
    level: &str,
) -> Result<()> {
    if !LEVELS.contains(&level) {
        anyhow::bail!("Unknown level: {level}. Valid levels: {}", LEVELS.join(", "));
    }
    let outcome = record_completion(progress, achievements, level, Utc::now())?;
    if outcome.newly_completed {
        println!("{} {level}", "Completed".green().bold());
    } else {
        println!("{level} was already complete.");
    }
    if let Some(next) = outcome.unlocked {
        println!("Unlocked {}", next.cyan());
    }
    Ok(())
}

fn reset(
    progress: &dyn Store<ProgressRecord>,
    achievements: &dyn Store<AchievementRecord>,
) -> Result<()> {
    progress.save(&ProgressRecord::default())?;
    achievements.save(&AchievementRecord::default())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_complete_rejects_unknown_level() {
        let progress = MemoryStore::default();
        let achievements = MemoryStore::default();
        let err = complete(&progress, &achievements, "level-9").unwrap_err();
        assert!(err.to_string().contains("level-1"));
        assert!(progress.raw().is_none());
    }

    #[test]
    fn test_complete_then_reset() {
        let progress = MemoryStore::<ProgressRecord>::default();
        let achievements = MemoryStore::<AchievementRecord>::default();
        complete(&progress, &achievements, "level-3").unwrap();
        assert!(progress.load().unwrap().is_completed("level-3"));
        assert!(achievements.load().unwrap().is_unlocked("deck-level-3"));

        reset(&progress, &achievements).unwrap();
        assert_eq!(progress.load().unwrap(), ProgressRecord::default());
        assert_eq!(achievements.load().unwrap(), AchievementRecord::default());
    }

    #[test]
    fn test_level_lines_cover_all_levels() {
        colored::control::set_override(false);
        let mut record = ProgressRecord::default();
        record.complete_level("level-1");
        let lines = level_lines(&record);
        assert_eq!(lines.len(), LEVELS.len());
        assert_eq!(lines[0], "\u{2713} level-1");
        assert_eq!(lines[1], "\u{25CB} level-2");
        assert_eq!(lines[2], "- level-3");
    }
}
