use clap::{Parser, Subcommand};
use fishfiesta_core::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fishfiesta")]
#[command(about = "Fish Fiesta habitat matching game", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the assets directory (holding fishes/ and levels/)
    #[arg(long, global = true)]
    assets_dir: Option<PathBuf>,

    /// Override the data directory holding saved progress
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all levels and their saved status
    Levels,

    /// Play (or resume) a level
    Play {
        /// Level id, e.g. level1
        level: String,

        /// Scripted decisions instead of prompting: a = accept, d = deny, q = quit
        #[arg(long, value_parser = parse_decisions)]
        decisions: Option<Script>,
    },

    /// Show the journal entry for a creature
    Journal {
        /// Creature id, e.g. great_white_shark
        fish: String,
    },

    /// Forget all saved progress for a level
    Reset {
        /// Level id
        level: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Action {
    Accept,
    Deny,
    Quit,
}

/// A pre-recorded sequence of decisions
#[derive(Clone, Debug)]
struct Script(Vec<Action>);

fn parse_decisions(raw: &str) -> std::result::Result<Script, String> {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c.to_ascii_lowercase() {
            'a' => Ok(Action::Accept),
            'd' => Ok(Action::Deny),
            'q' => Ok(Action::Quit),
            other => Err(format!("unknown decision '{}' (expected a, d or q)", other)),
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Script)
}

fn main() -> Result<()> {
    fishfiesta_core::logging::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = cli.assets_dir {
        config.assets.dir = dir;
    }
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }

    match cli.command {
        Commands::Levels => cmd_levels(&config),
        Commands::Play { level, decisions } => cmd_play(&config, &level, decisions),
        Commands::Journal { fish } => cmd_journal(&config, &fish),
        Commands::Reset { level } => cmd_reset(&config, &level),
    }
}

fn open_levels(config: &Config) -> LevelCatalog<JsonFileStore> {
    LevelCatalog::new(config.levels_dir(), JsonFileStore::open(config.store_path()))
}

fn cmd_levels(config: &Config) -> Result<()> {
    let mut levels = open_levels(config);
    let ids = levels.list_level_ids().to_vec();

    if ids.is_empty() {
        println!("No levels found in {}", levels.dir().display());
        return Ok(());
    }

    for id in ids {
        let saved = levels.persisted(&id);
        let status = match saved.status() {
            LevelStatus::NotStarted => "not started".to_string(),
            LevelStatus::InProgress => format!(
                "in progress (fish {}, {} mistakes)",
                saved.fish_index, saved.mistakes
            ),
            LevelStatus::Completed => format!("completed ({} mistakes)", saved.mistakes),
            LevelStatus::Failed => "failed".to_string(),
        };
        println!("  {:<16} {}", id, status);
    }

    Ok(())
}

fn cmd_play(config: &Config, level_id: &str, script: Option<Script>) -> Result<()> {
    let mut levels = open_levels(config);
    let mut creatures = CreatureCatalog::new(config.fishes_dir());

    if levels.is_completed(level_id) {
        println!(
            "Level {} is already completed with {} mistakes.",
            level_id,
            levels.get_mistakes(level_id)
        );
        println!("Run `fishfiesta reset {}` to play it again.", level_id);
        return Ok(());
    }

    let level = match levels.load_level_by_id(level_id) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Unable to load level {}: {}", level_id, e);
            return Err(e);
        }
    };
    display_conditions(level);

    let mut script = script.map(|Script(actions)| actions.into_iter());
    let mut aborted = None;

    loop {
        let level = levels
            .active_level_mut()
            .ok_or_else(|| Error::State("no active level".into()))?;

        if level.check_completion().is_terminal() {
            break;
        }
        let Some(fish_id) = level.current_creature_id().map(str::to_string) else {
            break;
        };

        let creature = match creatures.load_by_id(&fish_id) {
            Ok(creature) => creature,
            Err(e) => {
                eprintln!("Unable to load creature {}: {}", fish_id, e);
                aborted = Some(e);
                break;
            }
        };
        display_creature(creature, level.fish_index(), level.creature_ids().len());

        let action = match script.as_mut() {
            Some(actions) => actions.next().unwrap_or(Action::Quit),
            None => prompt_action()?,
        };
        let accepted = match action {
            Action::Accept => true,
            Action::Deny => false,
            Action::Quit => break,
        };

        let decision = match level.record_decision(creature, accepted) {
            Ok(decision) => decision,
            Err(e) => {
                eprintln!("Unable to judge {}: {}", creature.name, e);
                aborted = Some(e);
                break;
            }
        };
        if decision.correct {
            println!("  ✓ Correct!");
        } else {
            println!(
                "  ✗ Wrong! That makes {} of {} mistakes.",
                decision.mistakes, MISTAKE_LIMIT
            );
        }
        if decision.status == LevelStatus::Failed {
            break;
        }
    }

    let mistakes = levels.active_level().map(Level::mistakes).unwrap_or(0);
    match levels.finish_active()? {
        Some(LevelStatus::Completed) => {
            println!("\n✓ Level {} completed with {} mistakes!", level_id, mistakes)
        }
        Some(LevelStatus::Failed) => {
            println!("\n✗ Level {} failed: too many mistakes.", level_id)
        }
        Some(LevelStatus::InProgress) => {
            let fish_index = levels.active_level().map(Level::fish_index).unwrap_or(0);
            println!(
                "\nProgress saved for {} (fish {}, {} mistakes).",
                level_id, fish_index, mistakes
            )
        }
        Some(LevelStatus::NotStarted) | None => println!("\nLevel {} not started.", level_id),
    }

    match aborted {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn cmd_journal(config: &Config, fish_id: &str) -> Result<()> {
    let mut creatures = CreatureCatalog::new(config.fishes_dir());
    let creature = match creatures.load_by_id(fish_id) {
        Ok(creature) => creature,
        Err(e) => {
            eprintln!("Unable to load creature {}: {}", fish_id, e);
            return Err(e);
        }
    };

    println!("{}", creature.name);
    if !creature.notable_features.is_empty() {
        println!("Notable features: {}", creature.notable_features);
    }
    println!();
    println!("{}", creature.journal_description().trim_end());
    Ok(())
}

fn cmd_reset(config: &Config, level_id: &str) -> Result<()> {
    let mut levels = open_levels(config);
    if !levels.list_level_ids().iter().any(|id| id == level_id) {
        eprintln!("Unknown level: {}", level_id);
        return Err(Error::UnknownLevel(level_id.to_string()));
    }

    levels.clear(level_id)?;
    println!("✓ Cleared progress for {}", level_id);
    Ok(())
}

fn display_conditions(level: &Level) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  LEVEL {}", level.id());
    println!("╰─────────────────────────────────────────╯");
    println!("  Room conditions:");
    for (kind, values) in level.conditions() {
        println!("    {}: {}", kind, values.join(" or "));
    }
    if level.is_in_progress() && level.current_creature_id().is_some() {
        println!(
            "  Resuming at fish {} with {} mistakes",
            level.fish_index() + 1,
            level.mistakes()
        );
    }
    println!();
}

fn display_creature(creature: &CreatureRecord, index: usize, total: usize) {
    println!("─────────────────────────────────────────");
    println!("  Fish {}/{}: {}", index + 1, total, creature.name);
    if !creature.notable_features.is_empty() {
        println!("  Notable features: {}", creature.notable_features);
    }
}

fn prompt_action() -> Result<Action> {
    loop {
        print!("  [a]ccept / [d]eny / [q]uit > ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(Action::Quit);
        }

        match input.trim().to_lowercase().as_str() {
            "a" | "accept" => return Ok(Action::Accept),
            "d" | "deny" => return Ok(Action::Deny),
            "q" | "quit" => return Ok(Action::Quit),
            other => println!("  Unknown choice '{}'", other),
        }
    }
}
