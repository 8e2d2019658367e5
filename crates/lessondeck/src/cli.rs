use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lessondeck")]
#[command(author, version, about)]
#[command(long_about = "A slide presenter for interactive lesson decks.\n\n\
    Decks are YAML files listing slides and their elements.\n\n\
    Examples:\n  \
    lessondeck intro.yaml              Present a deck (fullscreen)\n  \
    lessondeck intro.yaml --windowed   Present in a window\n  \
    lessondeck check intro.yaml        Report slides that overflow\n  \
    lessondeck progress show           Show completed levels")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Deck file to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Level to record progress against (overrides the deck's `level`)
    #[arg(long, global = false)]
    pub level: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lay out every slide without a window and report overflow
    Check {
        /// Deck file to check
        file: PathBuf,

        /// Content width in canvas units
        #[arg(long, default_value = "1000")]
        width: f32,

        /// Exit with an error when any slide overflows
        #[arg(long)]
        strict: bool,
    },

    /// Export slides as PNG images
    Export {
        /// Deck file to export
        file: PathBuf,

        /// Output directory for PNG files
        #[arg(short, long, default_value = "export")]
        output_dir: PathBuf,

        /// Export width in pixels
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Export height in pixels
        #[arg(long, default_value = "1080")]
        height: u32,
    },

    /// Inspect or change learner progress
    Progress {
        #[command(subcommand)]
        command: ProgressCommands,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ProgressCommands {
    /// Show completed and unlocked levels and achievements
    Show,

    /// Mark a level complete and unlock the next one
    Complete {
        /// Level id (e.g. level-1)
        level: String,
    },

    /// Erase all progress and achievements
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.transition, defaults.transition_ms)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Check {
                file,
                width,
                strict,
            }) => crate::commands::check::run(&file, width, strict),
            Some(Commands::Export {
                file,
                output_dir,
                width,
                height,
            }) => crate::commands::export::run(file, output_dir, width, height),
            Some(Commands::Progress { command }) => crate::commands::progress::run(command),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::version::run();
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    crate::app::run(file, self.windowed, self.slide, self.level)
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}
