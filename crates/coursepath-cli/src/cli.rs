//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "coursepath", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "COURSEPATH_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Coursepath commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rebuild the path cache of one course, or of every course.
    Materialize {
        /// Course key, e.g. `course-v1:edX+DemoX+2015`.
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        course: Option<String>,

        /// Rebuild every course in the content directory.
        #[arg(long)]
        all: bool,

        /// Compute paths without writing the cache.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the cached breadcrumb paths of a block.
    Paths {
        /// Usage key of the block.
        usage_key: String,
    },

    /// List courses in the content directory with their cached entry counts.
    Courses,

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "content.fetch_mode").
        key: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_default() {
        let args = CliArgs::parse_from(["coursepath"]);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_flags() {
        let args = CliArgs::parse_from(["coursepath", "-v", "--config", "/etc/cp.toml"]);
        assert!(args.verbose);
        assert_eq!(args.config.as_deref(), Some("/etc/cp.toml"));
    }

    #[test]
    fn test_materialize_course() {
        let args = CliArgs::parse_from([
            "coursepath",
            "materialize",
            "course-v1:edX+Demo+2015",
            "--dry-run",
        ]);
        match args.command {
            Some(Command::Materialize {
                course,
                all,
                dry_run,
            }) => {
                assert_eq!(course.as_deref(), Some("course-v1:edX+Demo+2015"));
                assert!(!all);
                assert!(dry_run);
            }
            other => unreachable!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_materialize_all() {
        let args = CliArgs::parse_from(["coursepath", "materialize", "--all"]);
        assert!(matches!(
            args.command,
            Some(Command::Materialize {
                course: None,
                all: true,
                ..
            })
        ));
    }

    #[test]
    fn test_materialize_requires_course_or_all() {
        assert!(CliArgs::try_parse_from(["coursepath", "materialize"]).is_err());
        assert!(
            CliArgs::try_parse_from(["coursepath", "materialize", "course-v1:a+b+c", "--all"])
                .is_err()
        );
    }

    #[test]
    fn test_paths_command() {
        let args = CliArgs::parse_from(["coursepath", "paths", "i4x://edX/Demo/vertical/v1"]);
        assert!(matches!(
            args.command,
            Some(Command::Paths { usage_key }) if usage_key == "i4x://edX/Demo/vertical/v1"
        ));
    }

    #[test]
    fn test_config_subcommands() {
        let args = CliArgs::parse_from(["coursepath", "config", "get", "content.path"]);
        match args.command {
            Some(Command::Config(cmd)) => {
                assert!(matches!(cmd.command, ConfigAction::Get { key } if key == "content.path"));
            }
            other => unreachable!("unexpected command: {other:?}"),
        }

        let args = CliArgs::parse_from(["coursepath", "config", "init", "--force"]);
        assert!(matches!(
            args.command,
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Init { file: None, force: true }
            }))
        ));
    }
}
