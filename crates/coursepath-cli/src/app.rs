//! The Coursepath CLI application.

use crate::cli::{CliArgs, Command};
use crate::config::CoursepathConfig;
use crate::config_handlers;
use crate::course_handlers::{self, MaterializeOptions};
use coursepath_cache::RetryPolicy;
use coursepath_core::Result;
use coursepath_core::traits::ConfigProvider;
use coursepath_tree::FetchMode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CoursepathCli
// ============================================================================

/// CLI application parameterized over a config provider.
pub struct CoursepathCli<C: ConfigProvider> {
    name: String,
    config: Arc<C>,
    version: String,
    fetch_mode: FetchMode,
    retry: RetryPolicy,
}

impl CoursepathCli<CoursepathConfig> {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = CoursepathConfig::load(args.config.as_deref())?;
        let fetch_mode = config.content.fetch_mode;
        let retry = config.rebuild.clone();
        Ok(Self::new(name, config)
            .with_fetch_mode(fetch_mode)
            .with_retry(retry))
    }
}

impl<C: ConfigProvider> CoursepathCli<C> {
    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: C) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
            fetch_mode: FetchMode::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set how course trees are fetched.
    pub fn with_fetch_mode(mut self, fetch_mode: FetchMode) -> Self {
        self.fetch_mode = fetch_mode;
        self
    }

    /// Set the retry policy for `materialize --all`.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get a reference to the config provider.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    /// Library crates log through `log`; `tracing-subscriber` picks those
    /// records up through its `tracing-log` bridge.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);
        tracing::debug!(project = self.config.project_name(), "starting");

        match args.command {
            Some(Command::Materialize {
                course,
                all: _,
                dry_run,
            }) => {
                let options = MaterializeOptions {
                    course,
                    dry_run,
                    fetch_mode: self.fetch_mode,
                    retry: self.retry.clone(),
                };
                course_handlers::handle_materialize(&*self.config, options).await
            }
            Some(Command::Paths { usage_key }) => {
                course_handlers::handle_paths(&*self.config, &usage_key).await
            }
            Some(Command::Courses) => {
                course_handlers::handle_courses(&*self.config, self.fetch_mode).await
            }
            Some(Command::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(Command::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {}: use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use coursepath_tree::{fixtures, save_outline};
    use std::path::PathBuf;

    #[derive(Clone)]
    struct TestConfig {
        base: PathBuf,
    }

    impl ConfigProvider for TestConfig {
        fn project_name(&self) -> &str {
            "test-app"
        }

        fn base_path(&self) -> Result<PathBuf> {
            Ok(self.base.clone())
        }

        fn content_path(&self) -> Result<PathBuf> {
            Ok(self.base.join("courses"))
        }
    }

    fn test_config() -> TestConfig {
        TestConfig {
            base: PathBuf::from("/tmp/coursepath-test"),
        }
    }

    #[test]
    fn test_cli_new() {
        let cli = CoursepathCli::new("coursepath", test_config()).with_version("1.2.3");
        assert_eq!(cli.name, "coursepath");
        assert_eq!(cli.version, "1.2.3");
        assert_eq!(cli.fetch_mode, FetchMode::Bulk);
        assert_eq!(cli.config().project_name(), "test-app");
    }

    #[test]
    fn test_cli_builders() {
        let cli = CoursepathCli::new("coursepath", test_config())
            .with_fetch_mode(FetchMode::PerLevel)
            .with_retry(RetryPolicy::none());
        assert_eq!(cli.fetch_mode, FetchMode::PerLevel);
        assert_eq!(cli.retry.max_retries, 0);
    }

    #[tokio::test]
    async fn test_run_version_and_no_command() {
        let cli = CoursepathCli::new("coursepath", test_config());
        assert!(cli.run(CliArgs::parse_from(["coursepath", "version"])).await.is_ok());
        assert!(cli.run(CliArgs::parse_from(["coursepath"])).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_materialize_and_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("courses")).unwrap();
        let (demo, keys) = fixtures::demo_course();
        save_outline(&demo, dir.path().join("courses").join("demo.json")).unwrap();

        let cli = CoursepathCli::new(
            "coursepath",
            TestConfig {
                base: dir.path().to_path_buf(),
            },
        )
        .with_fetch_mode(FetchMode::PerLevel);

        cli.run(CliArgs::parse_from([
            "coursepath",
            "materialize",
            "course-v1:edX+Demo+2015",
        ]))
        .await
        .unwrap();
        cli.run(CliArgs::parse_from(["coursepath", "paths", keys.vertical_2.as_str()]))
            .await
            .unwrap();
        cli.run(CliArgs::parse_from(["coursepath", "courses"]))
            .await
            .unwrap();
    }

    #[test]
    fn test_from_args_with_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                project_name = "from-file"
                [content]
                fetch_mode = "per-level"
                [rebuild]
                max_retries = 1
            "#,
        )
        .unwrap();

        let args = CliArgs::parse_from(["coursepath", "--config", path.to_str().unwrap()]);
        let cli = CoursepathCli::from_args("coursepath", &args).unwrap();
        assert_eq!(cli.config().project_name(), "from-file");
        assert_eq!(cli.fetch_mode, FetchMode::PerLevel);
        assert_eq!(cli.retry.max_retries, 1);
    }

    #[test]
    fn test_init_logging() {
        let cli = CoursepathCli::new("coursepath", test_config());
        cli.init_logging(false, false);
        cli.init_logging(true, false);
        cli.init_logging(false, true);
    }
}
