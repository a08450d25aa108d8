use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "registrar", about = "University SIS to LMS integration toolkit", version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "registrar.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Import a SIS CSV file into the LMS
    Import {
        /// Path of the CSV diff to send to the LMS
        csv_path: String,
        /// Account to import into (defaults to the configured account)
        #[arg(long)]
        account_id: Option<String>,
        /// Run the import without uploading anything to the LMS
        #[arg(long)]
        dryrun: bool,
        /// Wall-clock budget in seconds so the import does not hang
        /// indefinitely; 0 disables the timeout
        #[arg(long, default_value_t = 7200)]
        timeout_seconds: u64,
    },
    /// List the courses for an account
    Courses {
        /// Account to list (defaults to the configured account)
        #[arg(long)]
        account_id: Option<String>,
    },
    /// Look up book metadata by ISBN
    Book {
        /// The ISBN to look up
        isbn: String,
    },
    /// List course-evaluation projects
    Projects,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            csv_path,
            account_id,
            dryrun,
            timeout_seconds,
        } => {
            commands::import::run(
                &cli.config,
                &csv_path,
                account_id.as_deref(),
                dryrun,
                timeout_seconds,
            )
            .await?;
        }
        Commands::Courses { account_id } => {
            commands::courses::run(&cli.config, account_id.as_deref()).await?;
        }
        Commands::Book { isbn } => {
            commands::book::run(&cli.config, &isbn).await?;
        }
        Commands::Projects => {
            commands::projects::run(&cli.config).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn cli_parse_import_defaults() {
        let cli = Cli::parse_from(["registrar", "import", "users.csv"]);
        assert_eq!(cli.config, "registrar.toml");
        match cli.command {
            Commands::Import {
                csv_path,
                account_id,
                dryrun,
                timeout_seconds,
            } => {
                assert_eq!(csv_path, "users.csv");
                assert_eq!(account_id, None);
                assert!(!dryrun);
                assert_eq!(timeout_seconds, 7200);
            }
            _ => panic!("expected Import command"),
        }
    }

    #[test]
    fn cli_parse_import_custom() {
        let cli = Cli::parse_from([
            "registrar",
            "--config",
            "/etc/registrar.toml",
            "import",
            "enrollments.csv",
            "--account-id",
            "115",
            "--dryrun",
            "--timeout-seconds",
            "600",
        ]);
        assert_eq!(cli.config, "/etc/registrar.toml");
        match cli.command {
            Commands::Import {
                csv_path,
                account_id,
                dryrun,
                timeout_seconds,
            } => {
                assert_eq!(csv_path, "enrollments.csv");
                assert_eq!(account_id.as_deref(), Some("115"));
                assert!(dryrun);
                assert_eq!(timeout_seconds, 600);
            }
            _ => panic!("expected Import command"),
        }
    }

    #[test]
    fn cli_parse_courses() {
        let cli = Cli::parse_from(["registrar", "courses", "--account-id", "1"]);
        match cli.command {
            Commands::Courses { account_id } => {
                assert_eq!(account_id.as_deref(), Some("1"));
            }
            _ => panic!("expected Courses command"),
        }
    }

    #[test]
    fn cli_parse_book() {
        let cli = Cli::parse_from(["registrar", "book", "9781593278281"]);
        match cli.command {
            Commands::Book { isbn } => {
                assert_eq!(isbn, "9781593278281");
            }
            _ => panic!("expected Book command"),
        }
    }

    #[test]
    fn cli_parse_projects() {
        let cli = Cli::parse_from(["registrar", "projects"]);
        assert!(matches!(cli.command, Commands::Projects));
    }
}
