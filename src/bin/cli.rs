use actboard::{
    cache::InMemoryCache,
    config::AppConfig,
    db,
    models::ActivityType,
    services::{create_email_service, CreateUserRequest, HttpActivitySource},
    AppState,
};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "actboard-cli")]
#[command(about = "CLI tool for managing actboard users and activity ingestion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Activity ingestion commands
    Activities {
        #[command(subcommand)]
        command: ActivityCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Department, used for recommendations
        #[arg(short, long)]
        department: Option<String>,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List all users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Delete a user
    Delete {
        /// Email address of the user to delete
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum ActivityCommands {
    /// Re-fetch one type's best list and replace its cached copy
    RefreshBest {
        /// club, external or contest
        #[arg(short = 't', long = "type")]
        act_type: ActivityType,

        #[arg(short, long, default_value_t = 1)]
        page: i64,
    },

    /// Store one page of a type's listing
    Ingest {
        /// club, external or contest
        #[arg(short = 't', long = "type")]
        act_type: ActivityType,

        #[arg(short, long, default_value_t = 1)]
        page: i64,

        /// Ingest this many consecutive pages, starting at --page
        #[arg(short, long, default_value_t = 1)]
        count: i64,
    },

    /// Refresh the recommendations of one user
    Recommend {
        /// Email address of the user
        #[arg(short, long)]
        email: String,
    },
}

fn get_password(prompt: &str) -> anyhow::Result<String> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "actboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AppConfig::from_env().context("loading configuration")?;
    let pool = db::create_pool(&config.database_url)
        .await
        .context("connecting to the database")?;
    db::run_migrations(&pool).await?;

    let source = Arc::new(HttpActivitySource::new(config.source.clone()));
    let state = AppState::new(
        config,
        pool,
        create_email_service(),
        source,
        Arc::new(InMemoryCache::new()),
    );

    match cli.command {
        Commands::User { command } => run_user_command(&state, command).await,
        Commands::Activities { command } => run_activity_command(&state, command).await,
    }
}

async fn run_user_command(state: &AppState, command: UserCommands) -> anyhow::Result<()> {
    match command {
        UserCommands::Create {
            email,
            name,
            department,
            password,
        } => {
            let password = match password {
                Some(pw) => pw,
                None => {
                    let password = get_password("Password")?;
                    if password != get_password("Confirm password")? {
                        bail!("Passwords do not match");
                    }
                    password
                }
            };

            let user = state
                .user_service
                .create_user(CreateUserRequest {
                    email,
                    password,
                    name,
                    department,
                    ..Default::default()
                })
                .await
                .context("Failed to create user")?;

            println!("✅ User created successfully!");
            println!("  ID: {}", user.id);
            println!("  Email: {}", user.email);
            println!("  Department: {}", user.department.as_deref().unwrap_or("-"));
        }

        UserCommands::List { limit, offset } => {
            let users = state
                .user_service
                .list_users(Some(limit), Some(offset))
                .await
                .context("Failed to list users")?;

            if users.is_empty() {
                println!("No users found.");
            } else {
                println!(
                    "{:<5} {:<40} {:<24} {:<28}",
                    "ID", "Email", "Department", "Created"
                );
                println!("{}", "-".repeat(97));
                for user in users {
                    println!(
                        "{:<5} {:<40} {:<24} {:<28}",
                        user.id,
                        user.email,
                        user.department.as_deref().unwrap_or("-"),
                        user.created_at
                    );
                }
            }
        }

        UserCommands::Delete { email } => {
            let user = state.user_service.find_by_email(&email).await?;
            state.user_service.delete_user(user.id).await?;
            println!("✅ User '{}' deleted successfully!", email);
        }
    }

    Ok(())
}

async fn run_activity_command(state: &AppState, command: ActivityCommands) -> anyhow::Result<()> {
    match command {
        ActivityCommands::RefreshBest { act_type, page } => {
            let stored = state.activity_service.refresh_all(act_type, page).await?;
            println!("✅ Stored {} {} activities as the best list", stored.len(), act_type);
            println!("ℹ️  The cache of this process is discarded on exit; run the refresh through the API to populate the server's cache.");
        }

        ActivityCommands::Ingest {
            act_type,
            page,
            count,
        } => {
            if count < 1 {
                bail!("--count must be at least 1");
            }
            let mut total = 0;
            for idx in page..page + count {
                let stored = state.activity_service.ingest_page(act_type, idx).await?;
                println!("  page {}: {} activities", idx, stored.len());
                total += stored.len();
            }
            println!("✅ Stored {} {} activities", total, act_type);
        }

        ActivityCommands::Recommend { email } => {
            let stored = state
                .activity_service
                .refresh_recommendations(&email)
                .await?;
            println!("✅ Stored {} recommended activities for '{}'", stored.len(), email);
            for activity in stored {
                println!("  [{}] {}", activity.act_type, activity.title);
            }
        }
    }

    Ok(())
}
