use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use disctracker::config::Config;
use disctracker::models::{CreateDiscRequest, DiscFilter, NewCheckInRequest, NewCourse};
use disctracker::storage;
use disctracker::travel;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "disctracker-admin")]
#[command(about = "Disc tracker admin management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new disc
    AddDisc {
        /// Code printed on the disc
        id: String,
        #[arg(long)]
        manufacturer: String,
        #[arg(long)]
        plastic: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        img_url: Option<String>,
    },
    /// Record a check-in with already geocoded coordinates
    CheckIn {
        disc_id: String,
        #[arg(long)]
        course: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        country: String,
        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        zip: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Print travel statistics for a disc as JSON
    Stats { disc_id: String },
    /// List registered discs
    ListDiscs {
        #[arg(long, default_value_t = 100)]
        limit: i64,
    },
    /// Load courses from a JSON array of course records
    SeedCourses { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let storage = storage::connect(&config.database).await?;

    match cli.command {
        Commands::AddDisc {
            id,
            manufacturer,
            plastic,
            name,
            img_url,
        } => {
            let request = CreateDiscRequest {
                id,
                manufacturer,
                plastic,
                name,
                img_url,
            };
            request.validate()?;
            let disc = storage.create_disc(&request).await?;
            println!("✓ Registered disc '{}' ({} {})", disc.id, disc.plastic, disc.name);
        }
        Commands::CheckIn {
            disc_id,
            course,
            state,
            country,
            latitude,
            longitude,
            username,
            city,
            zip,
            note,
        } => {
            let request = NewCheckInRequest {
                username,
                course_name: course,
                city,
                state,
                zip,
                country,
                latitude,
                longitude,
                note,
            };
            request.validate()?;
            let check_in = storage.create_check_in(&disc_id, &request).await?;
            let when = DateTime::<Utc>::from_timestamp(check_in.checked_in_at, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| check_in.checked_in_at.to_string());
            println!(
                "✓ Checked in disc '{}' at {} ({}) as check in #{}",
                disc_id, check_in.course_name, when, check_in.id
            );
        }
        Commands::Stats { disc_id } => {
            let stats = travel::stats_for_disc(storage.as_ref(), &disc_id).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::ListDiscs { limit } => {
            let discs = storage.list_discs(&DiscFilter::default(), limit, 0).await?;
            if discs.is_empty() {
                println!("No discs found.");
            } else {
                println!("{:<16} {:<20} {:<16} {}", "ID", "Manufacturer", "Plastic", "Name");
                println!("{}", "-".repeat(70));
                for disc in discs {
                    println!(
                        "{:<16} {:<20} {:<16} {}",
                        disc.id, disc.manufacturer, disc.plastic, disc.name
                    );
                }
            }
        }
        Commands::SeedCourses { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let courses: Vec<NewCourse> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a JSON array of courses", file.display()))?;

            for course in &courses {
                storage.add_course(course).await?;
            }
            println!("✓ Seeded {} courses", courses.len());
        }
    }

    Ok(())
}
