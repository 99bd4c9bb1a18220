use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{debug, info};

use property_pms::{
    CalendarPanel, EmbedOptions, ViewMode, build_embed_url,
    config::{self, Config},
    resolve_identifier,
    session::SessionContext,
    stats,
    supabase::SupabaseClient,
};

#[derive(Parser)]
#[command(name = "property-pms", about = "Property dashboard calendar and summary tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the calendar id found in a calendar reference
    Resolve { raw: String },
    /// Print the embed URL for a calendar reference
    Embed {
        raw: String,
        #[arg(long)]
        mode: Option<ViewMode>,
        #[arg(long)]
        hide_nav: bool,
        #[arg(long)]
        tz: Option<String>,
    },
    /// Show the stored settings and the calendar panel
    Show,
    /// Store a new calendar reference
    SetCalendar { raw: String },
    /// Print the dashboard totals
    Stats,
}

fn print_embed(raw: &str, options: &EmbedOptions) {
    let identifier = resolve_identifier(raw);
    debug!("Resolved '{}' to '{}'", raw, identifier);
    match build_embed_url(&identifier, options) {
        Some(url) => println!("{}", url),
        None => println!("{}", CalendarPanel::NotConfigured),
    }
}

enum BackendCommand {
    Show,
    SetCalendar(String),
    Stats,
}

async fn run_with_backend(command: BackendCommand, options: &EmbedOptions) -> Result<()> {
    let config = Config::from_env()?;
    let sessions = SessionContext::new();

    let mut subscription = sessions.subscribe();
    let watcher = tokio::spawn(async move {
        while let Ok(state) = subscription.changed().await {
            match state {
                Some(session) => debug!("Session active for {}", session.user_id),
                None => debug!("Session ended"),
            }
        }
    });

    sessions.sign_in(config.session());
    let session = sessions.require()?;

    let client = SupabaseClient::new(&config.supabase_url, &config.supabase_anon_key);

    match command {
        BackendCommand::Show => {
            let settings = client
                .load_settings(&session)
                .await
                .context("Failed to load settings")?;

            println!("{}", settings.display_name());
            for (label, url) in settings.sheet_links() {
                println!("  {:<14} {}", label, url);
            }
            for (label, url) in settings.embedded_sheets() {
                println!("  {:<14} {} (preview)", label, url);
            }
            println!("Calendar: {}", settings.calendar_panel(options));
        }
        BackendCommand::SetCalendar(raw) => {
            client.save_calendar_reference(&session, &raw).await?;
            println!("Calendar: {}", CalendarPanel::from_reference(&raw, options));
        }
        BackendCommand::Stats => {
            let today = Utc::now().date_naive();
            let stats = stats::load_dashboard_stats(&client, &session, today).await?;

            println!("Total income:      ${:.2}", stats.total_income);
            println!("Total expenses:    ${:.2}", stats.total_expenses);
            println!("Net income:        ${:.2}", stats.net_income);
            println!("Upcoming bookings: {}", stats.upcoming_bookings);
        }
    }

    sessions.sign_out();
    drop(sessions);
    watcher.await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut options = config::embed_options_from_env()?;

    match cli.command {
        Command::Resolve { raw } => println!("{}", resolve_identifier(&raw)),
        Command::Embed {
            raw,
            mode,
            hide_nav,
            tz,
        } => {
            if let Some(mode) = mode {
                options.mode = mode;
            }
            if hide_nav {
                options.show_nav = false;
            }
            if let Some(tz) = tz {
                options.time_zone = tz;
            }
            print_embed(&raw, &options);
        }
        Command::Show => run_with_backend(BackendCommand::Show, &options).await?,
        Command::SetCalendar { raw } => {
            run_with_backend(BackendCommand::SetCalendar(raw), &options).await?
        }
        Command::Stats => run_with_backend(BackendCommand::Stats, &options).await?,
    }

    info!("Done.");
    Ok(())
}
