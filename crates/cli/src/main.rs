mod render;

use anyhow::{anyhow, bail};
use api_client::{HttpClientDirectory, DEFAULT_API_URL};
use clap::{Parser, Subcommand};
use therapist_core::{
    ClientDirectory, FormField, ProfileTab, ProfileView, SubmissionCoordinator, SubmissionState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "therapist")]
#[command(about = "TherapistHelper client directory CLI")]
struct Cli {
    /// Base URL of the client directory API
    #[arg(long, env = "THERAPIST_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Editable profile fields. Values are passed through exactly as typed so the form validator
/// sees them.
#[derive(clap::Args, Default)]
struct ProfileFields {
    /// Full name
    #[arg(long)]
    name: Option<String>,
    /// Age in years
    #[arg(long)]
    age: Option<String>,
    /// One of: female, male, non-binary, prefer-not-to-say, other
    #[arg(long)]
    gender: Option<String>,
    /// Gender label used when gender is "other"
    #[arg(long)]
    custom_gender: Option<String>,
    /// Background notes (at most 2400 characters are kept)
    #[arg(long)]
    background: Option<String>,
}

impl ProfileFields {
    fn changes(self) -> Vec<(FormField, String)> {
        [
            (FormField::FullName, self.name),
            (FormField::Age, self.age),
            (FormField::Gender, self.gender),
            (FormField::CustomGender, self.custom_gender),
            (FormField::Background, self.background),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List all clients
    List,
    /// Show the number of clients
    Count,
    /// Show one client's profile
    Show {
        /// Client id
        id: u64,
        /// Profile tab: overview, sessions, insights or edit
        #[arg(long, default_value = "overview")]
        tab: ProfileTab,
    },
    /// Create a new client
    Create {
        #[command(flatten)]
        fields: ProfileFields,
    },
    /// Edit an existing client
    Edit {
        /// Client id
        id: u64,
        #[command(flatten)]
        fields: ProfileFields,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_client=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let directory = HttpClientDirectory::new(cli.api_url)?;

    match cli.command {
        Some(Commands::List) => {
            let clients = directory.list_summaries(0, usize::MAX).await?;
            if clients.is_empty() {
                println!("No clients found.");
            }
            for client in clients {
                println!(
                    "ID: {}, Name: {}, Age: {}, Gender: {}",
                    client.id,
                    client.full_name,
                    client.age,
                    client.gender
                );
            }
        }
        Some(Commands::Count) => {
            println!("{}", directory.count_clients().await?);
        }
        Some(Commands::Show { id, tab }) => {
            let record = directory.get_client(id).await?;
            let mut view = ProfileView::new(record);
            view.select_tab(tab);
            print!("{}", render::render_tab(&view));
        }
        Some(Commands::Create { fields }) => {
            let mut coordinator = SubmissionCoordinator::for_new_client();
            for (field, value) in fields.changes() {
                coordinator.set_field(field, value);
            }

            let state = coordinator.submit(&directory).await;
            report_failure(state, &coordinator)?;
            if let Some(record) = coordinator.record() {
                println!("Created client {}", record.id);
                println!("{}", render::summary_line(record));
            }
        }
        Some(Commands::Edit { id, fields }) => {
            let changes = fields.changes();
            if changes.is_empty() {
                bail!("nothing to change; pass at least one field option");
            }

            let record = directory.get_client(id).await?;
            let mut view = ProfileView::new(record);
            view.select_tab(ProfileTab::Edit);
            for (field, value) in changes {
                view.coordinator_mut().set_field(field, value);
            }

            let state = view.submit(&directory).await;
            report_failure(state, view.coordinator())?;
            println!("Updated client {}", id);
            print!("{}", render::render_tab(&view));
        }
        None => {
            println!("Use 'therapist --help' for commands");
        }
    }

    Ok(())
}

/// Prints validation or save errors and fails unless the submit succeeded.
fn report_failure(
    state: SubmissionState,
    coordinator: &SubmissionCoordinator,
) -> anyhow::Result<()> {
    if state == SubmissionState::Success {
        return Ok(());
    }
    eprint!("{}", render::render_errors(coordinator.errors()));
    Err(anyhow!("client profile was not saved"))
}
