use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use anyhow::{Result, anyhow};

use tonepicker_core::logging::init_tracing;
use tonepicker_core::{ActionError, Config, RequestController, ToneClient, ToneDirectionTable};

#[derive(Parser)]
#[command(name = "tonepicker")]
#[command(about = "Change the tone of text with AI, with undo and redo")]
struct Cli {
    /// Tone server base URL (defaults to TONEPICKER_SERVER or http://localhost:5000)
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive editing session with undo/redo
    Session,
    /// Change the tone of a single piece of text
    Transform {
        /// Tone identifier, e.g. casual-formal
        #[arg(short, long)]
        tone: String,
        /// Text to convert
        text: String,
    },
    /// Show server health and key configuration
    Health,
    /// Ask the server to verify its provider API key
    TestKey,
    /// List available tone identifiers
    Tones,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, load_error) = Config::load_or_defaults();

    init_tracing(config.log_level());
    if let Some(err) = load_error {
        tracing::warn!(error = %err, "could not read config file, using defaults");
    }

    let server = cli.server.unwrap_or_else(|| config.server_url());
    let client = ToneClient::new(&server);

    match cli.command {
        Commands::Session => run_session(client).await?,
        Commands::Transform { tone, text } => transform_once(client, &tone, &text).await?,
        Commands::Health => show_health(&client).await?,
        Commands::TestKey => test_key(&client).await?,
        Commands::Tones => list_tones(),
    }

    Ok(())
}

/// "casual-formal" -> "Casual → Formal"
fn tone_label(identifier: &str) -> String {
    match ToneDirectionTable::new().resolve(identifier) {
        Ok(direction) => format!(
            "{} → {}",
            direction.from.display_name(),
            direction.to.display_name()
        ),
        Err(_) => identifier.to_string(),
    }
}

#[derive(Clone, Copy)]
enum SessionAction {
    Edit,
    ChangeTone,
    Undo,
    Redo,
    Reset,
    History,
    DismissError,
    Quit,
}

impl SessionAction {
    fn label(&self) -> &'static str {
        match self {
            SessionAction::Edit => "Edit text",
            SessionAction::ChangeTone => "Change tone",
            SessionAction::Undo => "Undo",
            SessionAction::Redo => "Redo",
            SessionAction::Reset => "Reset",
            SessionAction::History => "Show history",
            SessionAction::DismissError => "Dismiss error",
            SessionAction::Quit => "Quit",
        }
    }
}

/// Actions offered for the current state; undo/redo only when possible.
fn available_actions(controller: &RequestController<ToneClient>) -> Vec<SessionAction> {
    let mut actions = vec![SessionAction::Edit, SessionAction::ChangeTone];
    if controller.can_undo() {
        actions.push(SessionAction::Undo);
    }
    if controller.can_redo() {
        actions.push(SessionAction::Redo);
    }
    actions.push(SessionAction::Reset);
    actions.push(SessionAction::History);
    if controller.error().is_some() {
        actions.push(SessionAction::DismissError);
    }
    actions.push(SessionAction::Quit);
    actions
}

async fn run_session(client: ToneClient) -> Result<()> {
    let theme = ColorfulTheme::default();
    let identifiers: Vec<&str> = ToneDirectionTable::new().identifiers().collect();
    let tone_labels: Vec<String> = identifiers.iter().map(|id| tone_label(id)).collect();
    let mut controller = RequestController::new(client);

    println!("\n{}", "🎨 Tone Picker".bold().blue());
    println!("{}", "Adjust the tone of your text with AI".dimmed());

    loop {
        println!("\n{}", "=".repeat(50).dimmed());
        let text = controller.current_text();
        if text.is_empty() {
            println!("{}", "(empty)".dimmed());
        } else {
            println!("{}", text);
        }
        println!("{}", "=".repeat(50).dimmed());
        println!(
            "{}",
            format!(
                "version {}/{}",
                controller.history().current_index() + 1,
                controller.history().len()
            )
            .dimmed()
        );
        if let Some(error) = controller.error() {
            println!("{} {}", "⚠️ ".yellow(), error.red());
        }

        let actions = available_actions(&controller);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let outcome = match actions[selection] {
            SessionAction::Edit => {
                let text: String = Input::with_theme(&theme)
                    .with_prompt("Text")
                    .with_initial_text(controller.current_text())
                    .allow_empty(true)
                    .interact_text()?;
                controller.edit(text)
            }
            SessionAction::ChangeTone => {
                let choice = Select::with_theme(&theme)
                    .with_prompt("Select a tone")
                    .items(&tone_labels)
                    .default(0)
                    .interact()?;
                println!("{}", "🤖 Changing tone...".magenta());
                controller.transform(identifiers[choice]).await
            }
            SessionAction::Undo => controller.undo().map(|_| ()),
            SessionAction::Redo => controller.redo().map(|_| ()),
            SessionAction::Reset => controller.reset(),
            SessionAction::History => {
                print_history(&controller);
                Ok(())
            }
            SessionAction::DismissError => {
                controller.dismiss_error();
                Ok(())
            }
            SessionAction::Quit => break,
        };

        if let Err(ActionError::Request(failure)) = &outcome {
            if failure.is_retryable() {
                println!("{}", "You can try the same tone again.".dimmed());
            }
        }
    }

    Ok(())
}

fn print_history(controller: &RequestController<ToneClient>) {
    let history = controller.history();
    println!("\n{}", "📜 History".bold().green());
    for (i, snapshot) in history.snapshots().iter().enumerate() {
        let marker = if i == history.current_index() { "▶" } else { " " };
        let shown = if snapshot.is_empty() { "(empty)" } else { snapshot.as_str() };
        println!("{} {}. {}", marker.bold().yellow(), i + 1, shown);
    }
}

async fn transform_once(client: ToneClient, tone: &str, text: &str) -> Result<()> {
    let mut controller = RequestController::new(client);
    controller.edit(text)?;

    match controller.transform(tone).await {
        Ok(()) => {
            println!("{}", controller.current_text());
            Ok(())
        }
        Err(err) => Err(anyhow!("{}", err)),
    }
}

async fn show_health(client: &ToneClient) -> Result<()> {
    let health = client.health().await?;

    println!("\n{}", "🩺 Server Health".bold().blue());
    println!("{}", "=".repeat(30).dimmed());
    println!("  Server:  {}", client.base_url());
    println!("  Status:  {}", health.status.green());
    println!("  Time:    {}", health.timestamp.dimmed());
    if health.api_key_configured {
        println!("  API key: {} ({})", "configured".green(), health.api_key_prefix);
    } else {
        println!("  API key: {}", "not configured".red());
    }

    Ok(())
}

async fn test_key(client: &ToneClient) -> Result<()> {
    match client.test_key().await {
        Ok(result) => {
            println!("{}", result.status.bold().green());
            for model in result.models {
                println!("  • {}", model);
            }
        }
        Err(failure) => return Err(anyhow!("API key test failed: {}", failure)),
    }
    Ok(())
}

fn list_tones() {
    println!("\n{}", "🎨 Available Tones".bold().blue());
    println!("{}", "=".repeat(30).dimmed());
    for id in ToneDirectionTable::new().identifiers() {
        println!("  • {:<22} {}", id.green(), tone_label(id).dimmed());
    }
}
