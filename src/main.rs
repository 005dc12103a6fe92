use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use chatgate::application::messaging::{Dispatcher, MembershipHandler, MessageParser, RegistrationGate};
use chatgate::domain::entities::{MembershipEvent, UserRecord};
use chatgate::domain::traits::{GroupStore, UserStore};
use chatgate::infrastructure::adapters::console::{parse_directive, ConsoleAdapter, ConsoleDirective};
use chatgate::infrastructure::config::{Config, StorageBackend};
use chatgate::infrastructure::database::Database;
use chatgate::infrastructure::groups::{FeatureAnnouncer, ParticipantCache};
use chatgate::infrastructure::incident::FileIncidentLog;
use chatgate::infrastructure::plugins::{HandlerFactory, HotReloader, ManifestLoader, PluginRegistry};
use chatgate::infrastructure::storage::MemoryStore;

/// Group id used for membership events typed on the console
const CONSOLE_GROUP: &str = "console@g.us";

#[derive(Parser)]
#[command(name = "chatgate")]
#[command(about = "Command dispatch core for chat bots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console transport
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("chatgate v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn load_config(config_path: &str) -> Config {
    if Path::new(config_path).exists() {
        match Config::load(config_path) {
            Ok(mut config) => {
                config.apply_env();
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::load_env()
            }
        }
    } else {
        Config::load_env()
    }
}

/// Open the configured store and make sure the console sender has a record
fn open_store(config: &Config) -> Result<(Arc<dyn UserStore>, Arc<dyn GroupStore>), String> {
    let console_user = UserRecord::new(&config.console.sender, config.storage.default_limit);

    match config.storage.backend {
        StorageBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            store.insert_user(console_user);
            Ok((store.clone(), store))
        }
        StorageBackend::Sqlite => {
            let db = Database::new(&config.storage.path)
                .map_err(|e| format!("Failed to initialize database: {}", e))?;
            tracing::info!("Database initialized at {}", config.storage.path.display());
            let existing = db
                .get_user(&console_user.id)
                .map_err(|e| format!("Failed to read console user: {}", e))?;
            if existing.is_none() {
                db.upsert_user(&console_user)
                    .map_err(|e| format!("Failed to seed console user: {}", e))?;
            }
            let db = Arc::new(db);
            Ok((db.clone(), db))
        }
    }
}

fn run_bot(config_path: &str) -> Result<(), String> {
    let config = Arc::new(load_config(config_path));
    tracing::info!("Starting chatgate: {} ({:?} mode)", config.bot.name, config.mode);

    let (users, groups) = open_store(&config)?;

    let rt = tokio::runtime::Runtime::new().map_err(|e| format!("Failed to start runtime: {}", e))?;
    rt.block_on(async move {
        let loader = ManifestLoader::new(&config.plugins.directory, HandlerFactory::with_builtins());
        let registry = Arc::new(PluginRegistry::new(Arc::new(loader)));

        let count = registry
            .initial_load(config.mode)
            .await
            .map_err(|e| format!("Failed to load plugins: {}", e))?;
        tracing::info!("Plugin system initialized with {} plugins", count);

        let reloader = if config.hot_reload_enabled() {
            match HotReloader::start(&config.plugins.directory, registry.clone()) {
                Ok(reloader) => Some(reloader),
                Err(e) => {
                    tracing::warn!("Hot reload unavailable: {}", e);
                    None
                }
            }
        } else {
            tracing::info!("Hot reload disabled in production mode.");
            None
        };

        let incidents = Arc::new(FileIncidentLog::new(&config.incidents.directory));
        let dispatcher = Arc::new(
            Dispatcher::new(config.clone(), registry, users.clone())
                .with_pre_process(Arc::new(RegistrationGate::new(config.clone(), users)))
                .with_incidents(incidents.clone()),
        );
        let membership = Arc::new(
            MembershipHandler::new(
                groups,
                Arc::new(ParticipantCache::new()),
                Arc::new(FeatureAnnouncer::new()),
                config.rate_limit(),
                config.rate_ledger_capacity,
            )
            .with_incidents(incidents),
        );

        run_console(config, dispatcher, membership).await;

        if let Some(reloader) = reloader {
            reloader.stop();
        }
        Ok(())
    })
}

async fn run_console(config: Arc<Config>, dispatcher: Arc<Dispatcher>, membership: Arc<MembershipHandler>) {
    let transport = Arc::new(ConsoleAdapter::new());
    let parser = MessageParser::new(config.bot.prefixes.iter().cloned());
    let conversation = if config.console.group {
        CONSOLE_GROUP
    } else {
        config.console.sender.as_str()
    };

    tracing::info!("Console ready. Type :event <action> <participants...> or :quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read console input: {}", e);
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match parse_directive(input) {
            Some(ConsoleDirective::Quit) => break,
            Some(ConsoleDirective::Event { action, participants }) => {
                let event = MembershipEvent::new(CONSOLE_GROUP, action, participants);
                let outcome = membership.handle(transport.as_ref(), &event).await;
                tracing::debug!("Membership outcome: {:?}", outcome);
                continue;
            }
            None => {}
        }

        let message = parser
            .parse(conversation, &config.console.sender, input)
            .in_group(config.console.group)
            .with_display_name(config.console.display_name.clone());

        let dispatcher = dispatcher.clone();
        let transport = transport.clone();
        tokio::spawn(async move {
            let outcome = dispatcher.process_message(transport.as_ref(), &message).await;
            tracing::debug!("Dispatch outcome: {:?}", outcome);
        });
    }
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => eprintln!("Failed to render default config: {}", e),
    }
}
