//! Bolão CLI
//!
//! Browses and manages pools in a session-local catalog and asks for lucky
//! numbers. Every run starts from the seeded demo catalog.

use bolao::{
    config::ConfigLoader, find_game, Pool, PoolDraft, ServiceBuilder, ServiceContainer,
    LOTTERY_GAMES,
};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bolao")]
#[command(about = "Lottery pool coordination", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the supported lotteries
    Games,

    /// List pools
    Pools {
        /// Only pools created by this organizer
        #[arg(long, conflicts_with_all = ["access_code", "search"])]
        organizer: Option<String>,

        /// Also show private pools unlocked by this code
        #[arg(long, conflicts_with = "search")]
        access_code: Option<String>,

        /// Filter public pools by name or description
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one pool
    Show { pool_id: String },

    /// Create a pool as the configured organizer
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "mega-sena")]
        game: String,

        #[arg(long, default_value = "20")]
        quotas: u32,

        #[arg(long, default_value = "10.0")]
        price: f64,

        #[arg(long, default_value = "")]
        description: String,

        /// Days until sales close; the draw is one day later
        #[arg(long, default_value = "7")]
        closes_in_days: i64,

        /// Hide the pool behind an access code
        #[arg(long, requires = "access_code")]
        private: bool,

        #[arg(long)]
        access_code: Option<String>,
    },

    /// Buy quotas of a pool
    Buy {
        pool_id: String,
        quantity: u32,

        #[arg(long, default_value = "u1")]
        user: String,
    },

    /// Suggest lucky numbers for a pool
    Lucky {
        pool_id: String,

        /// Override how many numbers to suggest
        #[arg(long)]
        count: Option<usize>,
    },

    /// Explain the rules of a lottery
    Rules { game: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let config = loader.load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("bolao={}", config.logging.level))),
        )
        .init();

    let mut services = ServiceBuilder::new().with_config(config).build()?;
    run(args.command, &mut services).await
}

async fn run(
    command: Command,
    services: &mut ServiceContainer,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Games => {
            for game in LOTTERY_GAMES.iter() {
                println!(
                    "{:<14} {:<14} {:>2} de 1 a {}",
                    game.id, game.name, game.min_numbers, game.max_numbers
                );
            }
        }
        Command::Pools {
            organizer,
            access_code,
            search,
        } => {
            let catalog = services.catalog();
            let pools = match (organizer, search) {
                (Some(organizer), _) => catalog.list_by_organizer(&organizer),
                (None, Some(query)) => catalog.search(&query),
                (None, None) => catalog.list_visible(access_code.as_deref()),
            };
            if pools.is_empty() {
                println!("Nenhum bolão encontrado.");
            }
            for pool in pools {
                print_summary(pool);
            }
        }
        Command::Show { pool_id } => {
            let pool = services.catalog().find_by_id(&pool_id)?;
            print_summary(pool);
            println!("   {}", pool.description);
            println!("   Fechamento: {}", pool.closing_date.format("%d/%m/%Y %H:%M"));
            println!("   Sorteio:    {}", pool.draw_date.format("%d/%m/%Y %H:%M"));
        }
        Command::Create {
            name,
            game,
            quotas,
            price,
            description,
            closes_in_days,
            private,
            access_code,
        } => {
            if find_game(&game).is_err() {
                tracing::warn!(game_type = %game, "Creating pool for a game outside the registry");
            }
            let closing_date = Utc::now() + Duration::days(closes_in_days);
            let draft = PoolDraft {
                name,
                description,
                game_type: game,
                total_quotas: quotas,
                price_per_quota: price,
                closing_date: Some(closing_date),
                draw_date: Some(closing_date + Duration::days(1)),
                is_public: !private,
                access_code,
            };
            let organizer_id = services.organizer().id.clone();
            let pool = services.catalog_mut().create(draft, &organizer_id)?;
            println!("✅ Bolão criado com sucesso!");
            print_summary(pool);
        }
        Command::Buy {
            pool_id,
            quantity,
            user,
        } => {
            let participation = services
                .catalog_mut()
                .purchase_quotas(&pool_id, &user, quantity)?;
            let pool = services.catalog().find_by_id(&pool_id)?;
            println!(
                "✅ {} cota(s) reservadas ({}). Total R$ {:.2} via PIX.",
                participation.quotas,
                participation.payment_status,
                pool.price_per_quota * participation.quotas as f64
            );
            print_summary(pool);
        }
        Command::Lucky { pool_id, count } => {
            let pool = services.catalog().find_by_id(&pool_id)?.clone();
            let lucky = services.lucky();
            let result = match count {
                Some(count) => lucky.generate(&pool.game_type, count).await,
                None => lucky.generate_for_pool(&pool).await,
            };
            let numbers: Vec<String> = result.numbers.iter().map(|n| format!("{:02}", n)).collect();
            println!("🍀 Números sugeridos ({:?}): {}", result.source, numbers.join(" "));
        }
        Command::Rules { game } => {
            let text = services.lucky().explain_rules(&game).await;
            println!("{}", text);
        }
    }

    Ok(())
}

fn print_summary(pool: &Pool) {
    let game_name = find_game(&pool.game_type)
        .map(|game| game.name)
        .unwrap_or(pool.game_type.as_str());
    println!(
        "{} | {} [{}] {} | R$ {:.2} | {}/{} cotas ({:.0}%)",
        pool.id,
        pool.name,
        game_name,
        pool.status.label(),
        pool.price_per_quota,
        pool.sold_quotas(),
        pool.total_quotas,
        pool.progress() * 100.0
    );
}
