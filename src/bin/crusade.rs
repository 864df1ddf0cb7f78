use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::{rngs::StdRng, SeedableRng};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;
use uuid::Uuid;

use crusade::catalog::tiering::{retier, tier_histogram};
use crusade::catalog::{CardCatalog, CardFilter, CardKind, CardTypeFilter, DifficultyTier};
use crusade::config::QuizConfig;
use crusade::distractors::PremiumDistractorTable;
use crusade::engine::round::{
    GameMode, HintKind, PlayerAction, RoundController, RoundOutcome, Transition,
};
use crusade::enrichment::{CardDetailLookup, KrcgClient, NoLookup};
use crusade::leaderboard::{
    AuthenticatedPlayer, LeaderboardGateway, LeaderboardMode, LeaderboardService, PlayerId,
};
use crusade::ranked::RankedPlaylist;
use crusade::session::{QuizSession, SessionError};
use crusade::stats::{FileStatsStore, StatsStore};

const LOG_TARGET: &str = "bin::crusade";
const SUBMIT_ATTEMPTS: usize = 3;

#[derive(Debug, Parser)]
#[command(name = "crusade")]
#[command(about = "Guess the VTES card, casual or ranked", long_about = None)]
struct Args {
    /// JSON config file; flags and env vars override its values
    #[arg(long, env = "CRUSADE_CONFIG")]
    config: Option<PathBuf>,

    /// Card dataset with difficulty tiers
    #[arg(long, env = "CRUSADE_DATASET")]
    dataset: Option<PathBuf>,

    /// Curated distractor table
    #[arg(long, env = "CRUSADE_PREMIUM")]
    premium: Option<PathBuf>,

    /// Casual stats file
    #[arg(long, env = "CRUSADE_STATS")]
    stats: Option<PathBuf>,

    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: Option<Url>,

    #[arg(long, env = "SUPABASE_ANON_KEY")]
    supabase_anon_key: Option<String>,

    /// User JWT for authenticated leaderboard writes
    #[arg(long, env = "SUPABASE_ACCESS_TOKEN")]
    supabase_access_token: Option<String>,

    /// Skip KRCG card detail lookups
    #[arg(long, env = "CRUSADE_OFFLINE", default_value_t = false)]
    offline: bool,

    /// Toggle structured (JSON) logs
    #[arg(long, env = "CRUSADE_LOG_JSON", default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Casual,
    Ranked,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play in the terminal
    Play {
        #[arg(long, value_enum, default_value_t = ModeArg::Casual)]
        mode: ModeArg,

        /// Casual difficulty, 1-5
        #[arg(long, default_value = "1", value_parser = parse_tier)]
        tier: DifficultyTier,

        /// crypt, library or all
        #[arg(long, default_value = "library", value_parser = parse_kind)]
        kind: CardTypeFilter,

        #[arg(long, env = "CRUSADE_SEED")]
        seed: Option<u64>,

        #[arg(long, env = "CRUSADE_PLAYER_ID")]
        player_id: Option<Uuid>,

        #[arg(long, env = "CRUSADE_PLAYER_NAME")]
        player_name: Option<String>,
    },
    /// Report the tier distribution of the dataset
    Tiers,
    /// Print a leaderboard page
    Leaderboard {
        #[arg(long, default_value = "ranked")]
        mode: LeaderboardMode,

        #[arg(long, default_value_t = 10)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
}

fn parse_tier(raw: &str) -> Result<DifficultyTier, String> {
    let value: u8 = raw.parse().map_err(|_| format!("`{raw}` is not a tier"))?;
    DifficultyTier::new(value).map_err(|err| err.to_string())
}

fn parse_kind(raw: &str) -> Result<CardTypeFilter, String> {
    raw.parse().map_err(|err: crusade::catalog::CatalogError| err.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let args = Args::parse();
    init_tracing(args.json)?;
    let config = build_config(&args).context("failed to build quiz config")?;

    match args.command {
        Command::Play {
            mode,
            tier,
            kind,
            seed,
            player_id,
            player_name,
        } => {
            let player = player_id.map(|id| AuthenticatedPlayer {
                id: PlayerId(id),
                display_name: player_name,
            });
            let options = PlayOptions {
                mode,
                filter: CardFilter {
                    include_imbued: config.include_imbued,
                    ..CardFilter::new(tier, kind)
                },
                seed,
                offline: args.offline,
                player,
            };
            play(&config, options).await
        }
        Command::Tiers => report_tiers(&config),
        Command::Leaderboard {
            mode,
            limit,
            offset,
        } => print_leaderboard(&config, mode, limit, offset).await,
    }
}

fn load_dotenv() {
    let manifest_env = env!("CARGO_MANIFEST_DIR");
    let manifest_env_path = PathBuf::from(manifest_env).join(".env");
    dotenv::from_filename(manifest_env_path).ok();
    dotenv::dotenv().ok();
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.compact().init();
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<QuizConfig> {
    let mut config = match &args.config {
        Some(path) => QuizConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => QuizConfig::default(),
    };
    if let Some(path) = &args.dataset {
        config.dataset_path = path.clone();
    }
    if let Some(path) = &args.premium {
        config.premium_path = Some(path.clone());
    }
    if let Some(path) = &args.stats {
        config.stats_path = path.clone();
    }
    if let Some(url) = &args.supabase_url {
        config.supabase_url = Some(url.clone());
    }
    if let Some(key) = &args.supabase_anon_key {
        config.supabase_anon_key = Some(key.clone());
    }
    if let Some(token) = &args.supabase_access_token {
        config.supabase_access_token = Some(token.clone());
    }
    config.validate()?;
    Ok(config)
}

fn load_catalog(config: &QuizConfig) -> Result<Arc<CardCatalog>> {
    let catalog = CardCatalog::load(&config.dataset_path)
        .with_context(|| format!("failed to load {}", config.dataset_path.display()))?;
    Ok(Arc::new(catalog))
}

fn load_premium(config: &QuizConfig) -> Result<Arc<PremiumDistractorTable>> {
    let table = match &config.premium_path {
        Some(path) => PremiumDistractorTable::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => PremiumDistractorTable::default(),
    };
    Ok(Arc::new(table))
}

fn gateway(config: &QuizConfig) -> Option<LeaderboardService> {
    config.supabase().map(LeaderboardService::supabase)
}

struct PlayOptions {
    mode: ModeArg,
    filter: CardFilter,
    seed: Option<u64>,
    offline: bool,
    player: Option<AuthenticatedPlayer>,
}

enum Flow {
    Continue,
    Quit,
}

async fn play(config: &QuizConfig, options: PlayOptions) -> Result<()> {
    let catalog = load_catalog(config)?;
    let premium = load_premium(config)?;
    let mut rng = options
        .seed
        .map(StdRng::seed_from_u64)
        .unwrap_or_else(StdRng::from_entropy);

    let lookup: Arc<dyn CardDetailLookup> = if options.offline {
        Arc::new(NoLookup)
    } else {
        Arc::new(KrcgClient::new(config.krcg_url()?))
    };

    let controller = match options.mode {
        ModeArg::Casual => {
            let store = FileStatsStore::new(&config.stats_path);
            let stats = store.load();
            let controller = RoundController::casual(
                catalog,
                premium,
                options.filter,
                stats.into(),
                config.round_config(),
                rng,
            );
            let mut session = QuizSession::new(controller, lookup)
                .with_stats_store(Arc::new(store) as Arc<dyn StatsStore>);
            return run_session(&mut session, config, options.player.as_ref()).await;
        }
        ModeArg::Ranked => {
            let playlist = RankedPlaylist::build(&catalog, config.include_imbued, &mut rng)
                .context("dataset cannot fill a ranked run")?;
            RoundController::ranked(catalog, premium, playlist, config.round_config(), rng)
        }
    };
    let mut session = QuizSession::new(controller, lookup);
    run_session(&mut session, config, options.player.as_ref()).await
}

async fn run_session(
    session: &mut QuizSession,
    config: &QuizConfig,
    player: Option<&AuthenticatedPlayer>,
) -> Result<()> {
    print_help(session.mode());
    let transition = session.start()?;
    render(session, &transition);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle_line(session, line.trim()) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(err) => println!("! {err}"),
                }
            }
            Some(event) = session.next_event() => {
                let transition = session.handle_event(event)?;
                render(session, &transition);
            }
        }
        if session.is_complete() {
            break;
        }
    }

    finish(session, config, player).await
}

fn handle_line(session: &mut QuizSession, line: &str) -> Result<Flow, SessionError> {
    if line.is_empty() {
        return Ok(Flow::Continue);
    }
    if let Ok(choice) = line.parse::<usize>() {
        let label = session
            .controller()
            .current()
            .and_then(|round| round.options.options().get(choice.wrapping_sub(1)).cloned());
        return match label {
            Some(label) => {
                let transition = session.act(PlayerAction::Choose(label))?;
                render(session, &transition);
                Ok(Flow::Continue)
            }
            None => {
                println!("! no option {choice}");
                Ok(Flow::Continue)
            }
        };
    }

    let mut words = line.split_whitespace();
    let transition = match words.next() {
        Some("/quit") => return Ok(Flow::Quit),
        Some("/skip") => session.act(PlayerAction::Skip)?,
        Some("/next") => session.continue_now()?,
        Some("/hint") => {
            let kind = match words.next() {
                Some("type") => HintKind::CardType,
                Some("disc") | Some("clan") => HintKind::Discipline,
                Some("cap") => HintKind::Capacity,
                Some("init") => HintKind::Initials,
                _ => {
                    println!("! hints: type, disc, cap, init");
                    return Ok(Flow::Continue);
                }
            };
            println!("  hint: {}", session.hint(kind)?);
            return Ok(Flow::Continue);
        }
        Some("/tier") => {
            let Some(filter) = session.controller().filter().copied() else {
                println!("! tier is fixed in ranked runs");
                return Ok(Flow::Continue);
            };
            match words.next().map(parse_tier) {
                Some(Ok(tier)) => session.set_filter(CardFilter { tier, ..filter })?,
                _ => {
                    println!("! usage: /tier 1-5");
                    return Ok(Flow::Continue);
                }
            }
        }
        Some("/kind") => {
            let Some(filter) = session.controller().filter().copied() else {
                println!("! card type is fixed in ranked runs");
                return Ok(Flow::Continue);
            };
            match words.next().map(parse_kind) {
                Some(Ok(kind)) => session.set_filter(CardFilter { kind, ..filter })?,
                _ => {
                    println!("! usage: /kind crypt|library|all");
                    return Ok(Flow::Continue);
                }
            }
        }
        _ => session.act(PlayerAction::Guess(line.to_string()))?,
    };
    render(session, &transition);
    Ok(Flow::Continue)
}

fn print_help(mode: GameMode) {
    println!("Type an option number or the card name.");
    match mode {
        GameMode::Casual => println!(
            "Commands: /hint type|disc|cap|init, /skip, /next, /tier N, /kind crypt|library|all, /quit"
        ),
        GameMode::Ranked => println!("20 cards, no skips, no hints. Commands: /next, /quit"),
    }
}

fn render(session: &QuizSession, transition: &Transition) {
    match transition {
        Transition::Presented { round_id, .. } => {
            let Some(round) = session.controller().current() else {
                return;
            };
            let kind = match round.card.kind {
                CardKind::Crypt => "crypt",
                CardKind::Library => "library",
            };
            match round.position {
                Some(position) => println!(
                    "\n#{} ({} of 20) tier {} {kind}",
                    round_id,
                    position + 1,
                    round.card.difficulty
                ),
                None => println!("\n#{round_id} tier {} {kind}", round.card.difficulty),
            }
            for (idx, option) in round.options.options().iter().enumerate() {
                println!("  {}. {option}", idx + 1);
            }
            if let Some(window) = session.controller().answer_window() {
                println!("  ({}s to answer)", window.as_secs());
            }
        }
        Transition::Answered {
            outcome, points, ..
        } => {
            let Some(round) = session.controller().current() else {
                return;
            };
            let verdict = match outcome {
                RoundOutcome::Correct => format!("Correct! +{points}"),
                RoundOutcome::Incorrect => "Wrong.".to_string(),
                RoundOutcome::Skipped => "Skipped.".to_string(),
                RoundOutcome::TimedOut => "Time's up.".to_string(),
                RoundOutcome::Pending => return,
            };
            println!("{verdict} It was {}.", round.card.display_name());
            if let Some(details) = session.details_for_current() {
                if let Some(url) = &details.image_url {
                    println!("  {url}");
                }
                if let Some(set) = &details.first_set {
                    println!("  first printed in {set}");
                }
                if !details.artists.is_empty() {
                    println!("  art by {}", details.artists.join(", "));
                }
            }
            let stats = session.controller().stats();
            println!(
                "  score {} | streak {} | best {} | {}/{}",
                stats.score, stats.streak, stats.best_streak, stats.correct, stats.played
            );
            if *outcome != RoundOutcome::Correct {
                println!("  /next to continue");
            }
        }
        Transition::RunComplete { summary, .. } => {
            println!("\n{}", summary.share_text(None));
        }
        Transition::Ignored => {}
    }
}

async fn finish(
    session: &mut QuizSession,
    config: &QuizConfig,
    player: Option<&AuthenticatedPlayer>,
) -> Result<()> {
    let (Some(gateway), Some(player)) = (gateway(config), player) else {
        return Ok(());
    };

    match session.mode() {
        GameMode::Ranked => {
            if session.controller().summary().is_none() {
                info!(target: LOG_TARGET, "ranked run abandoned, nothing to submit");
                return Ok(());
            }
            for attempt in 1..=SUBMIT_ATTEMPTS {
                match session.submit_ranked(&gateway, player).await {
                    Ok(outcome) => {
                        println!(
                            "Leaderboard rank {} (best {}{})",
                            outcome.rank,
                            outcome.best_score,
                            if outcome.updated { ", new best" } else { "" }
                        );
                        return Ok(());
                    }
                    Err(SessionError::Leaderboard(err))
                        if err.is_retryable() && attempt < SUBMIT_ATTEMPTS =>
                    {
                        warn!(target: LOG_TARGET, attempt, error = %err, "retrying ranked submission");
                    }
                    Err(err) => return Err(anyhow!(err).context("ranked submission failed")),
                }
            }
            Ok(())
        }
        GameMode::Casual => {
            if session.controller().stats().played == 0 {
                return Ok(());
            }
            let outcome = session
                .submit_casual(&gateway, player)
                .await
                .context("casual submission failed")?;
            println!("Leaderboard rank {} (best {})", outcome.rank, outcome.best_score);
            Ok(())
        }
    }
}

fn report_tiers(config: &QuizConfig) -> Result<()> {
    let catalog = load_catalog(config)?;
    for (label, cards) in [("crypt", catalog.crypt()), ("library", catalog.library())] {
        let histogram = tier_histogram(cards);
        let drift = retier(cards)
            .into_iter()
            .filter(|(idx, tier)| cards[*idx].difficulty != *tier)
            .count();
        println!("{label}: {} cards, {drift} would move on re-tiering", cards.len());
        for tier in DifficultyTier::all() {
            let count = histogram[(tier.value() - 1) as usize];
            let name = catalog.level_label(tier).unwrap_or("");
            println!("  tier {tier} {name:<12} {count}");
        }
    }
    Ok(())
}

async fn print_leaderboard(
    config: &QuizConfig,
    mode: LeaderboardMode,
    limit: usize,
    offset: usize,
) -> Result<()> {
    let gateway = gateway(config)
        .ok_or_else(|| anyhow!("SUPABASE_URL and SUPABASE_ANON_KEY are required"))?;
    let rows = gateway.top(mode, limit, offset).await?;
    for row in rows {
        println!(
            "{:>4}. {:<24} {:>6}  streak {:>2}  games {}",
            row.rank,
            row.entry.display_name.as_deref().unwrap_or("anonymous"),
            row.entry.score,
            row.entry.best_streak,
            row.entry.games_played
        );
    }
    Ok(())
}
