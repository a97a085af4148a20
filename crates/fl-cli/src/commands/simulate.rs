use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fl_app::{AppConfig, Application};
use fl_core::{Direction, GameConfig};
use fl_simulation::{DogId, SimConfig, SimEventKind};
use fl_store::MAX_PAGE;

/// Dogs pick a new direction this often.
const STEER_EVERY: u64 = 5;

#[derive(Debug, Default)]
struct Totals {
    spawned: usize,
    collected: usize,
    delivered: u64,
    retired: usize,
}

/// Run a headless game with randomly steered dogs and print a summary.
pub fn run(
    config_file: &Path,
    ticks: u64,
    tick_ms: u64,
    players: &[String],
    seed: u64,
    verbose: bool,
) -> Result<(), String> {
    let game = super::load_game(config_file)?;
    if game.maps.is_empty() {
        println!("  No maps found. Nothing to simulate.");
        return Ok(());
    }

    let players = if players.is_empty() {
        default_players(&game)
    } else {
        players
            .iter()
            .map(|p| parse_player(p.as_str()))
            .collect::<Result<Vec<_>, _>>()?
    };

    let config = AppConfig::default().with_sim(
        SimConfig::default()
            .with_seed(seed)
            .with_randomize_spawn(true)
            .with_max_events(0),
    );
    let mut app = Application::open(game, &config).map_err(|e| e.to_string())?;

    let mut dogs: Vec<DogId> = Vec::new();
    for (name, map) in &players {
        let joined = app
            .join(map, name)
            .map_err(|e| format!("cannot add '{name}' to '{map}': {e}"))?;
        dogs.push(joined.dog_id);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let delta = Duration::from_millis(tick_ms);
    let mut totals = Totals::default();

    for tick in 0..ticks {
        if tick % STEER_EVERY == 0 {
            dogs.retain(|dog| app.registry().session_of(*dog).is_some());
            for &dog in &dogs {
                let direction = Direction::MOVING[rng.random_range(0..Direction::MOVING.len())];
                app.set_direction(dog, direction.code())
                    .map_err(|e| format!("cannot steer dog {dog}: {e}"))?;
            }
        }
        let report = app
            .tick(delta)
            .map_err(|e| format!("simulation error: {e}"))?;
        totals.spawned += report.spawned.len();
        totals.collected += report.collected.len();
        totals.delivered += report.delivered.iter().map(|d| d.value).sum::<u64>();
        totals.retired += report.retired.len();
    }

    let registry = app.registry();

    // Header
    println!(
        "  {} {}",
        "Simulation".bold(),
        format!("({ticks} ticks, {tick_ms}ms/tick, seed={seed})").dimmed()
    );
    println!(
        "  {} dogs joined, {} events logged",
        players.len(),
        registry.events().len()
    );
    println!(
        "  Simulated time: {}",
        super::format_secs(registry.clock().elapsed())
    );
    println!(
        "  Loot: {} spawned, {} collected, {} points delivered",
        totals.spawned, totals.collected, totals.delivered
    );
    println!();

    if verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in registry.events().iter() {
            let tick_label = format!("[tick {:>4}]", event.tick).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {desc}");
        }
        if registry.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let notable: Vec<_> = registry
            .events()
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    SimEventKind::LootDelivered { .. } | SimEventKind::DogRetired { .. }
                )
            })
            .collect();
        if !notable.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in notable {
                match event.kind {
                    SimEventKind::DogRetired { .. } => {
                        println!("  {}  {}", "RETIRED".red().bold(), event.description);
                    }
                    _ => println!("  {}  {}", "DELIVERY".green().bold(), event.description),
                }
            }
            println!();
        }
    }

    // Active dogs
    println!("  {}", "Dogs".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Dog", "Map", "Position", "Heading", "Bag", "Score"]);

    let mut active = 0;
    for session in registry.sessions() {
        for dog in session.dogs() {
            let pos = dog.position();
            let heading = match dog.direction() {
                Direction::Idle => "-",
                d => d.code(),
            };
            table.add_row(vec![
                dog.name().to_string(),
                session.id().to_string(),
                format!("({:.2}, {:.2})", pos.x, pos.y),
                heading.to_string(),
                format!("{}/{}", dog.bag().len(), session.map().bag_capacity()),
                dog.score().to_string(),
            ]);
            active += 1;
        }
    }

    if active == 0 {
        println!("  {}", "(every dog has retired)".dimmed());
    } else {
        println!("{table}");
    }
    println!();

    if totals.retired > 0 {
        let records = app.records(0, MAX_PAGE).map_err(|e| e.to_string())?;
        println!("  {}", "Hall of Fame".bold().underline());
        println!();
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Player", "Score", "Play time"]);
        for record in &records {
            table.add_row(vec![
                record.name.clone(),
                record.score.to_string(),
                super::format_secs(record.play_time()),
            ]);
        }
        println!("{table}");
        println!();
    }

    Ok(())
}

fn default_players(game: &GameConfig) -> Vec<(String, String)> {
    game.maps
        .iter()
        .map(|m| (format!("{}-dog", m.id()), m.id().to_string()))
        .collect()
}

fn parse_player(entry: &str) -> Result<(String, String), String> {
    match entry.rsplit_once('@') {
        Some((name, map)) if !name.is_empty() && !map.is_empty() => {
            Ok((name.to_string(), map.to_string()))
        }
        _ => Err(format!("invalid player '{entry}', expected name@map")),
    }
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::DogJoined { .. } => description.blue(),
        SimEventKind::LootSpawned { .. } => description.normal(),
        SimEventKind::LootCollected { .. } => description.cyan(),
        SimEventKind::LootLeftBehind { .. } => description.yellow(),
        SimEventKind::LootDelivered { .. } => description.green(),
        SimEventKind::DogRetired { .. } => description.red().bold(),
    }
}
