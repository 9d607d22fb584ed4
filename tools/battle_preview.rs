//! Battle Preview: replays a battle narrative in the terminal.
//!
//! Usage: battle_preview --seed <seed> [--winner home|away]
//!                       [--home <title>:<slot,slot,...>] [--away <title>:<slot,slot,...>]
//!                       [--templates <path>] [--rules <path>] [--delay-ms <n>]
//!
//! Slots are raw identifiers such as `WeaponLaser`, `ShieldKevlar` or
//! `WeaponEmpty`, assigned to the left, right and front positions in order.

use battle_narrative::core::rules::BattleRules;
use battle_narrative::{BattleEngine, BattleOutcome, KartConfig, Side};
use std::process;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

struct KartArg {
    title: String,
    config: KartConfig,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut seed = None;
    let mut winner = Side::Home;
    let mut home = KartArg {
        title: "Home".to_string(),
        config: KartConfig::default(),
    };
    let mut away = KartArg {
        title: "Away".to_string(),
        config: KartConfig::default(),
    };
    let mut templates_path = None;
    let mut rules_path = None;
    let mut delay_ms: u64 = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = Some(args[i].clone());
            }
            "--winner" if i + 1 < args.len() => {
                i += 1;
                winner = match args[i].as_str() {
                    "home" | "0" => Side::Home,
                    "away" | "1" => Side::Away,
                    other => {
                        eprintln!("ERROR: winner must be home or away, got '{}'", other);
                        process::exit(1);
                    }
                };
            }
            "--home" if i + 1 < args.len() => {
                i += 1;
                home = parse_kart(&args[i]);
            }
            "--away" if i + 1 < args.len() => {
                i += 1;
                away = parse_kart(&args[i]);
            }
            "--templates" if i + 1 < args.len() => {
                i += 1;
                templates_path = Some(args[i].clone());
            }
            "--rules" if i + 1 < args.len() => {
                i += 1;
                rules_path = Some(args[i].clone());
            }
            "--delay-ms" if i + 1 < args.len() => {
                i += 1;
                delay_ms = args[i].parse().unwrap_or(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(seed) = seed else {
        eprintln!("ERROR: --seed is required");
        process::exit(1);
    };

    let mut builder = BattleEngine::builder();
    if let Some(ref path) = templates_path {
        builder = builder.templates_path(path);
    }
    if let Some(ref path) = rules_path {
        builder = builder.rules_path(path);
    }
    let engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let outcome = BattleOutcome::new("home", "away", winner, seed);
    let mut session = match engine.load_from_configs(
        &outcome,
        [home.title.as_str(), away.title.as_str()],
        &[home.config, away.config],
    ) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let [home_name, away_name] = session.names();
    println!("{} vs {}  (seed {})\n", home_name, away_name, outcome.seed);
    let (home_name, away_name) = (home_name.to_string(), away_name.to_string());

    let rules: &BattleRules = engine.rules();
    let mut number = 0;
    while let Some(narrative) = session.next() {
        number += 1;
        println!("Round {}", number);
        for line in &narrative.lines {
            println!("  {}", line);
            if delay_ms > 0 {
                thread::sleep(Duration::from_millis(delay_ms));
            }
        }
        let [home_power, away_power] = narrative.round.remaining_power(rules.starting_power);
        println!(
            "  {} {:>3} {}  |  {} {:>3} {}\n",
            home_name,
            home_power,
            power_bar(home_power, rules.starting_power),
            away_name,
            away_power,
            power_bar(away_power, rules.starting_power),
        );
    }

    println!("Winner: {}", session.winner_name());
}

fn parse_kart(arg: &str) -> KartArg {
    let (title, slots) = arg.split_once(':').unwrap_or((arg, ""));
    let mut slots = slots
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    KartArg {
        title: title.to_string(),
        config: KartConfig {
            left: slots.next(),
            right: slots.next(),
            front: slots.next(),
        },
    }
}

fn power_bar(power: u32, starting: u32) -> String {
    let width = 20;
    let filled = if starting == 0 {
        0
    } else {
        (power.min(starting) * width / starting) as usize
    };
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width as usize - filled))
}

fn print_usage() {
    println!("Usage: battle_preview --seed <seed> [--winner home|away]");
    println!("                      [--home <title>:<slot,...>] [--away <title>:<slot,...>]");
    println!("                      [--templates <path>] [--rules <path>] [--delay-ms <n>]");
    println!();
    println!("Example:");
    println!("  battle_preview --seed 1234 --winner away \\");
    println!("    --home \"A NEAR Kart Called Zippy:WeaponLaser,ShieldKevlar,WeaponEmpty\" \\");
    println!("    --away \"A NEAR Kart Called Dent:WeaponFlamethrower\"");
}
