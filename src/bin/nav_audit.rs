//! Navigation audit - cross-check graph reachability against A* search
//!
//! Builds the nav graph for every level in a level file and runs a search for
//! every ordered pair of walkable tiles, reporting pairs where the two disagree.
//!
//! Usage:
//!   cargo run --bin nav-audit
//!   cargo run --bin nav-audit -- --level StepUp --verbose
//!   cargo run --bin nav-audit -- --levels my_levels.txt --tuning config/nav_tuning.json
//!   cargo run --bin nav-audit -- --threads 4

use platform_nav::ai::Pathfinder;
use platform_nav::constants::LEVELS_FILE;
use platform_nav::levels::LevelDatabase;
use platform_nav::simulation::{AuditReport, audit_levels, init_parallel};
use platform_nav::tuning::{NAV_TUNING_FILE, NavConfig, PhysicsTweaks, apply_nav_tuning};

struct AuditArgs {
    levels_file: String,
    level: Option<String>,
    tuning_file: String,
    threads: usize,
    verbose: bool,
}

impl AuditArgs {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut parsed = Self {
            levels_file: LEVELS_FILE.to_string(),
            level: None,
            tuning_file: NAV_TUNING_FILE.to_string(),
            threads: 0,
            verbose: false,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--levels" if i + 1 < args.len() => {
                    parsed.levels_file = args[i + 1].clone();
                    i += 1;
                }
                "--level" if i + 1 < args.len() => {
                    parsed.level = Some(args[i + 1].clone());
                    i += 1;
                }
                "--tuning" if i + 1 < args.len() => {
                    parsed.tuning_file = args[i + 1].clone();
                    i += 1;
                }
                "--threads" if i + 1 < args.len() => {
                    parsed.threads = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
                "--verbose" | "-v" => parsed.verbose = true,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other => eprintln!("Ignoring unknown argument: {}", other),
            }
            i += 1;
        }
        parsed
    }
}

fn print_help() {
    println!("nav-audit: compare nav graph reachability with A* search");
    println!();
    println!("  --levels <file>   Level file (default {})", LEVELS_FILE);
    println!("  --level <name>    Audit a single level");
    println!("  --tuning <file>   Nav tuning JSON (default {})", NAV_TUNING_FILE);
    println!("  --threads <n>     Worker threads, 0 = auto");
    println!("  --verbose, -v     List every disagreement");
}

fn main() {
    let args = AuditArgs::from_args();

    if let Err(e) = init_parallel(args.threads) {
        eprintln!("Warning: {}", e);
    }

    let mut tweaks = PhysicsTweaks::default();
    let mut config = NavConfig::default();
    if let Err(e) = apply_nav_tuning(&args.tuning_file, &mut tweaks, &mut config) {
        eprintln!("Warning: {}, using defaults", e);
    }
    let pathfinder = Pathfinder::from_tuning(&config, &tweaks);

    let level_db = LevelDatabase::load_from_file(&args.levels_file);
    let levels: Vec<_> = level_db
        .levels
        .into_iter()
        .filter(|l| args.level.as_deref().is_none_or(|name| l.name.eq_ignore_ascii_case(name)))
        .collect();

    if levels.is_empty() {
        println!("No levels to audit in {}", args.levels_file);
        std::process::exit(1);
    }

    println!("Navigation Audit");
    println!("================\n");

    let reports = audit_levels(&levels, &pathfinder);
    for report in &reports {
        print_report(report, args.verbose);
    }
    // One-way drops are expected; anything else is a graph or search bug
    let dirty = reports
        .iter()
        .filter(|r| r.disagreements.len() > r.one_way_count())
        .count();
    let one_way: usize = reports.iter().map(|r| r.one_way_count()).sum();

    println!("\n================");
    if dirty == 0 {
        println!("All levels agree ({} one-way pairs)", one_way);
    } else {
        println!("{} level(s) with unexpected disagreements", dirty);
        std::process::exit(1);
    }
}

fn print_report(report: &AuditReport, verbose: bool) {
    let dots = ".".repeat(24 - report.level.len().min(23));
    let status = if report.is_clean() { "OK" } else { "MISMATCH" };
    println!(
        "  {} {} {} ({} tiles, {} components, {} pairs)",
        report.level,
        dots,
        status,
        report.walkable_tiles,
        report.components,
        report.pairs_checked
    );

    if report.is_clean() {
        return;
    }

    println!(
        "    {} disagreements, {} one-way",
        report.disagreements.len(),
        report.one_way_count()
    );
    let shown = if verbose { report.disagreements.len() } else { 5 };
    for d in report.disagreements.iter().take(shown) {
        println!(
            "    ({}, {}) -> ({}, {}): graph says {}, search {}",
            d.start.x,
            d.start.y,
            d.goal.x,
            d.goal.y,
            if d.graph_reachable { "reachable" } else { "unreachable" },
            if d.path_found { "found a path" } else { "found none" }
        );
    }
}
