//! Scenario runner CLI - reachability, search and path execution checks
//!
//! Usage:
//!   cargo run --bin test-scenarios                     # Run every scenario
//!   cargo run --bin test-scenarios -- ledge            # Names containing "ledge"
//!   cargo run --bin test-scenarios -- --dir my/scenarios
//!   cargo run --bin test-scenarios -- --list           # Show scenarios, run nothing
//!   cargo run --bin test-scenarios -- --verbose        # Expected/actual on failure

use std::fs;
use std::path::{Path, PathBuf};

use platform_nav::testing::{SCENARIOS_DIR, TestResult, parser::parse_test_file, runner::run_test};

struct RunnerArgs {
    dir: String,
    filter: Option<String>,
    list_only: bool,
    verbose: bool,
}

impl RunnerArgs {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut parsed = Self {
            dir: SCENARIOS_DIR.to_string(),
            filter: None,
            list_only: false,
            verbose: false,
        };

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--verbose" | "-v" => parsed.verbose = true,
                "--list" => parsed.list_only = true,
                "--dir" => {
                    if let Some(dir) = iter.next() {
                        parsed.dir = dir;
                    }
                }
                other if !other.starts_with('-') => parsed.filter = Some(other.to_string()),
                other => eprintln!("Ignoring unknown flag: {}", other),
            }
        }
        parsed
    }
}

#[derive(Default)]
struct Tally {
    passed: usize,
    failed: usize,
    errors: usize,
    frames: u64,
}

impl Tally {
    fn record(&mut self, result: &TestResult) {
        match result {
            TestResult::Pass { frames } => {
                self.passed += 1;
                self.frames += frames;
            }
            TestResult::Fail { .. } => self.failed += 1,
            TestResult::Error { .. } => self.errors += 1,
        }
    }

    fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

fn main() {
    let args = RunnerArgs::from_args();
    let base = Path::new(&args.dir);

    if !base.is_dir() {
        println!("No scenarios directory at {}", args.dir);
        std::process::exit(1);
    }

    let scenarios = collect_scenarios(base, args.filter.as_deref());
    if scenarios.is_empty() {
        match &args.filter {
            Some(f) => println!("No scenarios match '{}'", f),
            None => println!("No scenario files in {}", args.dir),
        }
        std::process::exit(1);
    }

    if args.list_only {
        for path in &scenarios {
            println!("{}", scenario_label(base, path));
        }
        return;
    }

    println!("Navigation Scenarios");
    println!("====================\n");

    let mut tally = Tally::default();
    for path in &scenarios {
        let label = scenario_label(base, path);
        let (result, description) = match parse_test_file(path) {
            Ok(def) => (run_test(&def), def.description),
            Err(message) => (TestResult::Error { message }, None),
        };
        tally.record(&result);
        report(&label, &result, description.as_deref(), args.verbose);
    }

    println!("\n====================");
    println!(
        "{} passed, {} failed, {} errors ({} frames simulated)",
        tally.passed, tally.failed, tally.errors, tally.frames
    );

    if !tally.all_passed() {
        std::process::exit(1);
    }
}

/// Every `.toml` under `base`, sorted, optionally narrowed by a substring of
/// the relative path
fn collect_scenarios(base: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![base.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for path in entries.flatten().map(|e| e.path()) {
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|e| e == "toml")
                && filter.is_none_or(|f| scenario_label(base, &path).contains(f))
            {
                found.push(path);
            }
        }
    }

    found.sort();
    found
}

fn scenario_label(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .with_extension("")
        .to_string_lossy()
        .to_string()
}

fn report(label: &str, result: &TestResult, description: Option<&str>, verbose: bool) {
    let pad = ".".repeat(36usize.saturating_sub(label.len()).max(1));
    match result {
        TestResult::Pass { frames } if *frames > 0 => {
            println!("  {} {} PASS ({} frames)", label, pad, frames)
        }
        TestResult::Pass { .. } => println!("  {} {} PASS", label, pad),
        TestResult::Fail { error } => {
            println!("  {} {} FAIL", label, pad);
            if verbose {
                if let Some(description) = description {
                    println!("    ({})", description);
                }
                println!("    {}", error);
            } else {
                println!("    {}", error.message);
            }
        }
        TestResult::Error { message } => {
            println!("  {} {} ERROR", label, pad);
            println!("    {}", message);
        }
    }
}
