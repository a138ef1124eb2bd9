//! Build automation tasks for the shift-countdown project.
//!
//! Run with: `cargo xtask <command>`

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::process::{Command, ExitCode};

/// Firmware applications in `demos/`; all of them need Wi-Fi.
const DEMOS: [&str; 2] = ["countdown", "stopwatch"];

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for shift-countdown", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: build lib and demos for both boards, run host tests, generate docs
    CheckAll,
    /// Build library with specified features
    Build {
        #[arg(long, default_value = "pico1")]
        board: Board,
        #[arg(long)]
        wifi: bool,
    },
    /// Build a demo (countdown or stopwatch)
    Demo {
        name: String,
        #[arg(long, default_value = "pico1")]
        board: Board,
    },
    /// Build UF2 firmware file for flashing to Pico
    Uf2 {
        name: String,
        #[arg(long, default_value = "pico1")]
        board: Board,
    },
    /// Run host tests (no board features)
    Test,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Board {
    Pico1,
    Pico2,
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Board::Pico1 => write!(f, "pico1"),
            Board::Pico2 => write!(f, "pico2"),
        }
    }
}

impl Board {
    fn target(self) -> &'static str {
        match self {
            Board::Pico1 => "thumbv6m-none-eabi",
            Board::Pico2 => "thumbv8m.main-none-eabihf",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckAll => check_all(),
        Commands::Build { board, wifi } => status(build_lib(board, wifi)),
        Commands::Demo { name, board } => status(build_demo(&name, board, false)),
        Commands::Uf2 { name, board } => status(build_uf2(&name, board)),
        Commands::Test => status(run_host_tests()),
    }
}

fn check_all() -> ExitCode {
    for board in [Board::Pico1, Board::Pico2] {
        println!("{}", format!("==> Building library ({board})...").cyan());
        if !build_lib(board, false) || !build_lib(board, true) {
            return ExitCode::FAILURE;
        }

        println!("\n{}", format!("==> Building demos ({board}, wifi)...").cyan());
        for demo in DEMOS {
            println!("  {}", format!("- {demo}").bright_black());
            if !build_demo(demo, board, false) {
                return ExitCode::FAILURE;
            }
        }
    }

    println!("\n{}", "==> Running host tests...".cyan());
    if !run_host_tests() {
        return ExitCode::FAILURE;
    }

    println!("\n{}", "==> Building documentation...".cyan());
    let board = Board::Pico2;
    if !run_command(Command::new("cargo").current_dir(workspace_root()).args([
        "doc",
        "--target",
        board.target(),
        "--no-deps",
        "--features",
        &build_features(board, true),
    ])) {
        return ExitCode::FAILURE;
    }

    println!("\n{}", "==> All checks passed!".green().bold());
    ExitCode::SUCCESS
}

fn run_host_tests() -> bool {
    let mut test_cmd = Command::new("cargo");
    test_cmd
        .current_dir(workspace_root())
        .args(["test", "--package", "shift-countdown"]);

    match host_target() {
        Some(target) => {
            println!("  {}", format!("Using host target: {target}").bright_black());
            test_cmd.arg("--target").arg(target);
        }
        None => {
            println!(
                "{}",
                "  Unable to detect host target; relying on cargo default.".bright_black()
            );
        }
    }

    run_command(&mut test_cmd)
}

fn build_lib(board: Board, wifi: bool) -> bool {
    let features = build_features(board, wifi);
    println!("{}", format!("Building library with features: {features}").cyan());

    run_command(Command::new("cargo").current_dir(workspace_root()).args([
        "build",
        "--lib",
        "--target",
        board.target(),
        "--features",
        &features,
    ]))
}

fn build_demo(name: &str, board: Board, release: bool) -> bool {
    let features = build_features(board, true);
    println!(
        "{}",
        format!("Building demo '{name}' with features: {features}").cyan()
    );

    let mut cmd = Command::new("cargo");
    cmd.current_dir(workspace_root()).args([
        "build",
        "--example",
        name,
        "--target",
        board.target(),
        "--features",
        &features,
    ]);
    if release {
        cmd.arg("--release");
    }
    run_command(&mut cmd)
}

fn build_uf2(name: &str, board: Board) -> bool {
    let target = board.target();
    println!("{}", format!("Building UF2 for demo '{name}' ({board})").cyan());
    println!("  Target: {}", target.bright_black());

    if !build_demo(name, board, true) {
        return false;
    }

    let elf_path = format!("target/{target}/release/examples/{name}");
    let uf2_path = format!("{name}.uf2");

    println!("\n{}", "Converting to UF2 format...".cyan());

    if run_command(
        Command::new("elf2uf2-rs")
            .current_dir(workspace_root())
            .args([&elf_path, &uf2_path]),
    ) {
        println!("{}", format!("UF2 created: {uf2_path}").green().bold());
        println!("{}", "Ready to drag-and-drop to your Pico!".bright_black());
        true
    } else {
        println!(
            "{}",
            "Note: Install elf2uf2-rs with: cargo install elf2uf2-rs".yellow()
        );
        false
    }
}

fn build_features(board: Board, wifi: bool) -> String {
    let mut features = vec![board.to_string(), "arm".to_string()];
    if wifi {
        features.push("wifi".to_string());
    }
    features.join(",")
}

fn status(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn workspace_root() -> std::path::PathBuf {
    std::env::current_dir().expect("Failed to get current directory")
}

fn host_target() -> Option<String> {
    let output = Command::new("rustc").arg("-vV").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if let Some(host) = line.strip_prefix("host: ") {
            return Some(host.trim().to_string());
        }
    }
    None
}

fn run_command(cmd: &mut Command) -> bool {
    match cmd.status() {
        Ok(status) => status.success(),
        Err(e) => {
            eprintln!("{}", format!("Failed to execute command: {e}").red());
            false
        }
    }
}
