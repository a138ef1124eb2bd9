use std::{env, fs, path::PathBuf};

fn main() {
    // 1) Handle memory.x based on target
    let target = env::var("TARGET").unwrap();
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    if target.starts_with("thumbv8m") {
        // Pico 2 ARM: copy memory-pico2.x to OUT_DIR as memory.x
        copy_memory_x("memory-pico2.x", &out_dir);
    } else if target.starts_with("thumbv6m") {
        // Pico 1 / Pico 1W: copy memory-pico1.x to OUT_DIR as memory.x
        copy_memory_x("memory-pico1.x", &out_dir);
    }

    // 2) Load optional env files (still supported for convenience)
    let _ = dotenvy::from_filename(".env");
    load_home_env(".pico.env");
    load_home_env(".env");

    // 3) Provide fallbacks so the crate compiles without .env
    let wifi_ssid = env_or_default("WIFI_SSID", "");
    let wifi_pass = env_or_default("WIFI_PASS", "");
    let utc_offset = env_or_default("UTC_OFFSET_MINUTES", "0");
    let stopwatch_seconds = env_or_default("STOPWATCH_SECONDS", "300");
    let ntp_server = env_or_default("NTP_SERVER", "pool.ntp.org");

    // Warn only if Wi-Fi was explicitly enabled but credentials are missing.
    if env::var_os("CARGO_FEATURE_WIFI").is_some() {
        if wifi_ssid.is_empty() {
            println!(
                "cargo:warning=WIFI feature enabled but WIFI_SSID is not set; the device will run offline"
            );
        }
        if wifi_pass.is_empty() {
            println!(
                "cargo:warning=WIFI feature enabled but WIFI_PASS is not set; using empty string"
            );
        }
    }

    // 4) Expose as compile-time constants (parsed in src/config.rs)
    println!("cargo:rustc-env=WIFI_SSID={wifi_ssid}");
    println!("cargo:rustc-env=WIFI_PASS={wifi_pass}");
    println!("cargo:rustc-env=UTC_OFFSET_MINUTES={utc_offset}");
    println!("cargo:rustc-env=STOPWATCH_SECONDS={stopwatch_seconds}");
    println!("cargo:rustc-env=NTP_SERVER={ntp_server}");

    for key in [
        "WIFI_SSID",
        "WIFI_PASS",
        "UTC_OFFSET_MINUTES",
        "STOPWATCH_SECONDS",
        "NTP_SERVER",
    ] {
        println!("cargo:rerun-if-env-changed={key}");
    }
    println!("cargo:rerun-if-changed=.env");
}

fn copy_memory_x(file: &str, out_dir: &PathBuf) {
    let memory_x = fs::read_to_string(file).unwrap_or_else(|_| panic!("Failed to read {file}"));
    let dest = out_dir.join("memory.x");
    fs::write(&dest, memory_x).expect("Failed to write memory.x");
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed={file}");
}

fn load_home_env(file: &str) {
    let home = match env::var_os("USERPROFILE").or_else(|| env::var_os("HOME")) {
        Some(path) => PathBuf::from(path),
        None => return,
    };
    let path = home.join(file);
    let _ = dotenvy::from_path(&path);
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
