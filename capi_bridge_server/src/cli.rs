use std::{env, env::VarError};

/// The server has no real CLI. Any argument prints the help text and the current settings.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

/// Global variables that never hold secrets. Per-shop variables are not listed, since most of them are credentials.
pub const DISPLAY_ENVS: [&str; 15] = [
    "RUST_LOG",
    "BRIDGE_HOST",
    "BRIDGE_PORT",
    "BRIDGE_DATABASE_URL",
    "BRIDGE_SHOPS",
    "BRIDGE_USE_X_FORWARDED_FOR",
    "BRIDGE_USE_FORWARDED",
    "BRIDGE_USE_CF_CONNECTING_IP",
    "BRIDGE_POLL_INTERVAL",
    "BRIDGE_POLL_LOOKBACK",
    "BRIDGE_DISABLE_POLLING",
    "BRIDGE_DEDUP_TTL",
    "BRIDGE_RESERVATION_TTL",
    "BRIDGE_ATTRIBUTION_TTL",
    "BRIDGE_HTTP_TIMEOUT",
];

fn display_envs() {
    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
