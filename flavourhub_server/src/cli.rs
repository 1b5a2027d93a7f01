use std::{env, env::VarError};

const README: &str = include_str!("./cli-help.txt");

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "FH_HOST",
        "FH_PORT",
        "FH_PAYSTACK_PUBLIC_KEY",
        "FH_PAYSTACK_BASE_URL",
        "FH_PAYSTACK_TIMEOUT",
        "FH_MINIMUM_AMOUNT",
        "FH_DEFAULT_CURRENCY",
        "FH_REFERENCE_PREFIX",
        "FH_ACCEPT_CLIENT_REPORTED_PAYMENTS",
        "FH_USE_X_FORWARDED_FOR",
        "FH_USE_FORWARDED",
    ];

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
