//! Startup banner and URL display

use super::config::{QueryConfig, is_all_interfaces};
use super::constants::APP_NAME;

/// Label width for aligned output
const W: usize = 12;

/// Print the startup banner with endpoint URLs and query limits
pub fn print_banner(host: &str, port: u16, query: &QueryConfig) {
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api/v1/query/compile",
        "Compile:", display_host, port
    );
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api/v1/query/validate",
        "Validate:", display_host, port
    );
    println!(
        "  \x1b[90m➜  {:<W$} {} ({}), max page size {}, max columns {}\x1b[0m",
        "Store:", query.id_field, query.id_kind, query.max_page_size, query.max_columns
    );

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    }
    println!();
}
