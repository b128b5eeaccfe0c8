//! Startup banner and URL display
//!
//! Printed to stderr so it never mixes with MCP traffic.

use super::config::is_all_interfaces;
use super::constants::{APP_NAME, HEALTH_PATH, MCP_PATH};
use crate::utils::string::sanitize_url;
use crate::utils::terminal::terminal_link;

/// Print the startup banner for the HTTP transport
pub fn print_banner(host: &str, port: u16, tempo_url: &str, tempo_auth: &str) {
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    eprintln!();
    eprintln!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();

    // Label width: "Network MCP:" is 12 chars, pad to 14 for alignment
    const W: usize = 14;

    let mcp_url = format!("http://{}:{}{}", display_host, port, MCP_PATH);
    eprintln!(
        "  \x1b[35m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "MCP:",
        terminal_link(&mcp_url)
    );
    eprintln!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}{}",
        "Health:", display_host, port, HEALTH_PATH
    );

    // Show network info based on bind address
    if host == "127.0.0.1" || host == "localhost" {
        eprintln!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    } else if is_all_interfaces(host) {
        // Enumerate LAN IPs when binding to all interfaces
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                let network_url = format!("http://{}:{}{}", ip, port, MCP_PATH);
                eprintln!(
                    "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
                    "Network MCP:",
                    terminal_link(&network_url)
                );
            }
        }
    } else {
        let network_url = format!("http://{}:{}{}", host, port, MCP_PATH);
        eprintln!(
            "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
            "Network MCP:",
            terminal_link(&network_url)
        );
    }

    eprintln!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {} \x1b[90m(auth: {})\x1b[0m",
        "Tempo:",
        sanitize_url(tempo_url),
        tempo_auth
    );

    eprintln!();
}
