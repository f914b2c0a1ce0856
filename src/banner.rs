//! Startup banner.
//!
//! Printed once before the API starts serving, with the address the
//! operator should open.

use console::style;
use std::net::SocketAddr;

const LOGO: &str = r#"
    ███╗   ██╗███████╗████████╗██╗    ██╗ █████╗ ██████╗ ██████╗ ███████╗███╗   ██╗
    ████╗  ██║██╔════╝╚══██╔══╝██║    ██║██╔══██╗██╔══██╗██╔══██╗██╔════╝████╗  ██║
    ██╔██╗ ██║█████╗     ██║   ██║ █╗ ██║███████║██████╔╝██║  ██║█████╗  ██╔██╗ ██║
    ██║╚██╗██║██╔══╝     ██║   ██║███╗██║██╔══██║██╔══██╗██║  ██║██╔══╝  ██║╚██╗██║
    ██║ ╚████║███████╗   ██║   ╚███╔███╔╝██║  ██║██║  ██║██████╔╝███████╗██║ ╚████║
    ╚═╝  ╚═══╝╚══════╝   ╚═╝    ╚══╝╚══╝ ╚═╝  ╚═╝╚═╝  ╚═╝╚═════╝ ╚══════╝╚═╝  ╚═══╝
"#;

/// Print the startup banner with the bound address.
pub fn print(addr: SocketAddr) {
    println!("{}", style(LOGO).cyan());
    println!(
        "    {} v{}",
        style(">> netwarden").dim(),
        env!("CARGO_PKG_VERSION")
    );
    println!("    {} {}", style(">> Status:").dim(), style("ONLINE").green());
    println!();
    println!(
        "    {} {}",
        style(">> Open:").bold(),
        style(format!("http://{addr}")).cyan()
    );
    println!("    {}", style(">> Press Ctrl+C to stop").dim());
    println!();
}
