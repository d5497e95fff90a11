//! Console output utilities.

use console::style;

use crate::session::OutgoingMessage;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print a chat message sent by the bot.
pub fn print_chat(message: &OutgoingMessage) {
    let target = match message {
        OutgoingMessage::Private { to, .. } => format!("@user {}", to),
        OutgoingMessage::Channel { channel, .. } => format!("#channel {}", channel),
    };
    println!(
        "{} {} {}",
        style("BOT").magenta().bold(),
        style(target).dim(),
        message.text()
    );
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     TT Downloader Bot                                 ║
║     Channel file downloads on request                 ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(server: &str, base_channel: &str, channel_mode: &str, output_dir: &str) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Server: {}", server);
    println!("  Base channel: {}", base_channel);
    println!("  Mode: {}", channel_mode);
    println!("  Directory: {}", output_dir);
    println!();
}
