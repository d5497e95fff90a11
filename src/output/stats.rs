//! Statistics reporting.

use chrono::Utc;
use console::style;

use crate::bot::CampaignStats;

/// Print statistics for a finished campaign.
pub fn print_campaign_stats(stats: &CampaignStats) {
    let elapsed = Utc::now().signed_duration_since(stats.started_at);

    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Campaign Statistics:").bold());
    println!(
        "  Started:  {}",
        stats.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Duration: {}s", elapsed.num_seconds().max(0));
    println!("  Channels queued:     {}", stats.channels_queued);
    println!("  Channels downloaded: {}", stats.channels_downloaded);
    println!("  Channels empty:      {}", stats.channels_empty);
    if stats.channels_skipped > 0 {
        println!(
            "  Channels skipped:    {}",
            style(stats.channels_skipped).yellow()
        );
    }
    if stats.channels_failed > 0 {
        println!(
            "  Channels failed:     {}",
            style(stats.channels_failed).red()
        );
    }
    println!("  Files finished: {}", style(stats.files_finished).green());
    if stats.files_failed > 0 {
        println!("  Files failed:   {}", style(stats.files_failed).red());
    }
    if stats.files_closed > 0 {
        println!(
            "  Files closed:   {} ({} stalled)",
            style(stats.files_closed).yellow(),
            stats.files_stalled
        );
    }
    if stats.failed_starts > 0 {
        println!("  Not started:    {}", style(stats.failed_starts).red());
    }
    println!("{}", style("═".repeat(50)).dim());
}
