use clap::Parser;

// ///////////// //
// CLI interface //
// ///////////// //

/// cups-keepalive - Prints a maintenance test page when a CUPS printer has been idle for too long, to keep inkjet nozzles from drying out.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print the test page regardless of the print history.
    #[arg(long)]
    pub force: bool,

    /// CUPS printer name (auto-detects the default destination if omitted).
    #[arg(long)]
    pub printer: Option<String>,

    /// Days without printing before a test page is due.
    #[arg(long)]
    pub days: Option<u32>,

    /// Only report whether a test page is due.
    #[arg(long)]
    pub dry_run: bool,

    /// Log subprocess calls and skipped log lines.
    #[arg(short, long)]
    pub verbose: bool,
}
