//! # Command Line Interface

use clap::{Args, Parser, Subcommand};
use cover_engine::TierId;
use std::path::PathBuf;

/// Parametric rain cover for T20 match tickets
#[derive(Parser, Debug)]
#[command(name = "cover")]
#[command(about = "Match Day Cover - price, buy and settle rain cover for T20 tickets")]
#[command(version)]
pub struct Cli {
    /// Engine configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for stored preferences
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level filter, e.g. `debug` or `cover_engine=debug`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported stadiums
    Stadiums,

    /// List insurance tiers and what they pay
    Tiers {
        /// Ticket value used to show rupee amounts
        #[arg(long, default_value = "2500")]
        ticket: i64,
    },

    /// Quote every tier for a ticket
    Quote {
        #[command(flatten)]
        ticket: TicketArgs,

        /// Show the full premium breakdown
        #[arg(long)]
        breakdown: bool,
    },

    /// Suggest a tier and explain its value
    Recommend {
        #[command(flatten)]
        ticket: TicketArgs,

        /// Ticket plus travel and stay, defaults to the ticket value
        #[arg(long)]
        investment: Option<i64>,
    },

    /// Simulate matches at a rain risk and tally the outcomes
    Simulate {
        /// Rain risk, 0-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        rain_risk: u8,

        /// Number of matches
        #[arg(long, default_value = "1000")]
        runs: u32,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Also total the payouts for this tier
        #[arg(long)]
        tier: Option<TierId>,

        /// Ticket value for payout totals
        #[arg(long, default_value = "2500")]
        ticket: i64,
    },

    /// Buy cover, play the match, and settle
    Play {
        #[command(flatten)]
        ticket: TicketArgs,

        /// Tier to buy, defaults to the last tier bought or the recommendation
        #[arg(long)]
        tier: Option<TierId>,

        /// Ticket plus travel and stay, defaults to the ticket value
        #[arg(long)]
        investment: Option<i64>,

        /// Attend the rescheduled fixture if the match is washed out
        #[arg(long)]
        attends_rescheduled: bool,

        /// Seed for the match simulation
        #[arg(long)]
        seed: Option<u64>,

        /// Do not read or write stored preferences
        #[arg(long)]
        ephemeral: bool,
    },

    /// Show or clear stored preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum PrefsAction {
    /// Print stored preferences
    Show,
    /// Forget the wallet, achievements and last selections
    Clear,
}

/// Ticket and venue arguments shared by the pricing commands
#[derive(Args, Debug, Clone)]
pub struct TicketArgs {
    /// Stadium id (see `cover stadiums`), defaults to the last one used
    #[arg(short, long)]
    pub stadium: Option<String>,

    /// Ticket value in rupees
    #[arg(short, long, default_value = "2500")]
    pub ticket: i64,

    /// Travelling from another city
    #[arg(long)]
    pub outstation: bool,

    /// Use this rain risk instead of fetching the live forecast
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub rain_risk: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_play() {
        let cli = Cli::try_parse_from([
            "cover", "play", "--stadium", "kol", "--ticket", "12000", "--tier", "premium",
            "--rain-risk", "75", "--seed", "7", "--outstation",
        ])
        .unwrap();

        match cli.command {
            Commands::Play { ticket, tier, seed, .. } => {
                assert_eq!(ticket.stadium.as_deref(), Some("kol"));
                assert_eq!(ticket.ticket, 12000);
                assert!(ticket.outstation);
                assert_eq!(ticket.rain_risk, Some(75));
                assert_eq!(tier, Some(TierId::Premium));
                assert_eq!(seed, Some(7));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rain_risk_is_bounded() {
        assert!(Cli::try_parse_from(["cover", "simulate", "--rain-risk", "101"]).is_err());
    }

    #[test]
    fn test_unknown_tier_is_rejected() {
        assert!(Cli::try_parse_from(["cover", "play", "--tier", "platinum"]).is_err());
    }
}
