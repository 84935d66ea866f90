//! Command handlers

use anyhow::{bail, Context, Result};
use colored::*;
use cover_engine::{
    find_stadium, find_tier, stadiums, tiers, EngineConfig, MatchDaySession, MatchSimulator,
    PayoutEngine, PremiumBreakdown, PricingEngine, PurchaseRequest, RandomSource,
    RecommendationAdvisor, SeededSource, SettlementContext, Stadium, ThreadRngSource, TierId,
};
use forecast_fetcher::retry::describe;
use forecast_fetcher::{FetcherConfig, ForecastFetcher, ForecastSnapshot, LatestSelection};
use preference_store::{FilePreferenceStore, PreferenceStore, Preferences, StoreConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use tracing::{debug, info};

use crate::cli::{Commands, PrefsAction, TicketArgs};
use crate::config::CliConfig;
use crate::display;

/// Engines and settings shared by every command
pub struct App {
    config: CliConfig,
    pricing: PricingEngine,
    simulator: MatchSimulator,
    advisor: RecommendationAdvisor,
    /// Shared across overlapping fetches so only the newest stadium lookup lands
    selection: LatestSelection,
    json: bool,
}

/// Rain risk for a stadium and, when fetched, the forecast behind it
struct RiskReading {
    rain_risk: u8,
    forecast: Option<ForecastSnapshot>,
}

#[derive(Serialize)]
struct QuoteOutput<'a> {
    stadium: &'a Stadium,
    rain_risk: u8,
    quotes: &'a [PremiumBreakdown],
}

#[derive(Serialize)]
struct SimulationOutput {
    runs: u32,
    rain_risk: u8,
    outcomes: BTreeMap<String, u32>,
    total_payout: Option<i64>,
}

impl App {
    pub fn new(config: CliConfig, engine: EngineConfig, json: bool) -> Self {
        let pricing = PricingEngine::new(engine.pricing);
        Self {
            config,
            simulator: MatchSimulator::new(engine.simulator),
            advisor: RecommendationAdvisor::new(engine.advisor, pricing.clone()),
            pricing,
            selection: LatestSelection::new(),
            json,
        }
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Stadiums => self.stadiums(),
            Commands::Tiers { ticket } => self.tiers(ticket),
            Commands::Quote { ticket, breakdown } => self.quote(&ticket, breakdown).await,
            Commands::Recommend { ticket, investment } => self.recommend(&ticket, investment).await,
            Commands::Simulate { rain_risk, runs, seed, tier, ticket } => {
                self.simulate(rain_risk, runs, seed, tier, ticket)
            }
            Commands::Play { ticket, tier, investment, attends_rescheduled, seed, ephemeral } => {
                self.play(&ticket, tier, investment, attends_rescheduled, seed, ephemeral).await
            }
            Commands::Prefs { action } => self.prefs(action).await,
        }
    }

    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    async fn open_preferences(&self) -> Result<Preferences<FilePreferenceStore>> {
        let store = FilePreferenceStore::with_config(&StoreConfig::new(&self.config.data_dir))
            .await
            .context("Failed to open preference store")?;
        Ok(Preferences::new(store))
    }

    async fn resolve_stadium(
        &self,
        requested: Option<&str>,
        prefs: Option<&Preferences<FilePreferenceStore>>,
    ) -> Result<&'static Stadium> {
        let stored = match (requested, prefs) {
            (None, Some(prefs)) => prefs.last_stadium().await?,
            _ => None,
        };
        let id = requested
            .map(str::to_string)
            .or(stored)
            .unwrap_or_else(|| self.config.default_stadium.clone());
        Ok(find_stadium(&id)?)
    }

    async fn rain_risk(&self, stadium: &Stadium, manual: Option<u8>) -> Result<RiskReading> {
        if let Some(rain_risk) = manual {
            debug!("Using manual rain risk {} for {}", rain_risk, stadium.id);
            return Ok(RiskReading { rain_risk, forecast: None });
        }

        let fetcher = ForecastFetcher::new(FetcherConfig::from_env())?;
        let snapshot = self.latest(fetcher.fetch_with_retry(stadium)).await?;

        Ok(RiskReading { rain_risk: snapshot.rain_risk(), forecast: Some(snapshot) })
    }

    /// Await a fetch started for the current selection, failing if a newer one began meanwhile
    async fn latest<T>(
        &self,
        fetch: impl Future<Output = forecast_fetcher::Result<T>>,
    ) -> Result<T> {
        let ticket = self.selection.begin();
        let value = match fetch.await {
            Ok(value) => value,
            Err(e) => bail!(describe(&e)),
        };
        match ticket.accept(value) {
            Some(value) => Ok(value),
            None => bail!("Stadium selection changed while the forecast was loading"),
        }
    }

    fn show_risk(&self, stadium: &Stadium, reading: &RiskReading) {
        if self.json {
            return;
        }
        if let Some(forecast) = &reading.forecast {
            display::forecast_summary(stadium, forecast);
        }
        display::risk_line(stadium, reading.rain_risk, reading.forecast.is_some());
    }

    fn stadiums(&self) -> Result<()> {
        if self.json {
            return self.print_json(&stadiums());
        }
        display::stadium_table(stadiums());
        Ok(())
    }

    fn tiers(&self, ticket_value: i64) -> Result<()> {
        if self.json {
            return self.print_json(&tiers());
        }
        display::header("Insurance tiers");
        let context = SettlementContext { is_outstation: true, attends_rescheduled: true };
        for tier in tiers() {
            let payouts = PayoutEngine::scenario_payouts(tier, ticket_value, &context);
            display::tier_card(tier, &payouts, ticket_value);
        }
        Ok(())
    }

    async fn quote(&self, args: &TicketArgs, show_breakdown: bool) -> Result<()> {
        let prefs = self.open_preferences().await.ok();
        let stadium = self.resolve_stadium(args.stadium.as_deref(), prefs.as_ref()).await?;
        let reading = self.rain_risk(stadium, args.rain_risk).await?;
        self.show_risk(stadium, &reading);

        let factors = self.pricing.factors_for(stadium, reading.rain_risk);
        let quotes: Vec<PremiumBreakdown> = TierId::ALL
            .iter()
            .map(|tier| self.pricing.quote(*tier, args.ticket, &factors, args.outstation))
            .collect();

        if self.json {
            return self.print_json(&QuoteOutput { stadium, rain_risk: reading.rain_risk, quotes: &quotes });
        }

        display::quote_table(&quotes, args.ticket);
        if show_breakdown {
            for quote in &quotes {
                display::breakdown(quote);
            }
        }
        Ok(())
    }

    async fn recommend(&self, args: &TicketArgs, investment: Option<i64>) -> Result<()> {
        let prefs = self.open_preferences().await.ok();
        let stadium = self.resolve_stadium(args.stadium.as_deref(), prefs.as_ref()).await?;
        let reading = self.rain_risk(stadium, args.rain_risk).await?;
        self.show_risk(stadium, &reading);

        let tier = self.advisor.recommend(args.ticket, reading.rain_risk, args.outstation);
        let factors = self.pricing.factors_for(stadium, reading.rain_risk);
        let premium = self.pricing.price(tier, args.ticket, &factors, args.outstation);
        let investment = investment.unwrap_or(args.ticket);

        let value = self.advisor.value_proposition(premium, args.ticket, investment, reading.rain_risk);
        let expected = self.advisor.expected_value(premium, args.ticket, reading.rain_risk);

        if self.json {
            return self.print_json(&serde_json::json!({
                "tier": tier,
                "premium": premium,
                "value_proposition": value,
                "expected_value": expected,
            }));
        }

        display::recommendation(tier, &value, &expected);
        println!("Premium for {}: {}", tier.as_str(), display::rupees(premium).bold());
        Ok(())
    }

    fn simulate(
        &self,
        rain_risk: u8,
        runs: u32,
        seed: Option<u64>,
        tier: Option<TierId>,
        ticket_value: i64,
    ) -> Result<()> {
        let mut rng = random_source(seed);
        let mut outcomes: BTreeMap<String, u32> = BTreeMap::new();
        let mut total_payout = 0i64;

        for _ in 0..runs {
            let status = self.simulator.simulate(rain_risk, rng.as_mut());
            let classification = PayoutEngine::classify(&status);
            let label = if classification.abandoned {
                "abandoned".to_string()
            } else {
                classification.payout_tier.to_string()
            };
            *outcomes.entry(label).or_default() += 1;

            if let Some(tier) = tier {
                total_payout +=
                    PayoutEngine::settle(find_tier(tier), ticket_value, classification.scenario());
            }
        }

        let output = SimulationOutput {
            runs,
            rain_risk,
            outcomes,
            total_payout: tier.map(|_| total_payout),
        };
        if self.json {
            return self.print_json(&output);
        }

        display::header(&format!("{} simulated matches at {}% rain risk", runs, rain_risk));
        for (label, count) in &output.outcomes {
            let share = *count as f64 / runs.max(1) as f64 * 100.0;
            println!("  {:<12} {:>6}  {:>5.1}%", label, count, share);
        }
        if let (Some(tier), Some(total)) = (tier, output.total_payout) {
            let per_match = if runs > 0 { total / runs as i64 } else { 0 };
            println!(
                "  {} cover on a {} ticket paid {} in total, {} per match",
                tier.as_str(),
                display::rupees(ticket_value),
                display::rupees(total),
                display::rupees(per_match)
            );
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn play(
        &self,
        args: &TicketArgs,
        tier: Option<TierId>,
        investment: Option<i64>,
        attends_rescheduled: bool,
        seed: Option<u64>,
        ephemeral: bool,
    ) -> Result<()> {
        let prefs = if ephemeral { None } else { Some(self.open_preferences().await?) };

        let mut session = match &prefs {
            Some(prefs) => MatchDaySession::restore(
                prefs.wallet(self.config.starting_wallet).await?,
                prefs.achievements().await?,
            ),
            None => MatchDaySession::new(self.config.starting_wallet),
        };

        let stadium = self.resolve_stadium(args.stadium.as_deref(), prefs.as_ref()).await?;
        let reading = self.rain_risk(stadium, args.rain_risk).await?;
        self.show_risk(stadium, &reading);

        let stored_tier = match (&prefs, tier) {
            (Some(prefs), None) => prefs.last_tier().await?,
            _ => None,
        };
        let tier = tier
            .or(stored_tier)
            .unwrap_or_else(|| self.advisor.recommend(args.ticket, reading.rain_risk, args.outstation));

        let factors = self.pricing.factors_for(stadium, reading.rain_risk);
        let premium = self.pricing.price(tier, args.ticket, &factors, args.outstation);
        let investment = investment.unwrap_or(args.ticket);

        if !session.can_afford(premium) {
            bail!(
                "Insufficient funds: {} cover costs {}, wallet holds {}",
                tier,
                display::rupees(premium),
                display::rupees(session.wallet())
            );
        }

        let (_, unlocked) = session.purchase(PurchaseRequest {
            tier,
            ticket_value: args.ticket,
            premium,
            stadium: stadium.clone(),
            rain_risk: reading.rain_risk,
            is_outstation: args.outstation,
            total_investment: investment,
        })?;

        let mut all_unlocked = unlocked;
        let (result, unlocked) =
            session.settle(&self.simulator, random_source(seed).as_mut(), attends_rescheduled)?;
        all_unlocked.extend(unlocked);

        if let Some(prefs) = &prefs {
            let achievements: Vec<_> = session.achievements().collect();
            prefs.set_wallet(session.wallet()).await?;
            prefs.set_achievements(&achievements).await?;
            prefs.set_last_stadium(&stadium.id).await?;
            prefs.set_last_tier(tier).await?;
        }

        info!("Play finished at {} with wallet {}", stadium.id, session.wallet());

        if self.json {
            return self.print_json(&serde_json::json!({
                "stadium": stadium.id,
                "tier": tier,
                "rain_risk": reading.rain_risk,
                "premium": premium,
                "settlement": result,
                "wallet": session.wallet(),
                "profit_loss": session.profit_loss(),
                "unlocked": all_unlocked,
            }));
        }

        println!(
            "Bought {} cover for {} on a {} ticket",
            tier.as_str().bold(),
            display::rupees(premium),
            display::rupees(args.ticket)
        );
        display::settlement(&result, premium);
        display::achievements_unlocked(&all_unlocked);
        println!("Wallet: {}", display::rupees(session.wallet()).bold());
        Ok(())
    }

    async fn prefs(&self, action: PrefsAction) -> Result<()> {
        let prefs = self.open_preferences().await?;
        match action {
            PrefsAction::Show => {
                let entries = prefs.store().entries().await?;
                if self.json {
                    let map: BTreeMap<_, _> = entries.into_iter().collect();
                    return self.print_json(&map);
                }
                display::header("Preferences");
                if entries.is_empty() {
                    println!("{}", "No stored preferences".dimmed());
                }
                for (key, value) in entries {
                    println!("  {:<14} {}", key, value);
                }
            }
            PrefsAction::Clear => {
                for (key, _) in prefs.store().entries().await? {
                    prefs.store().remove(&key).await?;
                }
                println!("{}", "Preferences cleared".green());
            }
        }
        Ok(())
    }
}

fn random_source(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(SeededSource::new(seed)),
        None => Box::new(ThreadRngSource),
    }
}
