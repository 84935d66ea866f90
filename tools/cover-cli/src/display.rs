//! Terminal rendering

use colored::*;
use cover_engine::advisor::format_inr;
use cover_engine::pricing::PremiumBound;
use cover_engine::{
    Achievement, ExpectedValue, InsuranceTier, MatchSuitability, PremiumBreakdown, Recommendation,
    ScenarioTag, SettlementResult, Stadium, TierId, ValueProposition,
};
use forecast_fetcher::ForecastSnapshot;

pub fn header(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
    println!("{}", "=".repeat(title.chars().count()));
}

pub fn rupees(amount: i64) -> String {
    format_inr(amount as f64)
}

fn suitability(value: MatchSuitability) -> ColoredString {
    match value {
        MatchSuitability::Excellent => value.label().green().bold(),
        MatchSuitability::Good => value.label().green(),
        MatchSuitability::Risky => value.label().yellow().bold(),
        MatchSuitability::Poor => value.label().red().bold(),
    }
}

pub fn stadium_table(stadiums: &[Stadium]) {
    header("Stadiums");
    println!(
        "{:<5} {:<36} {:<11} {:>9} {:<10} {:>7}",
        "ID", "Name", "City", "Capacity", "Drainage", "Covered"
    );
    for s in stadiums {
        println!(
            "{:<5} {:<36} {:<11} {:>9} {:<10} {:>6}%",
            s.id.bold(),
            s.name,
            s.city,
            s.capacity,
            s.drainage.as_str(),
            s.covered_percent
        );
    }
}

pub fn tier_card(tier: &InsuranceTier, payouts: &[(ScenarioTag, i64)], ticket_value: i64) {
    let title = if tier.recommended {
        format!("{} ({})", tier.name, "recommended".green())
    } else {
        tier.name.clone()
    };
    println!();
    println!("{}  {}", title.bold(), tier.tagline.dimmed());
    for feature in &tier.features {
        println!("  • {}", feature);
    }
    println!("  Payout on a {} ticket:", rupees(ticket_value));
    for (scenario, payout) in payouts {
        println!("    {:<12} {:>14}", scenario.as_str(), rupees(*payout));
    }
}

pub fn forecast_summary(stadium: &Stadium, snapshot: &ForecastSnapshot) {
    header(&format!("Forecast for {}", stadium.name));
    let current = &snapshot.current;
    println!(
        "Now: {:.0}°C, humidity {:.0}%, wind {:.0} km/h, pressure {:.0} hPa",
        current.temperature, current.humidity, current.wind_speed, current.pressure
    );
    for hour in &snapshot.hourly {
        let time = hour.time.split('T').nth(1).unwrap_or(&hour.time);
        println!(
            "  {}  {:>4.0}°C  rain {:>3.0}%  {:>4.1} mm",
            time, hour.temperature, hour.precipitation_probability, hour.precipitation
        );
    }
}

pub fn risk_line(stadium: &Stadium, rain_risk: u8, live: bool) {
    let source = if live { "live forecast" } else { "manual" };
    println!(
        "{} rain risk at {}: {}% ({}, {})",
        "☔".normal(),
        stadium.name.bold(),
        rain_risk.to_string().bold(),
        suitability(MatchSuitability::from_rain_risk(rain_risk)),
        source.dimmed()
    );
}

pub fn quote_table(quotes: &[PremiumBreakdown], ticket_value: i64) {
    header(&format!("Premiums for a {} ticket", rupees(ticket_value)));
    for quote in quotes {
        let bound = match quote.bound {
            PremiumBound::Unbounded => "".normal(),
            PremiumBound::Floor => "(minimum)".dimmed(),
            PremiumBound::Ceiling => "(capped)".dimmed(),
        };
        println!("  {:<10} {:>12} {}", quote.tier.as_str(), rupees(quote.total_premium).bold(), bound);
    }
}

pub fn breakdown(quote: &PremiumBreakdown) {
    println!();
    println!("{} {}", "Breakdown:".bold(), quote.tier);
    println!("  priced ticket value   {}", rupees(quote.priced_ticket_value));
    println!("  base expected loss    {:.2}", quote.base_expected_loss);
    println!("  venue multiplier      {:.2}", quote.venue_multiplier);
    println!("  drainage factor       {:.2}", quote.drainage_factor);
    println!("  coverage discount     {:.3}", quote.coverage_discount);
    println!("  add-on loss           {:.2}", quote.add_on_loss);
    println!("  expected loss         {:.2}", quote.expected_loss);
    println!("  loaded loss           {:.2}", quote.loaded_loss);
    println!("  admin cost            {:.2}", quote.admin_cost);
    println!("  raw premium           {:.2}", quote.raw_premium);
    println!("  floor / ceiling       {:.2} / {:.2}", quote.floor, quote.ceiling);
    if let Some(discount) = quote.group_discount {
        println!("  group discount        {:.0}%", discount * 100.0);
    }
    println!("  premium               {}", rupees(quote.total_premium));
}

pub fn recommendation(tier: TierId, value: &ValueProposition, expected: &ExpectedValue) {
    header("Recommendation");
    let verdict = match value.recommendation {
        Recommendation::StronglyRecommended => "Strongly recommended".green().bold(),
        Recommendation::Recommended => "Recommended".green(),
        Recommendation::Optional => "Optional".yellow(),
        Recommendation::NotRecommended => "Not recommended".red(),
    };
    println!("Suggested tier: {}", tier.as_str().bold());
    println!("Insurance is {}: {}", verdict, value.reasoning);
    println!("  protection ratio   {:.1}%", value.protection_ratio);
    println!("  expected ROI       {:.1}%", value.expected_roi);
    println!("  break-even risk    {:.1}%", value.break_even_risk);
    println!(
        "  expected payout    {} ({})",
        format_inr(expected.expected_payout),
        expected.confidence.dimmed()
    );
}

pub fn settlement(result: &SettlementResult, premium: i64) {
    header("Match result");
    let c = &result.classification;
    if result.abandoned {
        println!("{}", "Match abandoned".red().bold());
    } else if result.dls_applied {
        println!(
            "{} {} overs played, {:.0}% lost",
            "DLS applied:".yellow().bold(),
            result.overs_played,
            c.overs_lost_percentage
        );
    } else {
        println!("{}", "Full match played".green().bold());
    }
    println!("{}", c.description);

    let net = result.payout - premium;
    let net_text = if net >= 0 {
        format!("+{}", rupees(net)).green().bold()
    } else {
        format!("-{}", rupees(-net)).red()
    };
    println!("Payout: {}  (net {})", rupees(result.payout).bold(), net_text);
}

pub fn achievements_unlocked(unlocked: &[Achievement]) {
    for achievement in unlocked {
        println!("{} {}", "🏆 Achievement unlocked:".magenta().bold(), achievement.title());
    }
}
