//! Calculate command - full IHT calculation for an estate

use crate::cmd::{format_gbp, format_rate, read_estate_input};
use crate::config::TaxYear;
use crate::report::{CalculationOutcome, CalculationResult, ChargeableGiftSummary, GiftTaxPayer};
use crate::tax::calculate_iht;
use clap::Args;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// JSON file containing the estate (or stdin with "-")
    #[arg(short, long)]
    estate: PathBuf,

    /// Tax year override, e.g. "2024-25" (defaults to the date of death)
    #[arg(short, long)]
    year: Option<String>,

    /// Output the full calculation as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Output the gift analysis as CSV
    #[arg(long)]
    csv: bool,
}

impl CalculateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let input = read_estate_input(&self.estate)?;

        // CLI flag wins, then the file's own tax_year, then date of death
        let year = match self.year.as_deref().or(input.tax_year.as_deref()) {
            Some(s) => Some(s.parse::<TaxYear>()?),
            None => None,
        };

        let outcome = calculate_iht(&input.estate, year)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            return Ok(());
        }

        match &outcome {
            CalculationOutcome::Failure { errors } => {
                eprintln!("Estate input failed validation:");
                for error in errors {
                    eprintln!("  {} [{}]: {}", error.field, error.code, error.message);
                }
                anyhow::bail!("{} validation error(s)", errors.len());
            }
            CalculationOutcome::Success(result) => {
                if self.csv {
                    self.write_gift_csv(result)
                } else {
                    self.print_summary(result);
                    Ok(())
                }
            }
        }
    }

    fn print_summary(&self, result: &CalculationResult) {
        let summary = &result.summary;

        println!();
        println!("INHERITANCE TAX SUMMARY ({})", summary.tax_year);
        println!();

        println!("ESTATE");
        println!(
            "  Gross: {} | Liabilities: {} | Net: {}",
            format_gbp(summary.gross_estate),
            format_gbp(result.breakdown.estate_valuation.liabilities),
            format_gbp(summary.net_estate)
        );
        println!(
            "  Reliefs: {} | Exemptions: {} | Chargeable: {}",
            format_gbp(summary.total_reliefs),
            format_gbp(summary.total_exemptions),
            format_gbp(summary.chargeable_estate)
        );
        println!();

        let thresholds = &result.breakdown.threshold_calculation;
        println!("THRESHOLDS");
        println!(
            "  NRB: {} (transferred {}) | RNRB applied: {}",
            format_gbp(thresholds.total_nrb),
            format_gbp(thresholds.transferred_nrb),
            format_gbp(thresholds.applied_rnrb)
        );
        if thresholds.nrb_used_by_gifts > rust_decimal::Decimal::ZERO {
            println!(
                "  Consumed by lifetime gifts: {}",
                format_gbp(thresholds.nrb_used_by_gifts)
            );
        }
        println!(
            "  Available threshold: {}",
            format_gbp(summary.available_threshold)
        );
        println!();

        println!("TAX");
        println!(
            "  Taxable: {} @ {} = {}",
            format_gbp(summary.taxable_amount),
            format_rate(summary.tax_rate),
            format_gbp(result.breakdown.tax_calculation.gross_tax)
        );
        if summary.quick_succession_relief > rust_decimal::Decimal::ZERO {
            println!(
                "  Quick succession relief: -{}",
                format_gbp(summary.quick_succession_relief)
            );
        }
        if summary.gift_tax > rust_decimal::Decimal::ZERO {
            println!("  Gift tax: {}", format_gbp(summary.gift_tax));
        }
        println!();
        println!(
            "TOTAL TAX PAYABLE: {}",
            format_gbp(summary.total_tax_payable)
        );
        println!();

        if !result.gift_analysis.chargeable_gifts.is_empty() {
            println!("CHARGEABLE GIFTS");
            self.print_gift_table(&result.gift_analysis.chargeable_gifts);
            println!();
        }

        for warning in &result.warnings {
            println!("[{}] {}", warning.code, warning.message);
        }
    }

    fn print_gift_table(&self, gifts: &[ChargeableGiftSummary]) {
        let rows: Vec<GiftRow> = gifts.iter().map(GiftRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn write_gift_csv(&self, result: &CalculationResult) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for gift in &result.gift_analysis.chargeable_gifts {
            let record: GiftCsvRecord = gift.into();
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Row for the chargeable gifts table
#[derive(Debug, Clone, Tabled)]
struct GiftRow {
    #[tabled(rename = "Gift")]
    gift_id: String,

    #[tabled(rename = "Date")]
    date: String,

    #[tabled(rename = "Transfer Value")]
    gross_value: String,

    #[tabled(rename = "Years Before Death")]
    years_before_death: String,

    #[tabled(rename = "Taper Rate")]
    taper_rate: String,

    #[tabled(rename = "Tax Due")]
    tax_due: String,

    #[tabled(rename = "Paid By")]
    paid_by: String,
}

impl From<&ChargeableGiftSummary> for GiftRow {
    fn from(gift: &ChargeableGiftSummary) -> Self {
        GiftRow {
            gift_id: gift.gift_id.clone(),
            date: gift.date.format("%Y-%m-%d").to_string(),
            gross_value: format_gbp(gift.gross_value),
            years_before_death: format!("{:.1}", gift.years_before_death),
            taper_rate: format_rate(gift.taper_rate),
            tax_due: format_gbp(gift.tax_due),
            paid_by: paid_by_display(gift.paid_by).to_string(),
        }
    }
}

/// CSV record for gift analysis output
#[derive(Debug, Serialize)]
struct GiftCsvRecord {
    gift_id: String,
    date: String,
    gross_value: String,
    chargeable_value: String,
    years_before_death: String,
    taper_rate_pct: String,
    tax_due: String,
    paid_by: String,
}

impl From<&ChargeableGiftSummary> for GiftCsvRecord {
    fn from(gift: &ChargeableGiftSummary) -> Self {
        GiftCsvRecord {
            gift_id: gift.gift_id.clone(),
            date: gift.date.format("%Y-%m-%d").to_string(),
            gross_value: gift.gross_value.round_dp(2).to_string(),
            chargeable_value: gift.chargeable_value.round_dp(2).to_string(),
            years_before_death: format!("{:.2}", gift.years_before_death),
            taper_rate_pct: gift.taper_rate.round_dp(2).to_string(),
            tax_due: gift.tax_due.round_dp(2).to_string(),
            paid_by: paid_by_display(gift.paid_by).to_string(),
        }
    }
}

fn paid_by_display(paid_by: GiftTaxPayer) -> &'static str {
    match paid_by {
        GiftTaxPayer::Estate => "estate",
        GiftTaxPayer::Recipient => "recipient",
    }
}
