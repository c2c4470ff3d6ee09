//! Trust charge commands - ten-year periodic and exit charges

use crate::cmd::{format_gbp, format_rate};
use crate::estate::{Asset, TrustType};
use crate::tax::trust::{
    calculate_exit_charge, calculate_ten_year_charge, ExitChargeInput, TenYearChargeInput,
};
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// JSON input for the ten-year charge command
#[derive(Debug, Deserialize)]
pub struct TenYearChargeRecord {
    pub trust_type: TrustType,
    pub settlement_date: NaiveDate,
    pub anniversary_date: NaiveDate,
    #[serde(default)]
    pub relevant_property_value: Decimal,
    pub available_nil_rate_band: Decimal,
    #[serde(default)]
    pub related_settlements: Decimal,
    #[serde(default)]
    pub non_relevant_property: Decimal,
    #[serde(default)]
    pub assets: Option<Vec<Asset>>,
    #[serde(default)]
    pub notional_lifetime_transfer: Option<Decimal>,
}

/// JSON input for the exit charge command
#[derive(Debug, Deserialize)]
pub struct ExitChargeRecord {
    pub trust_type: TrustType,
    pub settlement_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub exit_value: Decimal,
    pub ten_year_anniversary_rate: Decimal,
    #[serde(default)]
    pub last_ten_year_charge_date: Option<NaiveDate>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

#[derive(Args, Debug)]
pub struct TenYearCommand {
    /// JSON file containing the ten-year charge input
    #[arg(short, long)]
    input: PathBuf,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl TenYearCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let record: TenYearChargeRecord = read_json(&self.input)?;
        let result = calculate_ten_year_charge(&TenYearChargeInput {
            trust_type: record.trust_type,
            settlement_date: record.settlement_date,
            anniversary_date: record.anniversary_date,
            relevant_property_value: record.relevant_property_value,
            available_nil_rate_band: record.available_nil_rate_band,
            related_settlements: record.related_settlements,
            non_relevant_property: record.non_relevant_property,
            assets: record.assets,
            notional_lifetime_transfer: record.notional_lifetime_transfer,
        });

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "is_chargeable": result.is_chargeable,
                    "relevant_property_value_after_reliefs": result.relevant_property_value_after_reliefs,
                    "notional_transfer": result.notional_transfer,
                    "excess_over_nrb": result.excess_over_nrb,
                    "hypothetical_tax_at_20_percent": result.hypothetical_tax_at_20_percent,
                    "effective_rate": result.effective_rate,
                    "anniversary_rate": result.anniversary_rate,
                    "tax_on_relevant_property": result.tax_on_relevant_property,
                    "capped_tax": result.capped_tax,
                    "warnings": result.warnings,
                }))?
            );
            return Ok(());
        }

        println!();
        println!("TEN-YEAR PERIODIC CHARGE");
        if !result.is_chargeable {
            for warning in &result.warnings {
                println!("  {}", warning);
            }
            println!("  No charge arises");
            return Ok(());
        }
        println!(
            "  Relevant property after reliefs: {}",
            format_gbp(result.relevant_property_value_after_reliefs)
        );
        println!(
            "  Notional transfer: {} | Excess over NRB: {}",
            format_gbp(result.notional_transfer),
            format_gbp(result.excess_over_nrb)
        );
        println!(
            "  Effective rate: {} | Anniversary rate: {}",
            format_rate(result.effective_rate),
            format_rate(result.anniversary_rate)
        );
        println!("  Tax payable: {}", format_gbp(result.capped_tax));
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ExitCommand {
    /// JSON file containing the exit charge input
    #[arg(short, long)]
    input: PathBuf,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl ExitCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let record: ExitChargeRecord = read_json(&self.input)?;
        let result = calculate_exit_charge(&ExitChargeInput {
            trust_type: record.trust_type,
            settlement_date: record.settlement_date,
            exit_date: record.exit_date,
            exit_value: record.exit_value,
            ten_year_anniversary_rate: record.ten_year_anniversary_rate,
            last_ten_year_charge_date: record.last_ten_year_charge_date,
        });

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "is_chargeable": result.is_chargeable,
                    "start_date": result.start_date,
                    "quarters_elapsed": result.quarters_elapsed,
                    "effective_rate": result.effective_rate,
                    "tax_payable": result.tax_payable,
                    "grace_period_applied": result.grace_period_applied,
                    "warnings": result.warnings,
                }))?
            );
            return Ok(());
        }

        println!();
        println!("EXIT CHARGE");
        if !result.is_chargeable {
            for warning in &result.warnings {
                println!("  {}", warning);
            }
            if result.grace_period_applied {
                println!("  Within three months of {}: no charge", result.start_date);
            } else {
                println!("  No charge arises");
            }
            return Ok(());
        }
        println!(
            "  Quarters since {}: {}",
            result.start_date, result.quarters_elapsed
        );
        println!("  Effective rate: {}", format_rate(result.effective_rate));
        println!("  Tax payable: {}", format_gbp(result.tax_payable));
        Ok(())
    }
}
