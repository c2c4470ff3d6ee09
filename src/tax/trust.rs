//! Relevant-property trust charges: the ten-year periodic charge and the
//! exit charge. Both are no-ops for IPDI trusts, which sit outside the
//! relevant-property regime.

use crate::dates::{complete_months_between, within_three_months};
use crate::estate::{Asset, TrustType};
use crate::report::ReliefBreakdown;
use crate::tax::reliefs::apply_reliefs;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Lifetime rate used for the hypothetical transfer, percent
const HYPOTHETICAL_RATE: Decimal = dec!(20);
/// Anniversary rate is 3/10 of the effective rate
const PERIODIC_MULTIPLIER_NUMERATOR: Decimal = dec!(3);
const PERIODIC_MULTIPLIER_DENOMINATOR: Decimal = dec!(10);
/// Statutory cap on the periodic charge rate, percent
const MAX_PERIODIC_RATE: Decimal = dec!(6);
/// Quarters in a ten-year period
const QUARTERS_IN_TEN_YEARS: Decimal = dec!(40);

/// Non-relevant property joined the notional transfer only before this
/// rule change
fn november_2015_rule_change() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 11, 18).unwrap()
}

pub struct TenYearChargeInput {
    pub trust_type: TrustType,
    pub settlement_date: NaiveDate,
    pub anniversary_date: NaiveDate,
    pub relevant_property_value: Decimal,
    pub available_nil_rate_band: Decimal,
    pub related_settlements: Decimal,
    pub non_relevant_property: Decimal,
    /// Trust assets; when supplied, reliefs are applied to derive the
    /// relevant-property value
    pub assets: Option<Vec<Asset>>,
    /// Explicit notional transfer, overriding the derived figure
    pub notional_lifetime_transfer: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct TenYearChargeResult {
    pub trust_type: TrustType,
    pub is_chargeable: bool,
    pub relevant_property_value_after_reliefs: Decimal,
    pub notional_transfer: Decimal,
    pub available_nrb: Decimal,
    pub excess_over_nrb: Decimal,
    pub hypothetical_tax_at_20_percent: Decimal,
    /// Percent
    pub effective_rate: Decimal,
    /// Percent
    pub anniversary_rate: Decimal,
    pub tax_on_relevant_property: Decimal,
    pub max_rate_cap: Decimal,
    pub capped_tax: Decimal,
    pub relief_breakdown: ReliefBreakdown,
    pub warnings: Vec<String>,
}

pub struct ExitChargeInput {
    pub trust_type: TrustType,
    pub settlement_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub exit_value: Decimal,
    /// Anniversary rate from the last ten-year charge, percent
    pub ten_year_anniversary_rate: Decimal,
    pub last_ten_year_charge_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ExitChargeResult {
    pub trust_type: TrustType,
    pub is_chargeable: bool,
    pub start_date: NaiveDate,
    pub quarters_elapsed: u32,
    /// Percent
    pub effective_rate: Decimal,
    pub tax_payable: Decimal,
    pub grace_period_applied: bool,
    pub warnings: Vec<String>,
}

/// Ten-year periodic charge on relevant property.
pub fn calculate_ten_year_charge(input: &TenYearChargeInput) -> TenYearChargeResult {
    if !input.trust_type.is_relevant_property() {
        return TenYearChargeResult {
            trust_type: input.trust_type,
            is_chargeable: false,
            relevant_property_value_after_reliefs: Decimal::ZERO,
            notional_transfer: Decimal::ZERO,
            available_nrb: input.available_nil_rate_band,
            excess_over_nrb: Decimal::ZERO,
            hypothetical_tax_at_20_percent: Decimal::ZERO,
            effective_rate: Decimal::ZERO,
            anniversary_rate: Decimal::ZERO,
            tax_on_relevant_property: Decimal::ZERO,
            max_rate_cap: MAX_PERIODIC_RATE,
            capped_tax: Decimal::ZERO,
            relief_breakdown: ReliefBreakdown::default(),
            warnings: vec![
                "IPDI trusts are not subject to relevant property periodic charges".to_string(),
            ],
        };
    }

    // When assets are supplied the relevant-property value is their owned
    // total after BPR/APR; otherwise the caller's figure is taken as-is
    let relief_outcome = input.assets.as_deref().map(|assets| {
        let owned_total: Decimal = assets.iter().map(Asset::owned_value).sum();
        apply_reliefs(assets, owned_total)
    });
    let (relevant_property_value_after_reliefs, relief_breakdown) = match relief_outcome {
        Some(outcome) => (outcome.value_after_reliefs, outcome.breakdown),
        None => (input.relevant_property_value, ReliefBreakdown::default()),
    };

    let include_non_relevant = input.anniversary_date < november_2015_rule_change();
    let derived_notional_transfer = relevant_property_value_after_reliefs
        + input.related_settlements
        + if include_non_relevant {
            input.non_relevant_property
        } else {
            Decimal::ZERO
        };
    let notional_transfer = input
        .notional_lifetime_transfer
        .unwrap_or(derived_notional_transfer);

    let excess_over_nrb =
        (notional_transfer - input.available_nil_rate_band).max(Decimal::ZERO);
    let hypothetical_tax = excess_over_nrb * HYPOTHETICAL_RATE / Decimal::ONE_HUNDRED;
    let effective_rate = if notional_transfer == Decimal::ZERO {
        Decimal::ZERO
    } else {
        hypothetical_tax / notional_transfer * Decimal::ONE_HUNDRED
    };
    let anniversary_rate =
        effective_rate * PERIODIC_MULTIPLIER_NUMERATOR / PERIODIC_MULTIPLIER_DENOMINATOR;
    let tax_on_relevant_property =
        relevant_property_value_after_reliefs * anniversary_rate / Decimal::ONE_HUNDRED;
    let max_tax_at_cap =
        relevant_property_value_after_reliefs * MAX_PERIODIC_RATE / Decimal::ONE_HUNDRED;
    let capped_tax = tax_on_relevant_property.min(max_tax_at_cap);

    log::debug!(
        "ten-year charge: notional {} excess {} anniversary rate {}% tax {}",
        notional_transfer,
        excess_over_nrb,
        anniversary_rate,
        capped_tax
    );

    TenYearChargeResult {
        trust_type: input.trust_type,
        is_chargeable: true,
        relevant_property_value_after_reliefs,
        notional_transfer,
        available_nrb: input.available_nil_rate_band,
        excess_over_nrb,
        hypothetical_tax_at_20_percent: hypothetical_tax,
        effective_rate,
        anniversary_rate,
        tax_on_relevant_property,
        max_rate_cap: MAX_PERIODIC_RATE,
        capped_tax,
        relief_breakdown,
        warnings: Vec::new(),
    }
}

/// Exit charge on property leaving a relevant-property trust.
pub fn calculate_exit_charge(input: &ExitChargeInput) -> ExitChargeResult {
    if !input.trust_type.is_relevant_property() {
        return ExitChargeResult {
            trust_type: input.trust_type,
            is_chargeable: false,
            start_date: input.last_ten_year_charge_date.unwrap_or(input.settlement_date),
            quarters_elapsed: 0,
            effective_rate: Decimal::ZERO,
            tax_payable: Decimal::ZERO,
            grace_period_applied: false,
            warnings: vec![
                "IPDI trusts are not subject to relevant property exit charges".to_string(),
            ],
        };
    }

    // No charge within three months of settlement or of the last ten-year
    // charge
    if within_three_months(input.settlement_date, input.exit_date) {
        return grace_period_exit(input, input.settlement_date);
    }
    if let Some(last_charge) = input.last_ten_year_charge_date {
        if within_three_months(last_charge, input.exit_date) {
            return grace_period_exit(input, last_charge);
        }
    }

    let start_date = input.last_ten_year_charge_date.unwrap_or(input.settlement_date);
    let quarters_elapsed = complete_months_between(start_date, input.exit_date) / 3;
    let effective_rate =
        input.ten_year_anniversary_rate * Decimal::from(quarters_elapsed) / QUARTERS_IN_TEN_YEARS;
    let tax_payable = input.exit_value * effective_rate / Decimal::ONE_HUNDRED;

    log::debug!(
        "exit charge: {} quarters since {} -> rate {}% tax {}",
        quarters_elapsed,
        start_date,
        effective_rate,
        tax_payable
    );

    ExitChargeResult {
        trust_type: input.trust_type,
        is_chargeable: true,
        start_date,
        quarters_elapsed,
        effective_rate,
        tax_payable,
        grace_period_applied: false,
        warnings: Vec::new(),
    }
}

fn grace_period_exit(input: &ExitChargeInput, start_date: NaiveDate) -> ExitChargeResult {
    ExitChargeResult {
        trust_type: input.trust_type,
        is_chargeable: false,
        start_date,
        quarters_elapsed: 0,
        effective_rate: Decimal::ZERO,
        tax_payable: Decimal::ZERO,
        grace_period_applied: true,
        warnings: Vec::new(),
    }
}
