//! Quick succession relief.
//!
//! When the deceased inherited property that bore IHT within the previous
//! five years, part of that tax is credited against the estate's own
//! charge. The relief is apportioned between the free estate and any
//! trust-held component: the threshold splits in proportion to value, but
//! the relief itself splits in proportion to each bucket's share of the
//! combined pre-relief tax.

use crate::dates::years_between;
use crate::estate::QsrClaim;
use crate::report::QsrBreakdown;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub struct QsrInput<'a> {
    pub date_of_death: NaiveDate,
    pub claim: Option<&'a QsrClaim>,
    pub chargeable_estate: Decimal,
    pub available_threshold: Decimal,
    /// Death rate on the estate, percent
    pub tax_rate: Decimal,
    pub estate_tax_before_qsr: Decimal,
    /// Owned value of trust-interest assets in the estate
    pub trust_interests_value: Decimal,
}

#[derive(Debug, Clone)]
pub struct QsrResult {
    pub applies: bool,
    pub years_since_previous_death: f64,
    pub relief_percentage: Decimal,
    pub relief_available: Decimal,
    pub relief_applied: Decimal,
    pub free_estate_value: Decimal,
    pub trust_value: Decimal,
    pub free_estate_threshold_allocation: Decimal,
    pub trust_threshold_allocation: Decimal,
    pub free_estate_tax_before_qsr: Decimal,
    pub trust_tax_before_qsr: Decimal,
    pub free_estate_qsr: Decimal,
    pub trust_qsr: Decimal,
    pub free_estate_final_tax: Decimal,
    pub trust_final_tax: Decimal,
    pub estate_tax_after_qsr: Decimal,
}

/// Statutory relief percentage by whole years since the previous death.
pub fn qsr_relief_percentage(years_since_previous_death: f64) -> Decimal {
    if years_since_previous_death < 1.0 {
        dec!(100)
    } else if years_since_previous_death < 2.0 {
        dec!(80)
    } else if years_since_previous_death < 3.0 {
        dec!(60)
    } else if years_since_previous_death < 4.0 {
        dec!(40)
    } else if years_since_previous_death < 5.0 {
        dec!(20)
    } else {
        Decimal::ZERO
    }
}

fn no_relief(estate_tax_before_qsr: Decimal) -> QsrResult {
    QsrResult {
        applies: false,
        years_since_previous_death: 0.0,
        relief_percentage: Decimal::ZERO,
        relief_available: Decimal::ZERO,
        relief_applied: Decimal::ZERO,
        free_estate_value: Decimal::ZERO,
        trust_value: Decimal::ZERO,
        free_estate_threshold_allocation: Decimal::ZERO,
        trust_threshold_allocation: Decimal::ZERO,
        free_estate_tax_before_qsr: estate_tax_before_qsr,
        trust_tax_before_qsr: Decimal::ZERO,
        free_estate_qsr: Decimal::ZERO,
        trust_qsr: Decimal::ZERO,
        free_estate_final_tax: estate_tax_before_qsr,
        trust_final_tax: Decimal::ZERO,
        estate_tax_after_qsr: estate_tax_before_qsr,
    }
}

fn years_since_previous_death(claim: &QsrClaim, date_of_death: NaiveDate) -> f64 {
    match claim.years_before_death {
        Some(years) => years,
        None => years_between(claim.previous_death, date_of_death),
    }
}

/// Relief available: tax paid on the inheritance at the banded percentage,
/// capped by any explicit claim amount.
fn available_relief(claim: &QsrClaim, relief_percentage: Decimal) -> Decimal {
    let by_rate = claim.tax_paid_on_inheritance * relief_percentage / Decimal::ONE_HUNDRED;
    match claim.qsr_amount {
        Some(cap) => cap.min(by_rate),
        None => by_rate,
    }
}

/// Share of the threshold for one bucket, proportional to value.
fn allocate_threshold(total_threshold: Decimal, entry_value: Decimal, total_value: Decimal) -> Decimal {
    if total_value == Decimal::ZERO {
        return Decimal::ZERO;
    }
    total_threshold * entry_value / total_value
}

/// Share of the relief for one bucket, proportional to pre-relief tax.
fn allocate_relief(total_relief: Decimal, entry_tax: Decimal, total_tax: Decimal) -> Decimal {
    if total_tax == Decimal::ZERO {
        return Decimal::ZERO;
    }
    total_relief * entry_tax / total_tax
}

pub fn calculate_qsr(input: QsrInput<'_>) -> QsrResult {
    let Some(claim) = input.claim else {
        return no_relief(input.estate_tax_before_qsr);
    };
    if input.estate_tax_before_qsr == Decimal::ZERO {
        return no_relief(input.estate_tax_before_qsr);
    }

    let years = years_since_previous_death(claim, input.date_of_death);
    let relief_percentage = claim
        .relief_percentage
        .unwrap_or_else(|| qsr_relief_percentage(years));
    let relief_available = available_relief(claim, relief_percentage);

    if relief_percentage == Decimal::ZERO || relief_available == Decimal::ZERO {
        return QsrResult {
            years_since_previous_death: years,
            relief_percentage,
            relief_available,
            ..no_relief(input.estate_tax_before_qsr)
        };
    }

    let trust_value = input.trust_interests_value.min(input.chargeable_estate);
    let free_estate_value = (input.chargeable_estate - trust_value).max(Decimal::ZERO);
    let total_value = free_estate_value + trust_value;

    let free_estate_threshold_allocation =
        allocate_threshold(input.available_threshold, free_estate_value, total_value);
    let trust_threshold_allocation =
        allocate_threshold(input.available_threshold, trust_value, total_value);

    let free_estate_tax_before_qsr = (free_estate_value - free_estate_threshold_allocation)
        .max(Decimal::ZERO)
        * input.tax_rate
        / Decimal::ONE_HUNDRED;
    let trust_tax_before_qsr = (trust_value - trust_threshold_allocation).max(Decimal::ZERO)
        * input.tax_rate
        / Decimal::ONE_HUNDRED;
    let tax_before_qsr = free_estate_tax_before_qsr + trust_tax_before_qsr;

    let relief_applied = relief_available.min(tax_before_qsr);
    let free_estate_qsr = allocate_relief(relief_applied, free_estate_tax_before_qsr, tax_before_qsr);
    let trust_qsr = allocate_relief(relief_applied, trust_tax_before_qsr, tax_before_qsr);

    let free_estate_final_tax = (free_estate_tax_before_qsr - free_estate_qsr).max(Decimal::ZERO);
    let trust_final_tax = (trust_tax_before_qsr - trust_qsr).max(Decimal::ZERO);
    let estate_tax_after_qsr = free_estate_final_tax + trust_final_tax;

    log::debug!(
        "QSR: {}% of {} -> available {}, applied {}",
        relief_percentage,
        claim.tax_paid_on_inheritance,
        relief_available,
        relief_applied
    );

    QsrResult {
        applies: relief_applied > Decimal::ZERO,
        years_since_previous_death: years,
        relief_percentage,
        relief_available,
        relief_applied,
        free_estate_value,
        trust_value,
        free_estate_threshold_allocation,
        trust_threshold_allocation,
        free_estate_tax_before_qsr,
        trust_tax_before_qsr,
        free_estate_qsr,
        trust_qsr,
        free_estate_final_tax,
        trust_final_tax,
        estate_tax_after_qsr,
    }
}

impl QsrResult {
    pub fn to_breakdown(&self) -> QsrBreakdown {
        QsrBreakdown {
            applies: self.applies,
            years_since_previous_death: self.years_since_previous_death,
            relief_percentage: self.relief_percentage,
            relief_available: self.relief_available,
            relief_applied: self.relief_applied,
            free_estate_value: self.free_estate_value,
            trust_value: self.trust_value,
            free_estate_threshold_allocation: self.free_estate_threshold_allocation,
            trust_threshold_allocation: self.trust_threshold_allocation,
            free_estate_tax_before_qsr: self.free_estate_tax_before_qsr,
            trust_tax_before_qsr: self.trust_tax_before_qsr,
            free_estate_qsr: self.free_estate_qsr,
            trust_qsr: self.trust_qsr,
            free_estate_final_tax: self.free_estate_final_tax,
            trust_final_tax: self.trust_final_tax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn claim(tax_paid: Decimal, years: Option<f64>) -> QsrClaim {
        QsrClaim {
            previous_death: date(2022, 1, 1),
            tax_paid_on_inheritance: tax_paid,
            inherited_property_value: None,
            years_before_death: years,
            relief_percentage: None,
            qsr_amount: None,
        }
    }

    fn input<'a>(
        claim: Option<&'a QsrClaim>,
        chargeable: Decimal,
        threshold: Decimal,
        estate_tax: Decimal,
        trust_value: Decimal,
    ) -> QsrInput<'a> {
        QsrInput {
            date_of_death: date(2024, 7, 1),
            claim,
            chargeable_estate: chargeable,
            available_threshold: threshold,
            tax_rate: dec!(40),
            estate_tax_before_qsr: estate_tax,
            trust_interests_value: trust_value,
        }
    }

    #[test]
    fn relief_percentage_bands() {
        assert_eq!(qsr_relief_percentage(0.5), dec!(100));
        assert_eq!(qsr_relief_percentage(1.5), dec!(80));
        assert_eq!(qsr_relief_percentage(2.5), dec!(60));
        assert_eq!(qsr_relief_percentage(3.5), dec!(40));
        assert_eq!(qsr_relief_percentage(4.5), dec!(20));
        assert_eq!(qsr_relief_percentage(5.0), Decimal::ZERO);
        assert_eq!(qsr_relief_percentage(7.0), Decimal::ZERO);
    }

    #[test]
    fn no_claim_no_relief() {
        let result = calculate_qsr(input(None, dec!(500000), dec!(325000), dec!(70000), Decimal::ZERO));
        assert!(!result.applies);
        assert_eq!(result.estate_tax_after_qsr, dec!(70000));
    }

    #[test]
    fn zero_estate_tax_no_relief() {
        let c = claim(dec!(40000), Some(1.0));
        let result = calculate_qsr(input(Some(&c), dec!(300000), dec!(325000), Decimal::ZERO, Decimal::ZERO));
        assert!(!result.applies);
        assert_eq!(result.estate_tax_after_qsr, Decimal::ZERO);
    }

    #[test]
    fn banded_relief_with_explicit_cap() {
        // 2.5 years -> 60%; available = min(cap 32,000, 40,000 x 60%)
        let mut c = claim(dec!(40000), Some(2.5));
        c.qsr_amount = Some(dec!(32000));
        let result = calculate_qsr(input(Some(&c), dec!(500000), dec!(325000), dec!(70000), Decimal::ZERO));

        assert_eq!(result.relief_percentage, dec!(60));
        assert_eq!(result.relief_available, dec!(24000));
        assert!(result.applies);
        assert_eq!(result.relief_applied, dec!(24000));
        assert_eq!(result.estate_tax_after_qsr, dec!(46000));
    }

    #[test]
    fn years_derived_from_dates_when_not_explicit() {
        // 2022-01-01 to 2024-07-01 is about 2.5 years -> 60%
        let c = claim(dec!(10000), None);
        let result = calculate_qsr(input(Some(&c), dec!(500000), dec!(325000), dec!(70000), Decimal::ZERO));
        assert_eq!(result.relief_percentage, dec!(60));
        assert_eq!(result.relief_available, dec!(6000));
    }

    #[test]
    fn relief_capped_by_combined_tax() {
        // Free estate tax is only 20,000; relief cannot exceed it
        let c = claim(dec!(100000), Some(0.5));
        let result = calculate_qsr(input(Some(&c), dec!(375000), dec!(325000), dec!(20000), Decimal::ZERO));
        assert_eq!(result.relief_available, dec!(100000));
        assert_eq!(result.relief_applied, dec!(20000));
        assert_eq!(result.estate_tax_after_qsr, Decimal::ZERO);
    }

    #[test]
    fn over_five_years_no_relief() {
        let c = claim(dec!(40000), Some(6.0));
        let result = calculate_qsr(input(Some(&c), dec!(500000), dec!(325000), dec!(70000), Decimal::ZERO));
        assert!(!result.applies);
        assert_eq!(result.relief_percentage, Decimal::ZERO);
        assert_eq!(result.years_since_previous_death, 6.0);
        assert_eq!(result.estate_tax_after_qsr, dec!(70000));
    }

    #[test]
    fn explicit_percentage_overrides_banding() {
        let mut c = claim(dec!(40000), Some(2.5));
        c.relief_percentage = Some(dec!(100));
        let result = calculate_qsr(input(Some(&c), dec!(500000), dec!(325000), dec!(70000), Decimal::ZERO));
        assert_eq!(result.relief_percentage, dec!(100));
        assert_eq!(result.relief_available, dec!(40000));
    }

    #[test]
    fn split_between_free_estate_and_trust() {
        // Chargeable 1,000,000 with 400,000 held in trust; threshold
        // 325,000 splits 60/40 by value; relief splits by tax share
        let c = claim(dec!(50000), Some(0.5));
        let result = calculate_qsr(input(
            Some(&c),
            dec!(1000000),
            dec!(325000),
            dec!(270000),
            dec!(400000),
        ));

        assert_eq!(result.free_estate_value, dec!(600000));
        assert_eq!(result.trust_value, dec!(400000));
        assert_eq!(result.free_estate_threshold_allocation, dec!(195000));
        assert_eq!(result.trust_threshold_allocation, dec!(130000));
        // Free estate: (600,000 - 195,000) x 40% = 162,000
        // Trust: (400,000 - 130,000) x 40% = 108,000
        assert_eq!(result.free_estate_tax_before_qsr, dec!(162000));
        assert_eq!(result.trust_tax_before_qsr, dec!(108000));
        // Relief 50,000 splits 60/40 with the tax shares
        assert_eq!(result.free_estate_qsr, dec!(30000));
        assert_eq!(result.trust_qsr, dec!(20000));
        assert_eq!(result.estate_tax_after_qsr, dec!(220000));
        assert!(result.applies);
    }

    #[test]
    fn trust_value_clamped_to_chargeable_estate() {
        let c = claim(dec!(10000), Some(0.5));
        let result = calculate_qsr(input(
            Some(&c),
            dec!(300000),
            Decimal::ZERO,
            dec!(120000),
            dec!(500000),
        ));
        assert_eq!(result.trust_value, dec!(300000));
        assert_eq!(result.free_estate_value, Decimal::ZERO);
    }
}
