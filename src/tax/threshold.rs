//! Nil-rate band, residence nil-rate band and lifetime-gift taxation.
//!
//! The gift-impact pass walks chargeable gifts (PETs and CLTs) made within
//! seven years of death in date order, grossing up donor-paid CLTs, testing
//! each gift against the band available to it, and accumulating the tapered
//! death tax. Only PETs consume the running band that is left over for the
//! estate; CLTs are tested against the full baseline.

use crate::config::TaxYearConfig;
use crate::dates::years_between;
use crate::estate::{Estate, GiftType, LifetimeGift};
use crate::report::{ChargeableGiftSummary, GiftTaxPayer};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Seven-year window for gifts becoming chargeable on death
const GIFT_WINDOW_YEARS: f64 = 7.0;

pub struct ThresholdInput<'a> {
    pub estate: &'a Estate,
    pub net_estate: Decimal,
    pub chargeable_estate: Decimal,
    pub config: &'a TaxYearConfig,
    /// Death rate on the estate, percent (charity rate when qualified)
    pub tax_rate: Decimal,
    /// NRB already consumed by a capped non-dom spouse exemption
    pub nrb_consumed_by_spouse_exemption: Decimal,
}

#[derive(Debug, Clone)]
pub struct ThresholdResult {
    pub basic_nrb: Decimal,
    pub transferred_nrb: Decimal,
    pub total_nrb: Decimal,
    pub total_gifts_in_7_years: Decimal,
    pub nrb_used_by_gifts: Decimal,
    pub nrb_remaining_for_estate: Decimal,
    pub gross_rnrb: Decimal,
    pub transferred_rnrb: Decimal,
    pub taper_reduction: Decimal,
    pub applied_rnrb: Decimal,
    pub available_threshold: Decimal,
    pub gift_taxable_amount: Decimal,
    pub gift_tax: Decimal,
    pub chargeable_gifts: Vec<ChargeableGiftSummary>,
    pub estate_taxable_amount: Decimal,
    pub estate_tax: Decimal,
    pub total_tax_payable: Decimal,
}

/// Tapered death rate on a gift, by years survived after making it.
fn gift_tax_rate(years_before_death: f64, standard_rate: Decimal) -> Decimal {
    if years_before_death >= 6.0 {
        standard_rate * dec!(0.2)
    } else if years_before_death >= 5.0 {
        standard_rate * dec!(0.4)
    } else if years_before_death >= 4.0 {
        standard_rate * dec!(0.6)
    } else if years_before_death >= 3.0 {
        standard_rate * dec!(0.8)
    } else {
        standard_rate
    }
}

/// CLT terms needed by the grossing-up test
#[derive(Debug, Clone, Copy)]
struct CltTerms {
    tax_paid_at_transfer: Decimal,
    paid_by_donor: bool,
}

struct ChargeableGiftRef<'a> {
    gift: &'a LifetimeGift,
    clt: Option<CltTerms>,
}

/// Chargeable gifts (PET and CLT only) in date order.
fn chargeable_gifts(gifts: &[LifetimeGift]) -> Vec<ChargeableGiftRef<'_>> {
    let mut chargeable: Vec<ChargeableGiftRef<'_>> = gifts
        .iter()
        .filter_map(|gift| match &gift.details {
            GiftType::Pet { .. } => Some(ChargeableGiftRef { gift, clt: None }),
            GiftType::Clt {
                tax_paid_at_transfer,
                paid_by_donor,
                ..
            } => Some(ChargeableGiftRef {
                gift,
                clt: Some(CltTerms {
                    tax_paid_at_transfer: *tax_paid_at_transfer,
                    paid_by_donor: *paid_by_donor,
                }),
            }),
            GiftType::Exempt { .. } => None,
        })
        .collect();
    chargeable.sort_by_key(|g| g.gift.date_of_gift);
    chargeable
}

/// Transfer value of a CLT for death-tax purposes.
///
/// When the donor paid the lifetime tax the stated value may be net. If the
/// tax paid equals what the stated value would itself owe at the lifetime
/// rate, the value is already gross; otherwise the excess over the
/// available band is grossed up at 1/(1 - rate).
fn clt_transfer_value(
    value: Decimal,
    available_nrb: Decimal,
    lifetime_rate: Decimal,
    terms: CltTerms,
) -> Decimal {
    if !terms.paid_by_donor {
        return value;
    }

    let excess_over_nrb = (value - available_nrb).max(Decimal::ZERO);
    if excess_over_nrb == Decimal::ZERO {
        return value;
    }

    let expected_tax_if_already_grossed = excess_over_nrb * lifetime_rate / Decimal::ONE_HUNDRED;
    if terms.tax_paid_at_transfer == expected_tax_if_already_grossed {
        return value;
    }

    let grossing_denominator = Decimal::ONE - lifetime_rate / Decimal::ONE_HUNDRED;
    let grossed_excess = excess_over_nrb / grossing_denominator;
    log::debug!(
        "grossing up CLT: net {} -> gross {}",
        value,
        available_nrb + grossed_excess
    );
    available_nrb + grossed_excess
}

/// Gross value of CLTs made in the seven years before a PET, which eat into
/// the band available to that PET. Near the seven-year boundary this is a
/// fourteen-year lookback relative to the death.
fn prior_clt_usage_for_pet(
    gifts: &[ChargeableGiftRef<'_>],
    pet_date: NaiveDate,
    available_nrb: Decimal,
    lifetime_rate: Decimal,
) -> Decimal {
    gifts
        .iter()
        .filter_map(|g| {
            let terms = g.clt?;
            let in_lookback = g.gift.date_of_gift < pet_date
                && years_between(g.gift.date_of_gift, pet_date) < GIFT_WINDOW_YEARS;
            in_lookback
                .then(|| clt_transfer_value(g.gift.value, available_nrb, lifetime_rate, terms))
        })
        .sum()
}

#[derive(Debug, Clone)]
struct GiftImpact {
    total_gifts_in_7_years: Decimal,
    nrb_used_by_gifts: Decimal,
    nrb_remaining_for_estate: Decimal,
    gift_taxable_amount: Decimal,
    gift_tax: Decimal,
    chargeable_gifts: Vec<ChargeableGiftSummary>,
}

fn gift_impact(
    gifts: &[LifetimeGift],
    death_date: NaiveDate,
    available_nrb: Decimal,
    standard_rate: Decimal,
    lifetime_rate: Decimal,
) -> GiftImpact {
    let all_chargeable = chargeable_gifts(gifts);
    let within_window: Vec<&ChargeableGiftRef<'_>> = all_chargeable
        .iter()
        .filter(|g| years_between(g.gift.date_of_gift, death_date) < GIFT_WINDOW_YEARS)
        .collect();

    let mut remaining_nrb = available_nrb;
    let mut total_gifts_in_7_years = Decimal::ZERO;
    let mut gift_taxable_amount = Decimal::ZERO;
    let mut gift_tax = Decimal::ZERO;
    let mut breakdown: Vec<ChargeableGiftSummary> = Vec::new();

    for entry in within_window {
        let gift = entry.gift;
        let transfer_value = match entry.clt {
            Some(terms) => clt_transfer_value(gift.value, available_nrb, lifetime_rate, terms),
            None => gift.value,
        };

        total_gifts_in_7_years += transfer_value;

        let annual_exemption_applied = Decimal::ZERO;
        let chargeable_value = (transfer_value - annual_exemption_applied).max(Decimal::ZERO);

        // PETs are tested against the band less CLTs in the seven years
        // before the PET; CLTs are tested against the full baseline
        let nrb_for_gift_tax = match entry.clt {
            None => {
                let prior_clt = prior_clt_usage_for_pet(
                    &all_chargeable,
                    gift.date_of_gift,
                    available_nrb,
                    lifetime_rate,
                );
                (available_nrb - prior_clt).max(Decimal::ZERO)
            }
            Some(_) => available_nrb,
        };

        let covered_by_nrb = chargeable_value.min(nrb_for_gift_tax);
        if entry.clt.is_none() {
            // Only PETs consume the band left over for the estate
            let consumed = chargeable_value.min(remaining_nrb);
            remaining_nrb = (remaining_nrb - consumed).max(Decimal::ZERO);
        }

        let taxable_on_gift = (chargeable_value - covered_by_nrb).max(Decimal::ZERO);
        let years_before_death = years_between(gift.date_of_gift, death_date);
        let gift_rate = if taxable_on_gift > Decimal::ZERO {
            gift_tax_rate(years_before_death, standard_rate)
        } else {
            Decimal::ZERO
        };
        let mut tax_due = taxable_on_gift * gift_rate / Decimal::ONE_HUNDRED;

        if taxable_on_gift > Decimal::ZERO {
            gift_taxable_amount += taxable_on_gift;
        }

        // CLTs get credit for lifetime tax already paid
        if let Some(terms) = entry.clt {
            if terms.tax_paid_at_transfer > Decimal::ZERO {
                tax_due = (tax_due - terms.tax_paid_at_transfer).max(Decimal::ZERO);
            }
        }

        log::debug!(
            "gift {}: transfer {} taxable {} rate {}% tax {}",
            gift.id,
            transfer_value,
            taxable_on_gift,
            gift_rate,
            tax_due
        );

        gift_tax += tax_due;
        breakdown.push(ChargeableGiftSummary {
            gift_id: gift.id.clone(),
            date: gift.date_of_gift,
            gross_value: transfer_value,
            annual_exemption_applied,
            chargeable_value,
            years_before_death,
            taper_rate: gift_rate,
            tax_due,
            paid_by: if tax_due > Decimal::ZERO {
                GiftTaxPayer::Recipient
            } else {
                GiftTaxPayer::Estate
            },
        });
    }

    GiftImpact {
        total_gifts_in_7_years,
        nrb_used_by_gifts: (available_nrb - remaining_nrb).max(Decimal::ZERO),
        nrb_remaining_for_estate: remaining_nrb,
        gift_taxable_amount,
        gift_tax,
        chargeable_gifts: breakdown,
    }
}

fn transferred_nrb(estate: &Estate, basic_nrb: Decimal) -> Decimal {
    match &estate.predecessor_estate {
        Some(predecessor) => basic_nrb * predecessor.unused_nrb_percentage / Decimal::ONE_HUNDRED,
        None => Decimal::ZERO,
    }
}

fn transferred_rnrb(estate: &Estate) -> Decimal {
    match &estate.predecessor_estate {
        Some(predecessor) => {
            predecessor.rnrb_available_at_death * predecessor.unused_rnrb_percentage
                / Decimal::ONE_HUNDRED
        }
        None => Decimal::ZERO,
    }
}

/// Residence value passing to direct descendants; zero unless the deceased
/// has direct descendants and the residence passes to them.
fn residence_to_descendants(estate: &Estate) -> Decimal {
    let Some(residence) = &estate.residence else {
        return Decimal::ZERO;
    };
    if !estate.deceased.has_direct_descendants || !residence.passing_to_direct_descendants {
        return Decimal::ZERO;
    }
    residence.value * residence.descendant_share / Decimal::ONE_HUNDRED
}

pub fn calculate_thresholds(input: ThresholdInput<'_>) -> ThresholdResult {
    let basic_nrb = input.config.nil_rate_band;
    let transferred_nrb = transferred_nrb(input.estate, basic_nrb);
    let total_nrb = (basic_nrb + transferred_nrb - input.nrb_consumed_by_spouse_exemption)
        .max(Decimal::ZERO);

    let impact = gift_impact(
        &input.estate.gifts,
        input.estate.deceased.date_of_death,
        total_nrb,
        input.config.standard_rate,
        input.config.trust_lifetime_rate,
    );

    let transferred_rnrb = transferred_rnrb(input.estate);
    let gross_rnrb_cap = input.config.residence_nil_rate_band + transferred_rnrb;
    let gross_rnrb = gross_rnrb_cap.min(residence_to_descendants(input.estate));

    // Estates over the taper threshold lose £1 of RNRB for every £2 over
    let taper_reduction = if input.net_estate > input.config.rnrb_taper_threshold {
        (input.net_estate - input.config.rnrb_taper_threshold) / dec!(2)
    } else {
        Decimal::ZERO
    };
    let applied_rnrb = (gross_rnrb - taper_reduction).max(Decimal::ZERO);

    let available_threshold = impact.nrb_remaining_for_estate + applied_rnrb;
    let estate_taxable_amount = (input.chargeable_estate - available_threshold).max(Decimal::ZERO);
    let estate_tax = estate_taxable_amount * input.tax_rate / Decimal::ONE_HUNDRED;
    let total_tax_payable = estate_tax + impact.gift_tax;

    ThresholdResult {
        basic_nrb,
        transferred_nrb,
        total_nrb,
        total_gifts_in_7_years: impact.total_gifts_in_7_years,
        nrb_used_by_gifts: impact.nrb_used_by_gifts,
        nrb_remaining_for_estate: impact.nrb_remaining_for_estate,
        gross_rnrb,
        transferred_rnrb,
        taper_reduction,
        applied_rnrb,
        available_threshold,
        gift_taxable_amount: impact.gift_taxable_amount,
        gift_tax: impact.gift_tax,
        chargeable_gifts: impact.chargeable_gifts,
        estate_taxable_amount,
        estate_tax,
        total_tax_payable,
    }
}
