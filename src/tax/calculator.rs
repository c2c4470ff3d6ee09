//! The estate calculation pipeline.
//!
//! Stages run in fixed order: validation, valuation, liability deduction,
//! reliefs, exemptions, thresholds and gift impact, then quick succession
//! relief. Every stage is pure; identical inputs give identical outcomes.

use crate::config::{ConfigError, TaxYear};
use crate::dates::years_between;
use crate::estate::{Estate, GiftType};
use crate::report::{
    CalculationBreakdown, CalculationOutcome, CalculationResult, ExemptionBreakdown, GiftAnalysis,
    GiftSummary, TaxBreakdown, TaxSummary, ThresholdBreakdown, ValidationError,
};
use crate::tax::exemptions::{calculate_exemptions, ExemptionInput};
use crate::tax::qsr::{calculate_qsr, QsrInput};
use crate::tax::reliefs::apply_reliefs;
use crate::tax::threshold::{calculate_thresholds, ThresholdInput};
use crate::tax::valuation::{deduct_liabilities, gross_estate, valuation_breakdown};
use rust_decimal::Decimal;

/// Structural validation ahead of the pipeline: negative money and
/// out-of-range percentages are rejected with field-level errors. Dangling
/// asset references are NOT errors; they degrade to zero downstream.
pub fn validate_estate(estate: &Estate) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut check_non_negative = |field: String, value: Decimal| {
        if value < Decimal::ZERO {
            errors.push(ValidationError {
                field,
                code: "E001".to_string(),
                message: "monetary amount must not be negative".to_string(),
            });
        }
    };

    for (i, asset) in estate.assets.iter().enumerate() {
        check_non_negative(format!("assets[{i}].gross_value"), asset.gross_value);
    }
    for (i, liability) in estate.liabilities.iter().enumerate() {
        check_non_negative(format!("liabilities[{i}].amount"), liability.amount);
    }
    for (i, gift) in estate.gifts.iter().enumerate() {
        check_non_negative(format!("gifts[{i}].value"), gift.value);
        if let GiftType::Clt {
            tax_paid_at_transfer,
            ..
        } = &gift.details
        {
            check_non_negative(
                format!("gifts[{i}].tax_paid_at_transfer"),
                *tax_paid_at_transfer,
            );
        }
    }
    if let Some(claim) = &estate.quick_succession_relief {
        check_non_negative(
            "quick_succession_relief.tax_paid_on_inheritance".to_string(),
            claim.tax_paid_on_inheritance,
        );
    }

    let mut check_percentage = |field: String, value: Decimal| {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            errors.push(ValidationError {
                field,
                code: "E002".to_string(),
                message: "percentage must be between 0 and 100".to_string(),
            });
        }
    };

    for (i, asset) in estate.assets.iter().enumerate() {
        check_percentage(format!("assets[{i}].ownership_share"), asset.ownership_share);
    }
    for (i, beneficiary) in estate.beneficiaries.iter().enumerate() {
        if let Some(share) = beneficiary.residuary_share {
            check_percentage(format!("beneficiaries[{i}].residuary_share"), share);
        }
    }
    if let Some(residence) = &estate.residence {
        check_percentage("residence.descendant_share".to_string(), residence.descendant_share);
    }
    if let Some(predecessor) = &estate.predecessor_estate {
        check_percentage(
            "predecessor_estate.unused_nrb_percentage".to_string(),
            predecessor.unused_nrb_percentage,
        );
        check_percentage(
            "predecessor_estate.unused_rnrb_percentage".to_string(),
            predecessor.unused_rnrb_percentage,
        );
    }

    errors
}

/// Exempt gifts within the seven-year window, for the gift analysis.
fn exempt_gift_summaries(estate: &Estate) -> Vec<GiftSummary> {
    estate
        .gifts
        .iter()
        .filter(|gift| {
            years_between(gift.date_of_gift, estate.deceased.date_of_death) < 7.0
        })
        .filter_map(|gift| match &gift.details {
            GiftType::Exempt { exemption_type } => Some(GiftSummary {
                gift_id: gift.id.clone(),
                date: gift.date_of_gift,
                value: gift.value,
                exemption_type: exemption_type.display().to_string(),
            }),
            _ => None,
        })
        .collect()
}

/// Calculate IHT for an estate.
///
/// The tax year is derived from the date of death unless supplied. An
/// unknown tax year is a fatal configuration error; everything else comes
/// back as a `CalculationOutcome`.
pub fn calculate_iht(
    estate: &Estate,
    tax_year: Option<TaxYear>,
) -> Result<CalculationOutcome, ConfigError> {
    let year = tax_year.unwrap_or_else(|| TaxYear::from_date(estate.deceased.date_of_death));
    let config = year.config()?;
    log::debug!("calculating IHT for tax year {}", year);

    let errors = validate_estate(estate);
    if !errors.is_empty() {
        return Ok(CalculationOutcome::Failure { errors });
    }

    // 1-2. Valuation and liability deduction
    let gross = gross_estate(&estate.assets);
    let gross_total = gross.total();
    let net_estate = deduct_liabilities(gross_total, &estate.liabilities);

    // 3. Business and agricultural property relief
    let reliefs = apply_reliefs(&estate.assets, net_estate);

    // 4. Spouse and charity exemptions, death rate selection
    let exemptions = calculate_exemptions(ExemptionInput {
        estate,
        value_after_reliefs: reliefs.value_after_reliefs,
        nil_rate_band: config.nil_rate_band,
        standard_rate: config.standard_rate,
        charity_rate: config.charity_rate,
        charity_rate_min_percentage: config.charity_rate_min_percentage,
    });

    // 5. Thresholds and lifetime-gift impact
    let thresholds = calculate_thresholds(ThresholdInput {
        estate,
        net_estate,
        chargeable_estate: exemptions.chargeable_estate,
        config: &config,
        tax_rate: exemptions.tax_rate,
        nrb_consumed_by_spouse_exemption: exemptions.nrb_consumed_by_spouse_exemption,
    });

    // 6. Quick succession relief on the estate tax
    let qsr = calculate_qsr(QsrInput {
        date_of_death: estate.deceased.date_of_death,
        claim: estate.quick_succession_relief.as_ref(),
        chargeable_estate: exemptions.chargeable_estate,
        available_threshold: thresholds.available_threshold,
        tax_rate: exemptions.tax_rate,
        estate_tax_before_qsr: thresholds.estate_tax,
        trust_interests_value: estate.trust_interest_total(),
    });

    let estate_tax = qsr.estate_tax_after_qsr;
    let total_tax_payable = estate_tax + thresholds.gift_tax;

    let summary = TaxSummary {
        tax_year: year.display(),
        gross_estate: gross_total,
        net_estate,
        total_reliefs: reliefs.breakdown.total_reliefs,
        total_exemptions: exemptions.total_exemptions,
        chargeable_estate: exemptions.chargeable_estate,
        available_threshold: thresholds.available_threshold,
        taxable_amount: thresholds.estate_taxable_amount,
        tax_rate: exemptions.tax_rate,
        estate_tax,
        gift_tax: thresholds.gift_tax,
        quick_succession_relief: qsr.relief_applied,
        total_tax_payable,
    };

    let breakdown = CalculationBreakdown {
        estate_valuation: valuation_breakdown(&gross, &estate.liabilities, net_estate),
        relief_application: reliefs.breakdown,
        exemption_application: ExemptionBreakdown {
            spouse_exemption: exemptions.spouse_exemption,
            charity_exemption: exemptions.charity_exemption,
            other_exemptions: exemptions.other_exemptions,
            total_exemptions: exemptions.total_exemptions,
            spouse_exemption_capped: exemptions.spouse_exemption_capped,
            charity_rate_applies: exemptions.charity_rate_qualifies,
        },
        threshold_calculation: ThresholdBreakdown {
            basic_nrb: thresholds.basic_nrb,
            transferred_nrb: thresholds.transferred_nrb,
            total_nrb: thresholds.total_nrb,
            gross_rnrb: thresholds.gross_rnrb,
            transferred_rnrb: thresholds.transferred_rnrb,
            taper_reduction: thresholds.taper_reduction,
            applied_rnrb: thresholds.applied_rnrb,
            nrb_used_by_gifts: thresholds.nrb_used_by_gifts,
            remaining_threshold: thresholds.available_threshold,
        },
        tax_calculation: TaxBreakdown {
            chargeable_estate: exemptions.chargeable_estate,
            available_threshold: thresholds.available_threshold,
            taxable_amount: thresholds.estate_taxable_amount,
            tax_rate: exemptions.tax_rate,
            charity_rate_applies: exemptions.charity_rate_qualifies,
            gross_tax: thresholds.estate_tax,
            quick_succession_relief: qsr.relief_applied,
            net_tax: estate_tax,
        },
        quick_succession_relief: qsr.to_breakdown(),
    };

    let gift_analysis = GiftAnalysis {
        total_gifts_in_7_years: thresholds.total_gifts_in_7_years,
        exempt_gifts: exempt_gift_summaries(estate),
        chargeable_gifts: thresholds.chargeable_gifts,
        total_gift_tax: thresholds.gift_tax,
        nrb_consumed_by_gifts: thresholds.nrb_used_by_gifts,
    };

    Ok(CalculationOutcome::Success(CalculationResult {
        summary,
        breakdown,
        gift_analysis,
        warnings: exemptions.warnings,
        audit_trail: Vec::new(),
    }))
}
