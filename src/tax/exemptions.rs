//! Spouse and charity exemptions.
//!
//! Bequests are valued as specific bequests (cash plus referenced-asset
//! owned value) plus a residuary share of what remains after every
//! beneficiary's specific bequests. The non-UK-domicile spouse cap and the
//! 36% charity-rate qualification both live here.

use crate::estate::{Estate, InheritanceType};
use crate::report::{Severity, Warning};
use rust_decimal::Decimal;

pub struct ExemptionInput<'a> {
    pub estate: &'a Estate,
    pub value_after_reliefs: Decimal,
    pub nil_rate_band: Decimal,
    pub standard_rate: Decimal,
    pub charity_rate: Decimal,
    pub charity_rate_min_percentage: Decimal,
}

#[derive(Debug, Clone)]
pub struct ExemptionResult {
    pub spouse_exemption: Decimal,
    pub charity_exemption: Decimal,
    pub other_exemptions: Decimal,
    pub total_exemptions: Decimal,
    pub chargeable_estate: Decimal,
    pub spouse_exemption_capped: bool,
    /// NRB consumed by the capped spouse exemption, fed to the threshold
    /// engine
    pub nrb_consumed_by_spouse_exemption: Decimal,
    pub baseline_for_charity_rate: Decimal,
    pub charity_threshold: Decimal,
    pub charity_rate_qualifies: bool,
    /// Death rate for the estate: charity rate when qualified, else standard
    pub tax_rate: Decimal,
    pub warnings: Vec<Warning>,
}

/// Specific bequests for one beneficiary: cash plus referenced assets.
/// Unknown asset ids contribute zero.
fn specific_bequests_for(estate: &Estate, beneficiary_id: &str) -> Decimal {
    let Some(beneficiary) = estate.beneficiaries.iter().find(|b| b.id == beneficiary_id) else {
        return Decimal::ZERO;
    };

    beneficiary
        .specific_bequests
        .iter()
        .map(|bequest| {
            let asset_value = bequest
                .asset_id
                .as_deref()
                .map(|id| estate.asset_owned_value(id))
                .unwrap_or(Decimal::ZERO);
            let cash = bequest.cash_amount.unwrap_or(Decimal::ZERO);
            asset_value + cash
        })
        .sum()
}

fn total_specific_bequests(estate: &Estate) -> Decimal {
    estate
        .beneficiaries
        .iter()
        .map(|b| specific_bequests_for(estate, &b.id))
        .sum()
}

/// Total bequest for one beneficiary: specific bequests plus residuary
/// share of the residue left after ALL beneficiaries' specific bequests.
fn beneficiary_bequest(estate: &Estate, beneficiary_id: &str, value_after_reliefs: Decimal) -> Decimal {
    let Some(beneficiary) = estate.beneficiaries.iter().find(|b| b.id == beneficiary_id) else {
        return Decimal::ZERO;
    };

    let specific = specific_bequests_for(estate, beneficiary_id);
    let residue = (value_after_reliefs - total_specific_bequests(estate)).max(Decimal::ZERO);
    let residuary_percent = beneficiary.residuary_share.unwrap_or(Decimal::ZERO);
    let residuary = residue * residuary_percent / Decimal::ONE_HUNDRED;

    specific + residuary
}

fn bequests_by_type(
    estate: &Estate,
    inheritance_type: InheritanceType,
    value_after_reliefs: Decimal,
) -> Decimal {
    estate
        .beneficiaries
        .iter()
        .filter(|b| b.inheritance_type == inheritance_type)
        .map(|b| beneficiary_bequest(estate, &b.id, value_after_reliefs))
        .sum()
}

pub fn calculate_exemptions(input: ExemptionInput<'_>) -> ExemptionResult {
    let spouse_bequest = bequests_by_type(
        input.estate,
        InheritanceType::ExemptSpouse,
        input.value_after_reliefs,
    );
    let charity_bequest = bequests_by_type(
        input.estate,
        InheritanceType::ExemptCharity,
        input.value_after_reliefs,
    );

    let mut warnings = Vec::new();
    let mut spouse_exemption = spouse_bequest;
    let mut spouse_exemption_capped = false;
    let mut nrb_consumed_by_spouse_exemption = Decimal::ZERO;

    if input.estate.deceased.non_uk_spouse_cap_applies() {
        spouse_exemption = spouse_bequest.min(input.nil_rate_band);
        spouse_exemption_capped = spouse_bequest > input.nil_rate_band;
        nrb_consumed_by_spouse_exemption = spouse_exemption;

        if spouse_exemption_capped {
            log::debug!(
                "non-dom spouse cap: bequest {} capped to NRB {}",
                spouse_bequest,
                input.nil_rate_band
            );
            warnings.push(Warning {
                code: "W001".to_string(),
                severity: Severity::Warning,
                message: "Spouse exemption capped at the nil-rate band due to non-UK domicile. \
                          An election under IHTA 1984 s.267ZA can access the unlimited exemption."
                    .to_string(),
                related_item_id: None,
            });
        }
    }

    let charity_exemption = charity_bequest;
    let other_exemptions = Decimal::ZERO;
    let total_exemptions = spouse_exemption + charity_exemption + other_exemptions;
    let chargeable_estate = (input.value_after_reliefs - total_exemptions).max(Decimal::ZERO);

    // The 36% rate requires the charity legacy to reach 10% of the baseline:
    // the estate after reliefs less the spouse exemption
    let baseline_for_charity_rate =
        (input.value_after_reliefs - spouse_exemption).max(Decimal::ZERO);
    let charity_threshold =
        baseline_for_charity_rate * input.charity_rate_min_percentage / Decimal::ONE_HUNDRED;
    let charity_rate_qualifies =
        charity_exemption > Decimal::ZERO && charity_exemption >= charity_threshold;
    let tax_rate = if charity_rate_qualifies {
        input.charity_rate
    } else {
        input.standard_rate
    };

    ExemptionResult {
        spouse_exemption,
        charity_exemption,
        other_exemptions,
        total_exemptions,
        chargeable_estate,
        spouse_exemption_capped,
        nrb_consumed_by_spouse_exemption,
        baseline_for_charity_rate,
        charity_threshold,
        charity_rate_qualifies,
        tax_rate,
        warnings,
    }
}
