//! Output model for estate calculations: headline summary, per-stage
//! breakdown, gift analysis and advisory warnings.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Result of an estate calculation: either a full set of figures, or the
/// field-level validation errors that stopped the pipeline from running.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CalculationOutcome {
    Success(CalculationResult),
    Failure { errors: Vec<ValidationError> },
}

impl CalculationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CalculationOutcome::Success(_))
    }

    pub fn success(&self) -> Option<&CalculationResult> {
        match self {
            CalculationOutcome::Success(result) => Some(result),
            CalculationOutcome::Failure { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculationResult {
    pub summary: TaxSummary,
    pub breakdown: CalculationBreakdown,
    pub gift_analysis: GiftAnalysis,
    pub warnings: Vec<Warning>,
    /// Reserved extension point; nothing populates it yet
    pub audit_trail: Vec<AuditEntry>,
}

/// Headline figures
#[derive(Debug, Clone, Serialize)]
pub struct TaxSummary {
    pub tax_year: String,
    pub gross_estate: Decimal,
    pub net_estate: Decimal,
    pub total_reliefs: Decimal,
    pub total_exemptions: Decimal,
    pub chargeable_estate: Decimal,
    pub available_threshold: Decimal,
    pub taxable_amount: Decimal,
    /// Estate death rate applied, percent
    pub tax_rate: Decimal,
    pub estate_tax: Decimal,
    pub gift_tax: Decimal,
    pub quick_succession_relief: Decimal,
    pub total_tax_payable: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculationBreakdown {
    pub estate_valuation: EstateValuationBreakdown,
    pub relief_application: ReliefBreakdown,
    pub exemption_application: ExemptionBreakdown,
    pub threshold_calculation: ThresholdBreakdown,
    pub tax_calculation: TaxBreakdown,
    pub quick_succession_relief: QsrBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct EstateValuationBreakdown {
    pub property_total: Decimal,
    pub financial_total: Decimal,
    pub business_total: Decimal,
    pub agricultural_total: Decimal,
    pub personal_total: Decimal,
    pub trust_interests_total: Decimal,
    pub gross_total: Decimal,
    pub liabilities: Decimal,
    pub funeral_expenses: Decimal,
    pub net_total: Decimal,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReliefBreakdown {
    pub bpr_details: Vec<ReliefDetail>,
    pub apr_details: Vec<ReliefDetail>,
    pub total_bpr: Decimal,
    pub total_apr: Decimal,
    pub total_reliefs: Decimal,
}

/// Relief applied to a single asset
#[derive(Debug, Clone, Serialize)]
pub struct ReliefDetail {
    pub asset_id: String,
    pub asset_description: String,
    pub gross_value: Decimal,
    /// Relief rate applied, percent
    pub relief_rate: Decimal,
    pub relief_amount: Decimal,
    pub net_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExemptionBreakdown {
    pub spouse_exemption: Decimal,
    pub charity_exemption: Decimal,
    pub other_exemptions: Decimal,
    pub total_exemptions: Decimal,
    pub spouse_exemption_capped: bool,
    pub charity_rate_applies: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdBreakdown {
    pub basic_nrb: Decimal,
    pub transferred_nrb: Decimal,
    pub total_nrb: Decimal,
    pub gross_rnrb: Decimal,
    pub transferred_rnrb: Decimal,
    pub taper_reduction: Decimal,
    pub applied_rnrb: Decimal,
    pub nrb_used_by_gifts: Decimal,
    pub remaining_threshold: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxBreakdown {
    pub chargeable_estate: Decimal,
    pub available_threshold: Decimal,
    pub taxable_amount: Decimal,
    pub tax_rate: Decimal,
    pub charity_rate_applies: bool,
    pub gross_tax: Decimal,
    pub quick_succession_relief: Decimal,
    pub net_tax: Decimal,
}

/// How quick succession relief was apportioned between the free estate and
/// trust-held property
#[derive(Debug, Clone, Default, Serialize)]
pub struct QsrBreakdown {
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
}

#[derive(Debug, Clone, Serialize)]
pub struct GiftAnalysis {
    pub total_gifts_in_7_years: Decimal,
    pub exempt_gifts: Vec<GiftSummary>,
    pub chargeable_gifts: Vec<ChargeableGiftSummary>,
    pub total_gift_tax: Decimal,
    pub nrb_consumed_by_gifts: Decimal,
}

/// An exempt gift within the seven-year window
#[derive(Debug, Clone, Serialize)]
pub struct GiftSummary {
    pub gift_id: String,
    pub date: NaiveDate,
    pub value: Decimal,
    pub exemption_type: String,
}

/// Per-gift tax detail for a chargeable lifetime gift
#[derive(Debug, Clone, Serialize)]
pub struct ChargeableGiftSummary {
    pub gift_id: String,
    pub date: NaiveDate,
    /// Transfer value after any grossing-up
    pub gross_value: Decimal,
    pub annual_exemption_applied: Decimal,
    pub chargeable_value: Decimal,
    pub years_before_death: f64,
    /// Tapered rate applied to the taxable portion, percent
    pub taper_rate: Decimal,
    pub tax_due: Decimal,
    pub paid_by: GiftTaxPayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftTaxPayer {
    Estate,
    Recipient,
}

/// Coded advisory message attached to a successful calculation
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_item_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub step: String,
    pub description: String,
    pub output_value: Decimal,
}

/// A structural violation found before the pipeline runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Path to the offending field, e.g. "assets[2].ownership_share"
    pub field: String,
    pub code: String,
    pub message: String,
}
