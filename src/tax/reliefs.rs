//! Business and Agricultural Property Relief.
//!
//! BPR and APR reduce the value of qualifying assets before exemptions and
//! thresholds apply. Agricultural assets use APR-then-BPR composition: the
//! agricultural-use value attracts APR and any remaining market value can
//! attract BPR at a caller-supplied rate (the trust engine uses this; the
//! estate pipeline does not).

use crate::estate::{Asset, AssetType, OccupationType};
use crate::report::{ReliefBreakdown, ReliefDetail};
use rust_decimal::Decimal;

/// Minimum ownership years for BPR and owner-occupied APR
const MIN_OWNERSHIP_YEARS: u32 = 2;
/// Minimum ownership years for APR on let land
const MIN_OWNERSHIP_YEARS_LET: u32 = 7;

/// BPR requires qualifying status and two years of ownership.
pub fn is_bpr_eligible(qualifies: bool, ownership_duration: u32) -> bool {
    qualifies && ownership_duration >= MIN_OWNERSHIP_YEARS
}

/// APR requires qualifying status and two years owner-occupied or seven
/// years let.
pub fn is_apr_eligible(
    qualifies: bool,
    occupation_type: OccupationType,
    ownership_duration: u32,
) -> bool {
    if !qualifies {
        return false;
    }
    let min_years = match occupation_type {
        OccupationType::OwnerOccupied => MIN_OWNERSHIP_YEARS,
        OccupationType::LetQualified | OccupationType::LetOther => MIN_OWNERSHIP_YEARS_LET,
    };
    ownership_duration >= min_years
}

/// APR-then-BPR composition over a single asset
#[derive(Debug, Clone)]
pub struct AprThenBpr {
    pub apr_relief: Decimal,
    pub bpr_relief: Decimal,
    pub total_relief: Decimal,
    pub net_value: Decimal,
}

/// Apply APR to the agricultural-use value, then optionally BPR to the
/// remaining non-agricultural value.
pub fn apply_apr_then_bpr(
    market_value: Decimal,
    agricultural_value: Decimal,
    apr_rate: Decimal,
    bpr_rate: Option<Decimal>,
) -> AprThenBpr {
    let apr_base = market_value.min(agricultural_value);
    let apr_relief = apr_base * apr_rate / Decimal::ONE_HUNDRED;

    let non_agricultural = (market_value - apr_base).max(Decimal::ZERO);
    let bpr_relief = match bpr_rate {
        Some(rate) => non_agricultural * rate / Decimal::ONE_HUNDRED,
        None => Decimal::ZERO,
    };

    let total_relief = apr_relief + bpr_relief;
    let net_value = (market_value - total_relief).max(Decimal::ZERO);

    AprThenBpr {
        apr_relief,
        bpr_relief,
        total_relief,
        net_value,
    }
}

/// Outcome of relief application over a set of assets
#[derive(Debug, Clone)]
pub struct ReliefOutcome {
    /// The base value reduced by total reliefs, floored at zero
    pub value_after_reliefs: Decimal,
    pub breakdown: ReliefBreakdown,
}

/// Apply BPR and APR to every qualifying asset, reducing `base_value`.
pub fn apply_reliefs(assets: &[Asset], base_value: Decimal) -> ReliefOutcome {
    let mut bpr_details: Vec<ReliefDetail> = Vec::new();
    let mut apr_details: Vec<ReliefDetail> = Vec::new();
    let mut total_bpr = Decimal::ZERO;
    let mut total_apr = Decimal::ZERO;

    for asset in assets {
        match &asset.details {
            AssetType::Business {
                bpr,
                ownership_duration,
                ..
            } if is_bpr_eligible(bpr.qualifies, *ownership_duration) => {
                let gross = asset.owned_value();
                let rate = Decimal::from(bpr.relief_rate);
                let relief_amount = gross * rate / Decimal::ONE_HUNDRED;
                let net_value = (gross - relief_amount).max(Decimal::ZERO);
                log::debug!(
                    "BPR {}: owned {} at {}% -> relief {}",
                    asset.id,
                    gross,
                    rate,
                    relief_amount
                );

                bpr_details.push(ReliefDetail {
                    asset_id: asset.id.clone(),
                    asset_description: asset.description.clone(),
                    gross_value: gross,
                    relief_rate: rate,
                    relief_amount,
                    net_value,
                });
                total_bpr += relief_amount;
            }
            AssetType::Agricultural {
                apr,
                agricultural_value,
                occupation_type,
                ownership_duration,
                ..
            } if is_apr_eligible(apr.qualifies, *occupation_type, *ownership_duration) => {
                let market_value = asset.owned_value();
                let owned_agricultural =
                    *agricultural_value * asset.ownership_share / Decimal::ONE_HUNDRED;
                let rate = Decimal::from(apr.relief_rate);

                // Estate-level agricultural assets get no BPR on the excess
                let relief = apply_apr_then_bpr(market_value, owned_agricultural, rate, None);
                log::debug!(
                    "APR {}: market {} agricultural {} at {}% -> relief {}",
                    asset.id,
                    market_value,
                    owned_agricultural,
                    rate,
                    relief.apr_relief
                );

                apr_details.push(ReliefDetail {
                    asset_id: asset.id.clone(),
                    asset_description: asset.description.clone(),
                    gross_value: market_value,
                    relief_rate: rate,
                    relief_amount: relief.apr_relief,
                    net_value: relief.net_value,
                });
                total_apr += relief.apr_relief;
            }
            _ => {}
        }
    }

    let total_reliefs = total_bpr + total_apr;
    let value_after_reliefs = (base_value - total_reliefs).max(Decimal::ZERO);

    ReliefOutcome {
        value_after_reliefs,
        breakdown: ReliefBreakdown {
            bpr_details,
            apr_details,
            total_bpr,
            total_apr,
            total_reliefs,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estate::{AgriculturalType, AprEligibility, BprEligibility, BusinessType};
    use rust_decimal_macros::dec;

    fn business(
        id: &str,
        value: Decimal,
        qualifies: bool,
        relief_rate: u8,
        ownership_duration: u32,
    ) -> Asset {
        Asset {
            id: id.to_string(),
            description: "Business".to_string(),
            gross_value: value,
            ownership_share: dec!(100),
            valuation_date: None,
            details: AssetType::Business {
                business_type: BusinessType::UnquotedShares,
                bpr: BprEligibility {
                    qualifies,
                    relief_rate,
                    reason: None,
                },
                ownership_duration,
            },
        }
    }

    fn agricultural(
        id: &str,
        market: Decimal,
        agricultural_value: Decimal,
        occupation_type: OccupationType,
        ownership_duration: u32,
    ) -> Asset {
        Asset {
            id: id.to_string(),
            description: "Farm".to_string(),
            gross_value: market,
            ownership_share: dec!(100),
            valuation_date: None,
            details: AssetType::Agricultural {
                agricultural_type: AgriculturalType::Farmland,
                apr: AprEligibility {
                    qualifies: true,
                    relief_rate: 100,
                    reason: None,
                },
                agricultural_value,
                occupation_type,
                ownership_duration,
            },
        }
    }

    #[test]
    fn bpr_full_relief_on_qualifying_shares() {
        let assets = vec![business("b1", dec!(300000), true, 100, 5)];
        let outcome = apply_reliefs(&assets, dec!(800000));

        assert_eq!(outcome.breakdown.total_bpr, dec!(300000));
        assert_eq!(outcome.value_after_reliefs, dec!(500000));
        assert_eq!(outcome.breakdown.bpr_details.len(), 1);
        assert_eq!(outcome.breakdown.bpr_details[0].net_value, Decimal::ZERO);
    }

    #[test]
    fn bpr_half_relief_rate() {
        let assets = vec![business("b1", dec!(200000), true, 50, 3)];
        let outcome = apply_reliefs(&assets, dec!(500000));
        assert_eq!(outcome.breakdown.total_bpr, dec!(100000));
        assert_eq!(outcome.value_after_reliefs, dec!(400000));
    }

    #[test]
    fn bpr_denied_under_two_years_ownership() {
        let assets = vec![business("b1", dec!(300000), true, 100, 1)];
        let outcome = apply_reliefs(&assets, dec!(800000));
        assert_eq!(outcome.breakdown.total_bpr, Decimal::ZERO);
        assert_eq!(outcome.value_after_reliefs, dec!(800000));
    }

    #[test]
    fn bpr_denied_when_not_qualifying() {
        let assets = vec![business("b1", dec!(300000), false, 100, 10)];
        let outcome = apply_reliefs(&assets, dec!(800000));
        assert_eq!(outcome.breakdown.total_bpr, Decimal::ZERO);
    }

    #[test]
    fn apr_uses_agricultural_value_not_market_value() {
        // Market value 500k but agricultural value only 350k: APR covers 350k
        let assets = vec![agricultural(
            "a1",
            dec!(500000),
            dec!(350000),
            OccupationType::OwnerOccupied,
            3,
        )];
        let outcome = apply_reliefs(&assets, dec!(900000));
        assert_eq!(outcome.breakdown.total_apr, dec!(350000));
        assert_eq!(outcome.value_after_reliefs, dec!(550000));
    }

    #[test]
    fn apr_let_land_needs_seven_years() {
        let under = vec![agricultural(
            "a1",
            dec!(400000),
            dec!(400000),
            OccupationType::LetQualified,
            6,
        )];
        assert_eq!(
            apply_reliefs(&under, dec!(400000)).breakdown.total_apr,
            Decimal::ZERO
        );

        let over = vec![agricultural(
            "a2",
            dec!(400000),
            dec!(400000),
            OccupationType::LetQualified,
            7,
        )];
        assert_eq!(
            apply_reliefs(&over, dec!(400000)).breakdown.total_apr,
            dec!(400000)
        );
    }

    #[test]
    fn apr_then_bpr_composition() {
        // 500k market, 350k agricultural: APR 100% on 350k, BPR 50% on the
        // 150k excess
        let relief = apply_apr_then_bpr(dec!(500000), dec!(350000), dec!(100), Some(dec!(50)));
        assert_eq!(relief.apr_relief, dec!(350000));
        assert_eq!(relief.bpr_relief, dec!(75000));
        assert_eq!(relief.total_relief, dec!(425000));
        assert_eq!(relief.net_value, dec!(75000));
    }

    #[test]
    fn apr_then_bpr_without_bpr_rate() {
        let relief = apply_apr_then_bpr(dec!(500000), dec!(350000), dec!(100), None);
        assert_eq!(relief.apr_relief, dec!(350000));
        assert_eq!(relief.bpr_relief, Decimal::ZERO);
        assert_eq!(relief.net_value, dec!(150000));
    }

    #[test]
    fn reliefs_never_push_base_below_zero() {
        let assets = vec![business("b1", dec!(300000), true, 100, 5)];
        let outcome = apply_reliefs(&assets, dec!(100000));
        assert_eq!(outcome.value_after_reliefs, Decimal::ZERO);
    }

    #[test]
    fn mixed_reliefs_accumulate() {
        let assets = vec![
            business("b1", dec!(200000), true, 100, 4),
            agricultural(
                "a1",
                dec!(300000),
                dec!(300000),
                OccupationType::OwnerOccupied,
                2,
            ),
        ];
        let outcome = apply_reliefs(&assets, dec!(1000000));
        assert_eq!(outcome.breakdown.total_bpr, dec!(200000));
        assert_eq!(outcome.breakdown.total_apr, dec!(300000));
        assert_eq!(outcome.breakdown.total_reliefs, dec!(500000));
        assert_eq!(outcome.value_after_reliefs, dec!(500000));
    }
}
