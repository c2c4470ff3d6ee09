//! Estate valuation: gross estate totals by asset class and liability
//! deduction.

use crate::estate::{Asset, AssetType, Liability, LiabilityType};
use crate::report::EstateValuationBreakdown;
use rust_decimal::Decimal;

/// Gross estate figures, totalled per asset class
#[derive(Debug, Clone, Default)]
pub struct GrossEstate {
    pub property: Decimal,
    pub financial: Decimal,
    pub business: Decimal,
    pub agricultural: Decimal,
    pub personal: Decimal,
    pub trust_interests: Decimal,
}

impl GrossEstate {
    pub fn total(&self) -> Decimal {
        self.property
            + self.financial
            + self.business
            + self.agricultural
            + self.personal
            + self.trust_interests
    }
}

/// Sum owned asset values into a gross estate figure.
pub fn gross_estate(assets: &[Asset]) -> GrossEstate {
    let mut totals = GrossEstate::default();
    for asset in assets {
        let owned = asset.owned_value();
        match asset.details {
            AssetType::Property { .. } => totals.property += owned,
            AssetType::Financial { .. } => totals.financial += owned,
            AssetType::Business { .. } => totals.business += owned,
            AssetType::Agricultural { .. } => totals.agricultural += owned,
            AssetType::Personal { .. } => totals.personal += owned,
            AssetType::TrustInterest { .. } => totals.trust_interests += owned,
        }
    }
    totals
}

/// Deduct debts from the gross estate, floored at zero.
pub fn deduct_liabilities(gross: Decimal, liabilities: &[Liability]) -> Decimal {
    let total: Decimal = liabilities.iter().map(|l| l.amount).sum();
    (gross - total).max(Decimal::ZERO)
}

/// Funeral expenses are reported separately in the valuation breakdown.
pub fn funeral_expenses(liabilities: &[Liability]) -> Decimal {
    liabilities
        .iter()
        .filter(|l| l.liability_type == LiabilityType::FuneralExpenses)
        .map(|l| l.amount)
        .sum()
}

pub fn valuation_breakdown(
    gross: &GrossEstate,
    liabilities: &[Liability],
    net_estate: Decimal,
) -> EstateValuationBreakdown {
    let gross_total = gross.total();
    EstateValuationBreakdown {
        property_total: gross.property,
        financial_total: gross.financial,
        business_total: gross.business,
        agricultural_total: gross.agricultural,
        personal_total: gross.personal,
        trust_interests_total: gross.trust_interests,
        gross_total,
        liabilities: gross_total - net_estate,
        funeral_expenses: funeral_expenses(liabilities),
        net_total: net_estate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estate::{FinancialType, PropertyType};
    use rust_decimal_macros::dec;

    fn property(id: &str, value: Decimal, share: Decimal) -> Asset {
        Asset {
            id: id.to_string(),
            description: "Property".to_string(),
            gross_value: value,
            ownership_share: share,
            valuation_date: None,
            details: AssetType::Property {
                property_type: PropertyType::MainResidence,
                is_main_residence: true,
            },
        }
    }

    fn financial(id: &str, value: Decimal) -> Asset {
        Asset {
            id: id.to_string(),
            description: "Savings".to_string(),
            gross_value: value,
            ownership_share: dec!(100),
            valuation_date: None,
            details: AssetType::Financial {
                financial_type: FinancialType::BankAccount,
                is_in_trust: false,
            },
        }
    }

    fn liability(liability_type: LiabilityType, amount: Decimal) -> Liability {
        Liability {
            id: "liab".to_string(),
            liability_type,
            amount,
            description: "Debt".to_string(),
            linked_asset_id: None,
        }
    }

    #[test]
    fn gross_estate_applies_ownership_share_per_class() {
        let assets = vec![
            property("p1", dec!(400000), dec!(50)),
            financial("f1", dec!(100000)),
        ];
        let gross = gross_estate(&assets);
        assert_eq!(gross.property, dec!(200000));
        assert_eq!(gross.financial, dec!(100000));
        assert_eq!(gross.total(), dec!(300000));
    }

    #[test]
    fn liabilities_reduce_to_net_floored_at_zero() {
        let liabilities = vec![
            liability(LiabilityType::Mortgage, dec!(150000)),
            liability(LiabilityType::CreditCard, dec!(5000)),
        ];
        assert_eq!(deduct_liabilities(dec!(300000), &liabilities), dec!(145000));
        assert_eq!(deduct_liabilities(dec!(100000), &liabilities), Decimal::ZERO);
    }

    #[test]
    fn funeral_expenses_split_out() {
        let liabilities = vec![
            liability(LiabilityType::Mortgage, dec!(150000)),
            liability(LiabilityType::FuneralExpenses, dec!(4000)),
        ];
        assert_eq!(funeral_expenses(&liabilities), dec!(4000));
        // Still deducted along with everything else
        assert_eq!(deduct_liabilities(dec!(300000), &liabilities), dec!(146000));
    }
}
