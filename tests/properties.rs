//! Property tests over the calculation pipeline.

use chrono::NaiveDate;
use ihtc::config::TaxYear;
use ihtc::estate::{
    Asset, AssetType, Beneficiary, DeceasedPerson, DomicileStatus, Estate, FinancialType,
    GiftRecipient, GiftType, InheritanceType, Liability, LiabilityType, LifetimeGift,
    MaritalStatus, PetStatus, RecipientType, Relationship,
};
use ihtc::tax::calculate_iht;
use ihtc::tax::threshold::{calculate_thresholds, ThresholdInput};
use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn estate_with(assets_value: u64, liabilities: u64, gift_value: u64, gift_days_before: i64) -> Estate {
    let death = date(2025, 6, 15);
    Estate {
        deceased: DeceasedPerson {
            date_of_death: death,
            domicile: DomicileStatus::UkDomiciled,
            marital_status: MaritalStatus::Single,
            has_direct_descendants: false,
        },
        assets: vec![Asset {
            id: "f1".to_string(),
            description: "Savings".to_string(),
            gross_value: Decimal::from(assets_value),
            ownership_share: dec!(100),
            valuation_date: None,
            details: AssetType::Financial {
                financial_type: FinancialType::BankAccount,
                is_in_trust: false,
            },
        }],
        liabilities: vec![Liability {
            id: "l1".to_string(),
            liability_type: LiabilityType::OtherDebt,
            amount: Decimal::from(liabilities),
            description: "Debt".to_string(),
            linked_asset_id: None,
        }],
        gifts: vec![LifetimeGift {
            id: "g1".to_string(),
            date_of_gift: death - chrono::Duration::days(gift_days_before),
            value: Decimal::from(gift_value),
            recipient: GiftRecipient {
                recipient_type: RecipientType::Individual,
                name: "Recipient".to_string(),
                relationship: None,
            },
            description: None,
            details: GiftType::Pet {
                pet_status: PetStatus::PotentiallyExempt,
            },
        }],
        beneficiaries: vec![Beneficiary {
            id: "child".to_string(),
            name: "Child".to_string(),
            relationship: Relationship::Child,
            inheritance_type: InheritanceType::Taxable,
            specific_bequests: vec![],
            residuary_share: Some(dec!(100)),
        }],
        residence: None,
        predecessor_estate: None,
        quick_succession_relief: None,
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn figures_never_negative(
        assets in 0u64..5_000_000,
        liabilities in 0u64..5_000_000,
        gift in 0u64..2_000_000,
        days in 0i64..4000,
    ) {
        let estate = estate_with(assets, liabilities, gift, days);
        let outcome = calculate_iht(&estate, None).unwrap();
        let result = outcome.success().unwrap();

        prop_assert!(result.summary.chargeable_estate >= Decimal::ZERO);
        prop_assert!(result.summary.taxable_amount >= Decimal::ZERO);
        prop_assert!(result.summary.estate_tax >= Decimal::ZERO);
        prop_assert!(result.summary.gift_tax >= Decimal::ZERO);
        prop_assert!(result.summary.total_tax_payable >= Decimal::ZERO);
    }

    #[test]
    fn total_is_estate_tax_plus_gift_tax(
        assets in 0u64..5_000_000,
        liabilities in 0u64..1_000_000,
        gift in 0u64..2_000_000,
        days in 0i64..4000,
    ) {
        let estate = estate_with(assets, liabilities, gift, days);
        let outcome = calculate_iht(&estate, None).unwrap();
        let result = outcome.success().unwrap();

        prop_assert_eq!(
            result.summary.total_tax_payable,
            result.summary.estate_tax + result.summary.gift_tax
        );
    }

    #[test]
    fn identical_inputs_identical_outputs(
        assets in 0u64..5_000_000,
        gift in 0u64..2_000_000,
        days in 0i64..4000,
    ) {
        let estate = estate_with(assets, 0, gift, days);
        let first = calculate_iht(&estate, None).unwrap();
        let second = calculate_iht(&estate, None).unwrap();
        let (a, b) = (first.success().unwrap(), second.success().unwrap());

        prop_assert_eq!(a.summary.total_tax_payable, b.summary.total_tax_payable);
        prop_assert_eq!(a.summary.available_threshold, b.summary.available_threshold);
        prop_assert_eq!(a.summary.taxable_amount, b.summary.taxable_amount);
    }

    #[test]
    fn threshold_monotonic_in_basic_nrb(
        chargeable in 0u64..3_000_000,
        gift in 0u64..1_000_000,
        days in 0i64..2555,
        bump in 1u64..200_000,
    ) {
        let estate = estate_with(chargeable, 0, gift, days);
        let base_config = TaxYear(2026).config().unwrap();
        let mut bumped_config = base_config.clone();
        bumped_config.nil_rate_band += Decimal::from(bump);

        let base = calculate_thresholds(ThresholdInput {
            estate: &estate,
            net_estate: Decimal::from(chargeable),
            chargeable_estate: Decimal::from(chargeable),
            config: &base_config,
            tax_rate: base_config.standard_rate,
            nrb_consumed_by_spouse_exemption: Decimal::ZERO,
        });
        let bumped = calculate_thresholds(ThresholdInput {
            estate: &estate,
            net_estate: Decimal::from(chargeable),
            chargeable_estate: Decimal::from(chargeable),
            config: &bumped_config,
            tax_rate: bumped_config.standard_rate,
            nrb_consumed_by_spouse_exemption: Decimal::ZERO,
        });

        prop_assert!(bumped.available_threshold >= base.available_threshold);
        prop_assert!(bumped.estate_tax <= base.estate_tax);
    }
}
