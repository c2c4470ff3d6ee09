use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input root for an estate calculation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EstateInput {
    #[serde(default)]
    pub tax_year: Option<String>,
    pub estate: Estate,
}

/// A deceased person's estate: everything the calculation reads.
///
/// The engine never mutates an estate; each calculation call reads it and
/// returns a fresh outcome.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Estate {
    pub deceased: DeceasedPerson,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub liabilities: Vec<Liability>,
    #[serde(default)]
    pub gifts: Vec<LifetimeGift>,
    #[serde(default)]
    pub beneficiaries: Vec<Beneficiary>,
    /// Qualifying residence details, required for any RNRB claim
    #[serde(default)]
    pub residence: Option<ResidenceDetails>,
    /// Predecessor spouse/civil partner's estate, for transferred NRB/RNRB
    #[serde(default)]
    pub predecessor_estate: Option<PredecessorEstate>,
    #[serde(default)]
    pub quick_succession_relief: Option<QsrClaim>,
}

impl Estate {
    /// Find an asset by id. Dangling references are tolerated and resolve
    /// to `None`, contributing zero to any bequest that names them.
    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Owned value of a referenced asset, zero when the id is unknown.
    pub fn asset_owned_value(&self, id: &str) -> Decimal {
        self.asset(id).map(Asset::owned_value).unwrap_or(Decimal::ZERO)
    }

    /// Total owned value of trust-interest assets, used by the QSR split.
    pub fn trust_interest_total(&self) -> Decimal {
        self.assets
            .iter()
            .filter(|a| matches!(a.details, AssetType::TrustInterest { .. }))
            .map(Asset::owned_value)
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeceasedPerson {
    pub date_of_death: NaiveDate,
    pub domicile: DomicileStatus,
    pub marital_status: MaritalStatus,
    pub has_direct_descendants: bool,
}

impl DeceasedPerson {
    /// True when the surviving spouse or civil partner is non-UK domiciled,
    /// which caps the spouse exemption at the nil-rate band.
    pub fn non_uk_spouse_cap_applies(&self) -> bool {
        match &self.marital_status {
            MaritalStatus::Married { spouse_domicile } => *spouse_domicile == Domicile::NonUk,
            MaritalStatus::CivilPartnership { partner_domicile } => {
                *partner_domicile == Domicile::NonUk
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomicileStatus {
    UkDomiciled,
    NonUkDomiciled,
    DeemedDomiciled { years_resident: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married { spouse_domicile: Domicile },
    CivilPartnership { partner_domicile: Domicile },
    Widowed { predecessor_death_date: NaiveDate },
    Divorced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Domicile {
    Uk,
    NonUk,
}

/// Estate asset with common fields + type-specific data
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Asset {
    /// Unique identifier, referenced by specific bequests
    pub id: String,
    pub description: String,
    /// Market value of the whole asset before applying the ownership share
    #[schemars(with = "f64")]
    pub gross_value: Decimal,
    /// Percentage of the asset owned by the deceased (0-100)
    #[schemars(with = "f64")]
    pub ownership_share: Decimal,
    #[serde(default)]
    pub valuation_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub details: AssetType,
}

impl Asset {
    /// Value attributable to the deceased: gross value x ownership share.
    pub fn owned_value(&self) -> Decimal {
        self.gross_value * self.ownership_share / Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssetType {
    Property {
        property_type: PropertyType,
        #[serde(default)]
        is_main_residence: bool,
    },
    Financial {
        financial_type: FinancialType,
        #[serde(default)]
        is_in_trust: bool,
    },
    Business {
        business_type: BusinessType,
        bpr: BprEligibility,
        /// Years the deceased owned the business asset (BPR needs 2)
        ownership_duration: u32,
    },
    Agricultural {
        agricultural_type: AgriculturalType,
        apr: AprEligibility,
        /// Value of the land in agricultural use, often below market value
        #[schemars(with = "f64")]
        agricultural_value: Decimal,
        occupation_type: OccupationType,
        /// Years owned (APR needs 2 owner-occupied, 7 let)
        ownership_duration: u32,
    },
    Personal {
        personal_type: PersonalType,
    },
    TrustInterest {
        trust_type: TrustType,
        trust_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    MainResidence,
    OtherResidential,
    Commercial,
    Land,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinancialType {
    BankAccount,
    Investment,
    Pension,
    LifeInsurance,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    SoleProprietor,
    PartnershipInterest,
    UnquotedShares,
    QuotedSharesControlling,
    BusinessPremises,
}

/// Business Property Relief eligibility as asserted by the adviser
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BprEligibility {
    pub qualifies: bool,
    /// Relief rate, 50 or 100
    pub relief_rate: u8,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AgriculturalType {
    Farmland,
    FarmBuildings,
    Farmhouse,
}

/// Agricultural Property Relief eligibility as asserted by the adviser
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AprEligibility {
    pub qualifies: bool,
    /// Relief rate, 50 or 100
    pub relief_rate: u8,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OccupationType {
    OwnerOccupied,
    LetQualified,
    LetOther,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PersonalType {
    Vehicle,
    Jewelry,
    Collectibles,
    Household,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrustType {
    /// Immediate post-death interest: outside the relevant-property regime
    Ipdi,
    LifeInterest,
    Discretionary,
    BareTrust,
    DisabledTrust,
    BereavedMinor,
    Age18To25,
}

impl TrustType {
    pub fn is_relevant_property(&self) -> bool {
        !matches!(self, TrustType::Ipdi)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Liability {
    pub id: String,
    #[serde(rename = "type")]
    pub liability_type: LiabilityType,
    #[schemars(with = "f64")]
    pub amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub linked_asset_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LiabilityType {
    Mortgage,
    SecuredLoan,
    UnsecuredLoan,
    CreditCard,
    FuneralExpenses,
    OtherDebt,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Beneficiary {
    /// Unique identifier
    pub id: String,
    pub name: String,
    pub relationship: Relationship,
    pub inheritance_type: InheritanceType,
    #[serde(default)]
    pub specific_bequests: Vec<SpecificBequest>,
    /// Percentage share of the residue after all specific bequests (0-100)
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub residuary_share: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Spouse,
    CivilPartner,
    Child,
    Grandchild,
    GreatGrandchild,
    StepChild,
    Sibling,
    Parent,
    NieceNephew,
    Charity,
    Other,
}

/// How a beneficiary's inheritance is treated for exemption purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InheritanceType {
    ExemptSpouse,
    ExemptCharity,
    Taxable,
    TaxFreeLegacy,
}

/// A specific bequest: a named asset, a cash sum, or both
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SpecificBequest {
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub cash_amount: Option<Decimal>,
    #[serde(default)]
    pub is_tax_free: bool,
}

/// Lifetime gift with common fields + type-specific data
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LifetimeGift {
    /// Unique identifier
    pub id: String,
    pub date_of_gift: NaiveDate,
    #[schemars(with = "f64")]
    pub value: Decimal,
    pub recipient: GiftRecipient,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub details: GiftType,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "gift_type", rename_all = "snake_case")]
pub enum GiftType {
    /// Potentially exempt transfer to an individual
    Pet {
        #[serde(default)]
        pet_status: PetStatus,
    },
    /// Chargeable lifetime transfer into a trust
    Clt {
        trust_type: TrustType,
        trust_id: String,
        /// Lifetime IHT paid when the transfer was made
        #[schemars(with = "f64")]
        tax_paid_at_transfer: Decimal,
        /// Whether the donor (rather than the trustees) paid that tax
        paid_by_donor: bool,
    },
    /// Gift covered by a lifetime exemption
    Exempt { exemption_type: ExemptionType },
}

impl LifetimeGift {
    /// PETs and CLTs are chargeable on death within 7 years; exempt gifts
    /// never are.
    pub fn is_chargeable(&self) -> bool {
        matches!(self.details, GiftType::Pet { .. } | GiftType::Clt { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PetStatus {
    #[default]
    PotentiallyExempt,
    Failed,
    Exempt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExemptionType {
    Spouse,
    Charity,
    SmallGift,
    AnnualExemption,
    WeddingChild,
    WeddingGrandchild,
    WeddingOther,
    NormalExpenditure,
    PoliticalParty,
    NationalBenefit,
}

impl ExemptionType {
    pub fn display(&self) -> &'static str {
        match self {
            ExemptionType::Spouse => "spouse",
            ExemptionType::Charity => "charity",
            ExemptionType::SmallGift => "small_gift",
            ExemptionType::AnnualExemption => "annual_exemption",
            ExemptionType::WeddingChild => "wedding_child",
            ExemptionType::WeddingGrandchild => "wedding_grandchild",
            ExemptionType::WeddingOther => "wedding_other",
            ExemptionType::NormalExpenditure => "normal_expenditure",
            ExemptionType::PoliticalParty => "political_party",
            ExemptionType::NationalBenefit => "national_benefit",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GiftRecipient {
    #[serde(rename = "type")]
    pub recipient_type: RecipientType,
    pub name: String,
    #[serde(default)]
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    Individual,
    Trust,
    Charity,
    Company,
}

/// Residence passing on death, for the residence nil-rate band
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResidenceDetails {
    #[schemars(with = "f64")]
    pub value: Decimal,
    pub passing_to_direct_descendants: bool,
    /// Percentage of the residence passing to direct descendants (0-100)
    #[schemars(with = "f64")]
    pub descendant_share: Decimal,
}

/// First-to-die spouse/civil partner's estate, for band transfers
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PredecessorEstate {
    pub date_of_death: NaiveDate,
    /// Percentage of the predecessor's NRB left unused (0-100)
    #[schemars(with = "f64")]
    pub unused_nrb_percentage: Decimal,
    /// Percentage of the predecessor's RNRB left unused (0-100)
    #[schemars(with = "f64")]
    pub unused_rnrb_percentage: Decimal,
    /// RNRB in force at the predecessor's death
    #[schemars(with = "f64")]
    pub rnrb_available_at_death: Decimal,
}

/// Claim for quick succession relief on a recent prior inheritance
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QsrClaim {
    pub previous_death: NaiveDate,
    #[schemars(with = "f64")]
    pub tax_paid_on_inheritance: Decimal,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub inherited_property_value: Option<Decimal>,
    /// Explicit years between deaths, overriding the date calculation
    #[serde(default)]
    pub years_before_death: Option<f64>,
    /// Explicit relief percentage, overriding the statutory banding
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub relief_percentage: Option<Decimal>,
    /// Cap on the relief amount
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub qsr_amount: Option<Decimal>,
}
