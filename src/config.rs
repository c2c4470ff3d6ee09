use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Errors raised while resolving tax-year configuration
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tax year configuration not found for: {0}")]
    UnknownTaxYear(String),
    #[error("invalid tax year identifier: {0}")]
    InvalidTaxYear(String),
}

/// UK Tax Year (runs 6 April to 5 April)
/// The year value represents the end year (e.g., 2025 = 2024-25 tax year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxYear(pub i32);

impl TaxYear {
    /// Create a tax year from a date
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        // Tax year starts 6 April
        if date >= NaiveDate::from_ymd_opt(year, 4, 6).unwrap() {
            TaxYear(year + 1)
        } else {
            TaxYear(year)
        }
    }

    /// Start date of the tax year (6 April of previous year)
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0 - 1, 4, 6).unwrap()
    }

    /// End date of the tax year (5 April)
    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 4, 5).unwrap()
    }

    /// Display as "2024-25" format
    pub fn display(&self) -> String {
        format!("{}-{:02}", self.0 - 1, self.0 % 100)
    }

    /// IHT configuration for this tax year
    pub fn config(&self) -> Result<TaxYearConfig, ConfigError> {
        TaxYearConfig::for_year(*self)
    }
}

impl std::fmt::Display for TaxYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl std::str::FromStr for TaxYear {
    type Err = ConfigError;

    /// Accepts "2024-25" or a bare end year "2025"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((start, _)) = s.split_once('-') {
            let start: i32 = start
                .parse()
                .map_err(|_| ConfigError::InvalidTaxYear(s.to_string()))?;
            return Ok(TaxYear(start + 1));
        }
        let year: i32 = s
            .parse()
            .map_err(|_| ConfigError::InvalidTaxYear(s.to_string()))?;
        Ok(TaxYear(year))
    }
}

/// Statutory rates and bands for one tax year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxYearConfig {
    pub year: TaxYear,
    pub nil_rate_band: Decimal,
    pub residence_nil_rate_band: Decimal,
    pub rnrb_taper_threshold: Decimal,
    /// Death rate on the estate, percent
    pub standard_rate: Decimal,
    /// Reduced death rate when the charity test is met, percent
    pub charity_rate: Decimal,
    /// Minimum charity share of the baseline for the reduced rate, percent
    pub charity_rate_min_percentage: Decimal,
    pub annual_exemption: Decimal,
    pub small_gift_limit: Decimal,
    pub wedding_gift_child: Decimal,
    pub wedding_gift_grandchild: Decimal,
    pub wedding_gift_other: Decimal,
    /// Lifetime rate on chargeable lifetime transfers, percent
    pub trust_lifetime_rate: Decimal,
    /// Cap on the ten-year periodic charge rate, percent
    pub trust_periodic_max_rate: Decimal,
}

impl TaxYearConfig {
    /// Look up the configuration for a tax year.
    ///
    /// Supported years run 2010-11 through 2025-26; the NRB has been frozen
    /// at £325,000 across that whole range. Anything outside it is an error
    /// rather than a guess.
    pub fn for_year(year: TaxYear) -> Result<TaxYearConfig, ConfigError> {
        if !(2011..=2026).contains(&year.0) {
            return Err(ConfigError::UnknownTaxYear(year.display()));
        }

        Ok(TaxYearConfig {
            year,
            nil_rate_band: dec!(325000),
            residence_nil_rate_band: Self::residence_nil_rate_band_for(year),
            rnrb_taper_threshold: dec!(2000000),
            standard_rate: dec!(40),
            charity_rate: dec!(36),
            charity_rate_min_percentage: dec!(10),
            annual_exemption: dec!(3000),
            small_gift_limit: dec!(250),
            wedding_gift_child: dec!(5000),
            wedding_gift_grandchild: dec!(2500),
            wedding_gift_other: dec!(1000),
            trust_lifetime_rate: dec!(20),
            trust_periodic_max_rate: dec!(6),
        })
    }

    /// RNRB was introduced in 2017-18 and phased up to £175,000
    fn residence_nil_rate_band_for(year: TaxYear) -> Decimal {
        match year.0 {
            // 2020/21 onwards: £175,000
            2021.. => dec!(175000),
            // 2019/20: £150,000
            2020 => dec!(150000),
            // 2018/19: £125,000
            2019 => dec!(125000),
            // 2017/18: £100,000
            2018 => dec!(100000),
            // No residence band before April 2017
            _ => Decimal::ZERO,
        }
    }
}
