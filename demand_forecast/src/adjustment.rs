//! Judgmental adjustment of a baseline forecast
//!
//! External factors expected over the horizon translate into one
//! percentage uplift that scales every forecast value identically:
//!
//! ```text
//! uplift = 0.02 × holidays + 0.015 × concerts + 0.005 × discount (promotions only)
//! adjusted = baseline × (1 + uplift)
//! ```

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Uplift contributed by each holiday in the horizon
pub const HOLIDAY_UPLIFT: f64 = 0.02;
/// Uplift contributed by each concert or festival in the horizon
pub const CONCERT_UPLIFT: f64 = 0.015;
/// Uplift per discount percentage point while a promotion runs
pub const DISCOUNT_UPLIFT: f64 = 0.005;

/// Kind of promotion running over the horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PromotionType {
    #[default]
    None,
    Discount,
    Bogo,
    Other,
}

impl fmt::Display for PromotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PromotionType::None => "none",
            PromotionType::Discount => "discount",
            PromotionType::Bogo => "bogo",
            PromotionType::Other => "other",
        };
        f.write_str(label)
    }
}

impl FromStr for PromotionType {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(PromotionType::None),
            "discount" => Ok(PromotionType::Discount),
            "bogo" | "buy-one-get-one" => Ok(PromotionType::Bogo),
            "other" | "others" => Ok(PromotionType::Other),
            other => Err(ForecastError::Validation(format!(
                "Unknown promotion type: {}",
                other
            ))),
        }
    }
}

/// External factors expected over the forecast horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExternalFactors {
    /// Number of holidays
    pub holidays: u32,
    /// Number of concerts or festivals
    pub concerts: u32,
    /// Promotion running over the horizon
    pub promotion: PromotionType,
    /// Discount percentage, 0 to 100
    pub discount_percent: u32,
}

/// Source of one adjustment term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Factor {
    Holidays,
    Concerts,
    Promotion,
}

/// One contribution to the total uplift
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentTerm {
    /// Which factor contributed
    pub factor: Factor,
    /// Contribution as a fraction (0.1 = 10%)
    pub percentage: f64,
    /// Human-readable explanation
    pub description: String,
}

/// Combined uplift and its terms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adjustment {
    /// Contributing terms, promotion only when one runs
    pub terms: Vec<AdjustmentTerm>,
    /// Sum of the terms as a fraction
    pub total: f64,
}

/// Baseline scaled by the uplift
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedForecast {
    /// Adjusted values, one per baseline value
    pub values: Vec<f64>,
    /// Uplift applied as a fraction
    pub total_percentage: f64,
    /// One line per contributing term
    pub breakdown: Vec<String>,
}

impl ExternalFactors {
    /// Factors with no effect on the forecast
    pub fn none() -> Self {
        Self::default()
    }

    /// Reject discounts outside 0..=100
    pub fn validate(&self) -> Result<()> {
        if self.discount_percent > 100 {
            return Err(ForecastError::Validation(format!(
                "Discount must be between 0 and 100 percent, got {}",
                self.discount_percent
            )));
        }
        Ok(())
    }

    /// Compute the uplift terms and their total
    pub fn adjustment(&self) -> Result<Adjustment> {
        self.validate()?;

        let holiday = self.holidays as f64 * HOLIDAY_UPLIFT;
        let concert = self.concerts as f64 * CONCERT_UPLIFT;

        let mut terms = vec![
            AdjustmentTerm {
                factor: Factor::Holidays,
                percentage: holiday,
                description: format!(
                    "{:.1}% increase due to {} holidays.",
                    holiday * 100.0,
                    self.holidays
                ),
            },
            AdjustmentTerm {
                factor: Factor::Concerts,
                percentage: concert,
                description: format!(
                    "{:.1}% increase due to {} concerts/festivals.",
                    concert * 100.0,
                    self.concerts
                ),
            },
        ];

        if self.promotion != PromotionType::None {
            let promotion = self.discount_percent as f64 * DISCOUNT_UPLIFT;
            terms.push(AdjustmentTerm {
                factor: Factor::Promotion,
                percentage: promotion,
                description: format!(
                    "{:.1}% increase from a {}% {} promotion.",
                    promotion * 100.0,
                    self.discount_percent,
                    self.promotion
                ),
            });
        }

        let total = terms.iter().map(|t| t.percentage).sum();
        Ok(Adjustment { terms, total })
    }

    /// Scale every baseline value by the combined uplift
    pub fn apply(&self, baseline: &[f64]) -> Result<AdjustedForecast> {
        let adjustment = self.adjustment()?;
        let factor = 1.0 + adjustment.total;
        Ok(AdjustedForecast {
            values: baseline.iter().map(|v| v * factor).collect(),
            total_percentage: adjustment.total,
            breakdown: adjustment
                .terms
                .into_iter()
                .map(|t| t.description)
                .collect(),
        })
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Impact of external factors:")?;
        for term in &self.terms {
            writeln!(f, "  - {}", term.description)?;
        }
        writeln!(
            f,
            "Overall adjustment: an increase of {:.1}%",
            self.total * 100.0
        )
    }
}
