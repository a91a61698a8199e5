use serde::{Deserialize, Serialize};

use super::validate::validate_non_empty;
use crate::{NewsId, UtcDateTime, ValidationError};

/// Market impact rating from 1 (minor) to 5 (major).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ImpactLevel(u8);

impl ImpactLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if !(i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            return Err(ValidationError::ImpactOutOfRange { value });
        }
        Ok(Self(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for ImpactLevel {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ImpactLevel> for u8 {
    fn from(value: ImpactLevel) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub id: NewsId,
    pub headline: String,
    pub impact: ImpactLevel,
    pub category: String,
    pub published_by: String,
    pub timestamp: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsDraft {
    pub headline: String,
    pub impact: i64,
    pub category: String,
    pub published_by: String,
}

impl NewsDraft {
    pub fn new(
        headline: impl Into<String>,
        impact: i64,
        category: impl Into<String>,
        published_by: impl Into<String>,
    ) -> Self {
        Self {
            headline: headline.into(),
            impact,
            category: category.into(),
            published_by: published_by.into(),
        }
    }

    pub fn into_news(self, id: NewsId, now: UtcDateTime) -> Result<News, ValidationError> {
        validate_non_empty("headline", &self.headline)?;
        let impact = ImpactLevel::new(self.impact)?;
        Ok(News {
            id,
            headline: self.headline.trim().to_owned(),
            impact,
            category: self.category.trim().to_owned(),
            published_by: self.published_by.trim().to_owned(),
            timestamp: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_bounds_are_inclusive() {
        assert!(ImpactLevel::new(1).is_ok());
        assert!(ImpactLevel::new(5).is_ok());
        assert_eq!(
            ImpactLevel::new(0),
            Err(ValidationError::ImpactOutOfRange { value: 0 })
        );
        assert_eq!(
            ImpactLevel::new(6),
            Err(ValidationError::ImpactOutOfRange { value: 6 })
        );
    }

    #[test]
    fn stored_impact_is_revalidated() {
        let err = serde_json::from_str::<ImpactLevel>("9").expect_err("must fail");
        assert!(err.to_string().contains("between 1 and 5"));
        let ok: ImpactLevel = serde_json::from_str("3").expect("deserialize");
        assert_eq!(ok.get(), 3);
    }
}
