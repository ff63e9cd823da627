use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Error returned when a catalog value falls outside its fixed domain
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum CatalogValueError {
    InvalidCredits(i32),
    InvalidSemester(i32),
}

impl Display for CatalogValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidCredits(value) => {
                write!(f, "Credits must be one of 2, 3, 4 or 6, got {value}")
            }
            Self::InvalidSemester(value) => {
                write!(f, "Semester must be between 1 and 8, got {value}")
            }
        }
    }
}

impl std::error::Error for CatalogValueError {}

/// Credit weight (SKS) of a course
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(into = "i32", try_from = "i32")]
pub enum Credits {
    #[sea_orm(num_value = 2)]
    Two,
    #[sea_orm(num_value = 3)]
    Three,
    #[sea_orm(num_value = 4)]
    Four,
    #[sea_orm(num_value = 6)]
    Six,
}

impl Credits {
    pub fn value(self) -> u32 {
        match self {
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Six => 6,
        }
    }
}

impl From<Credits> for i32 {
    fn from(credits: Credits) -> Self {
        credits.value() as i32
    }
}

impl TryFrom<i32> for Credits {
    type Error = CatalogValueError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            6 => Ok(Self::Six),
            other => Err(CatalogValueError::InvalidCredits(other)),
        }
    }
}

impl Display for Credits {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} SKS", self.value())
    }
}

/// A semester number in the eight-semester program, 1 through 8
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub struct Semester(u8);

impl Semester {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 8;

    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<i16> for Semester {
    type Error = CatalogValueError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        if (i16::from(Self::FIRST)..=i16::from(Self::LAST)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(CatalogValueError::InvalidSemester(value.into()))
        }
    }
}

impl From<Semester> for i16 {
    fn from(semester: Semester) -> Self {
        semester.0.into()
    }
}

impl Display for Semester {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Semester {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_credits_accepts_only_fixed_weights() {
        for credits in Credits::iter() {
            let raw: i32 = credits.into();
            assert_eq!(Credits::try_from(raw).unwrap(), credits);
        }
        assert_eq!(
            Credits::try_from(5),
            Err(CatalogValueError::InvalidCredits(5))
        );
        assert!(Credits::try_from(0).is_err());
    }

    #[test]
    fn test_credits_serialize_as_number() {
        assert_eq!(serde_json::to_string(&Credits::Four).unwrap(), "4");
        let parsed: Credits = serde_json::from_str("6").unwrap();
        assert_eq!(parsed, Credits::Six);
        assert!(serde_json::from_str::<Credits>("1").is_err());
    }

    #[test]
    fn test_semester_bounds() {
        assert_eq!(Semester::try_from(1i16).unwrap().number(), 1);
        assert_eq!(Semester::try_from(8i16).unwrap().number(), 8);
        assert_eq!(
            Semester::try_from(0i16),
            Err(CatalogValueError::InvalidSemester(0))
        );
        assert!(Semester::try_from(9i16).is_err());
        assert_eq!(Semester::try_from(3i16).unwrap().to_string(), "Semester 3");
    }
}
