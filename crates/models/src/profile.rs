use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumProperty, EnumString};

/// Whether an academic profile belongs to a student or an instructor
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "instructor")]
    Instructor,
}

impl Role {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

/// The five study programs shared by profiles and courses
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
    EnumProperty,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(100))")]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum Major {
    #[sea_orm(string_value = "artificial_intelligence_and_robotics")]
    #[strum(
        to_string = "artificial_intelligence_and_robotics",
        serialize = "AIR",
        props(code = "AIR")
    )]
    ArtificialIntelligenceAndRobotics,
    #[sea_orm(string_value = "business_mathematics")]
    #[strum(to_string = "business_mathematics", serialize = "BM", props(code = "BM"))]
    BusinessMathematics,
    #[sea_orm(string_value = "digital_business_technology")]
    #[strum(
        to_string = "digital_business_technology",
        serialize = "DBT",
        props(code = "DBT")
    )]
    DigitalBusinessTechnology,
    #[sea_orm(string_value = "product_design_engineering")]
    #[strum(
        to_string = "product_design_engineering",
        serialize = "PDE",
        props(code = "PDE")
    )]
    ProductDesignEngineering,
    #[sea_orm(string_value = "food_business_technology")]
    #[strum(
        to_string = "food_business_technology",
        serialize = "FBT",
        props(code = "FBT")
    )]
    FoodBusinessTechnology,
}

impl Major {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Short program code, e.g. `AIR`
    pub fn code(&self) -> &'static str {
        self.get_str("code").unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;
    use std::str::FromStr;

    #[test]
    fn test_major_parses_key_and_code() {
        assert_eq!(
            Major::from_str("business_mathematics").unwrap(),
            Major::BusinessMathematics
        );
        assert_eq!(Major::from_str("AIR").unwrap(), Major::ArtificialIntelligenceAndRobotics);
        assert_eq!(Major::from_str("fbt").unwrap(), Major::FoodBusinessTechnology);
        assert!(Major::from_str("computer_science").is_err());
    }

    #[test]
    fn test_major_round_trip() {
        for major in Major::iter() {
            let parsed = Major::from_str(major.as_str()).unwrap();
            assert_eq!(major, parsed);
            assert_eq!(Major::from_str(major.code()).unwrap(), major);
        }
    }

    #[test]
    fn test_major_serde_uses_program_key() {
        let json = serde_json::to_string(&Major::ProductDesignEngineering).unwrap();
        assert_eq!(json, "\"product_design_engineering\"");
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from_str("student").unwrap(), Role::Student);
        assert_eq!(Role::from_str("Instructor").unwrap(), Role::Instructor);
        assert_eq!(Role::Instructor.as_str(), "instructor");
    }
}
