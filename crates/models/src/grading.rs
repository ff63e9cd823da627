//! Weighted final score and letter grade computation.
//!
//! A final grade is `0.30 * assignment + 0.30 * midterm + 0.40 * final`,
//! rounded to two decimal places, and exists only when all three component
//! scores are present.

use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ColIdx, DbErr, QueryResult, TryGetError, TryGetable, Value,
    sea_query::{ArrayType, ColumnType, Nullable, StringLen, ValueType, ValueTypeErr},
};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

const ASSIGNMENT_WEIGHT: Decimal = Decimal::from_parts(30, 0, 0, false, 2);
const MIDTERM_WEIGHT: Decimal = Decimal::from_parts(30, 0, 0, false, 2);
const FINAL_WEIGHT: Decimal = Decimal::from_parts(40, 0, 0, false, 2);

pub const MIN_SCORE: Decimal = Decimal::ZERO;
pub const MAX_SCORE: Decimal = Decimal::ONE_HUNDRED;

/// Inclusive lower bounds, highest first. Anything below the last band is an `E`.
const LETTER_BANDS: [(Decimal, LetterGrade); 8] = [
    (Decimal::from_parts(85, 0, 0, false, 0), LetterGrade::A),
    (Decimal::from_parts(80, 0, 0, false, 0), LetterGrade::AMinus),
    (Decimal::from_parts(75, 0, 0, false, 0), LetterGrade::BPlus),
    (Decimal::from_parts(70, 0, 0, false, 0), LetterGrade::B),
    (Decimal::from_parts(65, 0, 0, false, 0), LetterGrade::BMinus),
    (Decimal::from_parts(60, 0, 0, false, 0), LetterGrade::CPlus),
    (Decimal::from_parts(55, 0, 0, false, 0), LetterGrade::C),
    (Decimal::from_parts(40, 0, 0, false, 0), LetterGrade::D),
];

/// Rounds to two decimal places, half away from zero
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Letter grade bucket of a weighted final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "E")]
    E,
}

impl LetterGrade {
    pub const ALL: [LetterGrade; 9] = [
        Self::A,
        Self::AMinus,
        Self::BPlus,
        Self::B,
        Self::BMinus,
        Self::CPlus,
        Self::C,
        Self::D,
        Self::E,
    ];

    /// Maps a final score onto its letter; bounds are inclusive on the upper band
    pub fn from_score(score: Decimal) -> Self {
        LETTER_BANDS
            .iter()
            .find(|(lower, _)| score >= *lower)
            .map(|(_, letter)| *letter)
            .unwrap_or(Self::E)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }

    /// Grade point used for GPA weighting
    pub fn grade_point(&self) -> Decimal {
        match self {
            Self::A => Decimal::from_parts(40, 0, 0, false, 1),
            Self::AMinus => Decimal::from_parts(37, 0, 0, false, 1),
            Self::BPlus => Decimal::from_parts(33, 0, 0, false, 1),
            Self::B => Decimal::from_parts(30, 0, 0, false, 1),
            Self::BMinus => Decimal::from_parts(27, 0, 0, false, 1),
            Self::CPlus => Decimal::from_parts(23, 0, 0, false, 1),
            Self::C => Decimal::from_parts(20, 0, 0, false, 1),
            Self::D => Decimal::from_parts(10, 0, 0, false, 1),
            Self::E => Decimal::from_parts(0, 0, 0, false, 1),
        }
    }
}

impl FromStr for LetterGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|letter| letter.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown letter grade: {s}"))
    }
}

impl Display for LetterGrade {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl ValueType for LetterGrade {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        match v {
            Value::String(Some(s)) => s.parse().map_err(|_| ValueTypeErr),
            _ => Err(ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "LetterGrade".to_string()
    }

    fn array_type() -> ArrayType {
        ArrayType::String
    }

    fn column_type() -> ColumnType {
        ColumnType::String(StringLen::N(2))
    }
}

impl From<LetterGrade> for Value {
    fn from(letter: LetterGrade) -> Self {
        Value::String(Some(Box::new(letter.as_str().to_owned())))
    }
}

impl TryGetable for LetterGrade {
    fn try_get_by<I: ColIdx>(res: &QueryResult, index: I) -> Result<Self, TryGetError> {
        let val = String::try_get_by(res, index)?;

        val.parse().map_err(|e| {
            TryGetError::DbErr(DbErr::Type(format!(
                "Failed to decode LetterGrade: {e}"
            )))
        })
    }
}

impl Nullable for LetterGrade {
    fn null() -> Value {
        Value::String(None)
    }
}

/// Error raised when a component score is outside the accepted range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScoreError {
    OutOfRange { field: &'static str, value: Decimal },
    TooPrecise { field: &'static str, value: Decimal },
}

impl ScoreError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::OutOfRange { field, .. } | Self::TooPrecise { field, .. } => field,
        }
    }
}

impl Display for ScoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::OutOfRange { field, value } => {
                write!(f, "{field} must be between 0 and 100, got {value}")
            }
            Self::TooPrecise { field, value } => {
                write!(f, "{field} allows at most two decimal places, got {value}")
            }
        }
    }
}

impl std::error::Error for ScoreError {}

/// The three component scores of an enrollment record, each optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub assignment: Option<Decimal>,
    pub midterm: Option<Decimal>,
    #[serde(rename = "final")]
    pub final_exam: Option<Decimal>,
}

/// Derived outputs of a fully scored record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeOutcome {
    pub final_grade: Decimal,
    pub letter_grade: LetterGrade,
}

impl Scores {
    pub fn new(
        assignment: Option<Decimal>,
        midterm: Option<Decimal>,
        final_exam: Option<Decimal>,
    ) -> Self {
        Self {
            assignment,
            midterm,
            final_exam,
        }
    }

    /// Checks every present score lies in [0, 100] with at most two decimals
    pub fn validate(&self) -> Result<(), ScoreError> {
        let fields = [
            ("assignment_score", self.assignment),
            ("midterm_score", self.midterm),
            ("final_score", self.final_exam),
        ];

        for (field, score) in fields {
            let Some(value) = score else { continue };

            if value < MIN_SCORE || value > MAX_SCORE {
                return Err(ScoreError::OutOfRange { field, value });
            }
            if value.round_dp(2) != value {
                return Err(ScoreError::TooPrecise { field, value });
            }
        }

        Ok(())
    }

    /// Overlays the scores present in `update` on top of `self`
    pub fn merge(self, update: Scores) -> Scores {
        Scores {
            assignment: update.assignment.or(self.assignment),
            midterm: update.midterm.or(self.midterm),
            final_exam: update.final_exam.or(self.final_exam),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_none() && self.midterm.is_none() && self.final_exam.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.assignment.is_some() && self.midterm.is_some() && self.final_exam.is_some()
    }

    /// Final and letter grade, or `None` unless all three scores are present
    pub fn outcome(&self) -> Option<GradeOutcome> {
        Some(calculate(
            self.assignment?,
            self.midterm?,
            self.final_exam?,
        ))
    }
}

/// Computes the weighted final grade and its letter from three scores
pub fn calculate(assignment: Decimal, midterm: Decimal, final_exam: Decimal) -> GradeOutcome {
    let final_grade = round2(
        assignment * ASSIGNMENT_WEIGHT + midterm * MIDTERM_WEIGHT + final_exam * FINAL_WEIGHT,
    );

    GradeOutcome {
        final_grade,
        letter_grade: LetterGrade::from_score(final_grade),
    }
}

/// Mean of the given final grades rounded to two places, `None` when empty
pub fn average<I: IntoIterator<Item = Decimal>>(final_grades: I) -> Option<Decimal> {
    let (count, total) = final_grades
        .into_iter()
        .fold((0u32, Decimal::ZERO), |(count, total), grade| {
            (count + 1, total + grade)
        });

    (count > 0).then(|| round2(total / Decimal::from(count)))
}
