//! Core domain types for the Fitlog workout log.
//!
//! This module defines the fundamental types used throughout the system:
//! - The exercise record and its closed enumerations
//! - Draft/patch shapes used by the record store
//! - Listing filters
//! - The derived-statistics struct
//!
//! Wire names are camelCase and enum values kebab-case, matching the
//! transport payload format this system exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Enumerations
// ============================================================================

/// Category of exercise (closed set)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseType {
    Cardio,
    Strength,
    Flexibility,
    Balance,
    Sports,
    Yoga,
    Pilates,
    Dance,
    MartialArts,
    Swimming,
    Cycling,
    Running,
    Walking,
    Other,
}

impl ExerciseType {
    /// All known categories, in display order
    pub const ALL: [ExerciseType; 14] = [
        ExerciseType::Cardio,
        ExerciseType::Strength,
        ExerciseType::Flexibility,
        ExerciseType::Balance,
        ExerciseType::Sports,
        ExerciseType::Yoga,
        ExerciseType::Pilates,
        ExerciseType::Dance,
        ExerciseType::MartialArts,
        ExerciseType::Swimming,
        ExerciseType::Cycling,
        ExerciseType::Running,
        ExerciseType::Walking,
        ExerciseType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Cardio => "cardio",
            ExerciseType::Strength => "strength",
            ExerciseType::Flexibility => "flexibility",
            ExerciseType::Balance => "balance",
            ExerciseType::Sports => "sports",
            ExerciseType::Yoga => "yoga",
            ExerciseType::Pilates => "pilates",
            ExerciseType::Dance => "dance",
            ExerciseType::MartialArts => "martial-arts",
            ExerciseType::Swimming => "swimming",
            ExerciseType::Cycling => "cycling",
            ExerciseType::Running => "running",
            ExerciseType::Walking => "walking",
            ExerciseType::Other => "other",
        }
    }
}

impl FromStr for ExerciseType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ExerciseType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown exercise type: {}", s))
    }
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Perceived intensity, ordered low < moderate < high < very-high
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum IntensityLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl IntensityLevel {
    pub const ALL: [IntensityLevel; 4] = [
        IntensityLevel::Low,
        IntensityLevel::Moderate,
        IntensityLevel::High,
        IntensityLevel::VeryHigh,
    ];

    /// Ordinal mapping used for averaging: low=1 .. very-high=4
    pub fn ordinal(&self) -> u32 {
        match self {
            IntensityLevel::Low => 1,
            IntensityLevel::Moderate => 2,
            IntensityLevel::High => 3,
            IntensityLevel::VeryHigh => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntensityLevel::Low => "low",
            IntensityLevel::Moderate => "moderate",
            IntensityLevel::High => "high",
            IntensityLevel::VeryHigh => "very-high",
        }
    }
}

impl FromStr for IntensityLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        IntensityLevel::ALL
            .iter()
            .find(|l| l.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown intensity level: {}", s))
    }
}

impl std::fmt::Display for IntensityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Exercise Record
// ============================================================================

/// A recorded exercise (the sole persisted entity)
///
/// `id`, `created_at` and `updated_at` are managed by the store; callers
/// never set them directly. `date` is when the exercise occurred and may be
/// backdated, so it can differ from `created_at`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ExerciseType,
    /// Duration in minutes, always positive
    pub duration: u32,
    pub intensity_level: IntensityLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_burned: Option<u32>,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating a record
///
/// Field validation (non-empty name, positive duration) is the caller's
/// responsibility before handing a draft to the store.
#[derive(Clone, Debug)]
pub struct ExerciseDraft {
    pub name: String,
    pub kind: ExerciseType,
    pub duration: u32,
    pub intensity_level: IntensityLevel,
    pub calories_burned: Option<u32>,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Partial field replacement for `update`
///
/// `id` and `created_at` are excluded by construction. `calories_burned`
/// and `notes` use a double `Option` so a patch can distinguish "leave
/// as-is" (`None`) from "clear the field" (`Some(None)`).
#[derive(Clone, Debug, Default)]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub kind: Option<ExerciseType>,
    pub duration: Option<u32>,
    pub intensity_level: Option<IntensityLevel>,
    pub calories_burned: Option<Option<u32>>,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<Option<String>>,
}

// ============================================================================
// Listing Filters
// ============================================================================

/// Inclusive date interval
#[derive(Clone, Copy, Debug)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Optional criteria for `ExerciseStore::list`
#[derive(Clone, Debug, Default)]
pub struct ExerciseFilter {
    pub kind: Option<ExerciseType>,
    pub intensity_level: Option<IntensityLevel>,
    pub date_range: Option<DateRange>,
}

impl ExerciseFilter {
    pub fn matches(&self, exercise: &Exercise) -> bool {
        if let Some(kind) = self.kind {
            if exercise.kind != kind {
                return false;
            }
        }
        if let Some(level) = self.intensity_level {
            if exercise.intensity_level != level {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if !range.contains(exercise.date) {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// Derived Statistics
// ============================================================================

/// Aggregate figures derived from the current record collection
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseStats {
    pub total_workouts: u32,
    /// Summed duration in minutes
    pub total_duration: u32,
    pub total_calories: u32,
    /// Mean intensity ordinal (1..4); 0 when there are no records
    pub average_intensity: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub this_week_workouts: u32,
    pub this_month_workouts: u32,
}
