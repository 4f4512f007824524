use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "M"),
            Sex::Female => write!(f, "F"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidentStatus {
    Active,
    Deceased,
    Exiled,
    OnMission,
    Quarantined,
}

impl ResidentStatus {
    pub fn label(self) -> &'static str {
        match self {
            ResidentStatus::Active => "Active",
            ResidentStatus::Deceased => "Deceased",
            ResidentStatus::Exiled => "Exiled",
            ResidentStatus::OnMission => "On Mission",
            ResidentStatus::Quarantined => "Quarantined",
        }
    }
}

impl FromStr for ResidentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "active" => Ok(ResidentStatus::Active),
            "deceased" => Ok(ResidentStatus::Deceased),
            "exiled" => Ok(ResidentStatus::Exiled),
            "on_mission" | "mission" => Ok(ResidentStatus::OnMission),
            "quarantined" => Ok(ResidentStatus::Quarantined),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ResidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the residents CSV, before validation.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "RegistryNumber")]
    pub registry_number: Option<String>,
    #[serde(rename = "GivenName")]
    pub given_name: Option<String>,
    #[serde(rename = "Surname")]
    pub surname: Option<String>,
    #[serde(rename = "DateOfBirth")]
    pub date_of_birth: Option<String>,
    #[serde(rename = "Sex")]
    pub sex: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Household")]
    pub household: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resident {
    pub id: u32,
    pub registry_number: String,
    pub given_name: String,
    pub surname: String,
    pub date_of_birth: NaiveDate,
    /// `None` when the census record carries no usable value.
    pub sex: Option<Sex>,
    pub status: ResidentStatus,
    pub household_id: Option<u32>,
}

impl Resident {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.surname)
    }
}

/// Active population split into seven fixed age bands.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgeDistribution {
    pub infants: usize,
    pub children: usize,
    pub adolescents: usize,
    pub young_adults: usize,
    pub adults: usize,
    pub middle_aged: usize,
    pub seniors: usize,
    pub total: usize,
    pub average_age: f64,
    pub median_age: f64,
}

impl AgeDistribution {
    /// Band counts in ascending age order, paired with their labels.
    pub fn bands(&self) -> [(AgeBand, usize); 7] {
        [
            (AgeBand::Infant, self.infants),
            (AgeBand::Child, self.children),
            (AgeBand::Adolescent, self.adolescents),
            (AgeBand::YoungAdult, self.young_adults),
            (AgeBand::Adult, self.adults),
            (AgeBand::MiddleAged, self.middle_aged),
            (AgeBand::Senior, self.seniors),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBand {
    Infant,
    Child,
    Adolescent,
    YoungAdult,
    Adult,
    MiddleAged,
    Senior,
}

impl AgeBand {
    /// Classify an age; bounds are inclusive and checked youngest first.
    pub fn for_age(age: u32) -> AgeBand {
        match age {
            0..=2 => AgeBand::Infant,
            3..=12 => AgeBand::Child,
            13..=17 => AgeBand::Adolescent,
            18..=25 => AgeBand::YoungAdult,
            26..=45 => AgeBand::Adult,
            46..=65 => AgeBand::MiddleAged,
            _ => AgeBand::Senior,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBand::Infant => "Infant",
            AgeBand::Child => "Child",
            AgeBand::Adolescent => "Adolescent",
            AgeBand::YoungAdult => "Young Adult",
            AgeBand::Adult => "Adult",
            AgeBand::MiddleAged => "Middle-aged",
            AgeBand::Senior => "Senior",
        }
    }

    pub fn range(self) -> &'static str {
        match self {
            AgeBand::Infant => "0-2",
            AgeBand::Child => "3-12",
            AgeBand::Adolescent => "13-17",
            AgeBand::YoungAdult => "18-25",
            AgeBand::Adult => "26-45",
            AgeBand::MiddleAged => "46-65",
            AgeBand::Senior => "66+",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SexDistribution {
    pub male: usize,
    pub female: usize,
    /// `male + female`; residents without a recorded sex are not counted.
    pub total: usize,
    pub male_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkforceStats {
    pub training_age: usize,
    pub full_workforce: usize,
    pub retirement_age: usize,
    pub dependents: usize,
    pub dependency_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulationStats {
    pub total_records: usize,
    pub active: usize,
    pub deceased: usize,
    pub exiled: usize,
    pub on_mission: usize,
    pub quarantined: usize,
    pub households: usize,
    pub average_household_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub year: i32,
    pub population: i64,
    pub births: i64,
    pub deaths: i64,
    pub net_change: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViabilityAssessment {
    pub is_viable: bool,
    pub minimum_viable_population: i64,
    /// 1-based year offset of the first projected fall below the minimum,
    /// 0 when the horizon never crosses it.
    pub years_to_mvp: u32,
    pub concerns: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationProjection {
    pub current_population: i64,
    pub growth_rate: f64,
    pub projections: Vec<ProjectionPoint>,
    pub viability: ViabilityAssessment,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AgeBandRow {
    #[serde(rename = "Band")]
    #[tabled(rename = "Band")]
    pub band: String,
    #[serde(rename = "Ages")]
    #[tabled(rename = "Ages")]
    pub ages: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "Share %")]
    pub share_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProjectionRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Population")]
    #[tabled(rename = "Population")]
    pub population: String,
    #[serde(rename = "Births")]
    #[tabled(rename = "Births")]
    pub births: i64,
    #[serde(rename = "Deaths")]
    #[tabled(rename = "Deaths")]
    pub deaths: i64,
    #[serde(rename = "NetChange")]
    #[tabled(rename = "Net")]
    pub net_change: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MetricRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Everything the demographics screen shows, in one serializable bundle.
#[derive(Debug, Serialize)]
pub struct DemographicsReport {
    pub as_of: NaiveDate,
    pub population: PopulationStats,
    pub age: AgeDistribution,
    pub sex: SexDistribution,
    pub workforce: WorkforceStats,
    pub projection: PopulationProjection,
}
