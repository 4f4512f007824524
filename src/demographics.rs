//! Demographic statistics and population projection.
//!
//! The engine reads residents through a [`ResidentSource`] and recomputes
//! everything on every call. The pure functions underneath take residents
//! or distributions directly and are what the tests exercise most.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::DemographicsConfig;
use crate::error::StoreResult;
use crate::store::{fetch_all, fetch_all_active, ResidentFilter, ResidentSource};
use crate::types::{
    AgeBand, AgeDistribution, PopulationProjection, PopulationStats, ProjectionPoint, Resident,
    ResidentStatus, Sex, SexDistribution, ViabilityAssessment, WorkforceStats,
};
use crate::util::{age_in_years, average, median, ratio};

pub const NO_CONCERNS: &str = "No immediate concerns";
pub const MAINTAIN_POLICY: &str = "Maintain current policies";

pub struct DemographicsEngine<'a> {
    source: &'a dyn ResidentSource,
    config: &'a DemographicsConfig,
}

impl<'a> DemographicsEngine<'a> {
    pub fn new(source: &'a dyn ResidentSource, config: &'a DemographicsConfig) -> Self {
        Self { source, config }
    }

    pub fn compute_age_distribution(&self, as_of: NaiveDate) -> StoreResult<AgeDistribution> {
        let residents = fetch_all_active(self.source)?;
        Ok(age_distribution(&residents, as_of))
    }

    pub fn compute_sex_distribution(&self) -> StoreResult<SexDistribution> {
        let residents = fetch_all_active(self.source)?;
        Ok(sex_distribution(&residents))
    }

    pub fn compute_workforce_stats(&self, as_of: NaiveDate) -> StoreResult<WorkforceStats> {
        let residents = fetch_all_active(self.source)?;
        Ok(workforce_stats(&residents, as_of))
    }

    /// Status counts and household sizes over every record, not only the
    /// active ones.
    pub fn compute_population_stats(&self) -> StoreResult<PopulationStats> {
        let residents = fetch_all(self.source, &ResidentFilter::default())?;
        Ok(population_stats(&residents))
    }

    pub fn project_population(&self, as_of: NaiveDate, years: u32) -> StoreResult<PopulationProjection> {
        let stats = self.compute_population_stats()?;
        let age = self.compute_age_distribution(as_of)?;
        let sex = self.compute_sex_distribution()?;
        let projection = projection_from(self.config, stats.active, &age, &sex, as_of, years);
        info!(
            current = projection.current_population,
            growth_rate = projection.growth_rate,
            years,
            viable = projection.viability.is_viable,
            "Population projection computed"
        );
        Ok(projection)
    }
}

pub fn age_distribution(residents: &[Resident], as_of: NaiveDate) -> AgeDistribution {
    let mut dist = AgeDistribution::default();
    let mut ages: Vec<f64> = Vec::with_capacity(residents.len());

    for r in residents {
        let age = age_in_years(r.date_of_birth, as_of);
        match AgeBand::for_age(age) {
            AgeBand::Infant => dist.infants += 1,
            AgeBand::Child => dist.children += 1,
            AgeBand::Adolescent => dist.adolescents += 1,
            AgeBand::YoungAdult => dist.young_adults += 1,
            AgeBand::Adult => dist.adults += 1,
            AgeBand::MiddleAged => dist.middle_aged += 1,
            AgeBand::Senior => dist.seniors += 1,
        }
        ages.push(age as f64);
    }

    dist.total = residents.len();
    dist.average_age = average(&ages);
    dist.median_age = median(ages);
    dist
}

/// Residents without a recorded sex are left out of both counts and the
/// total, so the ratio only describes residents whose sex is known.
pub fn sex_distribution(residents: &[Resident]) -> SexDistribution {
    let male = residents.iter().filter(|r| r.sex == Some(Sex::Male)).count();
    let female = residents.iter().filter(|r| r.sex == Some(Sex::Female)).count();
    let total = male + female;
    SexDistribution {
        male,
        female,
        total,
        male_ratio: ratio(male, total),
    }
}

pub fn workforce_stats(residents: &[Resident], as_of: NaiveDate) -> WorkforceStats {
    let mut stats = WorkforceStats::default();
    for r in residents {
        match age_in_years(r.date_of_birth, as_of) {
            16..=17 => stats.training_age += 1,
            18..=65 => stats.full_workforce += 1,
            age => {
                if age >= 66 {
                    stats.retirement_age += 1;
                }
                stats.dependents += 1;
            }
        }
    }
    let workers = stats.training_age + stats.full_workforce;
    stats.dependency_ratio = ratio(stats.dependents, workers);
    stats
}

pub fn population_stats(residents: &[Resident]) -> PopulationStats {
    let mut stats = PopulationStats {
        total_records: residents.len(),
        ..Default::default()
    };
    let mut households: HashMap<u32, usize> = HashMap::new();
    for r in residents {
        match r.status {
            ResidentStatus::Active => {
                stats.active += 1;
                if let Some(h) = r.household_id {
                    *households.entry(h).or_default() += 1;
                }
            }
            ResidentStatus::Deceased => stats.deceased += 1,
            ResidentStatus::Exiled => stats.exiled += 1,
            ResidentStatus::OnMission => stats.on_mission += 1,
            ResidentStatus::Quarantined => stats.quarantined += 1,
        }
    }
    stats.households = households.len();
    stats.average_household_size = ratio(households.values().sum(), households.len());
    stats
}

/// Whole births and deaths per year for the base population.
///
/// Populations above the configured floor always lose at least one
/// resident a year.
pub fn annual_rates(
    config: &DemographicsConfig,
    active: usize,
    age: &AgeDistribution,
    sex: &SexDistribution,
) -> (i64, i64) {
    let births = sex.female as f64 * config.childbearing_fraction * config.annual_birth_rate;

    let m = &config.mortality;
    let deaths = age.infants as f64 * m.infant
        + age.children as f64 * m.child
        + age.adolescents as f64 * m.adolescent
        + age.young_adults as f64 * m.young_adult
        + age.adults as f64 * m.adult
        + age.middle_aged as f64 * m.middle_aged
        + age.seniors as f64 * m.senior;

    let births = births.round() as i64;
    let mut deaths = deaths.round() as i64;
    if deaths < 1 && active > config.min_mortality_population {
        deaths = 1;
    }
    (births, deaths)
}

/// Year-by-year projection from already computed distributions.
///
/// Base births and deaths stay constant over the horizon; only the
/// small-population birth scaling changes from year to year.
pub fn projection_from(
    config: &DemographicsConfig,
    active: usize,
    age: &AgeDistribution,
    sex: &SexDistribution,
    as_of: NaiveDate,
    years: u32,
) -> PopulationProjection {
    let (births, deaths) = annual_rates(config, active, age, sex);
    let current = active as i64;
    let growth_rate = if current > 0 {
        (births - deaths) as f64 / current as f64 * 100.0
    } else {
        0.0
    };
    debug!(births, deaths, growth_rate, "Base year rates");

    let threshold = config.breeding_pool_threshold.max(1);
    let mut population = current;
    let mut projections = Vec::with_capacity(years as usize);
    for offset in 1..=years {
        let year_births = if population < threshold {
            births * population / threshold
        } else {
            births
        };
        let net_change = year_births - deaths;
        population = (population + net_change).max(0);
        projections.push(ProjectionPoint {
            year: as_of.year() + offset as i32,
            population,
            births: year_births,
            deaths,
            net_change,
        });
    }

    let viability = assess_viability(config, current, growth_rate, &projections, age, sex);
    PopulationProjection {
        current_population: current,
        growth_rate,
        projections,
        viability,
    }
}

pub fn assess_viability(
    config: &DemographicsConfig,
    current: i64,
    growth_rate: f64,
    projections: &[ProjectionPoint],
    age: &AgeDistribution,
    sex: &SexDistribution,
) -> ViabilityAssessment {
    let mvp = config.minimum_viable_population;
    let mut is_viable = current >= mvp;
    let mut years_to_mvp = 0;
    for (idx, point) in projections.iter().enumerate() {
        if point.population < mvp {
            is_viable = false;
            if years_to_mvp == 0 {
                years_to_mvp = idx as u32 + 1;
            }
        }
    }

    let mut concerns = Vec::new();
    if growth_rate < 0.0 {
        concerns.push("Negative population growth: deaths exceed births".to_string());
    }
    if age.seniors > age.young_adults + age.adults {
        concerns.push("Aging population: seniors outnumber young adults and adults".to_string());
    }
    if age.children + age.infants < age.seniors {
        concerns.push("Declining youth: fewer children and infants than seniors".to_string());
    }
    if sex.male_ratio < config.sex_ratio_min || sex.male_ratio > config.sex_ratio_max {
        concerns.push(format!(
            "Imbalanced sex ratio: {:.1}% male",
            sex.male_ratio * 100.0
        ));
    }
    if concerns.is_empty() {
        concerns.push(NO_CONCERNS.to_string());
    }

    let mut recommendations = Vec::new();
    if growth_rate < config.low_growth_threshold {
        recommendations.push("Introduce family formation incentives".to_string());
    }
    if age.seniors as f64 > age.adults as f64 / 2.0 {
        recommendations.push("Prepare elder care facilities and staffing".to_string());
    }
    if current < config.genetic_monitoring_threshold {
        recommendations.push("Monitor genetic diversity and inbreeding coefficients".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push(MAINTAIN_POLICY.to_string());
    }

    ViabilityAssessment {
        is_viable,
        minimum_viable_population: mvp,
        years_to_mvp,
        concerns,
        recommendations,
    }
}
