use chrono::NaiveDate;

use crate::demographics::DemographicsEngine;
use crate::error::StoreResult;
use crate::types::{AgeBandRow, AgeDistribution, DemographicsReport, MetricRow, ProjectionRow};
use crate::util::{format_int, format_number, ratio};

/// Run every statistic for one as-of date.
pub fn build_report(
    engine: &DemographicsEngine<'_>,
    as_of: NaiveDate,
    years: u32,
) -> StoreResult<DemographicsReport> {
    Ok(DemographicsReport {
        as_of,
        population: engine.compute_population_stats()?,
        age: engine.compute_age_distribution(as_of)?,
        sex: engine.compute_sex_distribution()?,
        workforce: engine.compute_workforce_stats(as_of)?,
        projection: engine.project_population(as_of, years)?,
    })
}

pub fn generate_age_rows(age: &AgeDistribution) -> Vec<AgeBandRow> {
    age.bands()
        .iter()
        .map(|(band, count)| AgeBandRow {
            band: band.label().to_string(),
            ages: band.range().to_string(),
            count: *count,
            share_pct: format_number(ratio(*count, age.total) * 100.0, 1),
        })
        .collect()
}

pub fn generate_projection_rows(report: &DemographicsReport) -> Vec<ProjectionRow> {
    report
        .projection
        .projections
        .iter()
        .map(|p| ProjectionRow {
            year: p.year,
            population: format_int(p.population),
            births: p.births,
            deaths: p.deaths,
            net_change: format!("{:+}", p.net_change),
        })
        .collect()
}

pub fn generate_summary_rows(report: &DemographicsReport) -> Vec<MetricRow> {
    let pop = &report.population;
    let viability = &report.projection.viability;
    let metric = |name: &str, value: String| MetricRow {
        metric: name.to_string(),
        value,
    };

    let mut rows = vec![
        metric("Registered residents", format_int(pop.total_records)),
        metric("Active", format_int(pop.active)),
        metric("Deceased", format_int(pop.deceased)),
        metric("Exiled", format_int(pop.exiled)),
        metric("On mission", format_int(pop.on_mission)),
        metric("Quarantined", format_int(pop.quarantined)),
        metric("Households", format_int(pop.households)),
        metric("Avg household size", format_number(pop.average_household_size, 2)),
        metric("Mean age", format_number(report.age.average_age, 1)),
        metric("Median age", format_number(report.age.median_age, 1)),
        metric(
            "Male / Female",
            format!("{} / {}", format_int(report.sex.male), format_int(report.sex.female)),
        ),
        metric("Male ratio", format_number(report.sex.male_ratio, 3)),
        metric("Training age (16-17)", format_int(report.workforce.training_age)),
        metric("Workforce (18-65)", format_int(report.workforce.full_workforce)),
        metric("Retirement age (66+)", format_int(report.workforce.retirement_age)),
        metric("Dependents", format_int(report.workforce.dependents)),
        metric("Dependency ratio", format_number(report.workforce.dependency_ratio, 2)),
        metric("Growth rate %", format_number(report.projection.growth_rate, 2)),
        metric("Viable", if viability.is_viable { "Yes" } else { "No" }.to_string()),
        metric("Minimum viable population", viability.minimum_viable_population.to_string()),
    ];
    if viability.years_to_mvp > 0 {
        rows.push(metric("Years to MVP", viability.years_to_mvp.to_string()));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemographicsConfig;
    use crate::store::tests::resident;
    use crate::store::InMemoryStore;
    use crate::types::{ResidentStatus, Sex};

    fn report() -> DemographicsReport {
        let residents = vec![
            resident(1, "2070-03-01", Some(Sex::Female), ResidentStatus::Active),
            resident(2, "2040-03-01", Some(Sex::Male), ResidentStatus::Active),
            resident(3, "2000-03-01", Some(Sex::Male), ResidentStatus::Active),
            resident(4, "2000-03-01", Some(Sex::Female), ResidentStatus::Deceased),
        ];
        let store = InMemoryStore::new(residents, 2).unwrap();
        let cfg = DemographicsConfig::default();
        let engine = DemographicsEngine::new(&store, &cfg);
        build_report(&engine, NaiveDate::from_ymd_opt(2080, 6, 1).unwrap(), 3).unwrap()
    }

    #[test]
    fn test_age_rows_cover_all_bands() {
        let r = report();
        let rows = generate_age_rows(&r.age);
        assert_eq!(rows.len(), 7);
        assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 3);
        assert_eq!(rows[1].band, "Child");
        assert_eq!(rows[1].share_pct, "33.3");
        assert_eq!(rows[6].ages, "66+");
    }

    #[test]
    fn test_projection_rows_signed_net() {
        let r = report();
        let rows = generate_projection_rows(&r);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].year, 2081);
        assert_eq!(rows[0].net_change, "+0");
    }

    #[test]
    fn test_summary_includes_counts_and_viability() {
        let r = report();
        let rows = generate_summary_rows(&r);
        let value = |name: &str| rows.iter().find(|m| m.metric == name).map(|m| m.value.clone());
        assert_eq!(value("Registered residents").as_deref(), Some("4"));
        assert_eq!(value("Active").as_deref(), Some("3"));
        assert_eq!(value("Deceased").as_deref(), Some("1"));
        assert_eq!(value("Viable").as_deref(), Some("No"));
        assert_eq!(value("Years to MVP").as_deref(), Some("1"));
    }
}
