use crate::error::LoadError;
use crate::types::{RawRow, Resident, ResidentStatus, Sex};
use crate::util::{non_empty, parse_date_safe, parse_u32_safe};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const REQUIRED_COLUMN: &str = "DateOfBirth";

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub missing_sex: usize,
}

pub fn load_residents(path: &Path) -> Result<(Vec<Resident>, LoadReport), LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (residents, report) = load_from_reader(file)?;
    info!(
        path = %path.display(),
        loaded = report.loaded_rows,
        skipped = report.parse_errors,
        "Residents file loaded"
    );
    Ok((residents, report))
}

/// Parse and validate census rows. Rows without a valid date of birth or
/// with an unknown status are counted as parse errors and skipped; an
/// unrecognised sex is kept as unset.
pub fn load_from_reader<R: Read>(reader: R) -> Result<(Vec<Resident>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?;
    if !headers.iter().any(|h| h.trim() == REQUIRED_COLUMN) {
        return Err(LoadError::MissingColumn(REQUIRED_COLUMN));
    }
    let mut report = LoadReport::default();
    let mut residents: Vec<Resident> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(row = report.total_rows, error = %e, "Unreadable row");
                report.parse_errors += 1;
                continue;
            }
        };

        let Some(date_of_birth) = parse_date_safe(row.date_of_birth.as_deref()) else {
            report.parse_errors += 1;
            continue;
        };
        let status = match non_empty(row.status.as_deref()) {
            None => ResidentStatus::Active,
            Some(s) => match s.parse::<ResidentStatus>() {
                Ok(st) => st,
                Err(()) => {
                    debug!(row = report.total_rows, status = s, "Unknown status");
                    report.parse_errors += 1;
                    continue;
                }
            },
        };
        let sex = non_empty(row.sex.as_deref()).and_then(|s| s.parse::<Sex>().ok());
        if sex.is_none() {
            report.missing_sex += 1;
        }

        let id = residents.len() as u32 + 1;
        let registry_number = non_empty(row.registry_number.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("V-{:05}", id));
        let given_name = non_empty(row.given_name.as_deref()).unwrap_or("Unknown").to_string();
        let surname = non_empty(row.surname.as_deref()).unwrap_or("").to_string();

        residents.push(Resident {
            id,
            registry_number,
            given_name,
            surname,
            date_of_birth,
            sex,
            status,
            household_id: parse_u32_safe(row.household.as_deref()),
        });
    }

    report.loaded_rows = residents.len();
    Ok((residents, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
RegistryNumber,GivenName,Surname,DateOfBirth,Sex,Status,Household
V-101,Ada,Reyes,2040-03-01,F,active,7
V-102,Bram,Okafor,2031-11-20,male,On Mission,7
,Cleo,,2075-01-09,,,
V-104,Dax,Ng,not-a-date,M,active,3
V-105,Eve,Ng,2050-05-05,F,missing,3
";

    #[test]
    fn test_load_counts_and_skips() {
        let (residents, report) = load_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.loaded_rows, 3);
        assert_eq!(report.parse_errors, 2);
        assert_eq!(report.missing_sex, 1);
        assert_eq!(residents.len(), 3);
    }

    #[test]
    fn test_load_field_defaults() {
        let (residents, _) = load_from_reader(SAMPLE.as_bytes()).unwrap();
        let ada = &residents[0];
        assert_eq!(ada.sex, Some(Sex::Female));
        assert_eq!(ada.household_id, Some(7));
        assert_eq!(residents[1].status, ResidentStatus::OnMission);
        assert_eq!(residents[1].sex, Some(Sex::Male));

        let cleo = &residents[2];
        assert_eq!(cleo.id, 3);
        assert_eq!(cleo.registry_number, "V-00003");
        assert_eq!(cleo.status, ResidentStatus::Active);
        assert_eq!(cleo.sex, None);
        assert_eq!(cleo.household_id, None);
    }

    #[test]
    fn test_missing_birth_date_column() {
        let err = load_from_reader("GivenName,Surname\nAda,Reyes\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("DateOfBirth")));
    }

    #[test]
    fn test_missing_file() {
        let err = load_residents(Path::new("/nonexistent/residents.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
