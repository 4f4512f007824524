//! Paginated resident record store.
//!
//! The statistics code only ever sees residents through [`ResidentSource`],
//! one page at a time. [`InMemoryStore`] backs it with the loaded census.

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::types::{Resident, ResidentStatus};

/// Query filter for resident listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResidentFilter {
    pub status: Option<ResidentStatus>,
    /// Case-insensitive match on name or registry number.
    pub search: Option<String>,
}

impl ResidentFilter {
    pub fn active() -> Self {
        Self {
            status: Some(ResidentStatus::Active),
            search: None,
        }
    }

    pub fn matches(&self, resident: &Resident) -> bool {
        if let Some(status) = self.status {
            if resident.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                resident.full_name().to_lowercase().contains(&term)
                    || resident.registry_number.to_lowercase().contains(&term)
            }
        }
    }
}

/// One page of query results. Pages are numbered from 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidentPage {
    pub records: Vec<Resident>,
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
}

pub trait ResidentSource {
    fn list_residents(&self, filter: &ResidentFilter, page: usize) -> StoreResult<ResidentPage>;
}

/// Collect every record matching `filter` by walking pages until the last
/// one. Any error aborts the scan and nothing is returned.
pub fn fetch_all(source: &dyn ResidentSource, filter: &ResidentFilter) -> StoreResult<Vec<Resident>> {
    let mut all = Vec::new();
    let mut page = 0;
    loop {
        let result = source.list_residents(filter, page)?;
        all.extend(result.records);
        page += 1;
        if page >= result.total_pages {
            break;
        }
    }
    debug!(records = all.len(), pages = page, "Exhaustive scan complete");
    Ok(all)
}

pub fn fetch_all_active(source: &dyn ResidentSource) -> StoreResult<Vec<Resident>> {
    fetch_all(source, &ResidentFilter::active())
}

#[derive(Debug, Clone)]
pub struct InMemoryStore {
    residents: Vec<Resident>,
    page_size: usize,
}

impl InMemoryStore {
    pub fn new(residents: Vec<Resident>, page_size: usize) -> StoreResult<Self> {
        if page_size == 0 {
            return Err(StoreError::InvalidPageSize(page_size));
        }
        Ok(Self {
            residents,
            page_size,
        })
    }

    pub fn len(&self) -> usize {
        self.residents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residents.is_empty()
    }

    /// Same records, paged differently.
    pub fn with_page_size(&self, page_size: usize) -> StoreResult<Self> {
        Self::new(self.residents.clone(), page_size)
    }
}

impl ResidentSource for InMemoryStore {
    fn list_residents(&self, filter: &ResidentFilter, page: usize) -> StoreResult<ResidentPage> {
        let matching: Vec<&Resident> = self.residents.iter().filter(|r| filter.matches(r)).collect();
        let total_records = matching.len();
        let total_pages = total_records.div_ceil(self.page_size);
        let records = matching
            .into_iter()
            .skip(page.saturating_mul(self.page_size))
            .take(self.page_size)
            .cloned()
            .collect();
        Ok(ResidentPage {
            records,
            page,
            total_pages,
            total_records,
        })
    }
}
