//! Translation between tag addresses and catalog commands.
//!
//! The [`CatalogQueryAdapter`] renders a domain request into command text (see
//! [`crate::query`]), runs it through the [`QueryCache`] and turns the answer
//! back into [`TagAddress`] values through typed records. Rows missing the
//! fields a query shape promises are reported as
//! [`AmiError::MalformedResponse`].

use tracing::{debug, warn};

use crate::address::{dimension_index, TagAddress, SLOT_COUNT};
use crate::cache::QueryCache;
use crate::catalog::{field, Catalog, Row, Rows};
use crate::error::{AmiError, Result};
use crate::query;
use crate::scope::ScopeTable;

/// Anything able to list the legal values of one unbound slot.
pub trait CandidateSource {
    fn find_slot_candidates(&self, partial: &TagAddress, slot: usize) -> Result<Vec<TagAddress>>;
}

impl<T: CandidateSource + ?Sized> CandidateSource for &T {
    fn find_slot_candidates(&self, partial: &TagAddress, slot: usize) -> Result<Vec<TagAddress>> {
        (**self).find_slot_candidates(partial, slot)
    }
}

// ------------- Records -------------
/// A `HASHTAGS` row: which dimension a tag lives in and its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashtagRecord {
    pub dimension: String,
    pub name: String,
}

impl HashtagRecord {
    pub fn from_row(row: &Row) -> Result<Self> {
        let dimension = field(row, "SCOPE")
            .ok_or_else(|| AmiError::MalformedResponse(format!("hashtag row without SCOPE: {row:?}")))?;
        let name = field(row, "NAME")
            .ok_or_else(|| AmiError::MalformedResponse(format!("hashtag row without NAME: {row:?}")))?;
        Ok(Self {
            dimension: dimension.to_string(),
            name: name.to_string(),
        })
    }
}

/// A `DATASET` row reduced to its logical dataset name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRecord {
    pub logical_dataset_name: String,
}

impl DatasetRecord {
    pub fn from_row(row: &Row) -> Result<Self> {
        field(row, "LOGICALDATASETNAME")
            .map(|name| Self { logical_dataset_name: name.to_string() })
            .ok_or_else(|| {
                AmiError::MalformedResponse(format!("dataset row without LOGICALDATASETNAME: {row:?}"))
            })
    }
}

fn hashtag_records(rows: &Rows) -> Result<Vec<HashtagRecord>> {
    rows.iter().map(HashtagRecord::from_row).collect()
}

// Seeds an address from a hashtag record. A dimension outside PMGL1..PMGL4 is
// an `UnknownDimension` error.
fn seed(scope: &str, record: HashtagRecord) -> Result<TagAddress> {
    TagAddress::from_row(scope, &record.dimension, record.name)
}

// ------------- Adapter -------------
pub struct CatalogQueryAdapter<'a, C: Catalog> {
    catalog: C,
    cache: &'a QueryCache,
    scopes: &'a ScopeTable,
}

impl<'a, C: Catalog> CatalogQueryAdapter<'a, C> {
    pub fn new(catalog: C, cache: &'a QueryCache, scopes: &'a ScopeTable) -> Self {
        Self { catalog, cache, scopes }
    }
    pub fn cache(&self) -> &QueryCache {
        self.cache
    }
    fn run(&self, command: &str) -> Result<Rows> {
        debug!(%command, "catalog query");
        self.cache
            .get_or_compute(command, || self.catalog.execute(command))
    }
    /// Values for `slot` consistent with every slot already bound in `partial`.
    /// An empty result is a dead end, not an error.
    pub fn find_slot_candidates(&self, partial: &TagAddress, slot: usize) -> Result<Vec<TagAddress>> {
        if slot >= SLOT_COUNT || partial.slot(slot).is_some() {
            return Err(AmiError::InvalidIndex { index: slot });
        }
        let catalog = self.scopes.catalog_for(partial.scope())?;
        let rows = self.run(&query::slot_candidates(&catalog, partial, slot))?;
        let mut candidates = Vec::with_capacity(rows.len());
        for record in hashtag_records(&rows)? {
            if dimension_index(&record.dimension).ok() != Some(slot) {
                return Err(AmiError::MalformedResponse(format!(
                    "asked for slot {} but the catalog answered with dimension {}",
                    slot + 1,
                    record.dimension
                )));
            }
            candidates.push(partial.with_slot_bound(slot, record.name)?);
        }
        Ok(candidates)
    }
    /// One single-slot address per hashtag whose name contains `text`.
    pub fn find_initial_candidates(&self, scope: &str, text: &str) -> Result<Vec<TagAddress>> {
        let catalog = self.scopes.catalog_for(scope)?;
        let rows = self.run(&query::hashtag_search(&catalog, text))?;
        hashtag_records(&rows)?
            .into_iter()
            .map(|record| seed(scope, record))
            .collect()
    }
    /// The single hashtag named exactly `name`.
    pub fn find_unique_hashtag(&self, scope: &str, name: &str) -> Result<TagAddress> {
        let catalog = self.scopes.catalog_for(scope)?;
        let rows = self.run(&query::hashtag_exact(&catalog, name))?;
        let mut records = hashtag_records(&rows)?;
        match records.len() {
            0 => Err(AmiError::NotFound(format!("hashtag '{name}' in {scope}"))),
            1 => seed(scope, records.remove(0)),
            count => Err(AmiError::Ambiguous {
                what: format!("hashtag '{name}' in {scope}"),
                count,
            }),
        }
    }
    /// Logical dataset names carrying all four hashtags of a complete address.
    pub fn find_datasets(&self, address: &TagAddress) -> Result<Vec<String>> {
        if let Some(index) = address.first_unbound_index() {
            return Err(AmiError::InvalidIndex { index });
        }
        let catalog = self.scopes.catalog_for(address.scope())?;
        let rows = self.run(&query::datasets_with_tags(&catalog, address))?;
        let names = rows
            .iter()
            .map(|row| DatasetRecord::from_row(row).map(|record| record.logical_dataset_name))
            .collect::<Result<Vec<_>>>()?;
        if names.is_empty() {
            warn!(%address, "no datasets carry this hashtag combination");
        }
        Ok(names)
    }
}

impl<C: Catalog> CandidateSource for CatalogQueryAdapter<'_, C> {
    fn find_slot_candidates(&self, partial: &TagAddress, slot: usize) -> Result<Vec<TagAddress>> {
        CatalogQueryAdapter::find_slot_candidates(self, partial, slot)
    }
}
