//! Item catalog and the startup-time structural validator.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogDefect, StructuralError};
use crate::models::{Domain, Facet, ItemMeta, LikertScale};

pub const ITEMS_PER_FACET: usize = 4;
pub const ITEMS_PER_DOMAIN: usize = ITEMS_PER_FACET * 3;
pub const DEFAULT_CATALOG_VERSION: &str = "items60-v3";

/// Position of the reverse-keyed item inside each facet block of the default catalog.
const REVERSE_SLOT: usize = 1;

/// Versioned, immutable item set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub version: String,
    pub scale: LikertScale,
    pub items: Vec<ItemMeta>,
}

impl ItemCatalog {
    pub fn new(version: impl Into<String>, scale: LikertScale, items: Vec<ItemMeta>) -> Self {
        Self { version: version.into(), scale, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&ItemMeta> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items_for_facet(&self, facet: Facet) -> impl Iterator<Item = &ItemMeta> {
        self.items.iter().filter(move |item| item.facet == facet)
    }

    pub fn reverse_ids(&self) -> Vec<u32> {
        self.items.iter().filter(|i| i.reverse).map(|i| i.id).collect()
    }
}

static DEFAULT_CATALOG: Lazy<ItemCatalog> = Lazy::new(|| {
    let items = Facet::ALL
        .iter()
        .enumerate()
        .flat_map(|(fi, facet)| {
            (0..ITEMS_PER_FACET).map(move |slot| ItemMeta {
                id: (fi * ITEMS_PER_FACET + slot + 1) as u32,
                domain: facet.domain(),
                facet: *facet,
                reverse: slot == REVERSE_SLOT,
                weight: None,
            })
        })
        .collect();
    ItemCatalog::new(DEFAULT_CATALOG_VERSION, LikertScale::FIVE_POINT, items)
});

/// The 60-item, 1..5 catalog: 15 facets × 4 items, one reverse-keyed item per facet.
pub fn default_catalog() -> &'static ItemCatalog {
    &DEFAULT_CATALOG
}

/// Summary returned by a successful structural check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub version: String,
    pub total_items: usize,
    pub reverse_items: usize,
    pub reverse_ratio: f64,
    pub items_per_facet: BTreeMap<Facet, usize>,
    pub items_per_domain: BTreeMap<Domain, usize>,
    pub facets_without_reverse: Vec<Facet>,
}

/// Check the fixed catalog shape: 4 items per facet, 12 per domain, unique
/// ids forming `1..=N`. Collects every defect before failing.
pub fn validate_catalog(catalog: &ItemCatalog) -> Result<CatalogStats, StructuralError> {
    let mut defects = Vec::new();

    if catalog.scale.min >= catalog.scale.max {
        defects.push(CatalogDefect::InvalidScale {
            min: catalog.scale.min,
            max: catalog.scale.max,
        });
    }

    let mut seen = BTreeSet::new();
    for item in &catalog.items {
        if !seen.insert(item.id) {
            defects.push(CatalogDefect::DuplicateId { item_id: item.id });
        }
        if item.facet.domain() != item.domain {
            defects.push(CatalogDefect::DomainMismatch { item_id: item.id });
        }
    }

    let max_id = seen.iter().next_back().copied().unwrap_or(0);
    for id in 1..=max_id {
        if !seen.contains(&id) {
            defects.push(CatalogDefect::IdGap { missing: id });
        }
    }

    let mut per_facet: BTreeMap<Facet, usize> = Facet::ALL.iter().map(|f| (*f, 0)).collect();
    let mut per_domain: BTreeMap<Domain, usize> = Domain::ALL.iter().map(|d| (*d, 0)).collect();
    let mut reversed_facets = BTreeSet::new();
    for item in &catalog.items {
        *per_facet.entry(item.facet).or_insert(0) += 1;
        *per_domain.entry(item.domain).or_insert(0) += 1;
        if item.reverse {
            reversed_facets.insert(item.facet);
        }
    }

    for (facet, count) in &per_facet {
        if *count != ITEMS_PER_FACET {
            defects.push(CatalogDefect::FacetItemCount {
                facet: *facet,
                expected: ITEMS_PER_FACET,
                found: *count,
            });
        }
    }
    for (domain, count) in &per_domain {
        if *count != ITEMS_PER_DOMAIN {
            defects.push(CatalogDefect::DomainItemCount {
                domain: domain.letter(),
                expected: ITEMS_PER_DOMAIN,
                found: *count,
            });
        }
    }

    if !defects.is_empty() {
        log::error!(
            "catalog {} failed structural validation with {} defect(s)",
            catalog.version,
            defects.len()
        );
        return Err(StructuralError { version: catalog.version.clone(), defects });
    }

    let facets_without_reverse: Vec<Facet> = Facet::ALL
        .iter()
        .copied()
        .filter(|f| !reversed_facets.contains(f))
        .collect();
    if !facets_without_reverse.is_empty() {
        log::warn!(
            "catalog {}: facets without reverse-keyed items: {:?}",
            catalog.version,
            facets_without_reverse
        );
    }

    let reverse_items = catalog.items.iter().filter(|i| i.reverse).count();
    let stats = CatalogStats {
        version: catalog.version.clone(),
        total_items: catalog.len(),
        reverse_items,
        reverse_ratio: reverse_items as f64 / catalog.len() as f64,
        items_per_facet: per_facet,
        items_per_domain: per_domain,
        facets_without_reverse,
    };
    log::info!(
        "catalog {} ok: {} items, {} reverse-keyed",
        stats.version,
        stats.total_items,
        stats.reverse_items
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_structurally_valid() {
        let stats = validate_catalog(default_catalog()).unwrap();
        assert_eq!(stats.total_items, 60);
        assert_eq!(stats.reverse_items, 15);
        assert!(stats.facets_without_reverse.is_empty());
        assert!(stats.items_per_facet.values().all(|c| *c == 4));
        assert!(stats.items_per_domain.values().all(|c| *c == 12));
    }

    #[test]
    fn default_catalog_layout() {
        let catalog = default_catalog();
        assert_eq!(catalog.get(1).unwrap().facet, Facet::Curiosity);
        assert!(catalog.get(2).unwrap().reverse);
        assert!(!catalog.get(3).unwrap().reverse);
        assert_eq!(catalog.get(60).unwrap().facet, Facet::StressVulnerability);
        assert_eq!(&catalog.reverse_ids()[..3], &[2, 6, 10]);
    }

    #[test]
    fn collects_every_defect() {
        let mut catalog = default_catalog().clone();
        // drop ids 1 and 60, duplicate id 5
        catalog.items.retain(|i| i.id != 60);
        catalog.items.retain(|i| i.id != 1);
        catalog.items.push(ItemMeta {
            id: 5,
            domain: Domain::O,
            facet: Facet::Aesthetic,
            reverse: false,
            weight: None,
        });

        let err = validate_catalog(&catalog).unwrap_err();
        assert!(err.defects.contains(&CatalogDefect::DuplicateId { item_id: 5 }));
        assert!(err.defects.contains(&CatalogDefect::IdGap { missing: 1 }));
        assert!(err.defects.contains(&CatalogDefect::FacetItemCount {
            facet: Facet::Curiosity,
            expected: 4,
            found: 3
        }));
        assert!(err.defects.contains(&CatalogDefect::FacetItemCount {
            facet: Facet::StressVulnerability,
            expected: 4,
            found: 3
        }));
        assert!(err.defects.contains(&CatalogDefect::DomainItemCount {
            domain: 'N',
            expected: 12,
            found: 11
        }));
    }

    #[test]
    fn domain_mismatch_is_reported() {
        let mut catalog = default_catalog().clone();
        catalog.items[0].domain = Domain::N;
        let err = validate_catalog(&catalog).unwrap_err();
        assert!(err.defects.contains(&CatalogDefect::DomainMismatch { item_id: 1 }));
    }
}
