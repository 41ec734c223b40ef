use std::collections::HashSet;

use log::{info, warn};

use super::catalog_model::ModelDescriptor;

/// Ordered, url-unique list of descriptors.
///
/// Entries only ever leave the catalog; a removed url is never re-added.
#[derive(Debug, Default)]
pub struct ModelCatalog {
    entries: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    /// Builds a catalog from a seed, keeping the first descriptor for any
    /// repeated url.
    pub fn new(seed: Vec<ModelDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(seed.len());
        for descriptor in seed {
            if seen.insert(descriptor.url.clone()) {
                entries.push(descriptor);
            } else {
                warn!(
                    "Ignoring duplicate catalog url {} (id {})",
                    descriptor.url, descriptor.id
                );
            }
        }
        Self { entries }
    }

    pub fn list(&self) -> &[ModelDescriptor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes the descriptor with this url. Returns whether anything was
    /// removed.
    pub fn remove_by_url(&mut self, url: &str) -> bool {
        let Some(index) = self.entries.iter().position(|d| d.url == url) else {
            return false;
        };
        let removed = self.entries.remove(index);
        info!(
            "Removed model {} ({}); catalog reduced to {} entries",
            removed.name,
            removed.url,
            self.entries.len()
        );
        for descriptor in &self.entries {
            info!("  remaining: {} {}", descriptor.name, descriptor.url);
        }
        true
    }
}
