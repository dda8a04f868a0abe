//! Static hero catalog.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const HERO_IMAGE_BASE: &str = "http://cdn.dota2.com/apps/dota2/images/heroes";
const HERO_NAME_PREFIX: &str = "npc_dota_hero_";

/// Errors raised while loading the hero catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read hero catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse hero catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate hero id {0} in catalog")]
    DuplicateId(u32),

    #[error("Hero {id} has an unexpected internal name: {name}")]
    BadName { id: u32, name: String },
}

/// A hero as it appears in the catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct HeroEntry {
    pub id: u32,
    /// Internal name, e.g. `npc_dota_hero_antimage`.
    pub name: String,
    pub localized_name: String,
}

/// Resolved hero with display name and image URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroDescriptor {
    pub id: u32,
    pub display_name: String,
    pub portrait_url: String,
    pub icon_url: String,
}

impl HeroDescriptor {
    fn from_entry(entry: &HeroEntry) -> Result<Self, CatalogError> {
        let slug = entry
            .name
            .strip_prefix(HERO_NAME_PREFIX)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CatalogError::BadName {
                id: entry.id,
                name: entry.name.clone(),
            })?;

        Ok(Self {
            id: entry.id,
            display_name: entry.localized_name.clone(),
            portrait_url: format!("{}/{}_vert.jpg", HERO_IMAGE_BASE, slug),
            icon_url: format!("{}/{}_full.png", HERO_IMAGE_BASE, slug),
        })
    }
}

/// Read-only lookup table from hero id to descriptor.
#[derive(Debug, Clone, Default)]
pub struct HeroCatalog {
    heroes: HashMap<u32, HeroDescriptor>,
}

impl HeroCatalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn from_entries(entries: &[HeroEntry]) -> Result<Self, CatalogError> {
        let mut heroes = HashMap::with_capacity(entries.len());
        for entry in entries {
            let descriptor = HeroDescriptor::from_entry(entry)?;
            if heroes.insert(entry.id, descriptor).is_some() {
                return Err(CatalogError::DuplicateId(entry.id));
            }
        }
        Ok(Self { heroes })
    }

    /// Load the catalog from a JSON array file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<HeroEntry> = serde_json::from_str(json)?;
        Self::from_entries(&entries)
    }

    pub fn get(&self, id: u32) -> Option<&HeroDescriptor> {
        self.heroes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }

    /// All heroes ordered by id.
    pub fn sorted(&self) -> Vec<&HeroDescriptor> {
        let mut heroes: Vec<&HeroDescriptor> = self.heroes.values().collect();
        heroes.sort_by_key(|h| h.id);
        heroes
    }
}
