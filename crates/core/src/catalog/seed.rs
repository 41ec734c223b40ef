//! Catalog seeds.
//!
//! The catalog starts from either the built-in asset set or a JSON array of
//! descriptors supplied at startup.

use super::catalog_model::ModelDescriptor;
use crate::errors::{Error, Result};

const KHRONOS_SAMPLES: &str = "https://raw.githubusercontent.com/KhronosGroup/glTF-Sample-Models/master";
const AR_ASSETS: &str = "https://simon-marquis.fr/ar";

/// The built-in asset set.
pub fn default_seed() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor::new(
            "monster",
            "Monster",
            format!("{KHRONOS_SAMPLES}/1.0/Monster/glTF/Monster.gltf"),
        ),
        ModelDescriptor::new("shark", "Shark", format!("{AR_ASSETS}/Shark.glb")),
        ModelDescriptor::new("astronaut", "Astronaut", format!("{AR_ASSETS}/Astronaut.glb")),
        ModelDescriptor::new(
            "barramundi",
            "Barramundi Fish",
            format!("{KHRONOS_SAMPLES}/2.0/BarramundiFish/glTF/BarramundiFish.gltf"),
        ),
        ModelDescriptor::new("campsite", "Camp Site", format!("{AR_ASSETS}/Camp Site.glb")),
        ModelDescriptor::new("cat", "Cat", format!("{AR_ASSETS}/Cat.glb")),
        ModelDescriptor::new(
            "milktruck",
            "Cesium Milk Truck",
            format!("{KHRONOS_SAMPLES}/2.0/CesiumMilkTruck/glTF/CesiumMilkTruck.gltf"),
        ),
    ]
}

/// Parses a seed from a JSON array of `{ id, name, url }` objects.
pub fn parse_seed(json: &str) -> Result<Vec<ModelDescriptor>> {
    let seed: Vec<ModelDescriptor> =
        serde_json::from_str(json).map_err(|e| Error::InvalidCatalog(e.to_string()))?;
    if let Some(blank) = seed.iter().find(|d| d.url.trim().is_empty()) {
        return Err(Error::InvalidCatalog(format!(
            "descriptor '{}' has an empty url",
            blank.id
        )));
    }
    Ok(seed)
}
