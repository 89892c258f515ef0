//! Study material links for the session in progress.
//!
//! The list lives only as long as the active session that owns it.

use crate::error::AppError;
use crate::models::StudyMaterial;
use crate::validation::{normalize_material_url, validate_link_name};

#[derive(Debug, Clone, Default)]
pub struct MaterialList {
    materials: Vec<StudyMaterial>,
}

impl MaterialList {
    pub fn materials(&self) -> &[StudyMaterial] {
        &self.materials
    }

    /// Append a link under the next free id.
    pub fn add(&mut self, name: &str, url: &str) -> Result<StudyMaterial, AppError> {
        let name = validate_link_name(name)?;
        let url = normalize_material_url(url)?;

        let id = self.materials.iter().map(|m| m.id).max().map_or(1, |max| max + 1);
        let material = StudyMaterial {
            id,
            name: name.to_string(),
            url,
        };
        self.materials.push(material.clone());
        Ok(material)
    }

    /// Returns true if a link was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.materials.len();
        self.materials.retain(|m| m.id != id);
        self.materials.len() != before
    }
}
