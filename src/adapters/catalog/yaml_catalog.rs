//! YAML-backed catalog.
//!
//! File layout:
//!
//! ```yaml
//! schools:
//!   - id: hades
//!     name: Depth Psychology
//!     description: ...
//!     tags: [hades, N]
//!     concepts:
//!       - type: interactive
//!         title: Dream Work
//!         description: ...
//!         question: What does my recurring dream mean?
//! personas:
//!   - id: jung
//!     name: Carl Jung
//!     school: hades
//!     era: 1875-1961
//!     description: ...
//!     greeting: ...
//!     tags: [hades, INFJ, N]
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::domain::catalog::{Persona, School};
use crate::ports::{CatalogError, CatalogReader};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    schools: Vec<School>,
    #[serde(default)]
    personas: Vec<Persona>,
}

/// Read-only catalog, validated at load time.
#[derive(Debug, Clone)]
pub struct YamlCatalog {
    schools: Vec<School>,
    personas: Vec<Persona>,
}

impl YamlCatalog {
    /// Loads and validates a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Load` if the file cannot be read or parsed, or
    /// fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Load(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_yaml_str(&raw)?;

        tracing::info!(
            path = %path.display(),
            schools = catalog.schools.len(),
            personas = catalog.personas.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_yaml::from_str(raw).map_err(|e| CatalogError::Load(e.to_string()))?;
        Self::from_parts(file.schools, file.personas)
    }

    /// Builds a catalog from entries, in the given order.
    ///
    /// # Errors
    ///
    /// - duplicate school or persona ids
    /// - a persona whose school is not in the catalog
    pub fn from_parts(schools: Vec<School>, personas: Vec<Persona>) -> Result<Self, CatalogError> {
        let mut school_ids = HashSet::new();
        for school in &schools {
            if !school_ids.insert(&school.id) {
                return Err(CatalogError::Load(format!("duplicate school id '{}'", school.id)));
            }
        }

        let mut persona_ids = HashSet::new();
        for persona in &personas {
            if !persona_ids.insert(&persona.id) {
                return Err(CatalogError::Load(format!("duplicate persona id '{}'", persona.id)));
            }
            if !school_ids.contains(&persona.school) {
                return Err(CatalogError::Load(format!(
                    "persona '{}' references unknown school '{}'",
                    persona.id, persona.school
                )));
            }
        }

        Ok(Self { schools, personas })
    }
}

impl CatalogReader for YamlCatalog {
    fn schools(&self) -> &[School] {
        &self.schools
    }

    fn personas(&self) -> &[Persona] {
        &self.personas
    }
}
