//! # Service Catalog
//!
//! The clinic's list of billable services, used to fill the `servicio` of a
//! plan line. The plan only needs to list services; where they come from is
//! behind [`ServiceCatalog`].
//!
//! The YAML form is a plain list:
//!
//! ```yaml
//! - id: SRV-001
//!   label: Resina simple
//! - id: SRV-002
//!   label: Exodoncia
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use odonto_core::ServiceId;

use crate::error::PlanError;

/// A billable service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRef {
    /// Service identifier.
    pub id: ServiceId,
    /// Display label.
    pub label: String,
}

/// Source of billable services.
pub trait ServiceCatalog {
    /// Every service on offer.
    fn list_services(&self) -> Result<Vec<ServiceRef>, PlanError>;

    /// Look up a single service.
    fn find(&self, id: &ServiceId) -> Result<Option<ServiceRef>, PlanError> {
        Ok(self.list_services()?.into_iter().find(|s| &s.id == id))
    }
}

/// An in-memory service list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticServiceCatalog {
    services: Vec<ServiceRef>,
}

impl StaticServiceCatalog {
    /// Wrap a list of services.
    pub fn new(services: Vec<ServiceRef>) -> Self {
        Self { services }
    }

    /// Parse a YAML service list.
    pub fn from_yaml(yaml: &str) -> Result<Self, PlanError> {
        let services: Vec<ServiceRef> =
            serde_yaml::from_str(yaml).map_err(|e| PlanError::Catalog(e.to_string()))?;
        Ok(Self { services })
    }
}

impl ServiceCatalog for StaticServiceCatalog {
    fn list_services(&self) -> Result<Vec<ServiceRef>, PlanError> {
        Ok(self.services.clone())
    }
}

/// A service list read from a YAML file on every call, so edits to the file
/// are picked up without a restart.
#[derive(Debug, Clone)]
pub struct YamlServiceCatalog {
    path: PathBuf,
}

impl YamlServiceCatalog {
    /// Catalog backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ServiceCatalog for YamlServiceCatalog {
    fn list_services(&self) -> Result<Vec<ServiceRef>, PlanError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            PlanError::Catalog(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let catalog = StaticServiceCatalog::from_yaml(&text)?;
        tracing::debug!(path = %self.path.display(), services = catalog.services.len(), "service catalog loaded");
        catalog.list_services()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICES: &str = "- id: SRV-001\n  label: Resina simple\n- id: SRV-002\n  label: Exodoncia\n";

    #[test]
    fn test_static_catalog_from_yaml() {
        let catalog = StaticServiceCatalog::from_yaml(SERVICES).unwrap();
        let services = catalog.list_services().unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[1].label, "Exodoncia");
    }

    #[test]
    fn test_find_service() {
        let catalog = StaticServiceCatalog::from_yaml(SERVICES).unwrap();
        assert!(catalog.find(&ServiceId::new("SRV-001")).unwrap().is_some());
        assert!(catalog.find(&ServiceId::new("SRV-999")).unwrap().is_none());
    }

    #[test]
    fn test_malformed_yaml_is_catalog_error() {
        assert!(matches!(
            StaticServiceCatalog::from_yaml("id: [unclosed"),
            Err(PlanError::Catalog(_))
        ));
    }

    #[test]
    fn test_yaml_file_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("services.yaml");
        std::fs::write(&path, SERVICES).unwrap();

        let catalog = YamlServiceCatalog::new(&path);
        assert_eq!(catalog.list_services().unwrap().len(), 2);

        std::fs::write(&path, "- id: SRV-003\n  label: Sellante\n").unwrap();
        assert_eq!(catalog.list_services().unwrap()[0].id, ServiceId::new("SRV-003"));
    }

    #[test]
    fn test_missing_file_is_catalog_error() {
        let catalog = YamlServiceCatalog::new("/nonexistent/services.yaml");
        assert!(matches!(catalog.list_services(), Err(PlanError::Catalog(_))));
    }
}
