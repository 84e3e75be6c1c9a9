//! Collaborators the dispatch actions report through.

use voxbridge_core::error::{Result, VoxbridgeError};
use voxbridge_core::types::{EmergencyContact, EmergencyType, GeoLocation};

/// Source of the user's current position.
pub trait LocationProvider {
    fn current_location(&self) -> Result<GeoLocation>;
}

/// Source of the emergency contact list.
pub trait ContactDirectory {
    fn contacts(&self) -> Result<Vec<EmergencyContact>>;
}

/// Location provider that always reports the same position.
#[derive(Debug, Clone)]
pub struct FixedLocation(pub GeoLocation);

impl LocationProvider for FixedLocation {
    fn current_location(&self) -> Result<GeoLocation> {
        Ok(self.0.clone())
    }
}

/// Location provider for hosts without positioning.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn current_location(&self) -> Result<GeoLocation> {
        Err(VoxbridgeError::CapabilityUnavailable(
            "location service".to_string(),
        ))
    }
}

/// Contact directory backed by a fixed list, usually from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory(pub Vec<EmergencyContact>);

impl ContactDirectory for StaticDirectory {
    fn contacts(&self) -> Result<Vec<EmergencyContact>> {
        Ok(self.0.clone())
    }
}

/// Contacts informed for an emergency of `kind`, in directory order.
///
/// Keeps contacts whose kind matches plus every priority-1 contact.
pub fn priority_contacts(
    contacts: &[EmergencyContact],
    kind: EmergencyType,
) -> Vec<EmergencyContact> {
    contacts
        .iter()
        .filter(|c| c.applies_to(kind))
        .cloned()
        .collect()
}
