//! Delivery addresses saved on the customer's account.

use serde::{Deserialize, Serialize};

use crate::{AddressId, ZoneId};

/// Address label shown in the address book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    #[default]
    Home,
    Office,
    #[serde(other)]
    Others,
}

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(default)]
    pub address_type: AddressType,
    #[serde(default)]
    pub contact_person_name: String,
    #[serde(default)]
    pub contact_person_number: String,
    #[serde(default)]
    pub address: String,
    /// Latitude as sent by the backend (decimal string).
    #[serde(default)]
    pub latitude: String,
    /// Longitude as sent by the backend (decimal string).
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub zone_id: Option<ZoneId>,
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub house: Option<String>,
    #[serde(default)]
    pub floor: Option<String>,
}

/// Body of the add-address and update-address calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub address_type: AddressType,
    pub contact_person_name: String,
    pub contact_person_number: String,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
}

impl From<&Address> for AddressInput {
    fn from(address: &Address) -> Self {
        Self {
            address_type: address.address_type,
            contact_person_name: address.contact_person_name.clone(),
            contact_person_number: address.contact_person_number.clone(),
            address: address.address.clone(),
            latitude: address.latitude.clone(),
            longitude: address.longitude.clone(),
            road: address.road.clone(),
            house: address.house.clone(),
            floor: address.floor.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_address_type_maps_to_others() {
        let address: Address =
            serde_json::from_str(r#"{"id": 1, "address_type": "gym", "address": "1 Main St"}"#)
                .unwrap();
        assert_eq!(address.address_type, AddressType::Others);
    }

    #[test]
    fn test_input_skips_empty_optionals() {
        let address: Address =
            serde_json::from_str(r#"{"id": 1, "address_type": "office", "latitude": "1.5"}"#)
                .unwrap();
        let json = serde_json::to_value(AddressInput::from(&address)).unwrap();
        assert_eq!(json["address_type"], "office");
        assert!(json.get("road").is_none());
    }
}
