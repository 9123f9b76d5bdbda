//! Saved delivery addresses of the signed-in customer.

use serde::Deserialize;
use tracing::instrument;
use wellspring_core::{Address, AddressId, AddressInput};

use super::MessageResponse;
use crate::error::Result;
use crate::http::ApiClient;

#[derive(Deserialize)]
struct AddressList {
    #[serde(default)]
    addresses: Vec<Address>,
}

/// Address book service.
#[derive(Debug, Clone)]
pub struct AddressService {
    api: ApiClient,
}

impl AddressService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Address>> {
        let list: AddressList = self.api.get("api/v1/customer/address/list").await?;
        Ok(list.addresses)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn add(&self, input: &AddressInput) -> Result<MessageResponse> {
        self.api.post("api/v1/customer/address/add", input).await
    }

    /// Replace an existing address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input), fields(address_id = %id))]
    pub async fn update(&self, id: AddressId, input: &AddressInput) -> Result<MessageResponse> {
        self.api
            .put(&format!("api/v1/customer/address/update/{id}"), input)
            .await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn delete(&self, id: AddressId) -> Result<()> {
        let id = id.to_string();
        self.api
            .delete("api/v1/customer/address/delete", &[("address_id", id.as_str())])
            .await
    }
}
