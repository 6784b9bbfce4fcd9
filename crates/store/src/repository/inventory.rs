//! Inventory lookups: brands and models by name, phones by IMEI.
//!
//! Name and field lookups are plain collection scans, so they run outside
//! the atomic phase. The reversal and posting engines resolve inventory
//! documents here first and hand the resulting paths to the planners.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use vendra_core::document::{CollectionPath, DocPath};
use vendra_core::model::{BrandRecord, Imei, ImeiRecord, ModelRecord, PhoneRecord, inventory};

use crate::contract::DocumentStore;
use crate::repository::{RepoError, decode_doc};

/// Reads brand, model, phone, and IMEI index documents.
#[derive(Clone)]
pub struct InventoryRepository {
    store: Arc<dyn DocumentStore>,
}

impl InventoryRepository {
    /// Creates a new inventory repository.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Finds a brand by its display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or a matching document is
    /// malformed.
    pub async fn brand_by_name(
        &self,
        name: &str,
    ) -> Result<Option<(DocPath, BrandRecord)>, RepoError> {
        self.first_match(&inventory::brands(), "name", name).await
    }

    /// Finds a model by display name under one brand.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or a matching document is
    /// malformed.
    pub async fn model_by_name(
        &self,
        brand: &DocPath,
        name: &str,
    ) -> Result<Option<(DocPath, ModelRecord)>, RepoError> {
        self.first_match(&inventory::models_of(brand), "name", name)
            .await
    }

    /// Finds a phone by IMEI within one model's phones.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or a matching document is
    /// malformed.
    pub async fn phone_by_imei(
        &self,
        model: &DocPath,
        imei: &Imei,
    ) -> Result<Option<(DocPath, PhoneRecord)>, RepoError> {
        self.first_match(&inventory::phones_of(model), "imei", imei.as_str())
            .await
    }

    /// Point read of the IMEI index entry for `imei`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the document is malformed.
    pub async fn imei_entry(&self, imei: &Imei) -> Result<Option<ImeiRecord>, RepoError> {
        let path = inventory::imei_path(imei);
        match self.store.get(&path).await? {
            Some(value) => Ok(Some(decode_doc(&path, value)?)),
            None => Ok(None),
        }
    }

    /// Point read of a phone document.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the document is malformed.
    pub async fn phone(&self, path: &DocPath) -> Result<Option<PhoneRecord>, RepoError> {
        match self.store.get(path).await? {
            Some(value) => Ok(Some(decode_doc(path, value)?)),
            None => Ok(None),
        }
    }

    async fn first_match<T: DeserializeOwned>(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &str,
    ) -> Result<Option<(DocPath, T)>, RepoError> {
        let needle = Value::String(value.to_string());
        let found = self.store.find_by_field(collection, field, &needle).await?;
        match found.into_iter().next() {
            Some((path, raw)) => {
                let decoded = decode_doc(&path, raw)?;
                Ok(Some((path, decoded)))
            }
            None => Ok(None),
        }
    }
}
