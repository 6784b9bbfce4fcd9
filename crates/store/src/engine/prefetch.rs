//! Pre-resolution of inventory documents referenced by trade line items.
//!
//! Brands and models are looked up by display name and phones by IMEI
//! field, which a snapshot read cannot express, so these lookups run before
//! the atomic phase. An item that no longer resolves is logged and skipped
//! rather than failing the reversal: the balances and the record are still
//! unwound, only that item's inventory documents are left untouched.

use uuid::Uuid;

use vendra_core::document::DocPath;
use vendra_core::ledger::{PhonePlacement, PhoneRemoval};
use vendra_core::model::{LineItem, inventory};

use crate::repository::{InventoryRepository, RepoError};

/// Resolves the phone and IMEI index documents to delete when reversing a
/// purchase.
pub(crate) async fn removals(
    repo: &InventoryRepository,
    items: &[LineItem],
) -> Result<Vec<PhoneRemoval>, RepoError> {
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        let Some((_, model_path)) = resolve_model(repo, item).await? else {
            continue;
        };
        match repo.phone_by_imei(&model_path, &item.imei).await? {
            Some((phone_path, _)) => resolved.push(PhoneRemoval {
                phone_path,
                imei_path: inventory::imei_path(&item.imei),
            }),
            None => {
                tracing::warn!(imei = %item.imei, "phone not found, skipping item");
            }
        }
    }
    Ok(resolved)
}

/// Resolves the brand and model documents under which to recreate phones
/// when reversing a sale, minting a fresh id for each phone document.
pub(crate) async fn placements(
    repo: &InventoryRepository,
    items: &[LineItem],
) -> Result<Vec<PhonePlacement>, RepoError> {
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        let Some((brand_path, model_path)) = resolve_model(repo, item).await? else {
            continue;
        };
        resolved.push(PhonePlacement {
            item: item.clone(),
            brand_path,
            model_path,
            phone_id: Uuid::new_v4().to_string(),
        });
    }
    Ok(resolved)
}

async fn resolve_model(
    repo: &InventoryRepository,
    item: &LineItem,
) -> Result<Option<(DocPath, DocPath)>, RepoError> {
    let Some((brand_path, _)) = repo.brand_by_name(&item.brand).await? else {
        tracing::warn!(imei = %item.imei, brand = %item.brand, "brand not found, skipping item");
        return Ok(None);
    };
    match repo.model_by_name(&brand_path, &item.model).await? {
        Some((model_path, _)) => Ok(Some((brand_path, model_path))),
        None => {
            tracing::warn!(
                imei = %item.imei,
                model = %item.model,
                "model not found, skipping item"
            );
            Ok(None)
        }
    }
}
