//! Frontend-facing view types.
//!
//! Every field is always serialized (optional values as `null`) so the
//! browsing frontend can use straight-line field access.

use pup_market_core::{Price, PuppyId, ShopId};
use serde::Serialize;

/// A puppy listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuppyView {
    #[serde(rename = "_id")]
    pub id: PuppyId,
    pub name: String,
    pub breed: String,
    pub price: Price,
    pub age: Option<String>,
    pub gender: String,
    pub vaccinated: bool,
    pub dob: Option<String>,
    /// Free-text background of the puppy.
    pub description: String,
    /// Delivery URLs, possibly rewritten for the CDN. Never absent.
    pub photos: Vec<String>,
    /// First photo, if any.
    pub image: Option<String>,
    /// Human-facing listing code.
    pub id_code: Option<String>,
    pub pet_shop_id: Option<ShopId>,
    /// Filled in by the linker; `null` when the shop id does not resolve.
    pub pet_shop: Option<ShopView>,
    /// Digits only.
    pub contact_number: Option<String>,
}

/// A pet shop listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopView {
    #[serde(rename = "_id")]
    pub id: ShopId,
    pub name: String,
    pub location: String,
    pub contact: String,
    pub email: String,
    pub description: String,
    pub image: Option<String>,
}

/// Condensed puppy entry shown on a shop's detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PuppySummary {
    #[serde(rename = "_id")]
    pub id: PuppyId,
    pub name: String,
    pub breed: String,
    pub price: Price,
    pub image: Option<String>,
}

impl From<&PuppyView> for PuppySummary {
    fn from(puppy: &PuppyView) -> Self {
        Self {
            id: puppy.id.clone(),
            name: puppy.name.clone(),
            breed: puppy.breed.clone(),
            price: puppy.price,
            image: puppy.image.clone(),
        }
    }
}

/// A shop together with the puppies it lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopDetail {
    #[serde(flatten)]
    pub shop: ShopView,
    pub puppies: Vec<PuppySummary>,
}
