//! Joins puppies to the shops that list them.

use std::collections::HashMap;

use pup_market_core::ShopId;

use super::views::{PuppySummary, PuppyView, ShopView};

/// Shop lookup built once per listing refresh.
#[derive(Debug, Default)]
pub struct ShopIndex<'a> {
    by_id: HashMap<&'a ShopId, &'a ShopView>,
}

impl<'a> ShopIndex<'a> {
    #[must_use]
    pub fn new(shops: &'a [ShopView]) -> Self {
        Self {
            by_id: shops.iter().map(|shop| (&shop.id, shop)).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &ShopId) -> Option<&'a ShopView> {
        self.by_id.get(id).copied()
    }

    /// Attach the referenced shop to `puppy`. Dangling references link to
    /// nothing; the puppy is kept either way.
    pub fn link(&self, puppy: &mut PuppyView) {
        puppy.pet_shop = puppy
            .pet_shop_id
            .as_ref()
            .and_then(|id| self.get(id))
            .cloned();
    }
}

/// Link every puppy against `shops`, preserving the input order.
#[must_use]
pub fn link_shops(mut puppies: Vec<PuppyView>, shops: &[ShopView]) -> Vec<PuppyView> {
    let index = ShopIndex::new(shops);
    for puppy in &mut puppies {
        index.link(puppy);
    }
    puppies
}

/// Puppies whose shop reference is `shop_id`, in listing order.
#[must_use]
pub fn puppies_for_shop(puppies: &[PuppyView], shop_id: &ShopId) -> Vec<PuppySummary> {
    puppies
        .iter()
        .filter(|puppy| puppy.pet_shop_id.as_ref() == Some(shop_id))
        .map(PuppySummary::from)
        .collect()
}
