//! Projection of raw record store records into view types.
//!
//! Field names and value shapes are owned by whoever edits the hosted tables,
//! so every read goes through [`FieldMapping`], which resolves a list of
//! aliases and tolerates the shapes Airtable produces (scalars, lookup lists,
//! attachment objects). Nothing here fails: malformed values fall back to the
//! field's default.

use pup_market_core::{Price, PuppyId, ShopId};
use serde_json::{Map, Value};

use super::views::{PuppyView, ShopView};
use crate::airtable::RawRecord;

/// Field name aliases, most specific first.
mod fields {
    pub const PUPPY_NAME: &[&str] = &["Name"];
    pub const PUPPY_BREED: &[&str] = &["Breed"];
    pub const PUPPY_PRICE: &[&str] = &["Price"];
    pub const PUPPY_AGE: &[&str] = &["Age of puppy", "Age"];
    pub const PUPPY_GENDER: &[&str] = &["Gender"];
    pub const PUPPY_VACCINATED: &[&str] = &["Vaccinated"];
    pub const PUPPY_DOB: &[&str] = &["Date of Birth"];
    pub const PUPPY_BACKGROUND: &[&str] = &["Background of puppy", "Description"];
    /// Migrated CDN URLs (comma-separated) win over the original attachments.
    pub const PUPPY_PHOTOS: &[&str] = &["CloudinaryPhotos", "Photos"];
    pub const PUPPY_SHOP: &[&str] = &["Pet Shop"];
    pub const PUPPY_CONTACT: &[&str] = &["Contact Number (For Pet Shop)", "Contact Number"];
    pub const PUPPY_ID_CODE: &[&str] = &["Puppy ID"];

    pub const SHOP_NAME: &[&str] = &["Pet Shop Name", "Name"];
    pub const SHOP_LOCATION: &[&str] = &["Location (For Pet Shop)", "Location"];
    pub const SHOP_CONTACT: &[&str] = &[
        "Contact Number (For Pet Shop)",
        "Contact Number",
        "Contact",
    ];
    pub const SHOP_EMAIL: &[&str] = &["Email (For Pet Shop)", "Email"];
    pub const SHOP_DESCRIPTION: &[&str] = &["Company description", "Description"];
    pub const SHOP_PHOTO: &[&str] = &["Shop Photo", "Image"];
}

const DEFAULT_PUPPY_NAME: &str = "Unnamed Puppy";
const DEFAULT_BREED: &str = "Unknown Breed";
const DEFAULT_PUPPY_BACKGROUND: &str = "No background available.";
const DEFAULT_SHOP_DESCRIPTION: &str = "No description available.";
const NOT_AVAILABLE: &str = "N/A";

/// Marker after which the CDN expects its transformation segment.
const UPLOAD_MARKER: &str = "/upload/";

/// Rewrites CDN image URLs to a resized, optimized delivery form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTransform {
    token: String,
    cloud_name: Option<String>,
}

impl ImageTransform {
    /// Insert `token` after `/upload/`. With a `cloud_name`, only URLs whose
    /// path contains `/{cloud_name}/` are rewritten.
    #[must_use]
    pub fn new(token: impl Into<String>, cloud_name: Option<String>) -> Self {
        Self {
            token: token.into(),
            cloud_name,
        }
    }

    /// Rewrite one URL.
    ///
    /// URLs without exactly one `/upload/` marker, URLs from another cloud and
    /// URLs that already carry the token pass through unchanged.
    #[must_use]
    pub fn apply(&self, url: &str) -> String {
        if self.token.is_empty() || url.matches(UPLOAD_MARKER).count() != 1 {
            return url.to_string();
        }

        if let Some(cloud) = self.cloud_name.as_deref()
            && !url.contains(&format!("/{cloud}/"))
        {
            return url.to_string();
        }

        match url.split_once(UPLOAD_MARKER) {
            Some((_, rest)) if rest.starts_with(&format!("{}/", self.token)) => url.to_string(),
            Some((head, rest)) => format!("{head}{UPLOAD_MARKER}{}/{rest}", self.token),
            None => url.to_string(),
        }
    }
}

/// Read-only view over a raw record's untyped fields.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> FieldMapping<'a> {
    #[must_use]
    pub const fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    /// First alias holding a non-empty value.
    #[must_use]
    pub fn value(&self, names: &[&str]) -> Option<&'a Value> {
        names
            .iter()
            .filter_map(|name| self.fields.get(*name))
            .find(|value| !is_empty(value))
    }

    /// Scalar text. Lookup lists yield their first element, numbers are
    /// formatted, attachments and other objects are ignored.
    #[must_use]
    pub fn text(&self, names: &[&str]) -> Option<String> {
        self.value(names).and_then(scalar_text)
    }

    /// Scalar text or `default`.
    #[must_use]
    pub fn text_or(&self, names: &[&str], default: &str) -> String {
        self.text(names).unwrap_or_else(|| default.to_string())
    }

    /// Checkbox-style flag.
    #[must_use]
    pub fn flag(&self, names: &[&str]) -> bool {
        self.value(names).is_some_and(truthy)
    }

    /// Price, zero when missing or unparseable.
    #[must_use]
    pub fn price(&self, names: &[&str]) -> Price {
        self.value(names).map_or(Price::ZERO, Price::from_value)
    }

    /// Digits of a phone number; `None` when no digits remain.
    #[must_use]
    pub fn phone_digits(&self, names: &[&str]) -> Option<String> {
        let digits: String = self
            .text(names)?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        (!digits.is_empty()).then_some(digits)
    }

    /// Photo URLs from an attachment list, a list of URL strings, or a
    /// comma-separated string. Empty entries are dropped.
    #[must_use]
    pub fn photo_urls(&self, names: &[&str]) -> Vec<String> {
        let mut urls = Vec::new();
        if let Some(value) = self.value(names) {
            collect_urls(value, &mut urls);
        }
        urls
    }
}

/// Maps raw records to views.
#[derive(Debug, Clone)]
pub struct Projector {
    images: ImageTransform,
}

impl Projector {
    #[must_use]
    pub const fn new(images: ImageTransform) -> Self {
        Self { images }
    }

    /// Project a puppy record. The shop is left unlinked.
    #[must_use]
    pub fn puppy(&self, record: &RawRecord) -> PuppyView {
        let map = FieldMapping::new(&record.fields);

        let photos: Vec<String> = map
            .photo_urls(fields::PUPPY_PHOTOS)
            .iter()
            .map(|url| self.images.apply(url))
            .collect();

        PuppyView {
            id: PuppyId::new(record.id.as_str()),
            name: map.text_or(fields::PUPPY_NAME, DEFAULT_PUPPY_NAME),
            breed: map.text_or(fields::PUPPY_BREED, DEFAULT_BREED),
            price: map.price(fields::PUPPY_PRICE),
            age: map.text(fields::PUPPY_AGE),
            gender: map.text_or(fields::PUPPY_GENDER, NOT_AVAILABLE),
            vaccinated: map.flag(fields::PUPPY_VACCINATED),
            dob: map.text(fields::PUPPY_DOB),
            description: map.text_or(fields::PUPPY_BACKGROUND, DEFAULT_PUPPY_BACKGROUND),
            image: photos.first().cloned(),
            photos,
            id_code: map.text(fields::PUPPY_ID_CODE),
            pet_shop_id: map.text(fields::PUPPY_SHOP).map(ShopId::from),
            pet_shop: None,
            contact_number: map.phone_digits(fields::PUPPY_CONTACT),
        }
    }

    /// Project a pet shop record.
    #[must_use]
    pub fn shop(&self, record: &RawRecord) -> ShopView {
        let map = FieldMapping::new(&record.fields);

        ShopView {
            id: ShopId::new(record.id.as_str()),
            name: map.text_or(fields::SHOP_NAME, NOT_AVAILABLE),
            location: map.text_or(fields::SHOP_LOCATION, NOT_AVAILABLE),
            contact: map.text_or(fields::SHOP_CONTACT, NOT_AVAILABLE),
            email: map.text_or(fields::SHOP_EMAIL, NOT_AVAILABLE),
            description: map.text_or(fields::SHOP_DESCRIPTION, DEFAULT_SHOP_DESCRIPTION),
            image: map
                .photo_urls(fields::SHOP_PHOTO)
                .first()
                .map(|url| self.images.apply(url)),
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items.iter().find_map(scalar_text),
        Value::Null | Value::Object(_) => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "checked"
        ),
        Value::Array(items) => items.first().is_some_and(truthy),
        Value::Null | Value::Number(_) | Value::Object(_) => false,
    }
}

fn collect_urls(value: &Value, urls: &mut Vec<String>) {
    match value {
        Value::String(s) => urls.extend(
            s.split(',')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string),
        ),
        Value::Array(items) => {
            for item in items {
                collect_urls(item, urls);
            }
        }
        Value::Object(attachment) => {
            if let Some(Value::String(url)) = attachment.get("url") {
                let url = url.trim();
                if !url.is_empty() {
                    urls.push(url.to_string());
                }
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const TOKEN: &str = "f_auto,q_auto,w_400,c_limit";

    fn projector() -> Projector {
        Projector::new(ImageTransform::new(TOKEN, None))
    }

    fn puppy(fields: Value) -> PuppyView {
        projector().puppy(&RawRecord::new("recPuppy", fields))
    }

    fn shop(fields: Value) -> ShopView {
        projector().shop(&RawRecord::new("recShop", fields))
    }

    #[test]
    fn test_price_shapes() {
        assert!((puppy(json!({"Price": "$1,234"})).price.amount() - 1234.0).abs() < f64::EPSILON);
        assert!((puppy(json!({"Price": 1234})).price.amount() - 1234.0).abs() < f64::EPSILON);
        assert!(puppy(json!({"Price": ""})).price.amount().abs() < f64::EPSILON);
        assert!(puppy(json!({"Price": null})).price.amount().abs() < f64::EPSILON);
        assert!(puppy(json!({})).price.amount().abs() < f64::EPSILON);
    }

    #[test]
    fn test_photos_from_attachments() {
        let view = puppy(json!({
            "Photos": [
                {"id": "att1", "url": "https://dl.airtable.com/a.jpg"},
                {"id": "att2"},
                {"id": "att3", "url": "  "},
                {"id": "att4", "url": "https://dl.airtable.com/b.jpg"}
            ]
        }));
        assert_eq!(
            view.photos,
            vec![
                "https://dl.airtable.com/a.jpg".to_string(),
                "https://dl.airtable.com/b.jpg".to_string()
            ]
        );
        assert_eq!(view.image.as_deref(), Some("https://dl.airtable.com/a.jpg"));
    }

    #[test]
    fn test_photos_from_comma_string_are_rewritten() {
        let view = puppy(json!({
            "CloudinaryPhotos": "https://res.cloudinary.com/demo/image/upload/v1/a.jpg, ,https://res.cloudinary.com/demo/image/upload/v1/b.jpg,",
            "Photos": [{"url": "https://dl.airtable.com/ignored.jpg"}]
        }));
        assert_eq!(
            view.photos,
            vec![
                format!("https://res.cloudinary.com/demo/image/upload/{TOKEN}/v1/a.jpg"),
                format!("https://res.cloudinary.com/demo/image/upload/{TOKEN}/v1/b.jpg"),
            ]
        );
    }

    #[test]
    fn test_photos_fall_back_when_migrated_field_blank() {
        let view = puppy(json!({
            "CloudinaryPhotos": "",
            "Photos": [{"url": "https://dl.airtable.com/a.jpg"}]
        }));
        assert_eq!(view.photos, vec!["https://dl.airtable.com/a.jpg".to_string()]);
    }

    #[test]
    fn test_photos_absent_is_empty_list() {
        let view = puppy(json!({"Photos": null}));
        assert!(view.photos.is_empty());
        assert!(view.image.is_none());
    }

    #[test]
    fn test_puppy_defaults() {
        let view = puppy(json!({}));
        assert_eq!(view.id.as_str(), "recPuppy");
        assert_eq!(view.name, DEFAULT_PUPPY_NAME);
        assert_eq!(view.breed, DEFAULT_BREED);
        assert_eq!(view.gender, NOT_AVAILABLE);
        assert_eq!(view.description, DEFAULT_PUPPY_BACKGROUND);
        assert!(!view.vaccinated);
        assert!(view.age.is_none());
        assert!(view.dob.is_none());
        assert!(view.pet_shop_id.is_none());
        assert!(view.pet_shop.is_none());
        assert!(view.contact_number.is_none());
    }

    #[test]
    fn test_puppy_fields() {
        let view = puppy(json!({
            "Name": "Biscuit",
            "Breed": "Beagle",
            "Age of puppy": 10,
            "Gender": "Male",
            "Vaccinated": true,
            "Date of Birth": "2024-03-01",
            "Background of puppy": "Loves naps.",
            "Pet Shop": ["recShop1"],
            "Contact Number (For Pet Shop)": ["+60 12-345 6789"],
            "Puppy ID": "PUP-001"
        }));
        assert_eq!(view.name, "Biscuit");
        assert_eq!(view.breed, "Beagle");
        assert_eq!(view.age.as_deref(), Some("10"));
        assert_eq!(view.gender, "Male");
        assert!(view.vaccinated);
        assert_eq!(view.dob.as_deref(), Some("2024-03-01"));
        assert_eq!(view.description, "Loves naps.");
        assert_eq!(view.pet_shop_id, Some(ShopId::new("recShop1")));
        assert_eq!(view.contact_number.as_deref(), Some("60123456789"));
        assert_eq!(view.id_code.as_deref(), Some("PUP-001"));
    }

    #[test]
    fn test_malformed_fields_degrade() {
        let view = puppy(json!({
            "Name": {"nested": true},
            "Vaccinated": 1,
            "Contact Number": "n/a",
            "Photos": 42
        }));
        assert_eq!(view.name, DEFAULT_PUPPY_NAME);
        assert!(!view.vaccinated);
        assert!(view.contact_number.is_none());
        assert!(view.photos.is_empty());
    }

    #[test]
    fn test_vaccinated_text_values() {
        assert!(puppy(json!({"Vaccinated": "Yes"})).vaccinated);
        assert!(!puppy(json!({"Vaccinated": "No"})).vaccinated);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let record = RawRecord::new(
            "recPuppy",
            json!({"Name": "Biscuit", "Price": "$900", "CloudinaryPhotos": "https://x/upload/a.jpg"}),
        );
        let projector = projector();
        assert_eq!(projector.puppy(&record), projector.puppy(&record));
    }

    #[test]
    fn test_shop_defaults() {
        let view = shop(json!({}));
        assert_eq!(view.name, NOT_AVAILABLE);
        assert_eq!(view.location, NOT_AVAILABLE);
        assert_eq!(view.contact, NOT_AVAILABLE);
        assert_eq!(view.email, NOT_AVAILABLE);
        assert_eq!(view.description, DEFAULT_SHOP_DESCRIPTION);
        assert!(view.image.is_none());
    }

    #[test]
    fn test_shop_aliases_and_lookups() {
        let view = shop(json!({
            "Name": "Acme Pets",
            "Location (For Pet Shop)": ["Kuala Lumpur"],
            "Contact": "012-3456789",
            "Email (For Pet Shop)": ["hello@acme.com"],
            "Company description": "Family run.",
            "Shop Photo": [{"url": "https://res.cloudinary.com/demo/image/upload/shop.jpg"}]
        }));
        assert_eq!(view.name, "Acme Pets");
        assert_eq!(view.location, "Kuala Lumpur");
        assert_eq!(view.contact, "012-3456789");
        assert_eq!(view.email, "hello@acme.com");
        assert_eq!(view.description, "Family run.");
        assert_eq!(
            view.image,
            Some(format!("https://res.cloudinary.com/demo/image/upload/{TOKEN}/shop.jpg"))
        );
    }

    #[test]
    fn test_image_transform_passthrough() {
        let transform = ImageTransform::new(TOKEN, None);
        assert_eq!(
            transform.apply("https://dl.airtable.com/a.jpg"),
            "https://dl.airtable.com/a.jpg"
        );
        assert_eq!(
            transform.apply("https://x/upload/a/upload/b.jpg"),
            "https://x/upload/a/upload/b.jpg"
        );
    }

    #[test]
    fn test_image_transform_does_not_double_apply() {
        let transform = ImageTransform::new(TOKEN, None);
        let once = transform.apply("https://x/upload/a.jpg");
        assert_eq!(transform.apply(&once), once);
    }

    #[test]
    fn test_image_transform_respects_cloud_name() {
        let transform = ImageTransform::new(TOKEN, Some("demo".to_string()));
        assert_eq!(
            transform.apply("https://res.cloudinary.com/other/image/upload/a.jpg"),
            "https://res.cloudinary.com/other/image/upload/a.jpg"
        );
        assert_eq!(
            transform.apply("https://res.cloudinary.com/demo/image/upload/a.jpg"),
            format!("https://res.cloudinary.com/demo/image/upload/{TOKEN}/a.jpg")
        );
    }
}
