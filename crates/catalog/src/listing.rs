use foundation::geo::LatLon;
use foundation::ids::ListingId;
use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Inclusive `[min, max]` range, in rupees for prices and sqft for areas.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

pub type PriceRange = ValueRange;
pub type AreaRange = ValueRange;

/// A single property project as shown in the list and on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub slug: String,
    pub city: String,
    pub micromarket: String,
    pub position: LatLon,
    pub price: PriceRange,
    pub area: AreaRange,
    pub typologies: Vec<String>,
    /// Raw possession date as supplied (`YYYY-MM-DD` or `YYYY-MM`).
    pub possession_date: String,
    pub rating: f64,
    pub image: String,
    pub image_alt: String,
    pub property_type: String,
}

impl Listing {
    /// Minimal listing; everything besides identity and position is empty.
    pub fn new(id: impl Into<ListingId>, name: impl Into<String>, position: LatLon) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            slug: slugify(&name),
            name,
            city: String::new(),
            micromarket: String::new(),
            position,
            price: ValueRange::new(0.0, 0.0),
            area: ValueRange::new(0.0, 0.0),
            typologies: Vec::new(),
            possession_date: String::new(),
            rating: 0.0,
            image: String::new(),
            image_alt: String::new(),
            property_type: String::new(),
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_price(mut self, min: f64, max: f64) -> Self {
        self.price = ValueRange::new(min, max);
        self
    }

    pub fn with_area(mut self, min: f64, max: f64) -> Self {
        self.area = ValueRange::new(min, max);
        self
    }

    pub fn with_typologies<I, S>(mut self, typologies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.typologies = typologies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_possession_date(mut self, date: impl Into<String>) -> Self {
        self.possession_date = date.into();
        self
    }
}

fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Wire form of a listing, matching the flat camelCase records of the data
/// source (`minPrice`, `latitude`, `propscore`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub micromarket: String,
    pub latitude: f64,
    pub longitude: f64,
    pub min_price: f64,
    pub max_price: f64,
    #[serde(default)]
    pub min_saleable_area: f64,
    #[serde(default)]
    pub max_saleable_area: f64,
    #[serde(default)]
    pub typologies: Vec<String>,
    #[serde(default)]
    pub possession_date: String,
    #[serde(default, alias = "rating")]
    pub propscore: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, rename = "type")]
    pub property_type: String,
}

impl TryFrom<ListingRecord> for Listing {
    type Error = CatalogError;

    fn try_from(r: ListingRecord) -> Result<Self, Self::Error> {
        let id = ListingId(r.id);
        let position = LatLon::new(r.latitude, r.longitude);
        if !position.is_valid() {
            return Err(CatalogError::InvalidCoordinate(id));
        }
        let price = ValueRange::new(r.min_price, r.max_price);
        if !price.is_valid() {
            return Err(CatalogError::InvalidRange { id, field: "price" });
        }
        let area = ValueRange::new(r.min_saleable_area, r.max_saleable_area);
        if !area.is_valid() {
            return Err(CatalogError::InvalidRange { id, field: "area" });
        }

        let slug = if r.slug.trim().is_empty() {
            slugify(&r.name)
        } else {
            r.slug
        };

        Ok(Listing {
            id,
            name: r.name,
            slug,
            city: r.city,
            micromarket: r.micromarket,
            position,
            price,
            area,
            typologies: r.typologies,
            possession_date: r.possession_date,
            rating: r.propscore,
            image: r.image,
            image_alt: r.alt,
            property_type: r.property_type,
        })
    }
}

impl From<&Listing> for ListingRecord {
    fn from(l: &Listing) -> Self {
        ListingRecord {
            id: l.id.get(),
            name: l.name.clone(),
            slug: l.slug.clone(),
            city: l.city.clone(),
            micromarket: l.micromarket.clone(),
            latitude: l.position.lat,
            longitude: l.position.lon,
            min_price: l.price.min,
            max_price: l.price.max,
            min_saleable_area: l.area.min,
            max_saleable_area: l.area.max,
            typologies: l.typologies.clone(),
            possession_date: l.possession_date.clone(),
            propscore: l.rating,
            image: l.image.clone(),
            alt: l.image_alt.clone(),
            property_type: l.property_type.clone(),
        }
    }
}
