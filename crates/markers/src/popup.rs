use catalog::listing::{Listing, ValueRange};
use chrono::{DateTime, NaiveDate};
use foundation::ids::ListingId;
use serde::{Deserialize, Serialize};

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupOptions {
    pub min_width_px: u32,
    pub close_button: bool,
    /// Whether opening another popup closes this one on the surface side.
    pub auto_close: bool,
}

impl Default for PopupOptions {
    fn default() -> Self {
        Self {
            min_width_px: 400,
            close_button: true,
            auto_close: false,
        }
    }
}

/// Detail card shown in the open marker's popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupContent {
    pub listing_id: ListingId,
    pub title: String,
    pub href: String,
    pub image: String,
    pub image_alt: String,
    pub micromarket: String,
    pub rating: f64,
    pub price: String,
    pub possession: String,
    pub typologies: String,
    pub area: String,
}

impl PopupContent {
    pub fn for_listing(listing: &Listing) -> Self {
        Self {
            listing_id: listing.id,
            title: listing.name.clone(),
            href: detail_href(listing),
            image: listing.image.clone(),
            image_alt: listing.image_alt.clone(),
            micromarket: listing.micromarket.clone(),
            rating: listing.rating,
            price: format_price_range(listing.price),
            possession: format_possession_date(&listing.possession_date),
            typologies: concatenate_typologies(&listing.typologies),
            area: format_area_range(listing.area),
        }
    }
}

pub fn detail_href(listing: &Listing) -> String {
    format!(
        "/property-for-sale-in/{}/{}/{}",
        listing.city.to_lowercase(),
        listing.slug.to_lowercase(),
        listing.id
    )
}

/// Rupee amount in Indian units: `₹2.1 Cr`, `₹95 L`, `₹85000`.
pub fn format_price(rupees: f64) -> String {
    if !rupees.is_finite() {
        return "-".to_string();
    }
    if rupees >= CRORE {
        format!("₹{} Cr", trim_decimals(rupees / CRORE))
    } else if rupees >= LAKH {
        format!("₹{} L", trim_decimals(rupees / LAKH))
    } else {
        format!("₹{}", rupees.round() as i64)
    }
}

pub fn format_price_range(range: ValueRange) -> String {
    format!("{} – {}", format_price(range.min), format_price(range.max))
}

pub fn format_area_range(range: ValueRange) -> String {
    format!(
        "{} – {} sqft",
        range.min.round() as i64,
        range.max.round() as i64
    )
}

/// `2027-12-01`, `2027-12` and RFC 3339 timestamps render as `Dec 2027`;
/// anything else is shown as given.
pub fn format_possession_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        });
    match date {
        Some(d) => d.format("%b %Y").to_string(),
        None => raw.to_string(),
    }
}

/// Typologies joined with `, `, blanks and repeats dropped.
pub fn concatenate_typologies(typologies: &[String]) -> String {
    let mut seen: Vec<&str> = Vec::with_capacity(typologies.len());
    for t in typologies {
        let t = t.trim();
        if !t.is_empty() && !seen.contains(&t) {
            seen.push(t);
        }
    }
    seen.join(", ")
}

fn trim_decimals(v: f64) -> String {
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::geo::LatLon;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_prices_in_indian_units() {
        assert_eq!(format_price(21_000_000.0), "₹2.1 Cr");
        assert_eq!(format_price(10_000_000.0), "₹1 Cr");
        assert_eq!(format_price(9_500_000.0), "₹95 L");
        assert_eq!(format_price(8_750_000.0), "₹87.5 L");
        assert_eq!(format_price(85_000.0), "₹85000");
        assert_eq!(format_price(f64::NAN), "-");
    }

    #[test]
    fn formats_possession_dates() {
        assert_eq!(format_possession_date("2027-12-01"), "Dec 2027");
        assert_eq!(format_possession_date("2026-03"), "Mar 2026");
        assert_eq!(format_possession_date("2028-06-30T00:00:00Z"), "Jun 2028");
        assert_eq!(format_possession_date("Ready to move"), "Ready to move");
    }

    #[test]
    fn joins_typologies() {
        let t = vec![
            "2 BHK".to_string(),
            " 3 BHK ".to_string(),
            "".to_string(),
            "2 BHK".to_string(),
        ];
        assert_eq!(concatenate_typologies(&t), "2 BHK, 3 BHK");
    }

    #[test]
    fn builds_popup_for_listing() {
        let listing = Listing::new(ListingId(7), "Oak Villas", LatLon::new(12.9, 77.5))
            .with_city("Bengaluru")
            .with_price(9_500_000.0, 21_000_000.0)
            .with_area(1200.0, 2400.4)
            .with_typologies(["2 BHK", "3 BHK"])
            .with_possession_date("2027-12-01");

        let popup = PopupContent::for_listing(&listing);
        assert_eq!(popup.href, "/property-for-sale-in/bengaluru/oak-villas/7");
        assert_eq!(popup.price, "₹95 L – ₹2.1 Cr");
        assert_eq!(popup.area, "1200 – 2400 sqft");
        assert_eq!(popup.typologies, "2 BHK, 3 BHK");
        assert_eq!(popup.possession, "Dec 2027");
    }
}
