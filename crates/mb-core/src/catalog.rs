//! Card catalog lookups: preview image and market price for one printing

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default catalog endpoint
pub const SCRYFALL_API_BASE: &str = "https://api.scryfall.com";

/// Price shown when the catalog has no price in the chosen currency
pub const PRICE_NOT_AVAILABLE: &str = "N/A";

/// Layouts whose images live on the individual faces
pub const MULTI_FACE_LAYOUTS: [&str; 4] = [
    "double_faced_token",
    "transform",
    "modal_dfc",
    "modal_reversible_card",
];

/// The subset of a catalog card document the viewer reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogCard {
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub card_faces: Vec<CardFace>,
    #[serde(default)]
    pub prices: Prices,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageUris {
    pub normal: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardFace {
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

/// Market prices; the catalog sends them as decimal strings or null
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Prices {
    pub eur: Option<PriceValue>,
    pub usd: Option<PriceValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Text(String),
    Number(serde_json::Number),
}

impl std::fmt::Display for PriceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceValue::Text(s) => f.write_str(s),
            PriceValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Fiat currency used for the displayed price
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
}

impl Currency {
    /// Key of this currency in the catalog's price map
    pub fn code(self) -> &'static str {
        match self {
            Currency::Eur => "eur",
            Currency::Usd => "usd",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Eur => "\u{20AC}",
            Currency::Usd => "$",
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "eur" => Ok(Currency::Eur),
            "usd" => Ok(Currency::Usd),
            other => Err(Error::InvalidArgument(format!("unknown currency '{}'", other))),
        }
    }
}

/// Image and price for one card; an empty image URL means "not found"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetail {
    pub image_url: String,
    pub price: String,
}

impl CardDetail {
    pub fn not_found() -> Self {
        Self {
            image_url: String::new(),
            price: PRICE_NOT_AVAILABLE.to_string(),
        }
    }

    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }
}

/// Pick the preview image for a card, honouring multi-face layouts
pub fn resolve_image(card: &CatalogCard) -> Option<&str> {
    let uris = if MULTI_FACE_LAYOUTS.contains(&card.layout.as_str()) {
        card.card_faces.first()?.image_uris.as_ref()
    } else {
        card.image_uris.as_ref()
    };
    uris?.normal.as_deref().filter(|url| !url.is_empty())
}

/// Currency symbol followed by the catalog's value verbatim, or "N/A"
pub fn format_price(prices: &Prices, currency: Currency) -> String {
    let value = match currency {
        Currency::Eur => prices.eur.as_ref(),
        Currency::Usd => prices.usd.as_ref(),
    };
    match value {
        Some(PriceValue::Text(s)) if s.is_empty() => PRICE_NOT_AVAILABLE.to_string(),
        Some(v) => format!("{}{}", currency.symbol(), v),
        None => PRICE_NOT_AVAILABLE.to_string(),
    }
}

/// Build the detail for a fetched card; missing image data is an error
pub fn card_detail(id: &str, card: &CatalogCard, currency: Currency) -> Result<CardDetail> {
    let image_url = resolve_image(card).ok_or_else(|| Error::MissingImage(id.to_string()))?;
    Ok(CardDetail {
        image_url: image_url.to_string(),
        price: format_price(&card.prices, currency),
    })
}

/// Something that can look up catalog cards by identifier
pub trait CatalogClient {
    fn fetch_card(&self, id: &str) -> Result<CatalogCard>;
}

/// HTTP client for the Scryfall card API
#[derive(Debug, Clone)]
pub struct ScryfallClient {
    http: Client,
    base_url: String,
}

impl ScryfallClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http {
                url: base_url.clone(),
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of a single card document
    pub fn card_url(&self, id: &str) -> String {
        format!("{}/cards/{}", self.base_url, id)
    }
}

impl CatalogClient for ScryfallClient {
    fn fetch_card(&self, id: &str) -> Result<CatalogCard> {
        let url = self.card_url(id);
        let http_err = |source| Error::Http {
            url: url.clone(),
            source,
        };

        let response = self
            .http
            .get(&url)
            .header(USER_AGENT, concat!("mb-viewer/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json;q=0.9,*/*;q=0.8")
            .send()
            .map_err(http_err)?;

        if !response.status().is_success() {
            return Err(Error::HttpStatus {
                url: url.clone(),
                status: response.status().as_u16(),
            });
        }

        response.json::<CatalogCard>().map_err(http_err)
    }
}

/// Fetch image and price for a card. Failures are logged and reported as
/// `CardDetail::not_found()`, never as errors.
pub fn fetch_card_detail<C>(client: &C, id: &str, currency: Currency) -> CardDetail
where
    C: CatalogClient + ?Sized,
{
    match client
        .fetch_card(id)
        .and_then(|card| card_detail(id, &card, currency))
    {
        Ok(detail) => detail,
        Err(e) => {
            tracing::warn!(id, error = %e, "error fetching card details");
            CardDetail::not_found()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_http::{refused_url, serve_once};
    use std::collections::HashMap;

    fn card(json: &str) -> CatalogCard {
        serde_json::from_str(json).unwrap()
    }

    /// In-memory catalog keyed by identifier
    struct FakeCatalog(HashMap<&'static str, &'static str>);

    impl CatalogClient for FakeCatalog {
        fn fetch_card(&self, id: &str) -> Result<CatalogCard> {
            match self.0.get(id) {
                Some(json) => Ok(serde_json::from_str(json)?),
                None => Err(Error::HttpStatus {
                    url: format!("fake/cards/{}", id),
                    status: 404,
                }),
            }
        }
    }

    #[test]
    fn test_transform_uses_first_face() {
        let c = card(
            r#"{"layout":"transform",
                "image_uris":{"normal":"TOP"},
                "card_faces":[{"image_uris":{"normal":"X"}},{"image_uris":{"normal":"BACK"}}],
                "prices":{"eur":null}}"#,
        );
        assert_eq!(resolve_image(&c), Some("X"));
    }

    #[test]
    fn test_normal_layout_uses_card_image() {
        let c = card(r#"{"layout":"normal","image_uris":{"normal":"Y"},"prices":{}}"#);
        assert_eq!(resolve_image(&c), Some("Y"));
    }

    #[test]
    fn test_all_multi_face_layouts() {
        for layout in MULTI_FACE_LAYOUTS {
            let c = card(&format!(
                r#"{{"layout":"{}","card_faces":[{{"image_uris":{{"normal":"F"}}}}]}}"#,
                layout
            ));
            assert_eq!(resolve_image(&c), Some("F"), "layout {}", layout);
        }
    }

    #[test]
    fn test_missing_face_images() {
        let c = card(r#"{"layout":"modal_dfc","card_faces":[]}"#);
        assert_eq!(resolve_image(&c), None);
        assert!(matches!(card_detail("abc", &c, Currency::Eur), Err(Error::MissingImage(_))));
    }

    #[test]
    fn test_format_price() {
        let c = card(r#"{"prices":{"eur":"3.50","usd":"4.10"}}"#);
        assert_eq!(format_price(&c.prices, Currency::Eur), "\u{20AC}3.50");
        assert_eq!(format_price(&c.prices, Currency::Usd), "$4.10");

        let missing = card(r#"{"prices":{"eur":null}}"#);
        assert_eq!(format_price(&missing.prices, Currency::Eur), "N/A");

        let numeric = card(r#"{"prices":{"eur":0.25}}"#);
        assert_eq!(format_price(&numeric.prices, Currency::Eur), "\u{20AC}0.25");
    }

    #[test]
    fn test_fetch_card_detail_success() {
        let catalog = FakeCatalog(HashMap::from([(
            "bolt",
            r#"{"layout":"normal",
                "image_uris":{"normal":"https://img/bolt.jpg"},
                "prices":{"eur":"1.99"}}"#,
        )]));

        let detail = fetch_card_detail(&catalog, "bolt", Currency::Eur);
        assert_eq!(detail.image_url, "https://img/bolt.jpg");
        assert_eq!(detail.price, "\u{20AC}1.99");
    }

    #[test]
    fn test_fetch_card_detail_failures_are_not_found() {
        let catalog = FakeCatalog(HashMap::from([("broken", r#"{"layout":"transform"}"#)]));

        let not_found = CardDetail::not_found();
        assert_eq!(fetch_card_detail(&catalog, "missing", Currency::Eur), not_found);
        assert_eq!(fetch_card_detail(&catalog, "broken", Currency::Eur), not_found);
        assert!(!CardDetail::not_found().has_image());
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::Eur);
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert!("gbp".parse::<Currency>().is_err());
    }

    #[test]
    fn test_card_url() {
        let client =
            ScryfallClient::new("https://api.scryfall.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.card_url("abc"), "https://api.scryfall.com/cards/abc");
    }

    #[test]
    fn test_scryfall_client_reads_card() {
        let base = serve_once(
            "200 OK",
            r#"{"layout":"transform",
                "card_faces":[{"image_uris":{"normal":"X"}},{"image_uris":{"normal":"BACK"}}],
                "prices":{"eur":"3.50","usd":null}}"#,
        );
        let client = ScryfallClient::new(base, Duration::from_secs(5)).unwrap();

        let detail = fetch_card_detail(&client, "abc", Currency::Eur);

        assert_eq!(detail.image_url, "X");
        assert_eq!(detail.price, "\u{20AC}3.50");
    }

    #[test]
    fn test_scryfall_client_status_error() {
        let base = serve_once("404 Not Found", r#"{"object":"error"}"#);
        let client = ScryfallClient::new(base, Duration::from_secs(5)).unwrap();

        let err = client.fetch_card("missing").unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    }

    #[test]
    fn test_scryfall_client_failures_are_not_found() {
        let base = serve_once("404 Not Found", r#"{"object":"error"}"#);
        let client = ScryfallClient::new(base, Duration::from_secs(5)).unwrap();
        assert_eq!(
            fetch_card_detail(&client, "missing", Currency::Eur),
            CardDetail::not_found()
        );

        let client = ScryfallClient::new(refused_url(), Duration::from_secs(5)).unwrap();
        assert_eq!(
            fetch_card_detail(&client, "abc", Currency::Eur),
            CardDetail::not_found()
        );
    }
}
