//! Single post page extraction
//!
//! Builds one [`PostRecord`] from a post detail page: headline fields,
//! body text, coordinates, pictures, the attribute groups and a few
//! job/housing heuristics on top of them.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use super::dom::{element_text, meta_property, non_empty_text, push_unique, strip_parens, SelectorChain};
use super::geo_extractor::extract_coordinates;
use super::list_extractor::id_from_url;
use super::phone_extractor::find_phone_numbers;
use crate::category::detect_category_from_url;
use crate::record::PostRecord;

/// Host serving listing pictures
pub const IMAGE_HOST: &str = "images.craigslist.org";

/// Colon-less attribute text containing one of these is an amenity
const AMENITY_TOKENS: [&str; 10] = [
    "furnished",
    "air",
    "w/d",
    "dishwasher",
    "parking",
    "apartment",
    "condo",
    "private",
    "shared",
    "studio",
];

static TITLE_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&["#titletextonly", "h1"]));
static PRICE_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&[".price", ".buyprice", ".attrgroup .price"]));
static LOCATION_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&[".postingtitletext small", ".mapaddress"]));
static BODY_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&["#postingbody", ".userbody", ".description"]));
static TIME_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| SelectorChain::new(&["time"]));
static POSTING_INFO_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&[".postinginfos .postinginfo"]));

static POST_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{7,})").expect("post id pattern is valid"));
static POST_ID_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)post id").expect("post id label pattern is valid"));
static QR_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^QR Code Link to This Post\s*").expect("qr prefix pattern is valid")
});
static COMPENSATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:compensation|pay|salary)\s*[:\-]\s*([^\n\r]+)")
        .expect("compensation pattern is valid")
});
static TITLE_DECORATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*+|~+|\[.*?\]|\(.*?\)").expect("title decoration pattern is valid")
});

/// Fields recovered from `key: value` attribute spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeField {
    Condition,
    Manufacturer,
    Model,
    AvailableFrom,
    EmploymentType,
    Compensation,
}

impl AttributeField {
    /// Map a lower-cased attribute label onto its field
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "condition" => Some(Self::Condition),
            "manufacturer" | "make / manufacturer" => Some(Self::Manufacturer),
            "model name / number" | "model" => Some(Self::Model),
            "available" | "available on" | "date available" => Some(Self::AvailableFrom),
            "employment type" => Some(Self::EmploymentType),
            "compensation" => Some(Self::Compensation),
            _ => None,
        }
    }

    fn slot(self, record: &mut PostRecord) -> &mut Option<String> {
        match self {
            Self::Condition => &mut record.condition,
            Self::Manufacturer => &mut record.manufacturer,
            Self::Model => &mut record.model,
            Self::AvailableFrom => &mut record.available_from,
            Self::EmploymentType => &mut record.employment_type,
            Self::Compensation => &mut record.compensation,
        }
    }
}

/// Parse a post detail page.
///
/// Never fails: missing markup leaves the corresponding field empty, and
/// empty fields are omitted once the record is serialized.
pub fn parse_post_page(document: &Html, source_url: &str) -> PostRecord {
    let title = TITLE_CHAIN.first_text_in(document);
    let body = extract_body(document);
    let coords = extract_coordinates(document);

    let mut record = PostRecord {
        id: extract_post_id(document, source_url),
        url: Some(source_url.to_string()).filter(|u| !u.is_empty()),
        title: title.clone(),
        datetime: extract_datetime(document),
        location: LOCATION_CHAIN
            .first_text_in(document)
            .map(|hood| strip_parens(&hood).trim().to_string())
            .filter(|hood| !hood.is_empty()),
        category: detect_category_from_url(source_url).map(String::from),
        price: non_empty_text(PRICE_CHAIN.first_in(document)),
        latitude: coords.latitude,
        longitude: coords.longitude,
        map_accuracy: coords.map_accuracy,
        phone_numbers: body.as_deref().map(find_phone_numbers).unwrap_or_default(),
        post: body,
        ..PostRecord::default()
    };

    collect_pictures(document, &mut record);
    collect_attributes(document, &mut record);
    apply_job_heuristics(&mut record);
    record.job_title = title.as_deref().and_then(job_title_from);

    debug!(
        source_url,
        id = record.id.as_deref().unwrap_or(""),
        attributes = record.attributes.len(),
        "post page parsed"
    );
    record
}

/// Parse raw post-page markup
pub fn parse_post_html(html: &str, source_url: &str) -> PostRecord {
    let document = Html::parse_document(html);
    parse_post_page(&document, source_url)
}

fn extract_datetime(document: &Html) -> Option<String> {
    if let Some(datetime) = TIME_CHAIN
        .first_in(document)
        .and_then(|el| el.value().attr("datetime"))
    {
        return Some(datetime.to_string());
    }
    meta_property(document, "og:updated_time")
        .or_else(|| meta_property(document, "article:published_time"))
}

type IdSource = fn(&Html) -> Option<String>;

/// Places holding the "post id: 1234567" text, in priority order
const POST_ID_SOURCES: [IdSource; 3] = [labelled_posting_info, first_posting_info, post_id_text_node];

fn labelled_posting_info(document: &Html) -> Option<String> {
    let selector = Selector::parse(".postinginfos .postinginfo").ok()?;
    document
        .select(&selector)
        .map(element_text)
        .find(|text| POST_ID_LABEL_RE.is_match(text))
}

fn first_posting_info(document: &Html) -> Option<String> {
    POSTING_INFO_CHAIN.first_in(document).map(element_text)
}

fn post_id_text_node(document: &Html) -> Option<String> {
    document
        .root_element()
        .text()
        .find(|text| POST_ID_LABEL_RE.is_match(text))
        .map(String::from)
}

fn extract_post_id(document: &Html, source_url: &str) -> Option<String> {
    POST_ID_SOURCES
        .iter()
        .filter_map(|source| source(document))
        .find_map(|text| {
            POST_ID_RE
                .captures(&text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
        .or_else(|| id_from_url(source_url))
}

fn extract_body(document: &Html) -> Option<String> {
    let body = element_text(BODY_CHAIN.first_in(document)?);
    Some(QR_PREFIX_RE.replace(&body, "").into_owned())
}

fn collect_pictures(document: &Html, record: &mut PostRecord) {
    let Ok(selector) = Selector::parse("img[src]") else {
        return;
    };

    for img in document.select(&selector) {
        if let Some(src) = img.value().attr("src") {
            if src.contains(IMAGE_HOST) {
                push_unique(&mut record.pics, src.to_string());
            }
        }
    }
}

fn collect_attributes(document: &Html, record: &mut PostRecord) {
    let (Ok(group_selector), Ok(span_selector)) =
        (Selector::parse(".attrgroup"), Selector::parse("span"))
    else {
        return;
    };

    for group in document.select(&group_selector) {
        for span in group.select(&span_selector) {
            let text = element_text(span);
            if text.is_empty() {
                continue;
            }
            push_unique(&mut record.attributes, text.clone());

            match text.split_once(':') {
                Some((key, value)) => {
                    let value = value.trim();
                    let field = AttributeField::from_label(&key.trim().to_lowercase());
                    if let Some(field) = field {
                        let slot = field.slot(record);
                        if slot.is_none() && !value.is_empty() {
                            *slot = Some(value.to_string());
                        }
                    }
                }
                None => {
                    if is_amenity(&text) {
                        push_unique(&mut record.amenities, text.clone());
                    }
                }
            }
        }
    }
}

fn is_amenity(text: &str) -> bool {
    let lowered = text.to_lowercase();
    AMENITY_TOKENS.iter().any(|token| lowered.contains(token))
}

fn apply_job_heuristics(record: &mut PostRecord) {
    let Some(body) = record.post.as_deref() else {
        return;
    };
    let lowered = body.to_lowercase();

    if record.employment_type.is_none() {
        if lowered.contains("full-time") {
            record.employment_type = Some("full-time".to_string());
        } else if lowered.contains("part-time") {
            record.employment_type = Some("part-time".to_string());
        }
    }

    if record.compensation.is_none() {
        record.compensation = COMPENSATION_RE
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|c| !c.is_empty());
    }
}

/// Title with `**`, `~~`, `[...]` and `(...)` decorations removed
fn job_title_from(title: &str) -> Option<String> {
    let stripped = TITLE_DECORATION_RE.replace_all(title, "");
    let stripped = stripped.trim();
    (!stripped.is_empty()).then(|| stripped.to_string())
}
