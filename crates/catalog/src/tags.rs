//! Tag rule engine.
//!
//! Tags are split in two partitions:
//!
//! - **auto** tags are derived from field values and regenerated in full on
//!   every mutation;
//! - **manual** tags are chosen by gallery staff and preserved verbatim.
//!
//! The rules are data ([`TagRules`]) so new materials, formats or structural
//! patterns can be added without touching the entity or the sync layer.

use std::collections::HashSet;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::details::DetailSchema;
use crate::model::ProductStatus;

/// A format label chosen when the largest dimension reaches `min_size` (cm).
#[derive(Debug, Clone, PartialEq)]
pub struct FormatThreshold {
    pub min_size: f64,
    pub label: String,
}

/// A shape a legacy tag can have that marks it as mechanically derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralPattern {
    /// Tag starts with the given prefix (case-sensitive).
    Prefix(String),
    /// Tag equals the given literal (case-sensitive).
    Exact(String),
    /// Tag is exactly this many ASCII digits (a bare year).
    Digits(usize),
}

impl StructuralPattern {
    pub fn matches(&self, tag: &str) -> bool {
        match self {
            StructuralPattern::Prefix(prefix) => tag.starts_with(prefix.as_str()),
            StructuralPattern::Exact(literal) => tag == literal,
            StructuralPattern::Digits(len) => {
                tag.len() == *len && tag.bytes().all(|b| b.is_ascii_digit())
            }
        }
    }
}

/// Declarative rule table driving derivation and classification.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRules {
    /// Evaluated in order; the first threshold reached wins, so keep it largest-first.
    pub format_thresholds: Vec<FormatThreshold>,
    /// `(keyword, label)`: the label is added when the normalized keyword
    /// appears in the normalized medium + product type text.
    pub materials: Vec<(String, String)>,
    /// Added iff the entity is `ACTIVE`.
    pub available_tag: String,
    pub location_prefix: String,
    /// Shapes that mark a legacy tag as auto, on top of value matches.
    pub structural: Vec<StructuralPattern>,
}

impl Default for TagRules {
    fn default() -> Self {
        Self::gallery()
    }
}

impl TagRules {
    /// The gallery's rule table.
    pub fn gallery() -> Self {
        let format_thresholds: Vec<FormatThreshold> = [
            (150.0, "Formato Grande"),
            (100.0, "Formato Mediano"),
            (50.0, "Formato Pequeño"),
            (0.0, "Formato Miniatura"),
        ]
        .into_iter()
        .map(|(min_size, label)| FormatThreshold {
            min_size,
            label: label.to_string(),
        })
        .collect();

        let materials = [
            ("oleo", "Óleo"),
            ("acrilico", "Acrílico"),
            ("mixta", "Técnica Mixta"),
            ("collage", "Collage"),
            ("tela", "Tela"),
            ("canvas", "Tela"),
            ("lienzo", "Tela"),
            ("papel", "Papel"),
            ("madera", "Madera"),
            ("metal", "Metal"),
            ("bronce", "Bronce"),
            ("grabado", "Grabado"),
            ("fotografia", "Fotografía"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let available_tag = "Disponible".to_string();
        let location_prefix = "locacion-".to_string();

        let mut structural = vec![StructuralPattern::Prefix(location_prefix.clone())];
        structural.extend(
            format_thresholds
                .iter()
                .map(|t| StructuralPattern::Exact(t.label.clone())),
        );
        structural.push(StructuralPattern::Exact(available_tag.clone()));
        structural.push(StructuralPattern::Digits(4));

        Self {
            format_thresholds,
            materials,
            available_tag,
            location_prefix,
            structural,
        }
    }

    /// Derive the full auto-tag set from current field values.
    ///
    /// Order: vendor, product type, year, location, availability, format,
    /// materials. Duplicates are dropped, first occurrence wins.
    pub fn derive<D: DetailSchema>(
        &self,
        vendor: &str,
        product_type: &str,
        status: ProductStatus,
        details: &D,
    ) -> Vec<String> {
        let mut tags = TagSet::default();

        tags.push(vendor.trim());
        tags.push(product_type.trim());
        if let Some(year) = details.year() {
            tags.push(year.trim());
        }
        if let Some(location) = details.location() {
            tags.push(&self.location_tag(location));
        }
        if status == ProductStatus::Active {
            tags.push(&self.available_tag);
        }
        if let Some(format) = self.format_tag(details.height(), details.width()) {
            tags.push(format);
        }
        for material in self.material_tags(details.medium(), product_type) {
            tags.push(material);
        }

        tags.into_vec()
    }

    /// `locacion-<slug>`: trimmed, lowercased, whitespace runs become `-`.
    pub fn location_tag(&self, location: &str) -> String {
        let slug = location
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("{}{}", self.location_prefix, slug)
    }

    /// At most one format label, from the larger of the two dimensions.
    ///
    /// Unparsable dimensions count as zero; when the larger one is not positive
    /// no format is known and no label is produced.
    pub fn format_tag(&self, height: Option<&str>, width: Option<&str>) -> Option<&str> {
        let height = height.and_then(parse_leading_number).unwrap_or(0.0);
        let width = width.and_then(parse_leading_number).unwrap_or(0.0);
        let largest = height.max(width);

        if largest <= 0.0 {
            return None;
        }

        self.format_thresholds
            .iter()
            .find(|t| largest >= t.min_size)
            .map(|t| t.label.as_str())
    }

    /// Labels whose keyword occurs in the normalized `medium + product type` text.
    pub fn material_tags(&self, medium: Option<&str>, product_type: &str) -> Vec<&str> {
        let text = normalize(&format!("{} {}", medium.unwrap_or_default(), product_type));

        let mut labels: Vec<&str> = Vec::new();
        for (keyword, label) in &self.materials {
            if text.contains(&normalize(keyword)) && !labels.contains(&label.as_str()) {
                labels.push(label);
            }
        }
        labels
    }

    /// Classify a legacy tag as auto (`true`) or manual (`false`).
    ///
    /// Auto iff the tag matches the vendor, the product type or a material label
    /// ignoring case and accents, or has one of the structural shapes.
    pub fn is_auto(&self, tag: &str, vendor: &str, product_type: &str) -> bool {
        let trimmed = tag.trim();
        let normalized = normalize(trimmed);

        if !normalized.is_empty() {
            let value_match = [vendor, product_type]
                .into_iter()
                .map(normalize)
                .chain(self.materials.iter().map(|(_, label)| normalize(label)))
                .any(|candidate| !candidate.is_empty() && candidate == normalized);
            if value_match {
                return true;
            }
        }

        self.structural.iter().any(|p| p.matches(trimmed))
    }

    /// Split a stored tag list into `(manual, auto)`, deduplicated, order kept.
    pub fn partition(
        &self,
        tags: &[String],
        vendor: &str,
        product_type: &str,
    ) -> (Vec<String>, Vec<String>) {
        let mut manual = TagSet::default();
        let mut auto = TagSet::default();
        for tag in tags {
            if self.is_auto(tag, vendor, product_type) {
                auto.push(tag);
            } else {
                manual.push(tag);
            }
        }
        (manual.into_vec(), auto.into_vec())
    }
}

/// Case-fold and strip diacritics (`"Óleo"` -> `"oleo"`).
pub fn normalize(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// `tags = manual ∪ auto`, manual first, deduplicated.
pub fn union(manual: &[String], auto: &[String]) -> Vec<String> {
    let mut tags = TagSet::default();
    for tag in manual.iter().chain(auto) {
        tags.push(tag);
    }
    tags.into_vec()
}

/// Numeric prefix of a string, the way a lenient form field is read:
/// `"120"`, `"120.5 cm"` and `" 80cm"` all parse; `"cm"` does not.
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let raw = raw.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (i, ch) in raw.char_indices() {
        match ch {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    raw[..end].trim_end_matches('.').parse().ok()
}

/// Insertion-ordered set of non-empty tags.
#[derive(Default)]
struct TagSet {
    seen: HashSet<String>,
    tags: Vec<String>,
}

impl TagSet {
    fn push(&mut self, tag: &str) {
        if tag.is_empty() || self.seen.contains(tag) {
            return;
        }
        self.seen.insert(tag.to_string());
        self.tags.push(tag.to_string());
    }

    fn into_vec(self) -> Vec<String> {
        self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::ArtworkDetails;

    fn rules() -> TagRules {
        TagRules::gallery()
    }

    fn artwork(height: Option<&str>, width: Option<&str>) -> ArtworkDetails {
        ArtworkDetails {
            height: height.map(str::to_string),
            width: width.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_folds_case_and_accents() {
        assert_eq!(normalize("  Óleo "), "oleo");
        assert_eq!(normalize("FOTOGRAFÍA"), "fotografia");
        assert_eq!(normalize("Técnica Mixta"), "tecnica mixta");
    }

    #[test]
    fn format_thresholds_pick_largest_dimension() {
        let r = rules();
        assert_eq!(r.format_tag(Some("120"), Some("80")), Some("Formato Mediano"));
        assert_eq!(r.format_tag(Some("40"), Some("150")), Some("Formato Grande"));
        assert_eq!(r.format_tag(Some("50"), None), Some("Formato Pequeño"));
        assert_eq!(r.format_tag(None, Some("12.5")), Some("Formato Miniatura"));
    }

    #[test]
    fn no_format_when_dimensions_unknown_or_zero() {
        let r = rules();
        assert_eq!(r.format_tag(None, None), None);
        assert_eq!(r.format_tag(Some("abc"), Some("")), None);
        assert_eq!(r.format_tag(Some("0"), Some("0")), None);
    }

    #[test]
    fn dimensions_with_units_still_parse() {
        assert_eq!(parse_leading_number("120 cm"), Some(120.0));
        assert_eq!(parse_leading_number(" 80.5cm"), Some(80.5));
        assert_eq!(parse_leading_number("1."), Some(1.0));
        assert_eq!(parse_leading_number("cm"), None);
        assert_eq!(parse_leading_number("-"), None);
    }

    #[test]
    fn material_tags_match_accent_insensitively() {
        let r = rules();
        let tags = r.material_tags(Some("Óleo y acrílico sobre LIENZO"), "Pintura");
        assert_eq!(tags, vec!["Óleo", "Acrílico", "Tela"]);

        // canvas and tela both map to the same label; it is emitted once.
        let tags = r.material_tags(Some("tela, canvas"), "");
        assert_eq!(tags, vec!["Tela"]);

        assert!(r.material_tags(None, "Escultura").is_empty());
    }

    #[test]
    fn derive_builds_full_auto_set() {
        let r = rules();
        let details = ArtworkDetails {
            medium: Some("Óleo sobre tela".into()),
            year: Some("2024".into()),
            height: Some("120".into()),
            width: Some("80".into()),
            location: Some("  Salón   A ".into()),
            ..Default::default()
        };

        let tags = r.derive(" Frida Kahlo ", "Pintura", ProductStatus::Active, &details);

        assert_eq!(
            tags,
            vec![
                "Frida Kahlo",
                "Pintura",
                "2024",
                "locacion-salón-a",
                "Disponible",
                "Formato Mediano",
                "Óleo",
                "Tela",
            ]
        );
    }

    #[test]
    fn derive_skips_availability_unless_active() {
        let r = rules();
        let tags = r.derive("Vendor", "", ProductStatus::Draft, &artwork(None, None));
        assert_eq!(tags, vec!["Vendor"]);
    }

    #[test]
    fn classification_by_value_and_structure() {
        let r = rules();
        let vendor = "Remedios Varo";
        let product_type = "Pintura";

        assert!(r.is_auto("remedios varo", vendor, product_type));
        assert!(r.is_auto("PINTURA", vendor, product_type));
        assert!(r.is_auto("oleo", vendor, product_type));
        assert!(r.is_auto("locacion-salon-a", vendor, product_type));
        assert!(r.is_auto("Formato Pequeño", vendor, product_type));
        assert!(r.is_auto("Disponible", vendor, product_type));
        assert!(r.is_auto(" 1987 ", vendor, product_type));

        assert!(!r.is_auto("Destacado", vendor, product_type));
        assert!(!r.is_auto("formato grande", vendor, product_type));
        assert!(!r.is_auto("19870", vendor, product_type));
        assert!(!r.is_auto("", "", ""));
    }

    #[test]
    fn partition_dedupes_and_keeps_order() {
        let r = rules();
        let tags: Vec<String> = [
            "Destacado",
            "2020",
            "Destacado",
            "Colección Otoño",
            "Disponible",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let (manual, auto) = r.partition(&tags, "Vendor", "Pintura");
        assert_eq!(manual, vec!["Destacado", "Colección Otoño"]);
        assert_eq!(auto, vec!["2020", "Disponible"]);
    }

    #[test]
    fn custom_rules_extend_the_table() {
        let mut r = rules();
        r.materials.push(("ceramica".into(), "Cerámica".into()));
        r.structural.push(StructuralPattern::Prefix("serie-".into()));

        assert_eq!(r.material_tags(Some("Cerámica esmaltada"), ""), vec!["Cerámica"]);
        assert!(r.is_auto("serie-azul", "", ""));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn dimension() -> impl Strategy<Value = Option<String>> {
            prop_oneof![
                Just(None),
                Just(Some(String::new())),
                Just(Some("n/a".to_string())),
                (0u32..400).prop_map(|n| Some(n.to_string())),
                (0u32..4000).prop_map(|n| Some(format!("{}.{} cm", n / 10, n % 10))),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: a format tag exists iff the larger parsed dimension is positive,
            /// and at most one format label is ever derived.
            #[test]
            fn format_tag_totality(height in dimension(), width in dimension()) {
                let r = TagRules::gallery();
                let details = artwork(height.as_deref(), width.as_deref());
                let tags = r.derive("", "", ProductStatus::Draft, &details);

                let labels: Vec<&String> = r.format_thresholds.iter().map(|t| &t.label).collect();
                let format_count = tags.iter().filter(|t| labels.contains(t)).count();

                let parse = |v: &Option<String>| {
                    v.as_deref().and_then(parse_leading_number).unwrap_or(0.0)
                };
                let largest = parse(&height).max(parse(&width));

                prop_assert_eq!(format_count, usize::from(largest > 0.0));
            }

            /// Property: derived material tags are always labels from the table.
            #[test]
            fn material_tags_subset_of_table(medium in "[a-zA-ZáéíóúÁÉÍÓÚ ,]{0,40}", product_type in "[a-zA-Z ]{0,20}") {
                let r = TagRules::gallery();
                let table: HashSet<&str> = r.materials.iter().map(|(_, l)| l.as_str()).collect();

                for label in r.material_tags(Some(&medium), &product_type) {
                    prop_assert!(table.contains(label));
                }
            }

            /// Property: classification never puts a tag in both partitions.
            #[test]
            fn partition_is_disjoint(
                tags in proptest::collection::vec("[A-Za-z0-9ó -]{0,12}", 0..12),
                vendor in "[A-Za-z ]{0,10}",
                product_type in "[A-Za-z ]{0,10}",
            ) {
                let r = TagRules::gallery();
                let (manual, auto) = r.partition(&tags, &vendor, &product_type);

                let auto_set: HashSet<&String> = auto.iter().collect();
                for tag in &manual {
                    prop_assert!(!auto_set.contains(tag));
                }
            }
        }
    }
}
