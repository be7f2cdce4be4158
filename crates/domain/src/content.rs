//! Deterministic content rewriting: titles, paragraphs, keywords, auto-fixes

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::model::{FixAction, Product, Suggestion};

const MAX_KEYWORDS: usize = 10;
const MIN_KEYWORD_CHARS: usize = 4;
const SEO_TITLE_MAX_CHARS: usize = 60;

static SPECIAL_CHAR_PAIRS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[!@#$%^&*()]{2,}").expect("valid regex"));

/// Strip special-character runs and title-case every word
pub fn optimize_title(title: &str) -> String {
    let cleaned = clean_special_chars(title);
    title_case(&cleaned)
}

/// Remove runs of two or more special characters, then trim
pub fn clean_special_chars(title: &str) -> String {
    SPECIAL_CHAR_PAIRS.replace_all(title, "").trim().to_string()
}

/// Uppercase the first letter of each word and lowercase the rest
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Group sentences into two-sentence paragraphs.
///
/// Descriptions with two sentences or fewer come back unchanged.
pub fn optimize_description(description: &str) -> String {
    let sentences: Vec<&str> = description
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.len() <= 2 {
        return description.to_string();
    }

    sentences
        .chunks(2)
        .map(|pair| format!("{}.", pair.join(". ")))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Ten most frequent words longer than three characters.
///
/// Ties keep first-encounter order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for token in normalized.split_whitespace() {
        if token.chars().count() < MIN_KEYWORD_CHARS {
            continue;
        }
        match positions.get(token) {
            Some(&index) => counts[index].1 += 1,
            None => {
                positions.insert(token, counts.len());
                counts.push((token, 1));
            }
        }
    }

    // sort_by is stable, so equal counts stay in encounter order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(token, _)| token.to_string())
        .collect()
}

/// Local SEO title used when no provider can generate one
pub fn fallback_seo_title(name: &str, category: Option<&str>) -> String {
    let mut title = optimize_title(name);
    if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
        title.push_str(" - ");
        title.push_str(&title_case(category));
    }
    if title.chars().count() > SEO_TITLE_MAX_CHARS {
        title = title.chars().take(SEO_TITLE_MAX_CHARS).collect::<String>();
        title.truncate(title.trim_end().len());
    }
    title
}

/// Rewritten fields produced by applying auto-fixes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub applied: Vec<FixAction>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Apply one fix action to the text it targets
pub fn apply_fix(action: FixAction, text: &str) -> String {
    match action {
        FixAction::CleanSpecialChars => clean_special_chars(text),
        FixAction::ConvertTitleCase => title_case(text),
        FixAction::AddParagraphs => optimize_description(text),
    }
}

/// Apply every auto-fixable suggestion to the product.
///
/// Each action runs at most once, in the order suggested.
pub fn apply_auto_fixes(product: &Product, suggestions: &[Suggestion]) -> ProductPatch {
    let mut title = product.name.clone();
    let mut description = product.description.clone();
    let mut applied = Vec::new();

    for action in suggestions
        .iter()
        .filter(|s| s.auto_fixable)
        .filter_map(|s| s.fix_action)
    {
        if applied.contains(&action) {
            continue;
        }
        match action {
            FixAction::CleanSpecialChars | FixAction::ConvertTitleCase => {
                title = apply_fix(action, &title);
            }
            FixAction::AddParagraphs => {
                description = apply_fix(action, &description);
            }
        }
        applied.push(action);
    }

    ProductPatch {
        title: (title != product.name).then_some(title),
        description: (description != product.description).then_some(description),
        applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimize_title() {
        assert_eq!(
            optimize_title("  SUPER deal!!! wireless HEADPHONES  "),
            "Super Deal Wireless Headphones"
        );
        assert_eq!(optimize_title("keep single! mark"), "Keep Single! Mark");
    }

    #[test]
    fn test_optimize_description_short_unchanged() {
        let text = "One sentence. Two sentences!";
        assert_eq!(optimize_description(text), text);
    }

    #[test]
    fn test_optimize_description_pairs() {
        let text = "First one. Second one! Third one? Fourth one. Fifth.";
        assert_eq!(
            optimize_description(text),
            "First one. Second one.\n\nThird one. Fourth one.\n\nFifth."
        );
    }

    #[test]
    fn test_extract_keywords_orders_by_count_then_encounter() {
        let keywords =
            extract_keywords("Steel bottle, steel cap. Insulated bottle keeps water cold; steel!");
        assert_eq!(keywords[0], "steel");
        assert_eq!(keywords[1], "bottle");
        assert_eq!(&keywords[2..], ["insulated", "keeps", "water", "cold"]);
    }

    #[test]
    fn test_extract_keywords_filters_short_and_caps_length() {
        let text = (0..15)
            .map(|i| format!("keyword{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let keywords = extract_keywords(&format!("the a cap {}", text));

        assert_eq!(keywords.len(), 10);
        assert!(keywords.iter().all(|k| k.chars().count() > 3));
        assert_eq!(keywords[0], "keyword0");
    }

    #[test]
    fn test_extract_keywords_strips_punctuation_inside_words() {
        assert_eq!(
            extract_keywords("steel-frame tent-stakes steel-frame"),
            vec!["steelframe", "tentstakes"]
        );
        assert_eq!(extract_keywords("user's guide!"), vec!["users", "guide"]);
    }

    #[test]
    fn test_extract_keywords_is_deterministic() {
        let text = "alpha beta gamma delta alpha beta epsilon";
        assert_eq!(extract_keywords(text), extract_keywords(text));
        assert_eq!(extract_keywords(""), Vec::<String>::new());
    }

    #[test]
    fn test_fallback_seo_title() {
        assert_eq!(
            fallback_seo_title("trail RUNNING shoes", Some("footwear")),
            "Trail Running Shoes - Footwear"
        );
        assert_eq!(fallback_seo_title("mug", None), "Mug");

        let long = fallback_seo_title(&"word ".repeat(20), Some("kitchen"));
        assert!(long.chars().count() <= 60);
        assert!(!long.ends_with(' '));
    }

    #[test]
    fn test_apply_auto_fixes() {
        let product = Product {
            id: "p1".to_string(),
            tenant_id: "t1".to_string(),
            name: "HOT DEAL!!! CAMPING TENT".to_string(),
            description: "Sleeps four. Waterproof. Packs small. Sets up fast.".to_string(),
            category_id: None,
            price: None,
            images: vec![],
            tags: vec![],
        };
        let suggestions = vec![
            Suggestion {
                suggestion_type: "title".to_string(),
                message: "clean".to_string(),
                auto_fixable: true,
                fix_action: Some(FixAction::CleanSpecialChars),
            },
            Suggestion {
                suggestion_type: "title".to_string(),
                message: "case".to_string(),
                auto_fixable: true,
                fix_action: Some(FixAction::ConvertTitleCase),
            },
            Suggestion {
                suggestion_type: "description".to_string(),
                message: "paragraphs".to_string(),
                auto_fixable: true,
                fix_action: Some(FixAction::AddParagraphs),
            },
            Suggestion {
                suggestion_type: "images".to_string(),
                message: "add images".to_string(),
                auto_fixable: false,
                fix_action: None,
            },
        ];

        let patch = apply_auto_fixes(&product, &suggestions);
        assert_eq!(patch.title.as_deref(), Some("Hot Deal Camping Tent"));
        assert_eq!(
            patch.description.as_deref(),
            Some("Sleeps four. Waterproof.\n\nPacks small. Sets up fast.")
        );
        assert_eq!(patch.applied.len(), 3);
    }

    #[test]
    fn test_apply_auto_fixes_no_changes() {
        let product = Product {
            id: "p1".to_string(),
            tenant_id: "t1".to_string(),
            name: "Fine Title".to_string(),
            description: String::new(),
            category_id: None,
            price: None,
            images: vec![],
            tags: vec![],
        };
        assert!(apply_auto_fixes(&product, &[]).is_empty());
    }
}
