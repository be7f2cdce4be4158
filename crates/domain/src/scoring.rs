//! Rule-based dimension scorers
//!
//! Each scorer starts at 100 and subtracts fixed penalties for the problems it
//! finds. Penalties are independent and additive, and the score never drops
//! below zero.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::model::{Dimension, FixAction, Issue, OptimizationRule, Severity, Suggestion};

const TITLE_MIN_CHARS: usize = 30;
const TITLE_MAX_CHARS: usize = 80;
const DESCRIPTION_MIN_CHARS: usize = 50;
const DESCRIPTION_SEO_CHARS: usize = 150;
const DESCRIPTION_STRUCTURE_CHARS: usize = 200;
const RECOMMENDED_IMAGES: usize = 3;

static SPECIAL_CHAR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[!@#$%^&*()]{3,}").expect("valid regex"));

/// Score and findings for one dimension
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionReport {
    pub dimension: Dimension,
    pub score: u8,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<Suggestion>,
    /// Rules that target this dimension (counted, not applied)
    pub rules_considered: usize,
}

struct Scorecard {
    dimension: Dimension,
    score: i32,
    issues: Vec<Issue>,
    suggestions: Vec<Suggestion>,
}

impl Scorecard {
    fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            score: 100,
            issues: vec![],
            suggestions: vec![],
        }
    }

    fn issue(&mut self, severity: Severity, message: &str, penalty: i32) {
        self.issues.push(Issue {
            issue_type: self.dimension.as_str().to_string(),
            severity,
            message: message.to_string(),
            field: Some(self.dimension.field().to_string()),
        });
        self.score -= penalty;
    }

    fn suggest(&mut self, message: &str, fix_action: Option<FixAction>) {
        self.suggestions.push(Suggestion {
            suggestion_type: self.dimension.as_str().to_string(),
            message: message.to_string(),
            auto_fixable: fix_action.is_some(),
            fix_action,
        });
    }

    fn finish(self, rules: &[&OptimizationRule]) -> DimensionReport {
        DimensionReport {
            dimension: self.dimension,
            score: self.score.clamp(0, 100) as u8,
            issues: self.issues,
            suggestions: self.suggestions,
            rules_considered: rules.len(),
        }
    }
}

/// Score a product title
pub fn score_title(title: &str, rules: &[&OptimizationRule]) -> DimensionReport {
    let mut card = Scorecard::new(Dimension::Title);
    let length = title.chars().count();

    if length < TITLE_MIN_CHARS {
        card.issue(
            Severity::Warning,
            "Title is too short (under 30 characters)",
            15,
        );
        card.suggest(
            "Expand the title with brand, key features, and product type",
            None,
        );
    }

    if length > TITLE_MAX_CHARS {
        card.issue(
            Severity::Info,
            "Title is too long (over 80 characters) and may be truncated",
            5,
        );
    }

    if SPECIAL_CHAR_RUN.is_match(title) {
        card.issue(
            Severity::Warning,
            "Title contains runs of special characters",
            10,
        );
        card.suggest(
            "Remove repeated special characters from the title",
            Some(FixAction::CleanSpecialChars),
        );
    }

    if is_single_case(title) {
        card.issue(Severity::Info, "Title is written in a single case", 5);
        card.suggest(
            "Convert the title to title case",
            Some(FixAction::ConvertTitleCase),
        );
    }

    card.finish(rules)
}

/// Score a product description
pub fn score_description(description: &str, rules: &[&OptimizationRule]) -> DimensionReport {
    let mut card = Scorecard::new(Dimension::Description);
    let length = description.chars().count();

    if length < DESCRIPTION_MIN_CHARS {
        card.issue(
            Severity::Error,
            "Description is missing or too short (under 50 characters)",
            40,
        );
        card.suggest(
            "Write a description covering features, materials, and use cases",
            None,
        );
    } else if length < DESCRIPTION_SEO_CHARS {
        card.issue(
            Severity::Warning,
            "Description is too short for SEO (under 150 characters)",
            15,
        );
    }

    if length > DESCRIPTION_STRUCTURE_CHARS && !description.contains("\n\n") {
        card.issue(
            Severity::Info,
            "Long description needs structure (no paragraph breaks)",
            10,
        );
        card.suggest(
            "Split the description into paragraphs",
            Some(FixAction::AddParagraphs),
        );
    }

    card.finish(rules)
}

/// Score the image set
pub fn score_images(images: &[String], rules: &[&OptimizationRule]) -> DimensionReport {
    let mut card = Scorecard::new(Dimension::Images);

    if images.is_empty() {
        card.issue(Severity::Critical, "Product has no images", 50);
        card.suggest("Add at least 3 product images", None);
    } else if images.len() < RECOMMENDED_IMAGES {
        card.issue(
            Severity::Warning,
            "Insufficient images, 3 to 5 are recommended",
            20,
        );
    }

    card.finish(rules)
}

/// Score the category assignment
pub fn score_category(category_id: Option<&str>, rules: &[&OptimizationRule]) -> DimensionReport {
    let mut card = Scorecard::new(Dimension::Category);

    if category_id.is_none_or(|id| id.trim().is_empty()) {
        card.issue(Severity::Error, "Product category is unassigned", 30);
        card.suggest("Assign the product to a category", None);
    }

    card.finish(rules)
}

/// Score the price
pub fn score_price(price: Option<f64>, rules: &[&OptimizationRule]) -> DimensionReport {
    let mut card = Scorecard::new(Dimension::Price);

    // NaN fails the comparison and counts as invalid
    if !price.is_some_and(|p| p > 0.0) {
        card.issue(
            Severity::Critical,
            "Invalid price: missing, zero, or negative",
            50,
        );
        card.suggest("Set a positive price for the product", None);
    }

    card.finish(rules)
}

/// Round-half-up mean of the dimension scores
pub fn overall_score(scores: &[u8]) -> u8 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u32 = scores.iter().map(|s| u32::from(*s)).sum();
    let count = scores.len() as u32;
    ((2 * sum + count) / (2 * count)) as u8
}

/// A title has cased letters and they are all upper or all lower
fn is_single_case(title: &str) -> bool {
    let mut has_upper = false;
    let mut has_lower = false;
    for c in title.chars() {
        has_upper |= c.is_uppercase();
        has_lower |= c.is_lowercase();
    }
    has_upper != has_lower
}

#[cfg(test)]
mod tests {
    use super::*;

    fn severities(report: &DimensionReport) -> Vec<Severity> {
        report.issues.iter().map(|i| i.severity).collect()
    }

    #[test]
    fn test_short_title_penalized() {
        let report = score_title("Phone", &[]);
        assert_eq!(report.score, 85);
        assert_eq!(severities(&report), vec![Severity::Warning]);
        assert!(report.issues[0].message.contains("too short"));
        assert!(!report.suggestions[0].auto_fixable);
    }

    #[test]
    fn test_all_caps_title_only_case_penalty() {
        let report = score_title("ALL CAPS TITLE HERE HERE AND MORE", &[]);
        assert_eq!(report.score, 95);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(
            report.suggestions[0].fix_action,
            Some(FixAction::ConvertTitleCase)
        );
    }

    #[test]
    fn test_title_penalties_are_additive() {
        let report = score_title("SALE!!!", &[]);
        // short (15) + special chars (10) + single case (5)
        assert_eq!(report.score, 70);
        assert_eq!(report.issues.len(), 3);
        assert_eq!(
            report
                .suggestions
                .iter()
                .filter(|s| s.auto_fixable)
                .count(),
            2
        );
    }

    #[test]
    fn test_long_title_info() {
        let title = format!("Ergonomic Office Chair {}", "With Lumbar Support ".repeat(4));
        let report = score_title(title.trim(), &[]);
        assert_eq!(report.score, 95);
        assert_eq!(severities(&report), vec![Severity::Info]);
    }

    #[test]
    fn test_title_without_letters_is_not_single_case() {
        assert!(!is_single_case("1234567890"));
        assert!(is_single_case("lowercase title"));
        assert!(!is_single_case("Mixed Case"));
    }

    #[test]
    fn test_empty_description() {
        let report = score_description("", &[]);
        assert_eq!(report.score, 60);
        assert_eq!(severities(&report), vec![Severity::Error]);
    }

    #[test]
    fn test_description_too_short_for_seo() {
        let report = score_description(&"a".repeat(100), &[]);
        assert_eq!(report.score, 85);
        assert_eq!(severities(&report), vec![Severity::Warning]);
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_long_unstructured_description() {
        let report = score_description(&"word ".repeat(60), &[]);
        assert_eq!(report.score, 90);
        assert_eq!(
            report.suggestions[0].fix_action,
            Some(FixAction::AddParagraphs)
        );

        let structured = format!("{}\n\n{}", "word ".repeat(30), "word ".repeat(30));
        assert_eq!(score_description(&structured, &[]).score, 100);
    }

    #[test]
    fn test_description_monotonic_in_length() {
        let mut previous = 0;
        for len in [0, 10, 49, 50, 120, 149, 150, 200] {
            let score = score_description(&"x".repeat(len), &[]).score;
            assert!(score >= previous, "score dropped at length {}", len);
            previous = score;
        }
    }

    #[test]
    fn test_title_monotonic_in_length() {
        let mut previous = 0;
        for len in [1, 10, 29, 30, 50, 80] {
            let title = format!("A{}", "b".repeat(len - 1));
            let score = score_title(&title, &[]).score;
            assert!(score >= previous, "score dropped at length {}", len);
            previous = score;
        }
    }

    #[test]
    fn test_images() {
        let none = score_images(&[], &[]);
        assert_eq!(none.score, 50);
        assert_eq!(severities(&none), vec![Severity::Critical]);

        let two = score_images(&["a.jpg".to_string(), "b.jpg".to_string()], &[]);
        assert_eq!(two.score, 80);
        assert_eq!(severities(&two), vec![Severity::Warning]);

        let three: Vec<String> = (0..3).map(|i| format!("{}.jpg", i)).collect();
        assert_eq!(score_images(&three, &[]).score, 100);
    }

    #[test]
    fn test_category() {
        assert_eq!(score_category(None, &[]).score, 70);
        assert_eq!(score_category(Some("shoes"), &[]).score, 100);
    }

    #[test]
    fn test_price() {
        let zero = score_price(Some(0.0), &[]);
        assert_eq!(zero.score, 50);
        assert_eq!(severities(&zero), vec![Severity::Critical]);
        assert!(zero.issues[0].message.contains("Invalid price"));

        assert_eq!(score_price(None, &[]).score, 50);
        assert_eq!(score_price(Some(-1.0), &[]).score, 50);
        assert_eq!(score_price(Some(f64::NAN), &[]).score, 50);
        assert_eq!(score_price(Some(19.99), &[]).score, 100);
    }

    #[test]
    fn test_overall_score_rounds_half_up() {
        assert_eq!(overall_score(&[85, 60, 50, 70, 50]), 63);
        assert_eq!(overall_score(&[100, 100, 100, 100, 88]), 98);
        assert_eq!(overall_score(&[100, 100, 100, 100, 87]), 97);
        assert_eq!(overall_score(&[1, 0]), 1);
        assert_eq!(overall_score(&[]), 0);
    }

    #[test]
    fn test_rules_are_counted_not_applied() {
        use crate::model::{RuleCategory, RuleType};

        let rule = OptimizationRule {
            id: "r1".to_string(),
            tenant_id: None,
            name: "Heavy title rule".to_string(),
            category: RuleCategory::Title,
            rule_type: RuleType::Length,
            config: serde_json::json!({"min": 60}),
            weight: 5.0,
            penalty_points: 90,
            severity: Severity::Critical,
            is_active: true,
            auto_fix_template: None,
        };

        let report = score_title("Phone", &[&rule]);
        assert_eq!(report.score, 85);
        assert_eq!(report.rules_considered, 1);
    }
}
