use super::{find_closing_delimiter, StructureCheck, DELIMITER};

pub const REQUIRED_SECTIONS: [&str; 3] = ["## Summary", "## Methodology", "## Conclusion"];
pub const REFERENCES_SECTION: &str = "## References";

const CODE_FENCE: &str = "```";
const SHORTCODE_OPEN: &str = "{{<";
const SHORTCODE_CLOSE: &str = ">}}";

/// Lint the article body (everything after the closing front-matter
/// delimiter).
///
/// Every check runs regardless of the others and each failure becomes one
/// advisory issue.
pub fn validate_markdown_structure(content: &str) -> StructureCheck {
    let Some(body_start) = find_closing_delimiter(content) else {
        return StructureCheck {
            valid: false,
            issues: vec!["Cannot find markdown body".to_string()],
        };
    };
    let body = &content[body_start + DELIMITER.len()..];

    let mut issues = Vec::new();

    let missing: Vec<&str> = REQUIRED_SECTIONS
        .iter()
        .copied()
        .filter(|section| !body.contains(section))
        .collect();
    if !missing.is_empty() {
        issues.push(format!("Missing required sections: {}", missing.join(", ")));
    }

    if !body.contains(CODE_FENCE) {
        issues.push(
            "No code blocks found - consider including code examples, analysis scripts, or methodology snippets"
                .to_string(),
        );
    }

    if !body.contains(REFERENCES_SECTION) {
        issues.push("'## References' section is recommended for citing data sources".to_string());
    }

    if !body.contains(SHORTCODE_OPEN) || !body.contains(SHORTCODE_CLOSE) {
        issues.push(
            "No figures detected using Hugo figure syntax; articles should include visualizations"
                .to_string(),
        );
    }

    StructureCheck::from_issues(issues)
}
