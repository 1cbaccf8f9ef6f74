use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

use super::{find_closing_delimiter, HeaderCheck, DELIMITER};

/// 必填字段，报告缺失时按此顺序列出
pub const REQUIRED_FIELDS: [&str; 3] = ["date", "entities", "title"];

pub const MIN_TITLE_LEN: usize = 10;

lazy_static! {
    static ref DATE_RE: Regex = Regex::new(r"(?i)date:\s*(\d{4}-\d{2}-\d{2})").unwrap();
    static ref ENTITIES_RE: Regex = Regex::new(r"entities:").unwrap();
    static ref TITLE_RE: Regex = Regex::new(r"(?m)^[ \t]*title:[ \t]*(.*)$").unwrap();
}

/// 头部校验失败原因，每个变体对应一条报告消息
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("Missing YAML frontmatter delimiter '---' at start")]
    MissingOpeningDelimiter,
    #[error("Missing closing YAML delimiter '---'")]
    MissingClosingDelimiter,
    #[error("Missing required YAML headers: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid or missing 'date' header (must be YYYY-MM-DD format)")]
    InvalidDate,
    #[error("Missing or malformed 'entities' header")]
    MissingEntities,
    #[error("Invalid YAML in entities section: {0}")]
    MalformedEntities(String),
    #[error("Missing or empty 'title' header")]
    MissingTitle,
    #[error("'title' header must be at least 10 characters (got: {0})")]
    TitleTooShort(usize),
}

/// Validate the article's front-matter.
///
/// Checks run in a fixed order and the first failure wins; the result is
/// always data, never an error, so a malformed article still produces a
/// reviewable message.
pub fn validate_headers(content: &str) -> HeaderCheck {
    match check_headers(content) {
        Ok(()) => HeaderCheck {
            valid: true,
            message: "Headers validated successfully".to_string(),
        },
        Err(e) => {
            tracing::debug!(error = %e, "Header validation failed");
            HeaderCheck {
                valid: false,
                message: e.to_string(),
            }
        }
    }
}

fn check_headers(content: &str) -> Result<(), HeaderError> {
    let frontmatter = extract_frontmatter(content)?;

    let present = present_fields(frontmatter);
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !present.contains(*field))
        .collect();
    if !missing.is_empty() {
        return Err(HeaderError::MissingFields(missing));
    }

    if !DATE_RE.is_match(frontmatter) {
        return Err(HeaderError::InvalidDate);
    }

    if !ENTITIES_RE.is_match(frontmatter) {
        return Err(HeaderError::MissingEntities);
    }
    validate_entities_section(frontmatter)?;

    let title = extract_title(frontmatter).ok_or(HeaderError::MissingTitle)?;
    let len = title.chars().count();
    if len < MIN_TITLE_LEN {
        return Err(HeaderError::TitleTooShort(len));
    }

    Ok(())
}

/// 返回开头与结尾分隔符之间的文本
pub fn extract_frontmatter(content: &str) -> Result<&str, HeaderError> {
    if !content.starts_with(DELIMITER) {
        return Err(HeaderError::MissingOpeningDelimiter);
    }
    let end = find_closing_delimiter(content).ok_or(HeaderError::MissingClosingDelimiter)?;
    Ok(&content[DELIMITER.len()..end])
}

/// Lower-cased names of every `key:` line in the block.
fn present_fields(frontmatter: &str) -> HashSet<String> {
    frontmatter
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(field, _)| field.trim().to_lowercase())
        .collect()
}

/// Parse the slice starting at `entities:` as YAML.
///
/// Only a parse error is reported; the parsed shape is not inspected.
fn validate_entities_section(frontmatter: &str) -> Result<(), HeaderError> {
    let Some(start) = frontmatter.find("entities:") else {
        return Ok(());
    };

    let mut section = &frontmatter[start..];
    for next_field in ["title", "date"] {
        if let Some(pos) = section.find(&format!("\n{next_field}:")) {
            if pos > 0 {
                section = &section[..pos];
                break;
            }
        }
    }

    serde_yaml::from_str::<serde_yaml::Value>(section)
        .map(|_| ())
        .map_err(|e| HeaderError::MalformedEntities(e.to_string()))
}

/// 标题值，去掉首尾引号；空值返回 None
fn extract_title(frontmatter: &str) -> Option<String> {
    let caps = TITLE_RE.captures(frontmatter)?;
    let title = caps
        .get(1)?
        .as_str()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();

    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}
