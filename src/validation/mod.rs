// 文章校验模块
// 头部（front-matter）校验遇到第一个错误即返回；结构校验汇总全部问题

pub mod header;
pub mod structure;

pub use header::{validate_headers, HeaderError};
pub use structure::validate_markdown_structure;

/// Front-matter 分隔符
pub const DELIMITER: &str = "---";

/// 头部校验结果：单条消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCheck {
    pub valid: bool,
    pub message: String,
}

/// 结构校验结果：问题列表，每条都只是建议
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureCheck {
    pub valid: bool,
    pub issues: Vec<String>,
}

impl StructureCheck {
    pub fn from_issues(issues: Vec<String>) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
        }
    }
}

/// Both validator outcomes for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub headers: HeaderCheck,
    pub structure: StructureCheck,
}

impl ValidationReport {
    /// 两个校验器互不依赖
    pub fn run(text: &str) -> Self {
        Self {
            headers: validate_headers(text),
            structure: validate_markdown_structure(text),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.headers.valid && self.structure.valid
    }
}

/// Byte offset of the first delimiter after the opening three bytes.
pub(crate) fn find_closing_delimiter(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    if bytes.len() < DELIMITER.len() {
        return None;
    }
    bytes[DELIMITER.len()..]
        .windows(DELIMITER.len())
        .position(|w| w == DELIMITER.as_bytes())
        .map(|i| i + DELIMITER.len())
}
