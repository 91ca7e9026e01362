//! 호스트 OS 식별 정보
//!
//! os-release 파일에서 `ID` 와 `VERSION_ID` 를 읽습니다. 파일을 읽지 못하면
//! 빈 값을 돌려주고, 건너뛰기 판정은 "건너뛰지 않음" 쪽으로 기웁니다.

use serde::Deserialize;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const OS_RELEASE_PATH: &str = "/etc/os-release";
pub const OS_RELEASE_FALLBACK_PATH: &str = "/usr/lib/os-release";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostInfo {
    /// 배포판 ID (`rhel`, `debian` 등)
    pub id: String,
    pub version_id: String,
}

impl HostInfo {
    pub fn new(id: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version_id: version_id.into(),
        }
    }

    /// 현재 호스트 정보를 읽습니다.
    pub fn detect() -> Self {
        Self::from_os_release_paths(OS_RELEASE_PATH, OS_RELEASE_FALLBACK_PATH)
    }

    /// 첫 번째 경로가 없을 때만 두 번째 경로를 읽습니다.
    pub fn from_os_release_paths(primary: impl AsRef<Path>, fallback: impl AsRef<Path>) -> Self {
        let path = if primary.as_ref().exists() {
            primary.as_ref()
        } else {
            fallback.as_ref()
        };

        match fs::read_to_string(path) {
            Ok(content) => {
                let info = Self::parse(&content);
                debug!(
                    path = %path.display(),
                    id = %info.id,
                    version_id = %info.version_id,
                    "호스트 OS 정보 확인"
                );
                info
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "호스트 버전 ID 를 찾을 수 없음");
                Self::default()
            }
        }
    }

    /// os-release 내용을 셸 대입문으로 해석합니다.
    pub fn parse(content: &str) -> Self {
        let mut info = Self::default();
        for (key, value) in parse_assignments(content) {
            match key.as_str() {
                "ID" => info.id = value,
                "VERSION_ID" => info.version_id = value,
                _ => {}
            }
        }
        info
    }
}

fn parse_assignments(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
            let (key, raw) = line.split_once('=')?;
            if !is_shell_identifier(key) {
                return None;
            }
            Some((key.to_string(), unquote(raw)))
        })
        .collect()
}

fn is_shell_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 셸 따옴표 규칙에 따라 값을 풉니다.
fn unquote(raw: &str) -> String {
    let mut value = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                for c in chars.by_ref() {
                    if c == '\'' {
                        break;
                    }
                    value.push(c);
                }
            }
            '"' => {
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => match chars.peek() {
                            Some(&next @ ('"' | '\\' | '$' | '`')) => {
                                value.push(next);
                                chars.next();
                            }
                            _ => value.push('\\'),
                        },
                        _ => value.push(c),
                    }
                }
            }
            '\\' => {
                if let Some(next) = chars.next() {
                    value.push(next);
                }
            }
            c if c.is_whitespace() => break,
            _ => value.push(c),
        }
    }

    value
}

/// 호스트 버전 비교 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionComparison {
    /// 문자열 순서 (`"10" < "9"`)
    #[default]
    Lexicographic,
    /// 점으로 나눈 숫자 단위 비교
    Numeric,
}

impl VersionComparison {
    /// `version >= minimum` 여부
    ///
    /// 숫자 비교에서 해석할 수 없는 버전은 `false` 입니다.
    pub fn at_least(self, version: &str, minimum: &str) -> bool {
        match self {
            VersionComparison::Lexicographic => version >= minimum,
            VersionComparison::Numeric => match (numeric_parts(version), numeric_parts(minimum)) {
                (Some(v), Some(m)) => compare_parts(&v, &m) != Ordering::Less,
                _ => false,
            },
        }
    }
}

impl std::str::FromStr for VersionComparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexicographic" => Ok(VersionComparison::Lexicographic),
            "numeric" => Ok(VersionComparison::Numeric),
            _ => Err(format!("알 수 없는 버전 비교 방식: {}", s)),
        }
    }
}

fn numeric_parts(version: &str) -> Option<Vec<u64>> {
    if version.is_empty() {
        return None;
    }
    version.split('.').map(|part| part.parse().ok()).collect()
}

fn compare_parts(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_values() {
        let content = r#"
NAME="Red Hat Enterprise Linux"
# comment
ID="rhel"
VERSION_ID='8.4'
PRETTY_NAME="Red Hat \"Ootpa\""
"#;
        let info = HostInfo::parse(content);
        assert_eq!(info.id, "rhel");
        assert_eq!(info.version_id, "8.4");
    }

    #[test]
    fn test_parse_unquoted_and_override() {
        let info = HostInfo::parse("ID=debian\nVERSION_ID=10\nVERSION_ID=11\n");
        assert_eq!(info.id, "debian");
        assert_eq!(info.version_id, "11");
    }

    #[test]
    fn test_unquote_escapes() {
        assert_eq!(unquote(r#""a\"b\\c\$d""#), r#"a"b\c$d"#);
        assert_eq!(unquote(r#""keep\n""#), r#"keep\n"#);
        assert_eq!(unquote("'lit\\eral'"), "lit\\eral");
        assert_eq!(unquote("abc def"), "abc");
        assert_eq!(unquote("a\\ b"), "a b");
    }

    #[test]
    fn test_invalid_keys_are_ignored() {
        let info = HostInfo::parse("1ID=x\nID-X=y\nID=fedora\n");
        assert_eq!(info.id, "fedora");
        assert_eq!(info.version_id, "");
    }

    #[test]
    fn test_lexicographic_comparison() {
        let cmp = VersionComparison::Lexicographic;
        assert!(cmp.at_least("8", "8"));
        assert!(cmp.at_least("8.4", "8"));
        assert!(!cmp.at_least("7", "8"));
        assert!(!cmp.at_least("", "8"));
        // 문자열 비교의 알려진 한계
        assert!(!cmp.at_least("10", "8"));
    }

    #[test]
    fn test_numeric_comparison() {
        let cmp = VersionComparison::Numeric;
        assert!(cmp.at_least("10", "8"));
        assert!(cmp.at_least("8.0", "8"));
        assert!(!cmp.at_least("7.9", "8"));
        assert!(!cmp.at_least("", "8"));
        assert!(!cmp.at_least("rolling", "8"));
    }
}
