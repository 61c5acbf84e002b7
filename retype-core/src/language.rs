//! File-extension based language hint.
//!
//! Purely cosmetic: it picks the comment syntax of the placeholder line for a
//! commit without content and the syntax definition the editor view
//! highlights with.

use std::path::Path;

/// Languages recognised from a file extension. Unknown extensions are `PlainText`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    C,
    Cpp,
    CSharp,
    Go,
    Ruby,
    Php,
    Html,
    Css,
    Json,
    Markdown,
    Sql,
    Shell,
    Yaml,
    Xml,
    Dart,
    Swift,
    Kotlin,
    Rust,
    #[default]
    PlainText,
}

const PLACEHOLDER: &str = "No code changes in this commit";

impl Language {
    /// Maps a bare extension (no dot, any case) to a language.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "py" => Self::Python,
            "java" => Self::Java,
            "c" => Self::C,
            "cpp" => Self::Cpp,
            "cs" => Self::CSharp,
            "go" => Self::Go,
            "rb" => Self::Ruby,
            "php" => Self::Php,
            "html" => Self::Html,
            "css" => Self::Css,
            "json" => Self::Json,
            "md" => Self::Markdown,
            "sql" => Self::Sql,
            "sh" | "bash" => Self::Shell,
            "yml" | "yaml" => Self::Yaml,
            "xml" => Self::Xml,
            "dart" => Self::Dart,
            "swift" => Self::Swift,
            "kt" => Self::Kotlin,
            "rs" => Self::Rust,
            _ => Self::PlainText,
        }
    }

    /// Derives the language from a path or URL ending in a file name.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// Lowercase display name, e.g. `"typescript"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Python => "python",
            Self::Java => "java",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CSharp => "csharp",
            Self::Go => "go",
            Self::Ruby => "ruby",
            Self::Php => "php",
            Self::Html => "html",
            Self::Css => "css",
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Sql => "sql",
            Self::Shell => "shell",
            Self::Yaml => "yaml",
            Self::Xml => "xml",
            Self::Dart => "dart",
            Self::Swift => "swift",
            Self::Kotlin => "kotlin",
            Self::Rust => "rust",
            Self::PlainText => "plaintext",
        }
    }

    /// Extension syntect knows this language by; `"txt"` for plain text.
    pub fn syntax_extension(self) -> &'static str {
        match self {
            Self::JavaScript => "js",
            Self::TypeScript => "ts",
            Self::Python => "py",
            Self::Java => "java",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CSharp => "cs",
            Self::Go => "go",
            Self::Ruby => "rb",
            Self::Php => "php",
            Self::Html => "html",
            Self::Css => "css",
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Sql => "sql",
            Self::Shell => "sh",
            Self::Yaml => "yaml",
            Self::Xml => "xml",
            Self::Dart => "dart",
            Self::Swift => "swift",
            Self::Kotlin => "kt",
            Self::Rust => "rs",
            Self::PlainText => "txt",
        }
    }

    /// The "no changes" placeholder written as a comment in this language.
    pub fn placeholder_comment(self) -> String {
        match self {
            Self::Python | Self::Ruby | Self::Shell | Self::Yaml | Self::PlainText => {
                format!("# {PLACEHOLDER}")
            }
            Self::Html | Self::Xml | Self::Markdown => format!("<!-- {PLACEHOLDER} -->"),
            Self::Css => format!("/* {PLACEHOLDER} */"),
            Self::Sql => format!("-- {PLACEHOLDER}"),
            _ => format!("// {PLACEHOLDER}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_from_nested_path() {
        assert_eq!(Language::from_path("packages/next/src/server/index.ts"), Language::TypeScript);
        assert_eq!(Language::from_path("scripts/build.BASH"), Language::Shell);
        assert_eq!(Language::from_path("Makefile"), Language::PlainText);
    }

    #[test]
    fn placeholder_uses_language_comment_syntax() {
        assert_eq!(Language::Python.placeholder_comment(), "# No code changes in this commit");
        assert_eq!(Language::Rust.placeholder_comment(), "// No code changes in this commit");
        assert_eq!(Language::Sql.placeholder_comment(), "-- No code changes in this commit");
        assert!(Language::Html.placeholder_comment().starts_with("<!--"));
    }
}
