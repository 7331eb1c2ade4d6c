pub mod typescript;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ast::SyntaxNode;
use crate::error::Result;

/// Source language of a file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Self::JavaScript,
            "jsx" => Self::Jsx,
            "ts" | "mts" | "cts" => Self::TypeScript,
            "tsx" => Self::Tsx,
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .map(|ext| Self::from_extension(&ext.to_string_lossy()))
            .unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JavaScript => write!(f, "JavaScript"),
            Self::Jsx => write!(f, "JSX"),
            Self::TypeScript => write!(f, "TypeScript"),
            Self::Tsx => write!(f, "TSX"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Language parser trait. Each parser lowers a source file into the
/// `SyntaxNode` tree checks run on.
pub trait LanguageParser: Send + Sync {
    fn language(&self) -> Language;
    fn parse_file(&self, path: &Path, content: &str) -> Result<SyntaxNode>;
}

/// Get the appropriate parser for a language.
pub fn parser_for_language(lang: Language) -> Option<Box<dyn LanguageParser>> {
    match lang {
        Language::JavaScript | Language::Jsx | Language::TypeScript | Language::Tsx => {
            Some(Box::new(typescript::TypeScriptParser::new(lang)))
        }
        Language::Unknown => None,
    }
}

/// Parse a file with the parser its extension selects.
pub fn parse_source(path: &Path, content: &str) -> Result<Option<SyntaxNode>> {
    match parser_for_language(Language::from_path(path)) {
        Some(parser) => parser.parse_file(path, content).map(Some),
        None => Ok(None),
    }
}
