//! Language lookup and parser construction

use super::error::{GrammarError, GrammarResult};
use super::options::GrammarOptions;
use crate::log_error;
use crate::mixed::{MixedKind, MixedParser};
use crate::syntax::{CssParser, JsParser, LanguageParser, PhpParser, SqlParser, XmlParser};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Json,
    Php,
    Css,
    Xml,
    Html,
    PhpHtml,
    Sql,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::JavaScript,
        Language::Json,
        Language::Php,
        Language::Css,
        Language::Xml,
        Language::Html,
        Language::PhpHtml,
        Language::Sql,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Json => "json",
            Language::Php => "php",
            Language::Css => "css",
            Language::Xml => "xml",
            Language::Html => "html",
            Language::PhpHtml => "phphtml",
            Language::Sql => "sql",
        }
    }

    /// Accepts the canonical name and a few common aliases, ignoring case
    pub fn from_name(name: &str) -> GrammarResult<Self> {
        let language = match name.to_ascii_lowercase().as_str() {
            "javascript" | "js" => Language::JavaScript,
            "json" => Language::Json,
            "php" => Language::Php,
            "css" => Language::Css,
            "xml" => Language::Xml,
            "html" | "htm" => Language::Html,
            "phphtml" | "php-html" => Language::PhpHtml,
            "sql" => Language::Sql,
            _ => return Err(GrammarError::unknown_language(name)),
        };
        Ok(language)
    }

    /// `.php` files start out as HTML, so they map to the mixed grammar
    pub fn from_extension(extension: &str) -> GrammarResult<Self> {
        let language = match extension.to_ascii_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Language::JavaScript,
            "json" => Language::Json,
            "php" | "phtml" => Language::PhpHtml,
            "css" => Language::Css,
            "xml" | "xsl" | "svg" => Language::Xml,
            "html" | "htm" => Language::Html,
            "sql" => Language::Sql,
            _ => return Err(GrammarError::unknown_extension(extension)),
        };
        Ok(language)
    }

    pub fn from_path(path: &Path) -> GrammarResult<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(extension)
    }

    /// Characters that should trigger re-indentation of the current line
    /// when typed
    pub fn electric_chars(self) -> &'static str {
        match self {
            Language::JavaScript | Language::Json | Language::Php => "{}:",
            Language::Css => "}",
            Language::Xml => "/",
            Language::Html | Language::PhpHtml => "{}/:",
            Language::Sql => ")",
        }
    }

    /// Grammars a mixed-mode language delegates to
    pub fn sub_grammars(self) -> &'static [Language] {
        match self {
            Language::Html => &[Language::Xml, Language::JavaScript, Language::Css],
            Language::PhpHtml => &[
                Language::Xml,
                Language::JavaScript,
                Language::Css,
                Language::Php,
            ],
            _ => &[],
        }
    }

    /// Build a fresh parser whose outermost indentation is `base_column`.
    /// XML-based grammars always start at column 0.
    pub fn make(
        self,
        base_column: usize,
        options: &GrammarOptions,
    ) -> GrammarResult<Box<dyn LanguageParser>> {
        options.validate()?;
        let parser: Box<dyn LanguageParser> = match self {
            Language::JavaScript => Box::new(JsParser::new(base_column, options)),
            Language::Json => {
                let options = GrammarOptions {
                    json: true,
                    ..options.clone()
                };
                Box::new(JsParser::new(base_column, &options))
            }
            Language::Php => Box::new(PhpParser::new(base_column, options)),
            Language::Css => Box::new(CssParser::new(base_column, options)),
            Language::Xml => Box::new(XmlParser::new(options)),
            Language::Html => Box::new(MixedParser::new(MixedKind::Html, options)),
            Language::PhpHtml => Box::new(MixedParser::new(MixedKind::PhpHtml, options)),
            Language::Sql => Box::new(SqlParser::new(options)),
        };
        Ok(parser)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Language {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// The set of grammars an editor has enabled, plus the options new parsers
/// are built with
#[derive(Debug, Clone)]
pub struct GrammarRegistry {
    options: GrammarOptions,
    disabled: BTreeSet<Language>,
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self {
            options: GrammarOptions::default(),
            disabled: BTreeSet::new(),
        }
    }
}

impl GrammarRegistry {
    pub fn new(options: GrammarOptions) -> GrammarResult<Self> {
        let mut registry = Self::default();
        registry.configure(options)?;
        Ok(registry)
    }

    pub fn options(&self) -> &GrammarOptions {
        &self.options
    }

    /// Replace the options used for parsers made from now on. Invalid
    /// options are rejected and the previous ones stay in effect.
    pub fn configure(&mut self, options: GrammarOptions) -> GrammarResult<()> {
        if let Err(err) = options.validate() {
            log_error!(err.error_code(), "Rejected grammar options", "error" => &err);
            return Err(err);
        }
        self.options = options;
        Ok(())
    }

    pub fn enable(&mut self, language: Language) {
        self.disabled.remove(&language);
    }

    pub fn disable(&mut self, language: Language) {
        self.disabled.insert(language);
    }

    pub fn is_enabled(&self, language: Language) -> bool {
        !self.disabled.contains(&language)
    }

    pub fn make(
        &self,
        language: Language,
        base_column: usize,
    ) -> GrammarResult<Box<dyn LanguageParser>> {
        if !self.is_enabled(language) {
            return Err(GrammarError::unknown_language(language.name()));
        }
        if let Some(missing) = language
            .sub_grammars()
            .iter()
            .copied()
            .find(|sub| !self.is_enabled(*sub))
        {
            let err = GrammarError::MissingSubGrammar { language, missing };
            log_error!(err.error_code(), "Mixed grammar cannot be built",
                "language" => language,
                "missing" => missing
            );
            return Err(err);
        }
        language.make(base_column, &self.options)
    }

    pub fn make_for_path(&self, path: &Path) -> GrammarResult<(Language, Box<dyn LanguageParser>)> {
        let language = Language::from_path(path)?;
        let parser = self.make(language, 0)?;
        Ok((language, parser))
    }
}
