//! SQL tokenizer state
//!
//! Word classes are matched case-insensitively with regexes built once.

use regex::Regex;
use std::sync::OnceLock;

use crate::stream::{CharacterStream, StreamResult};
use crate::tokens::{PartialToken, TokenState};

const FUNCTIONS: &[&str] = &[
    "abs", "acos", "adddate", "aes_encrypt", "aes_decrypt", "ascii", "asin", "atan", "atan2",
    "avg", "benchmark", "bin", "bit_and", "bit_count", "bit_length", "bit_or", "cast", "ceil",
    "ceiling", "char_length", "character_length", "coalesce", "concat", "concat_ws",
    "connection_id", "conv", "convert", "cos", "cot", "count", "curdate", "current_date",
    "current_time", "current_timestamp", "current_user", "curtime", "database", "date_add",
    "date_format", "date_sub", "dayname", "dayofmonth", "dayofweek", "dayofyear", "decode",
    "degrees", "des_encrypt", "des_decrypt", "elt", "encode", "encrypt", "exp", "export_set",
    "extract", "field", "find_in_set", "floor", "format", "found_rows", "from_days",
    "from_unixtime", "get_lock", "greatest", "group_unique_users", "hex", "ifnull", "inet_aton",
    "inet_ntoa", "instr", "interval", "is_free_lock", "isnull", "last_insert_id", "lcase",
    "least", "left", "length", "ln", "load_file", "locate", "log", "log2", "log10", "lower",
    "lpad", "ltrim", "make_set", "master_pos_wait", "max", "md5", "mid", "min", "mod",
    "monthname", "now", "nullif", "oct", "octet_length", "ord", "password", "period_add",
    "period_diff", "pi", "position", "pow", "power", "quarter", "quote", "radians", "rand",
    "release_lock", "repeat", "reverse", "right", "round", "rpad", "rtrim", "sec_to_time",
    "session_user", "sha", "sha1", "sign", "sin", "soundex", "space", "sqrt", "std", "stddev",
    "strcmp", "subdate", "substring", "substring_index", "sum", "sysdate", "system_user", "tan",
    "time_format", "time_to_sec", "to_days", "trim", "ucase", "unique_users", "unix_timestamp",
    "upper", "user", "version", "week", "weekday", "yearweek",
];

const KEYWORDS: &[&str] = &[
    "alter", "grant", "revoke", "primary", "key", "table", "start", "transaction", "select",
    "update", "insert", "delete", "create", "describe", "from", "into", "values", "where", "join",
    "inner", "left", "natural", "and", "or", "in", "not", "xor", "like", "using", "on", "order",
    "group", "by", "asc", "desc", "limit", "offset", "union", "all", "as", "distinct", "set",
    "commit", "rollback", "replace", "view", "database", "separator", "if", "exists", "null",
    "truncate", "status", "show", "lock", "unique",
];

const TYPES: &[&str] = &[
    "bigint", "binary", "bit", "blob", "bool", "char", "character", "date", "datetime", "dec",
    "decimal", "double", "enum", "float", "float4", "float8", "int", "int1", "int2", "int3",
    "int4", "int8", "integer", "long", "longblob", "longtext", "mediumblob", "mediumint",
    "mediumtext", "middleint", "nchar", "numeric", "real", "set", "smallint", "text", "time",
    "timestamp", "tinyblob", "tinyint", "tinytext", "varbinary", "varchar", "year",
];

const OPERATORS: &[&str] = &[
    ":=", "<", "<=", "==", "<>", ">", ">=", "like", "rlike", "in", "xor", "between",
];

struct WordClasses {
    operators: Regex,
    keywords: Regex,
    functions: Regex,
    types: Regex,
}

static WORD_CLASSES: OnceLock<Option<WordClasses>> = OnceLock::new();

fn word_regex(words: &[&str]) -> Option<Regex> {
    let alternatives: Vec<String> = words.iter().map(|word| regex::escape(word)).collect();
    Regex::new(&format!("(?i)^(?:{})$", alternatives.join("|"))).ok()
}

fn word_classes() -> Option<&'static WordClasses> {
    WORD_CLASSES
        .get_or_init(|| {
            Some(WordClasses {
                operators: word_regex(OPERATORS)?,
                keywords: word_regex(KEYWORDS)?,
                functions: word_regex(FUNCTIONS)?,
                types: word_regex(TYPES)?,
            })
        })
        .as_ref()
}

/// Style of a bare word, checked as operator, keyword, function, then type
pub fn word_style(word: &str) -> &'static str {
    let Some(classes) = word_classes() else {
        return "sql-word";
    };
    if classes.operators.is_match(word) {
        "sql-operator"
    } else if classes.keywords.is_match(word) {
        "sql-keyword"
    } else if classes.functions.is_match(word) {
        "sql-function"
    } else if classes.types.is_match(word) {
        "sql-type"
    } else {
        "sql-word"
    }
}

fn is_operator_char(ch: char) -> bool {
    matches!(ch, '*' | '+' | '-' | '<' | '>' | '=' | '&' | '|' | ':' | '/')
}

fn read_fraction(stream: &mut CharacterStream) -> StreamResult<()> {
    stream.consume_while(|ch| ch.is_ascii_digit());
    if stream.equals('.') {
        stream.advance()?;
        stream.consume_while(|ch| ch.is_ascii_digit());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlState {
    #[default]
    Normal,
    /// Quoted literal; backquoted names use `` ` ``
    Literal(char),
}

impl SqlState {
    fn normal(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<PartialToken>> {
        let ch = stream.advance()?;
        let style = match ch {
            '@' | '$' => {
                stream.consume_while(|c| c.is_alphanumeric() || c == '_');
                "sql-var"
            }
            '"' | '\'' | '`' => {
                *self = SqlState::Literal(ch);
                return Ok(None);
            }
            ',' | ';' => "sql-separator",
            '-' if stream.equals('-') => {
                stream.consume_while(|c| c != '\n');
                "sql-comment"
            }
            '-' if stream.matches_predicate(|c| c.is_ascii_digit()) => {
                read_fraction(stream)?;
                "sql-number"
            }
            '-' => "sql-operator",
            _ if is_operator_char(ch) => {
                stream.consume_while(is_operator_char);
                "sql-operator"
            }
            _ if ch.is_ascii_digit() => {
                read_fraction(stream)?;
                "sql-number"
            }
            '(' | ')' => "sql-punctuation",
            _ => {
                stream.consume_while(|c| c.is_alphanumeric() || c == '_');
                let word = stream.commit();
                let style = word_style(&word);
                return Ok(Some(PartialToken::plain(style).with_content(word)));
            }
        };
        Ok(Some(PartialToken::plain(style)))
    }

    fn literal(&mut self, stream: &mut CharacterStream, quote: char) -> StreamResult<PartialToken> {
        let mut escaped = false;
        while !stream.at_line_end() {
            let ch = stream.advance()?;
            if ch == quote && !escaped {
                *self = SqlState::Normal;
                break;
            }
            escaped = !escaped && ch == '\\';
        }
        Ok(PartialToken::plain(if quote == '`' { "sql-word" } else { "sql-literal" }))
    }
}

impl TokenState for SqlState {
    fn read(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<PartialToken>> {
        match *self {
            SqlState::Normal => self.normal(stream),
            SqlState::Literal(quote) => self.literal(stream, quote).map(Some),
        }
    }
}
