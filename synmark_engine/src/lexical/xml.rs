//! XML/HTML tokenizer state
//!
//! Like CSS, XML tokens use their style as their type tag.

use crate::stream::{is_inline_whitespace, CharacterStream, StreamResult};
use crate::tokens::{PartialToken, TokenState};

/// Region that runs until a fixed terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlBlock {
    Cdata,
    Comment,
    Processing,
}

impl XmlBlock {
    pub fn style(self) -> &'static str {
        match self {
            XmlBlock::Cdata => "xml-cdata",
            XmlBlock::Comment => "xml-comment",
            XmlBlock::Processing => "xml-processing",
        }
    }

    fn terminator(self) -> &'static str {
        match self {
            XmlBlock::Cdata => "]]>",
            XmlBlock::Comment => "-->",
            XmlBlock::Processing => "?>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlState {
    #[default]
    Text,
    Tag,
    Attribute(char),
    Block(XmlBlock),
}

fn is_name_char(ch: char) -> bool {
    !(is_inline_whitespace(ch) || matches!(ch, '\n' | '=' | '<' | '>' | '"' | '\'' | '/' | '?'))
}

impl XmlState {
    fn text(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<PartialToken>> {
        let ch = stream.advance()?;
        let style = match ch {
            '<' if stream.equals('!') => {
                stream.advance()?;
                if stream.equals('[') {
                    if stream.look_ahead("[CDATA[", true, false, false) {
                        *self = XmlState::Block(XmlBlock::Cdata);
                        return Ok(None);
                    }
                } else if stream.look_ahead("--", true, false, false) {
                    *self = XmlState::Block(XmlBlock::Comment);
                    return Ok(None);
                }
                "xml-text"
            }
            '<' if stream.equals('?') => {
                stream.advance()?;
                stream.consume_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
                *self = XmlState::Block(XmlBlock::Processing);
                "xml-processing"
            }
            '<' => {
                if stream.equals('/') {
                    stream.advance()?;
                }
                *self = XmlState::Tag;
                "xml-punctuation"
            }
            '&' => {
                while !stream.at_line_end() {
                    if stream.advance()? == ';' {
                        break;
                    }
                }
                "xml-entity"
            }
            _ => {
                stream.consume_while(|c| !matches!(c, '&' | '<' | '\n'));
                "xml-text"
            }
        };
        Ok(Some(PartialToken::plain(style)))
    }

    fn tag(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<PartialToken>> {
        let ch = stream.advance()?;
        let style = match ch {
            '>' => {
                *self = XmlState::Text;
                "xml-punctuation"
            }
            '?' | '/' if stream.equals('>') => {
                stream.advance()?;
                *self = XmlState::Text;
                "xml-punctuation"
            }
            '=' => "xml-punctuation",
            '"' | '\'' => {
                *self = XmlState::Attribute(ch);
                return Ok(None);
            }
            _ => {
                stream.consume_while(is_name_char);
                "xml-name"
            }
        };
        Ok(Some(PartialToken::plain(style)))
    }

    fn attribute(&mut self, stream: &mut CharacterStream, quote: char) -> StreamResult<PartialToken> {
        while !stream.at_line_end() {
            if stream.advance()? == quote {
                *self = XmlState::Tag;
                break;
            }
        }
        Ok(PartialToken::plain("xml-attribute"))
    }

    fn block(&mut self, stream: &mut CharacterStream, block: XmlBlock) -> StreamResult<PartialToken> {
        while !stream.at_line_end() {
            if stream.look_ahead(block.terminator(), true, false, false) {
                *self = XmlState::Text;
                break;
            }
            stream.advance()?;
        }
        Ok(PartialToken::plain(block.style()))
    }
}

impl TokenState for XmlState {
    fn read(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<PartialToken>> {
        match *self {
            XmlState::Text => self.text(stream),
            XmlState::Tag => self.tag(stream),
            XmlState::Attribute(quote) => self.attribute(stream, quote).map(Some),
            XmlState::Block(block) => self.block(stream, block).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tests::lex;

    fn styles(text: &str) -> Vec<(String, String)> {
        lex(XmlState::default(), text)
            .into_iter()
            .filter(|t| !t.is_whitespace())
            .map(|t| (t.style, t.content))
            .collect()
    }

    fn pair(style: &str, content: &str) -> (String, String) {
        (style.to_string(), content.to_string())
    }

    #[test]
    fn test_tags_and_attributes() {
        assert_eq!(
            styles("<a href=\"x y\">hi &amp; bye</a>"),
            vec![
                pair("xml-punctuation", "<"),
                pair("xml-name", "a"),
                pair("xml-name", "href"),
                pair("xml-punctuation", "="),
                pair("xml-attribute", "\"x y\""),
                pair("xml-punctuation", ">"),
                pair("xml-text", "hi "),
                pair("xml-entity", "&amp;"),
                pair("xml-text", "bye"),
                pair("xml-punctuation", "</"),
                pair("xml-name", "a"),
                pair("xml-punctuation", ">"),
            ]
        );
    }

    #[test]
    fn test_self_closing() {
        let found = styles("<br/>");
        assert_eq!(found[2], pair("xml-punctuation", "/>"));
    }

    #[test]
    fn test_comment_spans_lines() {
        let found = styles("<!-- a\nb --> c");
        assert_eq!(found[0], pair("xml-comment", "<!-- a"));
        assert_eq!(found[1], pair("xml-comment", "b -->"));
        assert_eq!(found[2], pair("xml-text", "c"));
    }

    #[test]
    fn test_cdata_and_processing() {
        let found = styles("<?php echo 1; ?><![CDATA[x<y]]><!DOCTYPE");
        assert_eq!(found[0], pair("xml-processing", "<?php"));
        assert_eq!(found[1], pair("xml-processing", "echo 1; ?>"));
        assert_eq!(found[2], pair("xml-cdata", "<![CDATA[x<y]]>"));
        assert_eq!(found[3], pair("xml-text", "<!"));
    }
}
