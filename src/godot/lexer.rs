//! Line-oriented tokenizer for the Godot text resource format
//!
//! The parser passes only ever see [`Token`]s: section headers with their
//! attributes already split out, and `key = value` properties whose value
//! may have been joined from several physical lines.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static ATTR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w+)=("[^"]*"|[^\s\]]+)"#).expect("valid attribute regex"));

static SECTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\[(gd_scene|gd_resource|ext_resource|sub_resource|resource|node|connection|editable)\b",
    )
    .expect("valid section regex")
});

/// A bracketed section header such as `[node name="A" type="Node3D"]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// First whitespace-delimited word inside the brackets
    pub keyword: String,
    /// `key=value` attributes, surrounding quotes removed
    pub attrs: HashMap<String, String>,
}

impl Header {
    /// Look up an attribute value
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// One logical line of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Section header
    Header(Header),
    /// `key = value` line, both sides trimmed
    Property { key: String, value: String },
}

/// Split a document into tokens, dropping blank and comment lines
pub fn tokenize(content: &str) -> Vec<Token> {
    let lines: Vec<&str> = content.lines().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;

        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            tokens.push(Token::Header(parse_header(line)));
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let mut value = value.trim().to_string();
        let mut balance = Balance::default();
        balance.feed(&value);

        while balance.is_open() && i < lines.len() {
            let next = lines[i].trim();
            if !balance.in_string && SECTION_PATTERN.is_match(next) {
                break;
            }
            i += 1;
            if next.is_empty() {
                continue;
            }
            value.push(' ');
            value.push_str(next);
            balance.feed(next);
        }

        tokens.push(Token::Property {
            key: key.to_string(),
            value,
        });
    }

    tokens
}

/// Parse a header line into its keyword and attributes
pub fn parse_header(line: &str) -> Header {
    let inner = line.strip_prefix('[').unwrap_or(line);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    let keyword = inner.split_whitespace().next().unwrap_or_default().to_string();
    let attrs = ATTR_PATTERN
        .captures_iter(inner)
        .map(|caps| (caps[1].to_string(), unquote(&caps[2]).to_string()))
        .collect();

    Header { keyword, attrs }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Bracket depth and string state of a partially read value
#[derive(Debug, Default)]
struct Balance {
    depth: i32,
    in_string: bool,
    escaped: bool,
}

impl Balance {
    fn feed(&mut self, text: &str) {
        for c in text.chars() {
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == '"' {
                    self.in_string = false;
                }
                continue;
            }
            match c {
                '"' => self.in_string = true,
                '[' | '{' | '(' => self.depth += 1,
                ']' | '}' | ')' => self.depth -= 1,
                _ => {}
            }
        }
    }

    fn is_open(&self) -> bool {
        self.in_string || self.depth > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_attributes() {
        let header =
            parse_header(r#"[ext_resource type="Script" path="res://player.gd" id="1_ab"]"#);
        assert_eq!(header.keyword, "ext_resource");
        assert_eq!(header.attr("type"), Some("Script"));
        assert_eq!(header.attr("path"), Some("res://player.gd"));
        assert_eq!(header.attr("id"), Some("1_ab"));
        assert_eq!(header.attr("uid"), None);
    }

    #[test]
    fn test_unquoted_attribute_values() {
        let header = parse_header(r#"[node name="Enemy" parent="." instance=ExtResource("2")]"#);
        assert_eq!(header.keyword, "node");
        assert_eq!(header.attr("instance"), Some(r#"ExtResource("2")"#));
        assert_eq!(header.attr("parent"), Some("."));
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let tokens = tokenize("; comment\n\n# another\n[resource]\nalbedo = 1\n");
        assert_eq!(tokens.len(), 2);
        assert!(matches!(&tokens[0], Token::Header(h) if h.keyword == "resource"));
        assert_eq!(
            tokens[1],
            Token::Property {
                key: "albedo".to_string(),
                value: "1".to_string()
            }
        );
    }

    #[test]
    fn test_property_splits_on_first_equals() {
        let tokens = tokenize("text = \"a=b\"\n");
        assert_eq!(
            tokens[0],
            Token::Property {
                key: "text".to_string(),
                value: "\"a=b\"".to_string()
            }
        );
    }

    #[test]
    fn test_multiline_value_is_joined() {
        let content = "[sub_resource type=\"ArrayMesh\" id=\"1\"]\n_surfaces = [{\n\"format\": 4097,\n\"primitive\": 3\n}]\nname = \"m\"\n";
        let tokens = tokenize(content);
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens[1],
            Token::Property {
                key: "_surfaces".to_string(),
                value: "[{ \"format\": 4097, \"primitive\": 3 }]".to_string()
            }
        );
    }

    #[test]
    fn test_unbalanced_value_stops_at_next_section() {
        let tokens = tokenize("[resource]\nbroken = [1, 2\n\n[node name=\"A\" type=\"Node\"]\n");
        assert_eq!(tokens.len(), 3);
        assert!(matches!(&tokens[2], Token::Header(h) if h.keyword == "node"));
    }

    #[test]
    fn test_multiline_string_keeps_brackets_inside() {
        let tokens = tokenize("text = \"first [\nsecond\"\nnext = 2\n");
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            tokens[0],
            Token::Property {
                key: "text".to_string(),
                value: "\"first [ second\"".to_string()
            }
        );
    }
}
