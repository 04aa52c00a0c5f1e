//! Texto do marcador (placa) de um IC
//!
//! A marker is the host-owned, four-line sign attached to a placement.
//!
//! | Linha | Conteúdo |
//! |:------|:---------|
//! | 0 | chip shorthand id, upper-cased by the engine |
//! | 1 | chip type reference, optionally `TYPE:FAMILY` |
//! | 2-3 | chip-specific configuration |

use serde::{Deserialize, Serialize};

use crate::types::Direction;

/// Número de linhas de uma placa
pub const LINE_COUNT: usize = 4;
/// Linha com o shorthand do chip
pub const SHORTHAND_LINE: usize = 0;
/// Linha com o tipo (e família opcional)
pub const TYPE_LINE: usize = 1;
/// Primeira linha de configuração
pub const CONFIG_LINE: usize = 2;
/// Segunda linha de configuração
pub const EXTRA_LINE: usize = 3;

/// The four text lines of a marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SignLines([String; LINE_COUNT]);

impl SignLines {
    /// Builds lines from up to four strings; missing lines are empty and
    /// extra lines are ignored.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Self::default();
        for (index, line) in lines.into_iter().take(LINE_COUNT).enumerate() {
            out.0[index] = line.into();
        }
        out
    }

    /// Line text, or `""` when `index` is out of range.
    pub fn get(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }

    /// Replaces a line. Returns `false` when `index` is out of range.
    pub fn set(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.0.get_mut(index) {
            Some(line) => {
                *line = text.into();
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_array(&self) -> &[String; LINE_COUNT] {
        &self.0
    }

    /// Parsed type reference from line 1.
    pub fn type_line(&self) -> TypeLine<'_> {
        TypeLine::parse(self.get(TYPE_LINE))
    }
}

impl From<[&str; LINE_COUNT]> for SignLines {
    fn from(lines: [&str; LINE_COUNT]) -> Self {
        Self::new(lines)
    }
}

/// Type reference written on line 1: `CLOCK` or `AND:SISO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeLine<'a> {
    /// Model id, shorthand or long name of the chip
    pub chip: &'a str,
    /// Pin family overriding the chip's default
    pub family: Option<&'a str>,
}

impl<'a> TypeLine<'a> {
    pub fn parse(text: &'a str) -> Self {
        match text.split_once(':') {
            Some((chip, family)) => {
                let family = family.trim();
                Self {
                    chip: chip.trim(),
                    family: (!family.is_empty()).then_some(family),
                }
            }
            None => Self {
                chip: text.trim(),
                family: None,
            },
        }
    }
}

/// How a marker is attached to its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mount {
    /// Montada numa face vertical
    Wall,
    /// Em pé sobre o bloco
    Standing,
}

/// Marker as exposed by the host world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Direction the text faces (away from the supporting block)
    pub facing: Direction,
    pub mount: Mount,
    pub lines: SignLines,
}

impl Marker {
    pub fn wall(facing: Direction, lines: impl Into<SignLines>) -> Self {
        Self {
            facing,
            mount: Mount::Wall,
            lines: lines.into(),
        }
    }

    pub fn standing(facing: Direction, lines: impl Into<SignLines>) -> Self {
        Self {
            facing,
            mount: Mount::Standing,
            lines: lines.into(),
        }
    }

    /// Only wall markers with a horizontal facing can host a chip.
    pub fn is_valid_site(&self) -> bool {
        self.mount == Mount::Wall && self.facing.is_horizontal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_lines_padding() {
        let lines = SignLines::new(["", "clock"]);
        assert_eq!(lines.get(1), "clock");
        assert_eq!(lines.get(3), "");
        assert_eq!(lines.get(9), "");
    }

    #[test]
    fn test_sign_lines_set_out_of_range() {
        let mut lines = SignLines::default();
        assert!(lines.set(2, "20"));
        assert!(!lines.set(4, "nope"));
        assert_eq!(lines.get(2), "20");
    }

    #[test]
    fn test_type_line_parse() {
        assert_eq!(
            TypeLine::parse(" clock "),
            TypeLine { chip: "clock", family: None }
        );
        assert_eq!(
            TypeLine::parse("and : siso"),
            TypeLine { chip: "and", family: Some("siso") }
        );
        assert_eq!(TypeLine::parse("and:").family, None);
    }

    #[test]
    fn test_valid_site() {
        assert!(Marker::wall(Direction::North, ["", "", "", ""]).is_valid_site());
        assert!(!Marker::standing(Direction::North, ["", "", "", ""]).is_valid_site());
        assert!(!Marker::wall(Direction::Up, ["", "", "", ""]).is_valid_site());
    }

    #[test]
    fn test_marker_serde() {
        let marker = Marker::wall(Direction::East, ["CLOCK", "MC1421", "20", ""]);
        let json = serde_json::to_string(&marker).unwrap();
        assert!(json.contains("\"east\""));
        let back: Marker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, marker);
    }
}
