use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FAMILY, DEFAULT_FONT_PT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decoration {
    #[default]
    None,
    Underline,
    Strikethrough,
}

/// A run of text sharing one font style.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextSpan {
    pub text: String,
    pub font_family: Option<String>,
    /// Declared size in points
    pub font_size: Option<f32>,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    #[serde(alias = "textDecoration")]
    pub decoration: Decoration,
}

impl TextSpan {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }

    pub fn size(mut self, pt: f32) -> Self {
        self.font_size = Some(pt);
        self
    }

    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn bold(mut self) -> Self {
        self.font_weight = FontWeight::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.font_style = FontStyle::Italic;
        self
    }

    pub fn decorated(mut self, decoration: Decoration) -> Self {
        self.decoration = decoration;
        self
    }

    /// Declared size in points, 24pt when unset.
    pub fn declared_pt(&self) -> f32 {
        match self.font_size {
            Some(pt) if pt > 0.0 && pt.is_finite() => pt,
            _ => DEFAULT_FONT_PT,
        }
    }

    pub fn family_or_default(&self) -> &str {
        match self.font_family.as_deref() {
            Some(f) if !f.trim().is_empty() => f,
            _ => DEFAULT_FAMILY,
        }
    }
}

/// Unformatted label text; `\n` separates lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlainText(pub String);

impl PlainText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn lines(&self) -> Vec<&str> {
        self.0.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect()
    }
}

impl From<&str> for PlainText {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Span-formatted label text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText {
    pub spans: Vec<TextSpan>,
}

impl RichText {
    pub fn new(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Re-segment spans into lines. A span containing line breaks is split into
    /// fragments carrying its style onto consecutive lines; empty fragments are dropped.
    pub fn lines(&self) -> Vec<Vec<TextSpan>> {
        let mut lines: Vec<Vec<TextSpan>> = vec![Vec::new()];
        for span in &self.spans {
            for (i, part) in span.text.split('\n').enumerate() {
                if i > 0 {
                    lines.push(Vec::new());
                }
                let part = part.strip_suffix('\r').unwrap_or(part);
                if part.is_empty() {
                    continue;
                }
                if let Some(line) = lines.last_mut() {
                    line.push(TextSpan { text: part.to_string(), ..span.clone() });
                }
            }
        }
        lines
    }

    /// Mean declared size over all spans, in points.
    pub fn mean_declared_pt(&self) -> Option<f32> {
        if self.spans.is_empty() {
            return None;
        }
        let sum: f32 = self.spans.iter().map(TextSpan::declared_pt).sum();
        Some(sum / self.spans.len() as f32)
    }
}

/// What goes on the label.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelContent {
    Plain(PlainText),
    Rich(RichText),
}

impl From<PlainText> for LabelContent {
    fn from(t: PlainText) -> Self {
        LabelContent::Plain(t)
    }
}

impl From<RichText> for LabelContent {
    fn from(t: RichText) -> Self {
        LabelContent::Rich(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_split_on_breaks() {
        let t = PlainText::new("ONE\r\nTWO\n\nFOUR");
        assert_eq!(t.lines(), vec!["ONE", "TWO", "", "FOUR"]);
        assert!(PlainText::new(" \n\t").is_blank());
    }

    #[test]
    fn spans_with_breaks_distribute_across_lines() {
        let rich = RichText::new(vec![
            TextSpan::new("AB\nC").bold().size(18.0),
            TextSpan::new("D"),
            TextSpan::new("\nE\n"),
        ]);
        let lines = rich.lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].len(), 1);
        assert_eq!(lines[0][0].text, "AB");
        assert_eq!(lines[1].iter().map(|s| s.text.as_str()).collect::<Vec<_>>(), vec!["C", "D"]);
        assert_eq!(lines[1][0].font_weight, FontWeight::Bold);
        assert_eq!(lines[1][0].font_size, Some(18.0));
        assert_eq!(lines[2][0].text, "E");
        assert!(lines[3].is_empty());
    }

    #[test]
    fn empty_span_list_has_no_mean_size() {
        assert_eq!(RichText::default().mean_declared_pt(), None);
        let rich = RichText::new(vec![TextSpan::new("a").size(24.0), TextSpan::new("b").size(12.0)]);
        assert_eq!(rich.mean_declared_pt(), Some(18.0));
    }

    #[test]
    fn span_json_uses_camel_case() {
        let rich = RichText::from_json(
            r#"[{"text":"Hi","fontSize":24,"fontWeight":"bold","decoration":"underline"},{"text":"there"}]"#,
        )
        .unwrap();
        assert_eq!(rich.spans[0].font_weight, FontWeight::Bold);
        assert_eq!(rich.spans[0].decoration, Decoration::Underline);
        assert_eq!(rich.spans[1].declared_pt(), DEFAULT_FONT_PT);
        assert_eq!(rich.spans[1].family_or_default(), DEFAULT_FAMILY);
    }
}
