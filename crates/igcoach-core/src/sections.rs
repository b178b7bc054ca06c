//! Splits a generated coaching report into its four sections.
//!
//! The model is asked to number its sections `1)` through `4)`. The first
//! section has no marker of its own and starts at the top of the text;
//! lines whose trimmed content begins with `2)`, `3)` or `4)` open the
//! diagnostics, recommendations and plan sections. Text without any
//! markers ends up entirely in the scorecard.

use serde::{Deserialize, Serialize};

/// A section carried through as a single trimmed text blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSection {
    pub raw: String,
}

impl RawSection {
    fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.raw.is_empty() {
            self.raw.push('\n');
        }
        self.raw.push_str(text);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSections {
    pub scorecard: RawSection,
    pub diagnostics: RawSection,
    pub recommendations: RawSection,
    pub plan_30d: Vec<String>,
}

/// Response body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub account_url: String,
    #[serde(flatten)]
    pub sections: ReportSections,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Scorecard,
    Diagnostics,
    Recommendations,
    Plan,
}

const MARKERS: [(&str, Section); 3] = [
    ("2)", Section::Diagnostics),
    ("3)", Section::Recommendations),
    ("4)", Section::Plan),
];

/// Returns the section a marker line opens and the text following the
/// marker on the same line.
fn match_marker(line: &str) -> Option<(Section, &str)> {
    let trimmed = line.trim();
    MARKERS.iter().find_map(|&(prefix, section)| {
        trimmed
            .strip_prefix(prefix)
            .map(|rest| (section, rest.trim()))
    })
}

/// Splits `text` into scorecard, diagnostics, recommendations and plan.
///
/// Marker lines are consumed; anything written after the marker on the
/// same line starts the new section. Non-marker lines are kept verbatim
/// until the section is flushed.
#[must_use]
pub fn sectionize(text: &str) -> ReportSections {
    let mut out = ReportSections::default();
    let mut current = Section::Scorecard;
    let mut buf: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if let Some((next, rest)) = match_marker(line) {
            flush(&mut out, current, &buf);
            buf.clear();
            current = next;
            if !rest.is_empty() {
                buf.push(rest);
            }
            continue;
        }
        buf.push(line);
    }
    flush(&mut out, current, &buf);

    out
}

fn flush(out: &mut ReportSections, section: Section, buf: &[&str]) {
    let joined = buf.join("\n");
    let text = joined.trim();
    match section {
        Section::Scorecard => out.scorecard.append(text),
        Section::Diagnostics => out.diagnostics.append(text),
        Section::Recommendations => out.recommendations.append(text),
        Section::Plan => out.plan_30d.extend(plan_items(text)),
    }
}

/// One plan entry per non-blank line, with list bullets removed.
fn plan_items(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_start_matches(['-', '•', ' ']).trim_end())
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
#[path = "sections_test.rs"]
mod tests;
