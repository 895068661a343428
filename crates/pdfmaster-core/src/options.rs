// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operation options: the raw name/value map collected from the user, and the
// typed per-tool options the dispatcher builds from it.

use std::collections::{BTreeMap, HashSet};

use crate::catalog::ToolId;
use crate::error::{PdfMasterError, Result};

pub const PAGES_OPTION: &str = "pages";
pub const ANGLE_OPTION: &str = "angle";
pub const PASSWORD_OPTION: &str = "password";

/// Raw option values keyed by name. Nothing is validated on `set`; legality
/// depends on the tool and is checked when [`ToolOptions`] are built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: BTreeMap<String, String>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the entry for `name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

// -- Page ranges --------------------------------------------------------------

/// One token of a page-range expression as 0-based inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub start: usize,
    pub end: usize,
}

impl PageSpan {
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Parse a page-range expression such as `"1-3, 5, 8"`.
///
/// Tokens are comma-separated; each is a 1-based page number or an inclusive
/// hyphenated range. Numbers become 0-based. Nothing is de-duplicated here.
/// Empty tokens, non-numeric tokens, page 0 and reversed ranges are errors.
pub fn parse_page_range(expr: &str) -> Result<Vec<PageSpan>> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(PdfMasterError::InvalidPageRange(
            "no pages given".to_string(),
        ));
    }

    expr.split(',').map(parse_token).collect()
}

fn parse_token(token: &str) -> Result<PageSpan> {
    let token = token.trim();
    let mut parts = token.split('-');
    let first = parts.next().unwrap_or_default();
    let second = parts.next();
    if parts.next().is_some() {
        return Err(PdfMasterError::InvalidPageRange(format!(
            "'{token}' has more than one '-'"
        )));
    }

    let start = parse_page_number(first, token)?;
    let end = match second {
        Some(raw) => parse_page_number(raw, token)?,
        None => start,
    };

    if end < start {
        return Err(PdfMasterError::InvalidPageRange(format!(
            "'{token}' runs backwards"
        )));
    }

    Ok(PageSpan { start, end })
}

/// Parse one 1-based page number into a 0-based index.
fn parse_page_number(raw: &str, token: &str) -> Result<usize> {
    let number: usize = raw.trim().parse().map_err(|_| {
        PdfMasterError::InvalidPageRange(format!("'{token}' is not a page number or range"))
    })?;
    number
        .checked_sub(1)
        .ok_or_else(|| PdfMasterError::InvalidPageRange("pages are numbered from 1".to_string()))
}

/// Expand spans into 0-based indices in request order, duplicates kept.
pub fn expand_spans(spans: &[PageSpan]) -> Vec<usize> {
    spans.iter().flat_map(PageSpan::indices).collect()
}

/// A set of 0-based page indices that remembers first-request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSelection {
    order: Vec<usize>,
    members: HashSet<usize>,
}

impl PageSelection {
    /// Resolve spans against a document of `page_count` pages. Any index at
    /// or beyond `page_count` fails rather than being clamped.
    pub fn resolve(spans: &[PageSpan], page_count: usize) -> Result<Self> {
        if let Some(span) = spans.iter().find(|span| span.end >= page_count) {
            return Err(PdfMasterError::PageOutOfRange {
                page: span.end + 1,
                page_count,
            });
        }
        Ok(spans.iter().flat_map(PageSpan::indices).collect())
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    /// Selected indices, each once, in the order first requested.
    pub fn indices(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Indices in `0..page_count` not selected, in document order.
    pub fn complement(&self, page_count: usize) -> Vec<usize> {
        (0..page_count).filter(|i| !self.contains(*i)).collect()
    }
}

impl FromIterator<usize> for PageSelection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut selection = Self::default();
        for index in iter {
            if selection.members.insert(index) {
                selection.order.push(index);
            }
        }
        selection
    }
}

// -- Rotation -----------------------------------------------------------------

/// Clockwise rotation applied to every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    pub fn degrees(&self) -> i64 {
        match self {
            Self::Quarter => 90,
            Self::Half => 180,
            Self::ThreeQuarter => 270,
        }
    }

    pub fn from_degrees(degrees: i64) -> Result<Self> {
        match degrees {
            90 => Ok(Self::Quarter),
            180 => Ok(Self::Half),
            270 => Ok(Self::ThreeQuarter),
            other => Err(PdfMasterError::InvalidOption {
                name: ANGLE_OPTION,
                reason: format!("{other} is not one of 90, 180, 270"),
            }),
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let degrees: i64 = raw.trim().parse().map_err(|_| PdfMasterError::InvalidOption {
            name: ANGLE_OPTION,
            reason: format!("'{raw}' is not a number of degrees"),
        })?;
        Self::from_degrees(degrees)
    }
}

// -- Typed options ------------------------------------------------------------

/// Options as the selected tool understands them. Built from an [`OptionMap`]
/// right before dispatch; names the tool does not use are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOptions {
    None,
    /// Page-range expression for split and delete-pages.
    Pages(Vec<PageSpan>),
    /// Rotation angle; defaults to 90 when not given.
    Rotate(Rotation),
    /// Password for the (non-cryptographic) protect placeholder.
    Password(String),
}

impl ToolOptions {
    pub fn from_map(tool: ToolId, map: &OptionMap) -> Result<Self> {
        let legal: &[&str] = match tool {
            ToolId::SplitPdf | ToolId::DeletePdfPages => &[PAGES_OPTION],
            ToolId::RotatePdf => &[ANGLE_OPTION],
            ToolId::ProtectPdf => &[PASSWORD_OPTION],
            _ => &[],
        };
        if let Some(name) = map.names().find(|name| !legal.contains(name)) {
            return Err(PdfMasterError::IllegalOption {
                name: name.to_string(),
                tool: tool.as_str(),
            });
        }

        match tool {
            ToolId::SplitPdf | ToolId::DeletePdfPages => {
                let expr = map
                    .get(PAGES_OPTION)
                    .ok_or(PdfMasterError::MissingOption(PAGES_OPTION))?;
                Ok(Self::Pages(parse_page_range(expr)?))
            }
            ToolId::RotatePdf => {
                let rotation = match map.get(ANGLE_OPTION) {
                    Some(raw) => Rotation::parse(raw)?,
                    None => Rotation::default(),
                };
                Ok(Self::Rotate(rotation))
            }
            ToolId::ProtectPdf => match map.get(PASSWORD_OPTION) {
                Some(password) if !password.is_empty() => Ok(Self::Password(password.to_string())),
                _ => Err(PdfMasterError::MissingOption(PASSWORD_OPTION)),
            },
            _ => Ok(Self::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(expr: &str) -> Vec<usize> {
        expand_spans(&parse_page_range(expr).expect("valid range"))
    }

    #[test]
    fn parses_ranges_and_singles() {
        assert_eq!(indices("1-3,5"), vec![0, 1, 2, 4]);
        assert_eq!(indices("2"), vec![1]);
        assert_eq!(indices(" 1 - 2 , 4 "), vec![0, 1, 3]);
    }

    #[test]
    fn parser_keeps_duplicates() {
        assert_eq!(indices("1-2,2"), vec![0, 1, 1]);
    }

    #[test]
    fn malformed_tokens_fail() {
        for bad in ["", "a", "1,,2", "3-1", "0", "1-2-3", "-2", "2-", "1.5"] {
            assert!(
                matches!(parse_page_range(bad), Err(PdfMasterError::InvalidPageRange(_))),
                "expected failure for {bad:?}"
            );
        }
    }

    #[test]
    fn selection_collapses_duplicates_in_request_order() {
        let spans = parse_page_range("5,1-2,2").expect("valid");
        let selection = PageSelection::resolve(&spans, 6).expect("in range");
        assert_eq!(selection.indices(), &[4, 0, 1]);
        assert_eq!(selection.complement(6), vec![2, 3, 5]);
    }

    #[test]
    fn selection_out_of_bounds_is_an_error() {
        let spans = parse_page_range("2-9").expect("valid");
        match PageSelection::resolve(&spans, 4) {
            Err(PdfMasterError::PageOutOfRange { page, page_count }) => {
                assert_eq!(page, 9);
                assert_eq!(page_count, 4);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn split_and_delete_partition_the_document() {
        let spans = parse_page_range("1,3-4").expect("valid");
        let selection = PageSelection::resolve(&spans, 5).expect("in range");
        let kept = selection.complement(5);
        let mut union: Vec<usize> =
            selection.indices().iter().copied().chain(kept.clone()).collect();
        union.sort_unstable();
        assert_eq!(union, vec![0, 1, 2, 3, 4]);
        assert!(kept.iter().all(|i| !selection.contains(*i)));
    }

    #[test]
    fn rotation_defaults_to_ninety() {
        let options = ToolOptions::from_map(ToolId::RotatePdf, &OptionMap::new()).expect("ok");
        assert_eq!(options, ToolOptions::Rotate(Rotation::Quarter));

        let mut map = OptionMap::new();
        map.set(ANGLE_OPTION, "270");
        let options = ToolOptions::from_map(ToolId::RotatePdf, &map).expect("ok");
        assert_eq!(options, ToolOptions::Rotate(Rotation::ThreeQuarter));
    }

    #[test]
    fn rotation_rejects_odd_angles() {
        assert!(Rotation::parse("45").is_err());
        assert!(Rotation::parse("ninety").is_err());
    }

    #[test]
    fn illegal_option_names_are_rejected() {
        let mut map = OptionMap::new();
        map.set(PASSWORD_OPTION, "hunter2");
        let err = ToolOptions::from_map(ToolId::RotatePdf, &map).unwrap_err();
        assert!(matches!(err, PdfMasterError::IllegalOption { .. }));
    }

    #[test]
    fn split_requires_pages() {
        let err = ToolOptions::from_map(ToolId::SplitPdf, &OptionMap::new()).unwrap_err();
        assert!(matches!(err, PdfMasterError::MissingOption(PAGES_OPTION)));
    }

    #[test]
    fn protect_requires_a_password() {
        let mut map = OptionMap::new();
        map.set(PASSWORD_OPTION, "");
        assert!(ToolOptions::from_map(ToolId::ProtectPdf, &map).is_err());
        map.set(PASSWORD_OPTION, "secret");
        assert_eq!(
            ToolOptions::from_map(ToolId::ProtectPdf, &map).expect("ok"),
            ToolOptions::Password("secret".into())
        );
    }

    #[test]
    fn set_overwrites() {
        let mut map = OptionMap::new();
        map.set(PAGES_OPTION, "1");
        map.set(PAGES_OPTION, "2-3");
        assert_eq!(map.get(PAGES_OPTION), Some("2-3"));
    }
}
