//! Cell text formatting and measurement for the detail table.
//!
//! [CellFormatter] turns an entry plus its lazily resolved metadata into the text of one cell,
//! per [ColumnKind]. [Measure] is the capability the renderer supplies to turn that text into a
//! width; [TextWidth] measures in terminal cells.

use crate::core::cache::{MetaValue, Metadata};
use crate::core::entry::DirEntry;
use crate::core::sort::{ColumnKind, SortSpec};

use humansize::{BINARY, DECIMAL, format_size};
use serde::Deserialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Shown while a background resolution is in flight.
pub const PENDING_PLACEHOLDER: &str = "…";
/// Shown for an item count that could not be resolved.
pub const UNKNOWN_COUNT: &str = "?";
/// Shown for a content type that could not be resolved.
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Which unit system file sizes are formatted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnits {
    #[default]
    Decimal,
    Binary,
}

/// Width measurement supplied by the renderer.
pub trait Measure {
    fn measure(&self, text: &str) -> u32;
}

/// Measures text in terminal cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextWidth;

impl Measure for TextWidth {
    fn measure(&self, text: &str) -> u32 {
        UnicodeWidthStr::width(text) as u32
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CellFormatter {
    units: SizeUnits,
}

impl CellFormatter {
    pub fn new(units: SizeUnits) -> Self {
        Self { units }
    }

    /// Header label, with the sort arrow on the active column.
    pub fn header(&self, column: ColumnKind, sort: SortSpec) -> String {
        if sort.key == column {
            format!("{} {}", column.title(), sort.direction.arrow())
        } else {
            column.title().to_string()
        }
    }

    /// Text for the `column` cell of `entry`. `meta` is the cache state for the metadata the
    /// column needs, if it needs any (see [CellFormatter::needs]).
    pub fn cell(&self, entry: &DirEntry, column: ColumnKind, meta: Option<&Metadata>) -> String {
        match column {
            ColumnKind::Name => {
                if entry.is_dir() {
                    format!("{}/", entry.name())
                } else {
                    entry.name().to_string()
                }
            }
            ColumnKind::Type => {
                if entry.is_dir() {
                    return "Directory".to_string();
                }
                if let Some(known) = entry.content_type() {
                    return known.to_string();
                }
                match meta {
                    Some(Metadata::Cached(MetaValue::ContentType(t))) => t.to_string(),
                    Some(Metadata::Pending) => PENDING_PLACEHOLDER.to_string(),
                    _ => UNKNOWN_TYPE.to_string(),
                }
            }
            ColumnKind::Size => {
                if !entry.is_dir() {
                    return self.file_size(entry.size());
                }
                match meta {
                    Some(Metadata::Cached(MetaValue::ItemCount(n))) => format_item_count(*n),
                    Some(Metadata::Pending) => PENDING_PLACEHOLDER.to_string(),
                    _ => format!("{UNKNOWN_COUNT} items"),
                }
            }
        }
    }

    /// The lazily resolved metadata a cell needs, if any.
    pub fn needs(entry: &DirEntry, column: ColumnKind) -> Option<crate::core::MetaKind> {
        use crate::core::MetaKind;
        match column {
            ColumnKind::Name => None,
            ColumnKind::Type if entry.is_dir() || entry.content_type().is_some() => None,
            ColumnKind::Type => Some(MetaKind::ContentType),
            ColumnKind::Size if entry.is_dir() => Some(MetaKind::DirCount),
            ColumnKind::Size => None,
        }
    }

    pub fn file_size(&self, size: Option<u64>) -> String {
        match size {
            Some(sz) => match self.units {
                SizeUnits::Decimal => format_size(sz, DECIMAL),
                SizeUnits::Binary => format_size(sz, BINARY),
            },
            None => "-".to_string(),
        }
    }
}

pub fn format_item_count(n: u64) -> String {
    if n == 1 {
        "1 item".to_string()
    } else {
        format!("{n} items")
    }
}

/// Cleans `line` to exactly `width` terminal cells by removing control characters, expanding
/// tabs to 4 spaces, and truncating or padding the string to fit.
pub fn sanitize_to_exact_width(line: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut current_w = 0;

    for char in line.chars() {
        if char == '\t' {
            let space_count = 4 - (current_w % 4);
            if current_w + space_count > width {
                break;
            }
            out.push_str(&" ".repeat(space_count));
            current_w += space_count;
            continue;
        }

        if char.is_control() {
            continue;
        }

        let w = char.width().unwrap_or(0);
        if current_w + w > width {
            break;
        }

        out.push(char);
        current_w += w;
    }

    // If the string is shorter than the cell, fill it with spaces.
    if current_w < width {
        out.push_str(&" ".repeat(width - current_w));
    }

    out
}
