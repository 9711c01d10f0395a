use serde::Deserialize;
use std::borrow::Cow;

use crate::process::schema::DISCLOSURE_FIELDS;

const FIELD_COUNT: usize = DISCLOSURE_FIELDS.len();

/// How a composite cell with the wrong number of commas is carved up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Fixed positions. Surplus sub-fields are dropped, missing ones are null.
    #[default]
    Positional,
    /// Owner is the first sub-field and the last five are fixed, so commas
    /// inside the company name are re-joined into it.
    Anchored,
}

impl SplitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitMode::Positional => "positional",
            SplitMode::Anchored => "anchored",
        }
    }
}

impl std::str::FromStr for SplitMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "positional" => Ok(SplitMode::Positional),
            "anchored" => Ok(SplitMode::Anchored),
            other => anyhow::bail!("unknown split mode {other:?} (expected positional|anchored)"),
        }
    }
}

/// One composite cell cut into its seven positional sub-fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitFields<'a> {
    pub fields: [Option<Cow<'a, str>>; FIELD_COUNT],
    /// Number of comma-separated pieces actually present in the cell.
    pub piece_count: usize,
}

impl SplitFields<'_> {
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).and_then(|f| f.as_deref())
    }

    /// The cell had a different number of sub-fields than the layout expects.
    pub fn is_malformed(&self) -> bool {
        self.piece_count != FIELD_COUNT
    }
}

/// Cut a composite disclosure string on `,`. No quoting or escaping is
/// recognised inside the cell.
pub fn split_composite(raw: Option<&str>, mode: SplitMode) -> SplitFields<'_> {
    let mut fields: [Option<Cow<'_, str>>; FIELD_COUNT] = Default::default();

    let Some(raw) = raw else {
        return SplitFields {
            fields,
            piece_count: 0,
        };
    };

    let pieces: Vec<&str> = raw.split(',').collect();
    let piece_count = pieces.len();

    if mode == SplitMode::Anchored && piece_count > FIELD_COUNT {
        let tail_start = piece_count - (FIELD_COUNT - 2);
        fields[0] = Some(pieces[0].into());
        fields[1] = Some(pieces[1..tail_start].join(",").into());
        for (slot, piece) in fields[2..].iter_mut().zip(&pieces[tail_start..]) {
            *slot = Some((*piece).into());
        }
    } else {
        for (slot, piece) in fields.iter_mut().zip(&pieces) {
            *slot = Some((*piece).into());
        }
    }

    SplitFields {
        fields,
        piece_count,
    }
}
