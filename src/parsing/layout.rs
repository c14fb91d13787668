//! Text layout format for tigs.
//!
//! A layout lists a tig's identity, suggestion flags, statistics, and child
//! placements, one item per line:
//!
//! ```text
//! tig 12
//! len 2400
//! coverageStat 1.25
//! microhetProb 0.98
//! suggestRepeat F
//! suggestUnique T
//! suggestCircular F
//! suggestHaploid F
//! numChildren 2
//! read 100 anchor 0 hang 0 0 position 0 1200
//! unitig 7 anchor 100 hang 300 -20 position 2400 1180
//! tigend
//! ```
//!
//! Consensus, delta alignments, and variants are not part of the layout.
//! An unassigned tig ID is written as `-`.

use std::io::{BufRead, Write};

use crate::core::error::TigError;
use crate::core::position::PositionRecord;
use crate::core::tig::Tig;
use crate::core::types::{ChildKind, UNASSIGNED_TIG_ID};

/// Write the layout of `tig`
///
/// # Errors
///
/// Returns `TigError::Io` if the writer fails.
pub fn write_layout<W: Write>(tig: &Tig, writer: &mut W) -> Result<(), TigError> {
    if tig.is_assigned() {
        writeln!(writer, "tig {}", tig.tig_id)?;
    } else {
        writeln!(writer, "tig -")?;
    }
    writeln!(writer, "len {}", tig.layout_len)?;
    writeln!(writer, "coverageStat {}", tig.coverage_stat)?;
    writeln!(writer, "microhetProb {}", tig.microhet_prob)?;
    writeln!(writer, "suggestRepeat {}", flag_char(tig.flags.suggest_repeat()))?;
    writeln!(writer, "suggestUnique {}", flag_char(tig.flags.suggest_unique()))?;
    writeln!(
        writer,
        "suggestCircular {}",
        flag_char(tig.flags.suggest_circular())
    )?;
    writeln!(writer, "suggestHaploid {}", flag_char(tig.flags.suggest_haploid()))?;
    writeln!(writer, "numChildren {}", tig.number_of_children())?;

    for child in tig.children() {
        let kind = child.kind().map_or("unknown", ChildKind::as_str);
        writeln!(
            writer,
            "{kind} {} anchor {} hang {} {} position {} {}",
            child.obj_id, child.anchor, child.ahang, child.bhang, child.bgn, child.end
        )?;
    }

    writeln!(writer, "tigend")?;
    Ok(())
}

/// Replace `tig` with the next layout in `reader`.
///
/// Returns `Ok(false)` if the input ends before a `tig` line. On error the
/// tig is cleared.
///
/// # Errors
///
/// Returns `TigError::Layout` with the 1-based line number of the problem,
/// or `TigError::Io` on a read failure.
pub fn read_layout<R: BufRead>(tig: &mut Tig, reader: &mut R) -> Result<bool, TigError> {
    let mut parser = LayoutParser {
        reader,
        line_number: 0,
        line: String::new(),
    };
    let result = parser.parse(tig);
    if result.is_err() {
        tig.clear();
    }
    result
}

fn flag_char(value: bool) -> char {
    if value {
        'T'
    } else {
        'F'
    }
}

struct LayoutParser<'a, R> {
    reader: &'a mut R,
    line_number: usize,
    line: String,
}

impl<R: BufRead> LayoutParser<'_, R> {
    fn parse(&mut self, tig: &mut Tig) -> Result<bool, TigError> {
        tig.clear();

        // Find the start of the next layout, skipping blank lines
        let id_field = loop {
            if !self.next_line()? {
                return Ok(false);
            }
            let fields: Vec<&str> = self.line.split_whitespace().collect();
            match fields.as_slice() {
                [] => continue,
                ["tig", id] => break (*id).to_string(),
                _ => return Err(self.error(format!("expected 'tig <id>', found '{}'", self.line.trim()))),
            }
        };
        tig.tig_id = if id_field == "-" {
            UNASSIGNED_TIG_ID
        } else {
            self.parse_number(&id_field, "tig id")?
        };

        let mut declared_children: Option<usize> = None;
        loop {
            if !self.next_line()? {
                return Err(self.error("input ended before 'tigend'".to_string()));
            }
            let line = std::mem::take(&mut self.line);
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [] => {}
                ["tigend"] => break,
                ["len", value] => tig.layout_len = self.parse_number(value, "layout length")?,
                ["coverageStat", value] => {
                    tig.coverage_stat = self.parse_number(value, "coverage statistic")?;
                }
                ["microhetProb", value] => {
                    tig.microhet_prob = self.parse_number(value, "microhet probability")?;
                }
                ["suggestRepeat", value] => tig.flags.set_repeat(self.parse_flag(value)?),
                ["suggestUnique", value] => tig.flags.set_unique(self.parse_flag(value)?),
                ["suggestCircular", value] => tig.flags.set_circular(self.parse_flag(value)?),
                ["suggestHaploid", value] => tig.flags.set_haploid(self.parse_flag(value)?),
                ["numChildren", value] => {
                    declared_children = Some(self.parse_number(value, "child count")?);
                }
                [kind, id, "anchor", anchor, "hang", ahang, bhang, "position", bgn, end] => {
                    let kind = ChildKind::parse(kind)
                        .ok_or_else(|| self.error(format!("unknown child kind '{kind}'")))?;
                    let child = PositionRecord::new(
                        kind,
                        self.parse_number(id, "child id")?,
                        self.parse_number(bgn, "child begin")?,
                        self.parse_number(end, "child end")?,
                    )
                    .with_anchor(
                        self.parse_number(anchor, "anchor id")?,
                        self.parse_number(ahang, "a-hang")?,
                        self.parse_number(bhang, "b-hang")?,
                    );
                    // add_child may widen the layout; the declared length wins
                    let layout_len = tig.layout_len;
                    tig.add_child(child);
                    tig.layout_len = layout_len;
                }
                _ => return Err(self.error(format!("unrecognized line '{}'", line.trim()))),
            }
        }

        if let Some(declared) = declared_children {
            if declared != tig.number_of_children() {
                return Err(self.error(format!(
                    "numChildren is {declared} but {} children were listed",
                    tig.number_of_children()
                )));
            }
        }

        Ok(true)
    }

    /// Read the next line into `self.line`; false at end of input
    fn next_line(&mut self) -> Result<bool, TigError> {
        self.line.clear();
        let n = self.reader.read_line(&mut self.line)?;
        if n == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }

    fn parse_number<T: std::str::FromStr>(&self, value: &str, what: &str) -> Result<T, TigError> {
        value
            .parse()
            .map_err(|_| self.error(format!("invalid {what} '{value}'")))
    }

    fn parse_flag(&self, value: &str) -> Result<bool, TigError> {
        match value {
            "T" | "1" | "true" => Ok(true),
            "F" | "0" | "false" => Ok(false),
            _ => Err(self.error(format!("invalid flag value '{value}'"))),
        }
    }

    fn error(&self, message: String) -> TigError {
        TigError::Layout {
            line: self.line_number,
            message,
        }
    }
}
