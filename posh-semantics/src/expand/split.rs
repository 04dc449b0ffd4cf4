//! Field splitting: "split each unquoted portion of a
//! prefield on IFS characters; quoted portions never split; a prefield whose
//! text became empty is dropped unless a quoted construct forced it to
//! survive or it was produced by exploding `\"$@\"`."
//!
//! Grounded on `yash-semantics/src/expansion/split.rs`'s three-class IFS
//! model (whitespace vs. non-whitespace vs. the rest), reworked to carry
//! each character's quotedness alongside its text (this crate's
    //! [`super::Chunk`]/[`super::PreField`] shape) so [`super::glob`] and
//! [`crate::pattern`] can later tell a literal asterisk from a glob one.

use super::PreField;

/// One field after splitting, each character tagged with whether it came
/// from quoted input (so pathname expansion and pattern matching downstream
    /// still treat it as literal).
#[derive(Clone, Debug, Default)]
pub struct SplitField {
    pub chars: Vec<(char, bool)>,
}

impl SplitField {
    pub fn text(&self) -> String {
        self.chars.iter().map(|&(c, _)| c).collect()
    }
}

fn is_ifs_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n'
}

fn flatten(prefield: &PreField) -> Vec<(char, bool)> {
    prefield
    .chunks
    .iter()
    .flat_map(|chunk| chunk.text.chars().map(move |c| (c, chunk.quoted)))
    .collect()
}

/// Splits every prefield's unquoted text on IFS, leaving quoted text intact.
/// Fields produced by exploding `$@` (`atomic`) are passed through unsplit
///.
pub fn split_fields(prefields: Vec<PreField>, ifs: &str) -> Vec<SplitField> {
    let is_ws = |c: char| ifs.contains(c) && is_ifs_whitespace(c);
    let is_nonws = |c: char| ifs.contains(c) && !is_ifs_whitespace(c);
    let is_ifs = |c: char| ifs.contains(c);

    let mut out = Vec::new();
    for prefield in prefields {
        let chars = flatten(&prefield);

        if prefield.atomic {
            out.push(SplitField { chars });
            continue;
        }

        if ifs.is_empty() {
            if !chars.is_empty() || prefield.quoted_forced {
                out.push(SplitField { chars });
            }
            continue;
        }

        let n = chars.len();
        let mut i = 0;
        while i < n && !chars[i].1 && is_ws(chars[i].0) {
            i += 1;
        }

        let mut fields: Vec<Vec<(char, bool)>> = Vec::new();
        let mut current: Vec<(char, bool)> = Vec::new();
        let mut had_trailing_ws_delim = false;

        while i < n {
            let (c, quoted) = chars[i];
            if !quoted && is_ifs(c) {
                while i < n && !chars[i].1 && is_ws(chars[i].0) {
                    i += 1;
                }
                let mut saw_nonws = false;
                if i < n && !chars[i].1 && is_nonws(chars[i].0) {
                    saw_nonws = true;
                    i += 1;
                    while i < n && !chars[i].1 && is_ws(chars[i].0) {
                        i += 1;
                    }
                }
                fields.push(std::mem::take(&mut current));
                had_trailing_ws_delim = !saw_nonws && i == n;
            } else {
                current.push((c, quoted));
                had_trailing_ws_delim = false;
                i += 1;
            }
        }

        let push_final = !current.is_empty()
        || prefield.quoted_forced
        || (!fields.is_empty() && !had_trailing_ws_delim);
        if push_final {
            fields.push(current);
        }

        out.extend(fields.into_iter().map(|chars| SplitField { chars }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::Chunk;

    fn unquoted_field(text: &str) -> PreField {
        PreField {
            chunks: vec![Chunk {
                    text: text.to_string(),
                    quoted: false,
                }],
            atomic: false,
            quoted_forced: false,
        }
    }

    fn quoted_field(text: &str) -> PreField {
        PreField {
            chunks: vec![Chunk {
                    text: text.to_string(),
                    quoted: true,
                }],
            atomic: false,
            quoted_forced: true,
        }
    }

    #[test]
    fn default_ifs_splits_on_runs_of_whitespace() {
        let out = split_fields(vec![unquoted_field("a b c\td")], " \t\n");
        let texts: Vec<String> = out.iter().map(SplitField::text).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn quoted_field_never_splits() {
        let out = split_fields(vec![quoted_field("a b c")], " \t\n");
        let texts: Vec<String> = out.iter().map(SplitField::text).collect();
        assert_eq!(texts, vec!["a b c"]);
    }

    #[test]
    fn unquoted_all_whitespace_vanishes() {
        let out = split_fields(vec![unquoted_field(" ")], " \t\n");
        assert!(out.is_empty());
    }

    #[test]
    fn quoted_empty_field_survives() {
        let mut field = quoted_field("");
        field.chunks.clear();
        let out = split_fields(vec![field], " \t\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text(), "");
    }

    #[test]
    fn non_whitespace_ifs_marks_boundary_even_when_adjacent() {
        let out = split_fields(vec![unquoted_field("a::b")], ":");
        let texts: Vec<String> = out.iter().map(SplitField::text).collect();
        assert_eq!(texts, vec!["a", "", "b"]);
    }

    #[test]
    fn trailing_nonws_delimiter_produces_trailing_empty_field() {
        let out = split_fields(vec![unquoted_field("a:")], ":");
        let texts: Vec<String> = out.iter().map(SplitField::text).collect();
        assert_eq!(texts, vec!["a", ""]);
    }

    #[test]
    fn trailing_whitespace_produces_no_trailing_field() {
        let out = split_fields(vec![unquoted_field("a b ")], " \t\n");
        let texts: Vec<String> = out.iter().map(SplitField::text).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn atomic_field_passes_through_unsplit() {
        let field = PreField {
            chunks: vec![Chunk {
                    text: "a b".to_string(),
                    quoted: false,
                }],
            atomic: true,
            quoted_forced: false,
        };
        let out = split_fields(vec![field], " \t\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text(), "a b");
    }
}
