//! Table document assembly.
//!
//! Tables detected from page geometry are merged across page breaks, split
//! where a second header is glued into the body, and paired in order with the
//! table section headings found in the text. Sections without a geometry
//! table fall back to splitting their text lines at a column boundary.

use std::collections::HashSet;

use crate::model::{Block, Line, PageContent, Table, TableCell, TableRow};
use crate::profile::{DocumentProfile, TableVocabulary};

use super::cells::CellAssembler;

/// Words that make up a cell header, at most this many per cell.
const HEADER_CELL_MAX_WORDS: usize = 3;

/// Minimum whitespace run that separates text columns.
const COLUMN_GAP: usize = 2;

/// A table section heading and the text lines under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSection {
    pub heading: String,
    pub lines: Vec<String>,
}

/// How a table was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Geometry,
    TextColumns,
}

/// What a table section renders as.
enum SectionBody<'s> {
    Table,
    Text(&'s [String]),
}

/// Routes table documents between geometry tables and the text fallback.
#[derive(Debug, Clone)]
pub struct TableRouter {
    vocab: TableVocabulary,
    headings: Vec<String>,
    assembler: CellAssembler,
}

impl TableRouter {
    pub fn new(profile: &DocumentProfile) -> Self {
        Self {
            vocab: profile.table.clone(),
            headings: profile
                .table
                .section_headings
                .iter()
                .map(|h| h.trim().to_lowercase())
                .collect(),
            assembler: CellAssembler::new(&profile.geometry),
        }
    }

    /// Check if a line opens a table section.
    pub fn is_section_heading(&self, text: &str) -> bool {
        let text = text.trim().trim_end_matches(':').to_lowercase();
        self.headings.iter().any(|h| *h == text)
    }

    /// Split lines into the preamble and the table sections after it.
    pub fn split_sections(&self, lines: &[Line]) -> (Vec<Line>, Vec<TableSection>) {
        let first = lines.iter().position(|l| self.is_section_heading(l.text()));
        let Some(first) = first else {
            return (lines.to_vec(), Vec::new());
        };

        let mut sections: Vec<TableSection> = Vec::new();
        for line in &lines[first..] {
            if self.is_section_heading(line.text()) {
                sections.push(TableSection {
                    heading: line.text().to_string(),
                    lines: Vec::new(),
                });
            } else if let Some(section) = sections.last_mut() {
                section.lines.push(line.raw.clone());
            }
        }
        (lines[..first].to_vec(), sections)
    }

    /// Build the blocks of all table sections.
    ///
    /// Geometry tables are paired with sections in order; a section left
    /// without one tries the text-column fallback and otherwise keeps its
    /// text as paragraphs. Geometry tables beyond the last section are
    /// appended without a heading.
    pub fn route(&self, sections: &[TableSection], pages: &[PageContent]) -> Vec<Block> {
        let mut geometry = self.geometry_tables(pages).into_iter();
        let mut tables: Vec<Table> = Vec::new();
        let mut routed: Vec<(Option<&str>, SectionBody<'_>)> = Vec::new();

        for section in sections {
            let found = geometry
                .next()
                .map(|t| (t, TableSource::Geometry))
                .or_else(|| {
                    self.text_columns(&section.lines)
                        .map(|t| (t, TableSource::TextColumns))
                });
            let body = match found {
                Some((mut table, source)) => {
                    log::debug!("section `{}`: {:?} table", section.heading, source);
                    table.caption = Some(section.heading.clone());
                    tables.push(self.finalize(table));
                    SectionBody::Table
                }
                None => {
                    log::debug!("section `{}`: no table found, keeping text", section.heading);
                    SectionBody::Text(&section.lines)
                }
            };
            routed.push((Some(section.heading.as_str()), body));
        }
        for table in geometry {
            log::debug!("table on pages {:?} has no section heading", table.pages);
            tables.push(self.finalize(table));
            routed.push((None, SectionBody::Table));
        }
        self.unify_widths(&mut tables);

        let mut tables = tables.into_iter();
        let mut blocks = Vec::new();
        for (heading, body) in routed {
            if let Some(heading) = heading {
                blocks.push(Block::SectionHeader {
                    text: heading.to_string(),
                });
            }
            match body {
                SectionBody::Table => {
                    if let Some(table) = tables.next() {
                        blocks.push(Block::Table { table });
                    }
                }
                SectionBody::Text(lines) => blocks.extend(paragraphs(lines)),
            }
        }
        blocks
    }

    /// Geometry tables of all pages, merged and split into logical tables.
    pub fn geometry_tables(&self, pages: &[PageContent]) -> Vec<Table> {
        let page_tables: Vec<Table> = pages
            .iter()
            .filter_map(|page| self.assembler.extract(page))
            .collect();
        self.merge_pages(page_tables)
            .into_iter()
            .flat_map(|t| self.split_embedded(t))
            .collect()
    }

    /// Merge tables that continue across a page break.
    ///
    /// A page table continues the previous one when its first row is not a
    /// header, or when it repeats a header similar to the previous table's;
    /// a repeated header row is dropped.
    pub fn merge_pages(&self, tables: Vec<Table>) -> Vec<Table> {
        let mut merged: Vec<Table> = Vec::new();
        for table in tables {
            let Some(prev) = merged.last_mut() else {
                merged.push(table);
                continue;
            };
            let Some(first) = table.rows.first() else {
                continue;
            };

            let skip = if !self.is_header_row(first) {
                0
            } else if prev
                .rows
                .first()
                .filter(|r| self.is_header_row(r))
                .is_some_and(|h| header_similarity(h, first) >= self.vocab.header_similarity)
            {
                1
            } else {
                merged.push(table);
                continue;
            };

            log::debug!(
                "merging table from pages {:?} into pages {:?}",
                table.pages,
                prev.pages
            );
            prev.rows.extend(table.rows.into_iter().skip(skip));
            prev.pages.extend(table.pages);
        }
        merged
    }

    /// Split a table at a body row that opens a second, differently typed table.
    pub fn split_embedded(&self, mut table: Table) -> Vec<Table> {
        let header_has_split = table
            .rows
            .first()
            .is_some_and(|r| self.is_header_row(r) && self.has_split_term(r));
        if header_has_split {
            return vec![table];
        }
        let at = table
            .rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, r)| self.is_header_row(r) && self.has_split_term(r))
            .map(|(i, _)| i);
        let Some(at) = at else {
            return vec![table];
        };

        log::debug!("splitting embedded table at row {at}");
        let rest = table.rows.split_off(at);
        let mut second = Table::new();
        second.rows = rest;
        second.pages = table.pages.clone();
        vec![table, second]
    }

    /// Check if a row reads like a column header.
    pub fn is_header_row(&self, row: &TableRow) -> bool {
        row.cells.iter().any(|cell| {
            let words = words(&cell.text);
            words.len() <= HEADER_CELL_MAX_WORDS
                && words
                    .iter()
                    .any(|w| matches_term(w, &self.vocab.header_terms))
        })
    }

    fn has_split_term(&self, row: &TableRow) -> bool {
        row.cells
            .iter()
            .flat_map(|c| words(&c.text))
            .any(|w| matches_term(&w, &self.vocab.split_terms))
    }

    /// Mark or synthesize the header row, drop blank rows and pad to a rectangle.
    pub fn finalize(&self, mut table: Table) -> Table {
        table.rows.retain(|r| !r.is_blank());
        let width = table.column_count().max(1);

        let has_header = table.rows.first().is_some_and(|r| self.is_header_row(r));
        if has_header {
            table.rows[0].is_header = true;
        } else {
            let names = (0..width).map(|i| {
                self.vocab
                    .default_columns
                    .get(i)
                    .cloned()
                    .unwrap_or_default()
            });
            table.rows.insert(0, TableRow::from_strings(names).into_header());
        }
        table.header_rows = 1;
        table.normalize();
        table
    }

    /// Give every table the same width when feature- and requirement-style
    /// tables appear in one document.
    pub fn unify_widths(&self, tables: &mut [Table]) {
        let styled = |t: &Table| t.header().first().is_some_and(|h| self.has_split_term(h));
        let mixed = tables.iter().any(styled) && tables.iter().any(|t| !styled(t));
        if !mixed {
            return;
        }
        let width = tables.iter().map(Table::column_count).max().unwrap_or(0);
        for table in tables.iter_mut() {
            let current = table.column_count();
            if let Some(header) = table.rows.first_mut() {
                for i in current..width {
                    let name = self.vocab.default_columns.get(i).cloned().unwrap_or_default();
                    header.cells.push(TableCell::text(name));
                }
            }
            table.pad_to(width);
        }
    }

    /// Parse text lines as a two-column table.
    ///
    /// The column boundary is the median position of each line's widest
    /// whitespace gap. Lines without a gap continue the previous row.
    pub fn text_columns(&self, lines: &[String]) -> Option<Table> {
        let gaps: Vec<Option<(usize, usize)>> = lines.iter().map(|l| widest_gap(l)).collect();
        let mut starts: Vec<usize> = gaps.iter().flatten().map(|g| g.0).collect();
        if starts.is_empty() {
            return None;
        }
        starts.sort_unstable();
        let boundary = starts[starts.len() / 2];

        let mut rows: Vec<Vec<String>> = Vec::new();
        for (line, gap) in lines.iter().zip(&gaps) {
            let text = line.trim_end();
            if text.trim().is_empty() {
                continue;
            }
            let chars: Vec<char> = text.chars().collect();
            match gap {
                Some(_) => {
                    let (start, end) = nearest_gap(&chars, boundary).unwrap_or((boundary, boundary));
                    let left: String = chars[..start.min(chars.len())].iter().collect();
                    let right: String = chars[end.min(chars.len())..].iter().collect();
                    rows.push(vec![left.trim().to_string(), right.trim().to_string()]);
                }
                None => match rows.last_mut() {
                    Some(row) => {
                        let cell = if row[1].is_empty() { &mut row[0] } else { &mut row[1] };
                        cell.push(' ');
                        cell.push_str(text.trim());
                    }
                    None => rows.push(vec![text.trim().to_string(), String::new()]),
                },
            }
        }
        if rows.len() < 2 {
            return None;
        }
        Some(Table::from_rows(rows, false))
    }
}

/// Word-overlap ratio of two rows: shared words over the larger word set.
pub fn header_similarity(a: &TableRow, b: &TableRow) -> f32 {
    let set = |row: &TableRow| -> HashSet<String> {
        row.cells
            .iter()
            .flat_map(|c| words(&c.text))
            .map(|w| singular(&w).to_string())
            .collect()
    };
    let (a, b) = (set(a), set(b));
    let larger = a.len().max(b.len());
    if larger == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f32 / larger as f32
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Word without a plural `s`.
fn singular(word: &str) -> &str {
    match word.strip_suffix('s') {
        Some(stem) if stem.len() > 2 && !stem.ends_with('s') => stem,
        _ => word,
    }
}

/// Whole-word match, allowing a plural `s`.
fn matches_term(word: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| {
        let t = t.to_lowercase();
        word == t || word.strip_suffix('s') == Some(t.as_str())
    })
}

/// Character span of the widest run of `COLUMN_GAP`+ spaces inside a line.
fn widest_gap(line: &str) -> Option<(usize, usize)> {
    gaps(&line.trim_end().chars().collect::<Vec<_>>())
        .into_iter()
        .max_by_key(|(s, e)| (e - s, usize::MAX - s))
}

/// Gap closest to a column boundary.
fn nearest_gap(chars: &[char], boundary: usize) -> Option<(usize, usize)> {
    gaps(chars)
        .into_iter()
        .min_by_key(|(s, _)| s.abs_diff(boundary))
}

fn gaps(chars: &[char]) -> Vec<(usize, usize)> {
    let lead = chars.iter().take_while(|c| c.is_whitespace()).count();
    let mut found = Vec::new();
    let mut i = lead;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            let start = i;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            if i - start >= COLUMN_GAP && i < chars.len() {
                found.push((start, i));
            }
        } else {
            i += 1;
        }
    }
    found
}

/// Paragraph blocks from raw lines, split at blank lines.
fn paragraphs(lines: &[String]) -> Vec<Block> {
    lines
        .split(|l| l.trim().is_empty())
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            Block::paragraph(
                chunk
                    .iter()
                    .map(|l| l.trim())
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        })
        .collect()
}
