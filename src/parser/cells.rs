//! Mapping of positioned text fragments into grid cells.

use crate::model::{PageContent, Table, TableCell, TableRow};
use crate::profile::GeometryThresholds;

use super::geometry::{Grid, GridDetector};

/// Fills a grid with the text fragments of a page.
#[derive(Debug, Clone)]
pub struct CellAssembler {
    detector: GridDetector,
    break_gap: f32,
}

impl CellAssembler {
    pub fn new(thresholds: &GeometryThresholds) -> Self {
        Self {
            detector: GridDetector::new(thresholds),
            break_gap: thresholds.cell_break_gap,
        }
    }

    /// Detect the grid of a page and fill it.
    ///
    /// Returns `None` when the page has no usable grid or no text inside it;
    /// the caller then falls back to text-column parsing.
    pub fn extract(&self, page: &PageContent) -> Option<Table> {
        let Some(grid) = self.detector.detect(&page.ops) else {
            log::debug!("page {}: no table rules", page.number);
            return None;
        };
        if grid.is_degenerate() {
            log::debug!(
                "page {}: degenerate grid {}x{}",
                page.number,
                grid.row_count(),
                grid.column_count()
            );
            return None;
        }
        let table = self.assemble(page, &grid);
        if table.rows.iter().all(TableRow::is_blank) {
            return None;
        }
        Some(table)
    }

    /// Assign every fragment to the cell containing its origin.
    ///
    /// Fragments outside the grid are dropped. Within a cell, a vertical jump
    /// larger than the break gap starts a new line.
    pub fn assemble(&self, page: &PageContent, grid: &Grid) -> Table {
        let (rows, cols) = (grid.row_count(), grid.column_count());
        let mut cells = vec![vec![String::new(); cols]; rows];
        let mut last_y: Vec<Vec<Option<f32>>> = vec![vec![None; cols]; rows];

        for fragment in &page.fragments {
            let (Some(col), Some(row)) = (grid.column_at(fragment.x), grid.row_at(fragment.y)) else {
                continue;
            };
            let cell = &mut cells[row][col];
            match last_y[row][col] {
                Some(prev) if (prev - fragment.y).abs() > self.break_gap => cell.push('\n'),
                Some(_) if needs_space(cell, &fragment.text) => cell.push(' '),
                _ => {}
            }
            cell.push_str(&fragment.text);
            last_y[row][col] = Some(fragment.y);
        }

        let mut table = Table::new();
        table.pages.push(page.number);
        for row in cells {
            table.add_row(TableRow::new(
                row.into_iter()
                    .map(|text| TableCell::text(tidy_cell(&text)))
                    .collect(),
            ));
        }
        table
    }
}

fn needs_space(cell: &str, next: &str) -> bool {
    !cell.is_empty()
        && !cell.ends_with(char::is_whitespace)
        && !next.starts_with(char::is_whitespace)
}

/// Trim each visual line of a cell and drop empty ones.
fn tidy_cell(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DrawOp;

    fn ruled_page(number: u32) -> PageContent {
        // Two columns (0..100, 100..300), two rows (0..20 bottom, 20..40 top).
        let mut page = PageContent::new(number);
        for x in [0.0, 100.0, 300.0] {
            page = page.op(DrawOp::Rect {
                x,
                y: 0.0,
                width: 0.5,
                height: 40.0,
            });
        }
        for y in [0.0, 20.0, 40.0] {
            page = page.op(DrawOp::Rect {
                x: 0.0,
                y,
                width: 300.0,
                height: 0.5,
            });
        }
        page
    }

    fn assembler() -> CellAssembler {
        CellAssembler::new(&GeometryThresholds::default())
    }

    #[test]
    fn test_fragments_land_in_cells_top_to_bottom() {
        let page = ruled_page(1)
            .text("Feature", 5.0, 30.0)
            .text("Description", 105.0, 30.0)
            .text("VPN", 5.0, 10.0)
            .text("Secure tunnel", 105.0, 10.0);
        let table = assembler().extract(&page).unwrap();
        assert_eq!(table.rows[0].texts(), vec!["Feature", "Description"]);
        assert_eq!(table.rows[1].texts(), vec!["VPN", "Secure tunnel"]);
        assert_eq!(table.pages, vec![1]);
    }

    #[test]
    fn test_vertical_jump_breaks_line_in_cell() {
        let page = ruled_page(1)
            .text("Feature", 5.0, 30.0)
            .text("first line", 105.0, 16.0)
            .text("continues", 160.0, 16.0)
            .text("second line", 105.0, 6.0);
        let table = assembler().extract(&page).unwrap();
        assert_eq!(table.rows[1].cells[1].text, "first line continues\nsecond line");
    }

    #[test]
    fn test_fragments_outside_grid_dropped() {
        let page = ruled_page(1)
            .text("Header", 5.0, 30.0)
            .text("page footer", 5.0, 80.0)
            .text("margin", 400.0, 10.0);
        let table = assembler().extract(&page).unwrap();
        assert_eq!(table.plain_text(), "Header\t\n\t");
    }

    #[test]
    fn test_empty_grid_is_no_table() {
        assert!(assembler().extract(&ruled_page(1)).is_none());
    }

    #[test]
    fn test_page_without_rules_is_no_table() {
        let page = PageContent::new(2).text("just text", 10.0, 10.0);
        assert!(assembler().extract(&page).is_none());
    }
}
