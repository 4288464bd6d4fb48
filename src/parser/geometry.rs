//! Table grid detection from vector drawing operators.
//!
//! Table borders in PDFs are drawn either as thin filled rectangles or as
//! stroked move/line paths. Both are collected as axis-aligned edges in page
//! space, grouped by position into vertical and horizontal grid lines, and the
//! spans of each group are merged into disjoint intervals.

use crate::model::DrawOp;
use crate::profile::GeometryThresholds;

/// Affine transform `[a b c d e f]` as used by the `cm` operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix(pub [f32; 6]);

impl Matrix {
    pub const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Compose `other` into this transform; `other` is applied first.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        let m1 = &self.0;
        let m2 = &other.0;
        Matrix([
            m1[0] * m2[0] + m1[2] * m2[1],
            m1[1] * m2[0] + m1[3] * m2[1],
            m1[0] * m2[2] + m1[2] * m2[3],
            m1[1] * m2[2] + m1[3] * m2[3],
            m1[0] * m2[4] + m1[2] * m2[5] + m1[4],
            m1[1] * m2[4] + m1[3] * m2[5] + m1[5],
        ])
    }

    /// Map a point through the transform.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let m = &self.0;
        (x * m[0] + y * m[2] + m[4], x * m[1] + y * m[3] + m[5])
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned rectangle in page space covering one drawn rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Edge {
    /// Transform a user-space rectangle, normalizing to a non-negative size.
    fn transformed(ctm: &Matrix, x: f32, y: f32, width: f32, height: f32) -> Self {
        let (x1, y1) = ctm.apply(x, y);
        let (x2, y2) = ctm.apply(x + width, y + height);
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x1 - x2).abs(),
            height: (y1 - y2).abs(),
        }
    }
}

/// A closed span along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f32,
    pub end: f32,
}

impl Interval {
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn len(&self) -> f32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }
}

/// A detected table boundary: its coordinate and the spans merged into it.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    /// x for a column boundary, y for a row boundary
    pub position: f32,
    /// Disjoint spans along the other axis; empty for a synthetic boundary
    pub intervals: Vec<Interval>,
}

impl GridLine {
    /// Boundary inferred at a table edge that has no drawn rule.
    pub fn synthetic(position: f32) -> Self {
        Self {
            position,
            intervals: Vec::new(),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Row and column boundaries of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Column boundaries, left to right
    pub columns: Vec<GridLine>,
    /// Row boundaries, bottom to top (PDF order)
    pub rows: Vec<GridLine>,
}

impl Grid {
    pub fn column_count(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// A grid with fewer than two rows or columns is not a table.
    pub fn is_degenerate(&self) -> bool {
        self.row_count() < 2 || self.column_count() < 2
    }

    /// Column index for an x coordinate.
    pub fn column_at(&self, x: f32) -> Option<usize> {
        self.columns
            .windows(2)
            .position(|w| x >= w[0].position && x < w[1].position)
    }

    /// Row index for a y coordinate, counted top to bottom.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        let from_bottom = self
            .rows
            .windows(2)
            .position(|w| y >= w[0].position && y < w[1].position)?;
        Some(self.row_count() - 1 - from_bottom)
    }
}

/// Sort intervals and merge every pair that overlaps or nearly touches.
///
/// Two intervals are joined when the next one starts no more than `join_gap`
/// after the current one ends.
pub fn merge_intervals(mut intervals: Vec<Interval>, join_gap: f32) -> Vec<Interval> {
    intervals.sort_by(|a, b| a.start.total_cmp(&b.start));
    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end + join_gap => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Builds grids from drawing operators.
#[derive(Debug, Clone)]
pub struct GridDetector {
    thresholds: GeometryThresholds,
}

impl GridDetector {
    pub fn new(thresholds: &GeometryThresholds) -> Self {
        Self {
            thresholds: thresholds.clone(),
        }
    }

    /// Collect rule edges in page space.
    ///
    /// Rectangles qualify when their thinner side is below the rule width.
    /// Path segments qualify when one axis is invariant; with a stroke width
    /// set they become rectangles of that width centered on the path.
    pub fn edges(&self, ops: &[DrawOp]) -> Vec<Edge> {
        let mut ctm = Matrix::IDENTITY;
        let mut stack: Vec<Matrix> = Vec::new();
        let mut line_width: Option<f32> = None;
        let mut current = (0.0f32, 0.0f32);
        let mut edges = Vec::new();

        for op in ops {
            match *op {
                DrawOp::Save => stack.push(ctm),
                DrawOp::Restore => ctm = stack.pop().unwrap_or(Matrix::IDENTITY),
                DrawOp::Transform(m) => ctm = ctm.concat(&Matrix(m)),
                DrawOp::SetLineWidth(w) => line_width = Some(w),
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                } => {
                    if width.abs().min(height.abs()) < self.thresholds.rule_max_width {
                        edges.push(Edge::transformed(&ctm, x, y, width, height));
                    }
                }
                DrawOp::MoveTo { x, y } => current = (x, y),
                DrawOp::LineTo { x, y } => {
                    let (cx, cy) = current;
                    let half = line_width.unwrap_or(0.0) / 2.0;
                    let stroke = line_width.unwrap_or(0.0);
                    if approx_eq(cx, x) {
                        edges.push(Edge::transformed(
                            &ctm,
                            x - half,
                            cy.min(y),
                            stroke,
                            (y - cy).abs(),
                        ));
                    } else if approx_eq(cy, y) {
                        edges.push(Edge::transformed(
                            &ctm,
                            cx.min(x),
                            y - half,
                            (x - cx).abs(),
                            stroke,
                        ));
                    }
                    current = (x, y);
                }
            }
        }
        edges
    }

    /// Column boundaries from thin vertical edges.
    pub fn vertical_lines(&self, edges: &[Edge]) -> Vec<GridLine> {
        let candidates: Vec<(f32, Interval)> = edges
            .iter()
            .filter(|e| e.width <= self.thresholds.rule_max_width)
            .map(|e| (e.x, Interval::new(e.y, e.y + e.height)))
            .collect();
        self.group(candidates)
    }

    /// Row boundaries from thin horizontal edges.
    pub fn horizontal_lines(&self, edges: &[Edge]) -> Vec<GridLine> {
        let candidates: Vec<(f32, Interval)> = edges
            .iter()
            .filter(|e| e.height <= self.thresholds.rule_max_width)
            .map(|e| (e.y, Interval::new(e.x, e.x + e.width)))
            .collect();
        self.group(candidates)
    }

    /// Group spans by position and merge each group's spans.
    fn group(&self, mut candidates: Vec<(f32, Interval)>) -> Vec<GridLine> {
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.start.total_cmp(&b.1.start)));

        let mut lines = Vec::new();
        let mut position: Option<f32> = None;
        let mut spans: Vec<Interval> = Vec::new();
        for (pos, span) in candidates {
            match position {
                Some(p) if pos - p <= self.thresholds.position_tolerance => spans.push(span),
                _ => {
                    if let Some(p) = position {
                        self.push_line(&mut lines, p, std::mem::take(&mut spans));
                    }
                    position = Some(pos);
                    spans.push(span);
                }
            }
        }
        if let Some(p) = position {
            self.push_line(&mut lines, p, spans);
        }
        lines
    }

    fn push_line(&self, lines: &mut Vec<GridLine>, position: f32, spans: Vec<Interval>) {
        let intervals: Vec<Interval> = merge_intervals(spans, self.thresholds.segment_join_gap)
            .into_iter()
            .filter(|i| i.len() > self.thresholds.rule_max_width)
            .collect();
        if !intervals.is_empty() {
            lines.push(GridLine {
                position,
                intervals,
            });
        }
    }

    /// Detect the grid of one page, or `None` when rules are missing on either axis.
    ///
    /// Outer row boundaries without a drawn rule are added at the vertical
    /// extent of the column rules.
    pub fn detect(&self, ops: &[DrawOp]) -> Option<Grid> {
        let edges = self.edges(ops);
        let columns = self.vertical_lines(&edges);
        let mut rows = self.horizontal_lines(&edges);
        if columns.is_empty() || rows.is_empty() {
            return None;
        }

        let spans = columns.iter().flat_map(|c| c.intervals.iter());
        let (low, high) = spans.fold((f32::MAX, f32::MIN), |(lo, hi), i| {
            (lo.min(i.start), hi.max(i.end))
        });

        let tolerance = self.thresholds.boundary_tolerance;
        let near = |rows: &[GridLine], y: f32| rows.iter().any(|r| (r.position - y).abs() < tolerance);
        if !near(&rows, low) {
            rows.insert(0, GridLine::synthetic(low));
        }
        if !near(&rows, high) {
            rows.push(GridLine::synthetic(high));
        }
        rows.sort_by(|a, b| a.position.total_cmp(&b.position));

        Some(Grid { columns, rows })
    }
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
