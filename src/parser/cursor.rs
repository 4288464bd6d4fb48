//! Forward-only cursor over normalized lines.

use crate::model::Line;
use crate::profile::ContinuationPolicy;

use super::rules::{LineContext, RuleSet};

/// Lexer-style cursor with bounded lookahead.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    lines: &'a [Line],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(lines: &'a [Line]) -> Self {
        Self { lines, pos: 0 }
    }

    /// Current line without consuming it.
    pub fn peek(&self) -> Option<&'a Line> {
        self.lines.get(self.pos)
    }

    /// Current line with lookahead context.
    pub fn peek_context(&self) -> Option<LineContext<'a>> {
        (self.pos < self.lines.len()).then(|| LineContext::new(self.lines, self.pos))
    }

    /// Consume and return the current line.
    pub fn advance(&mut self) -> Option<&'a Line> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some(line)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// Check if the current line starts a new section.
    pub fn at_section_boundary(&self, rules: &RuleSet) -> bool {
        self.peek_context().is_some_and(|ctx| rules.is_boundary(&ctx))
    }

    /// Number of blank lines starting at the current position.
    fn blank_run(&self) -> usize {
        self.lines[self.pos..]
            .iter()
            .take_while(|l| l.is_blank())
            .count()
    }

    /// Consume continuation lines of the block whose first line was just read.
    ///
    /// Stops before a blank-line run longer than the policy allows, before a
    /// section boundary when the policy says so, and before any line `stop`
    /// accepts. A tolerated blank-line run is recorded as one empty string.
    pub fn take_continuation<F>(
        &mut self,
        rules: &RuleSet,
        policy: &ContinuationPolicy,
        stop: F,
    ) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        let ends_block = |cursor: &Self| {
            cursor.peek().map_or(true, |line| {
                (policy.stop_at_boundary && cursor.at_section_boundary(rules)) || stop(line.text())
            })
        };

        let mut taken = Vec::new();
        while let Some(line) = self.peek() {
            if line.is_blank() {
                let run = self.blank_run();
                if run > policy.blank_lines_allowed {
                    break;
                }
                let mut ahead = self.clone();
                ahead.pos += run;
                if ahead.is_at_end() || ends_block(&ahead) {
                    break;
                }
                self.pos += run;
                taken.push(String::new());
                continue;
            }
            if ends_block(&*self) {
                break;
            }
            taken.push(line.text().to_string());
            self.pos += 1;
        }
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::DocumentProfile;

    fn rules() -> RuleSet {
        RuleSet::new(&DocumentProfile::default()).unwrap()
    }

    #[test]
    fn test_peek_and_advance() {
        let lines = Line::split("a\nb");
        let mut cursor = LineCursor::new(&lines);
        assert_eq!(cursor.peek().map(Line::text), Some("a"));
        assert_eq!(cursor.advance().map(Line::text), Some("a"));
        assert_eq!(cursor.position(), 1);
        cursor.advance();
        assert!(cursor.is_at_end());
        assert!(cursor.advance().is_none());
        assert!(cursor.peek_context().is_none());
    }

    #[test]
    fn test_continuation_stops_at_blank_line() {
        let lines = Line::split("x\nx\nx\nx\nx\nfirst\nsecond line\n\nafter");
        let mut cursor = LineCursor::new(&lines);
        for _ in 0..6 {
            cursor.advance();
        }
        let taken = cursor.take_continuation(&rules(), &ContinuationPolicy::default(), |_| false);
        assert_eq!(taken, vec!["second line".to_string()]);
        assert!(cursor.peek().is_some_and(Line::is_blank));
    }

    #[test]
    fn test_continuation_stops_at_boundary() {
        let lines = Line::split("x\nx\nx\nx\nx\nfirst\nmore words\n3. next step");
        let mut cursor = LineCursor::new(&lines);
        for _ in 0..6 {
            cursor.advance();
        }
        let taken = cursor.take_continuation(&rules(), &ContinuationPolicy::default(), |_| false);
        assert_eq!(taken, vec!["more words".to_string()]);
        assert!(cursor.at_section_boundary(&rules()));
    }

    #[test]
    fn test_tolerant_policy_keeps_gap() {
        let lines = Line::split("x\nx\nx\nx\nx\nfirst\n\nstill inside\n\n\nout");
        let mut cursor = LineCursor::new(&lines);
        for _ in 0..6 {
            cursor.advance();
        }
        let policy = ContinuationPolicy::tolerant(1);
        let taken = cursor.take_continuation(&rules(), &policy, |_| false);
        assert_eq!(taken, vec![String::new(), "still inside".to_string()]);
    }

    #[test]
    fn test_tolerant_policy_does_not_cross_into_boundary() {
        let lines = Line::split("x\nx\nx\nx\nx\nfirst\n\n• bullet");
        let mut cursor = LineCursor::new(&lines);
        for _ in 0..6 {
            cursor.advance();
        }
        let taken = cursor.take_continuation(&rules(), &ContinuationPolicy::tolerant(2), |_| false);
        assert!(taken.is_empty());
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn test_custom_stop_predicate() {
        let lines = Line::split("x\nx\nx\nx\nx\nfirst\ncont\nmore");
        let mut cursor = LineCursor::new(&lines);
        for _ in 0..6 {
            cursor.advance();
        }
        let taken = cursor.take_continuation(&rules(), &ContinuationPolicy::default(), |t| t == "more");
        assert_eq!(taken, vec!["cont".to_string()]);
    }
}
