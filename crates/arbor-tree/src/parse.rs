//! Parser for indented tree dumps.
//!
//! The dump is line oriented. Every line starts with zero or more `|   `
//! markers giving its depth, followed by either a clause
//! (`attr < 0.5`, `attr >= 0.5`, `attr = value`), optionally ending in an
//! inline leaf (`... : label (covered/misclassified)`), or by a bare leaf.
//! A clause without an inline leaf owns the block of deeper lines that
//! follows it.

use tracing::{debug, instrument};

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::node::{Leaf, Node, Split};
use crate::tree::DecisionTree;

/// Indentation marker preceding every nested line, once per level.
pub const INDENT: &str = "|   ";

/// Separator between a clause and its inline leaf.
pub const LEAF_SEPARATOR: &str = " : ";

/// A non-blank input line with its indentation measured.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// 1-based line number in the input text.
    number: usize,
    /// Count of leading indentation markers.
    depth: usize,
    /// Content after the indentation markers.
    body: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Less,
    AtLeast,
    Equals,
}

impl Operator {
    const ALL: [Operator; 3] = [Operator::Less, Operator::AtLeast, Operator::Equals];

    fn token(self) -> &'static str {
        match self {
            Operator::Less => " < ",
            Operator::AtLeast => " >= ",
            Operator::Equals => " = ",
        }
    }
}

/// One split clause, e.g. `speed < 4.99 : walk (12/1)`.
#[derive(Debug, Clone, Copy)]
struct Clause<'a> {
    line: Line<'a>,
    attribute: &'a str,
    operator: Operator,
    value: &'a str,
    leaf: Option<&'a str>,
}

impl<'a> Clause<'a> {
    /// Recognize a clause, returning `None` when the line has no split operator.
    fn recognize(line: Line<'a>) -> Option<Self> {
        let (head, leaf) = match line.body.rsplit_once(LEAF_SEPARATOR) {
            Some((head, leaf)) => (head, Some(leaf)),
            None => (line.body, None),
        };
        let (pos, operator) = Operator::ALL
            .iter()
            .filter_map(|&op| head.find(op.token()).map(|pos| (pos, op)))
            .min_by_key(|&(pos, _)| pos)?;
        let attribute = head[..pos].trim();
        let value = head[pos + operator.token().len()..].trim();
        if attribute.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self {
            line,
            attribute,
            operator,
            value,
            leaf,
        })
    }

    fn threshold(&self) -> Result<f64, ParseError> {
        match self.value.parse::<f64>() {
            Ok(t) if t.is_finite() => Ok(t),
            _ => Err(ParseError::InvalidThreshold {
                line: self.line.number,
                raw: self.value.to_string(),
            }),
        }
    }
}

/// Parse a tree dump with the default [`ParserConfig`].
///
/// # Errors
///
/// See [`ParserConfig::parse`].
pub fn parse_tree(text: &str) -> Result<DecisionTree, ParseError> {
    ParserConfig::new().parse(text)
}

/// Parse a single leaf line such as `attr >= 0.86 : train (1.23/0.22)`.
///
/// The leaf is read from after the rightmost `" : "`; without a separator
/// the whole line (minus a leading `:`) is taken as `label (a/b)`.
///
/// # Errors
///
/// Returns [`ParseError::MalformedLeaf`] or [`ParseError::InvalidWeight`].
pub fn parse_leaf(text: &str) -> Result<Leaf, ParseError> {
    leaf_at(text, 1)
}

impl ParserConfig {
    /// Parse a tree dump into a [`DecisionTree`].
    ///
    /// Blank lines are skipped; `\r\n` line endings are accepted.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ParseError::EmptyInput`] | no non-blank line |
    /// | [`ParseError::DepthLimitExceeded`] | a line is indented deeper than `max_depth` |
    /// | [`ParseError::MalformedLeaf`] / [`ParseError::InvalidWeight`] | bad `label (a/b)` trailer |
    /// | [`ParseError::MalformedSplit`] / [`ParseError::InvalidThreshold`] | unrecognized clause |
    /// | [`ParseError::AttributeMismatch`] | sibling clauses test different attributes |
    /// | [`ParseError::UnexpectedClause`] | clause out of place, e.g. a leading `>=` |
    /// | [`ParseError::MissingBody`] | clause with neither leaf nor block |
    /// | [`ParseError::MissingBranch`] / [`ParseError::ThresholdMismatch`] | incomplete numeric split |
    /// | [`ParseError::DuplicateCategory`] | category listed twice |
    /// | [`ParseError::Indentation`] | line at the wrong depth |
    #[instrument(skip(self, text), fields(n_bytes = text.len()))]
    pub fn parse(&self, text: &str) -> Result<DecisionTree, ParseError> {
        let lines = self.tokenize(text)?;
        if lines.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        debug!(n_lines = lines.len(), "tokenized tree dump");

        let tree = DecisionTree::new(build(&lines)?);
        debug!(
            n_nodes = tree.n_nodes(),
            n_leaves = tree.n_leaves(),
            depth = tree.depth(),
            "tree parsed"
        );
        Ok(tree)
    }

    fn tokenize<'a>(&self, text: &'a str) -> Result<Vec<Line<'a>>, ParseError> {
        let mut lines = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            if raw.trim().is_empty() {
                continue;
            }
            let mut body = raw.trim_end();
            let mut depth = 0;
            while let Some(rest) = body.strip_prefix(INDENT) {
                body = rest;
                depth += 1;
            }
            if depth > self.max_depth {
                return Err(ParseError::DepthLimitExceeded {
                    line: idx + 1,
                    limit: self.max_depth,
                });
            }
            lines.push(Line {
                number: idx + 1,
                depth,
                body,
            });
        }
        Ok(lines)
    }
}

/// Build the tree over all of `lines`.
///
/// Splits still reading their clauses sit on an explicit stack, so nesting
/// depth costs heap rather than call stack. Each pass descends through
/// nested blocks until some node completes, then climbs back up, handing
/// the node to its parent and closing every split that has no clause left.
fn build(lines: &[Line<'_>]) -> Result<Node, ParseError> {
    let mut open: Vec<OpenSplit<'_>> = Vec::new();
    let mut run = Run {
        start: 0,
        end: lines.len(),
        depth: 0,
    };
    loop {
        let (mut node, mut after) = loop {
            let first = lines[run.start];
            if first.depth != run.depth {
                return Err(ParseError::Indentation {
                    line: first.number,
                    expected: run.depth,
                    found: first.depth,
                });
            }
            if run.end - run.start == 1 {
                break (Node::Leaf(leaf_at(first.body, first.number)?), run.end);
            }
            let clause = Clause::recognize(first).ok_or_else(|| ParseError::MalformedSplit {
                line: first.number,
                text: first.body.to_string(),
            })?;
            let split = OpenSplit::open(clause, run)?;
            let body = split.body(lines)?;
            open.push(split);
            match body {
                Body::Leaf(leaf, next) => break (Node::Leaf(leaf), next),
                Body::Block(inner) => run = inner,
            }
        };

        loop {
            let Some(split) = open.last_mut() else {
                return Ok(node);
            };
            split.branches.push((split.current.value.to_string(), node));
            match split.advance(lines, after)? {
                Some(Body::Leaf(leaf, next)) => {
                    node = Node::Leaf(leaf);
                    after = next;
                }
                Some(Body::Block(inner)) => {
                    run = inner;
                    break;
                }
                None => {
                    let Some(done) = open.pop() else {
                        unreachable!("the split just advanced is on the stack")
                    };
                    let end = done.run.end;
                    node = Node::Split(done.close(lines, after)?);
                    after = end;
                }
            }
        }
    }
}

/// A run of lines forming one node: `lines[start..end]`, first line at `depth`.
///
/// Every line in the run sits at `depth` or deeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    start: usize,
    end: usize,
    depth: usize,
}

/// What follows a clause header.
enum Body {
    /// Inline leaf, plus the index of the line after the clause.
    Leaf(Leaf, usize),
    /// Nested block of deeper lines.
    Block(Run),
}

/// A split whose sibling clauses are still being read.
struct OpenSplit<'a> {
    first: Clause<'a>,
    /// Clause whose body is being parsed.
    current: Clause<'a>,
    /// Index of `current` in the line list.
    at: usize,
    /// Run the split must consume entirely.
    run: Run,
    /// Numeric threshold; unused for categorical splits.
    threshold: f64,
    branches: Vec<(String, Node)>,
}

impl<'a> OpenSplit<'a> {
    /// Start a split at the head of `run`.
    fn open(first: Clause<'a>, run: Run) -> Result<Self, ParseError> {
        let threshold = match first.operator {
            Operator::Less => first.threshold()?,
            Operator::AtLeast => {
                return Err(ParseError::UnexpectedClause {
                    line: first.line.number,
                    text: first.line.body.to_string(),
                });
            }
            Operator::Equals => f64::NAN,
        };
        Ok(Self {
            first,
            current: first,
            at: run.start,
            run,
            threshold,
            branches: Vec::new(),
        })
    }

    /// Locate the body of the current clause.
    fn body(&self, lines: &[Line<'_>]) -> Result<Body, ParseError> {
        let depth = self.run.depth;
        let end = self.run.end;
        let next = self.at + 1;

        if let Some(leaf) = self.current.leaf {
            let leaf = leaf_at(leaf, self.current.line.number)?;
            if next < end && lines[next].depth > depth {
                return Err(ParseError::Indentation {
                    line: lines[next].number,
                    expected: depth,
                    found: lines[next].depth,
                });
            }
            return Ok(Body::Leaf(leaf, next));
        }

        if next >= end || lines[next].depth <= depth {
            return Err(ParseError::MissingBody {
                line: self.current.line.number,
                text: self.current.line.body.to_string(),
            });
        }
        let block_end = lines[next..end]
            .iter()
            .position(|l| l.depth <= depth)
            .map_or(end, |offset| next + offset);
        Ok(Body::Block(Run {
            start: next,
            end: block_end,
            depth: depth + 1,
        }))
    }

    /// Move to the next sibling clause at line index `after`.
    ///
    /// Returns `None` once the split has all its branches.
    fn advance(&mut self, lines: &[Line<'a>], after: usize) -> Result<Option<Body>, ParseError> {
        let end = self.run.end;
        match self.first.operator {
            Operator::Less if self.branches.len() == 1 => {
                if after >= end {
                    return Err(ParseError::MissingBranch {
                        line: self.first.line.number,
                        attribute: self.first.attribute.to_string(),
                    });
                }
                let line = lines[after];
                let second = Clause::recognize(line).ok_or_else(|| ParseError::MalformedSplit {
                    line: line.number,
                    text: line.body.to_string(),
                })?;
                if second.attribute != self.first.attribute {
                    return Err(ParseError::AttributeMismatch {
                        line: line.number,
                        expected: self.first.attribute.to_string(),
                        found: second.attribute.to_string(),
                    });
                }
                if second.operator != Operator::AtLeast {
                    return Err(ParseError::UnexpectedClause {
                        line: line.number,
                        text: line.body.to_string(),
                    });
                }
                let right = second.threshold()?;
                if right != self.threshold {
                    return Err(ParseError::ThresholdMismatch {
                        line: line.number,
                        left: self.threshold,
                        right,
                    });
                }
                self.current = second;
                self.at = after;
                self.body(lines).map(Some)
            }
            Operator::Equals if after < end => match Clause::recognize(lines[after]) {
                Some(c) if c.operator == Operator::Equals && c.attribute == self.first.attribute => {
                    if self.branches.iter().any(|(label, _)| label == c.value) {
                        return Err(ParseError::DuplicateCategory {
                            line: c.line.number,
                            attribute: c.attribute.to_string(),
                            value: c.value.to_string(),
                        });
                    }
                    self.current = c;
                    self.at = after;
                    self.body(lines).map(Some)
                }
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    /// Finish the split; `after` must have reached the end of its run.
    fn close(self, lines: &[Line<'_>], after: usize) -> Result<Split, ParseError> {
        let attribute = self.first.attribute;
        if after < self.run.end {
            let extra = lines[after];
            return Err(match Clause::recognize(extra) {
                Some(c) if c.attribute != attribute => ParseError::AttributeMismatch {
                    line: extra.number,
                    expected: attribute.to_string(),
                    found: c.attribute.to_string(),
                },
                _ => ParseError::UnexpectedClause {
                    line: extra.number,
                    text: extra.body.to_string(),
                },
            });
        }
        if self.first.operator == Operator::Equals {
            return Ok(Split::categorical(attribute, self.branches));
        }
        let mut children = self.branches.into_iter().map(|(_, node)| node);
        match (children.next(), children.next()) {
            (Some(below), Some(at_or_above)) => {
                Ok(Split::numeric(attribute, self.threshold, below, at_or_above))
            }
            _ => unreachable!("a numeric split closes only after both branches"),
        }
    }
}

/// Parse `label (covered/misclassified)` out of `text`.
fn leaf_at(text: &str, line: usize) -> Result<Leaf, ParseError> {
    let malformed = |reason| ParseError::MalformedLeaf {
        line,
        text: text.to_string(),
        reason,
    };

    let region = match text.rsplit_once(LEAF_SEPARATOR) {
        Some((_, leaf)) => leaf,
        None => text.trim_start().strip_prefix(':').unwrap_or(text),
    }
    .trim();

    let open = region.rfind('(').ok_or_else(|| malformed("missing '('"))?;
    let weights = region[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| malformed("missing ')'"))?;
    let label = region[..open].trim();
    if label.is_empty() {
        return Err(malformed("missing class label"));
    }
    let (covered, misclassified) = weights
        .split_once('/')
        .ok_or_else(|| malformed("missing '/'"))?;

    Ok(Leaf::new(
        label,
        weight_at(covered, line)?,
        weight_at(misclassified, line)?,
    ))
}

fn weight_at(raw: &str, line: usize) -> Result<f64, ParseError> {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(w) if w.is_finite() => Ok(w),
        _ => Err(ParseError::InvalidWeight {
            line,
            raw: raw.to_string(),
        }),
    }
}
