//! Insertion-ordered vote accumulation.

use crate::node::Leaf;

/// Accumulated vote weight per class label, in first-encountered order.
///
/// The encounter order is part of the contract: [`VoteTally::winner`] breaks
/// ties in favour of the class that was added first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteTally {
    entries: Vec<(String, f64)>,
}

impl VoteTally {
    /// Create an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally leaves by predicted class, weighted by training coverage.
    #[must_use]
    pub fn from_leaves(leaves: &[&Leaf]) -> Self {
        let mut tally = Self::new();
        for leaf in leaves {
            tally.add(leaf.predicted_class(), leaf.total_weight_covered());
        }
        tally
    }

    /// Tally labels with one unit of weight each.
    #[must_use]
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut tally = Self::new();
        for label in labels {
            tally.add(label.as_ref(), 1.0);
        }
        tally
    }

    /// Add `weight` to `class`, appending it if not yet seen.
    pub fn add(&mut self, class: &str, weight: f64) {
        match self.entries.iter_mut().find(|(c, _)| c == class) {
            Some((_, total)) => *total += weight,
            None => self.entries.push((class.to_string(), weight)),
        }
    }

    /// Return the class with the strictly greatest weight.
    ///
    /// A later class replaces the current best only when its weight is
    /// strictly greater, so the earliest class among equals wins. Returns
    /// `None` only for an empty tally.
    #[must_use]
    pub fn winner(&self) -> Option<&str> {
        let mut entries = self.entries.iter();
        let (mut best, mut best_weight) = entries.next().map(|(c, w)| (c, *w))?;
        for (class, weight) in entries {
            if *weight > best_weight {
                best = class;
                best_weight = *weight;
            }
        }
        Some(best)
    }

    /// Return the accumulated weight for `class`, if it received any vote.
    #[must_use]
    pub fn weight(&self, class: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| c == class)
            .map(|(_, w)| *w)
    }

    /// Iterate `(class, weight)` pairs in first-encountered order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(c, w)| (c.as_str(), *w))
    }

    /// Return the number of distinct classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if no vote has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tally_has_no_winner() {
        assert_eq!(VoteTally::new().winner(), None);
    }

    #[test]
    fn heaviest_class_wins() {
        let mut t = VoteTally::new();
        t.add("stationary", 2.0);
        t.add("car", 1.0);
        t.add("car", 1.5);
        assert_eq!(t.winner(), Some("car"));
        assert_eq!(t.weight("car"), Some(2.5));
    }

    #[test]
    fn tie_goes_to_first_encountered() {
        let mut t = VoteTally::new();
        t.add("bus", 3.0);
        t.add("tram", 3.0);
        assert_eq!(t.winner(), Some("bus"));

        let mut t = VoteTally::new();
        t.add("tram", 3.0);
        t.add("bus", 3.0);
        assert_eq!(t.winner(), Some("tram"));
    }

    #[test]
    fn all_zero_weights_pick_first() {
        let mut t = VoteTally::new();
        t.add("walk", 0.0);
        t.add("bike", 0.0);
        assert_eq!(t.winner(), Some("walk"));
    }

    #[test]
    fn negative_weights_still_compare() {
        let mut t = VoteTally::new();
        t.add("walk", -2.0);
        t.add("bike", -1.0);
        assert_eq!(t.winner(), Some("bike"));
    }

    #[test]
    fn order_is_first_encounter() {
        let t = VoteTally::from_labels(&["car", "bus", "car", "walk"]);
        let classes: Vec<&str> = t.iter().map(|(c, _)| c).collect();
        assert_eq!(classes, vec!["car", "bus", "walk"]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.weight("car"), Some(2.0));
    }

    #[test]
    fn from_leaves_uses_coverage() {
        let a = Leaf::new("train", 71.53, 0.0);
        let b = Leaf::new("bus", 0.11, 0.0);
        let c = Leaf::new("train", 1.23, 0.22);
        let t = VoteTally::from_leaves(&[&a, &b, &c]);
        assert_eq!(t.winner(), Some("train"));
        assert!((t.weight("train").unwrap_or(0.0) - 72.76).abs() < 1e-9);
    }
}
