use std::collections::HashMap;
use std::fmt;

/// A single present feature value.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// A numeric measurement, compared against numeric split thresholds.
    Numeric(f64),
    /// A category label, matched exactly against categorical split labels.
    Category(String),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Numeric(v) => write!(f, "{v}"),
            FeatureValue::Category(c) => f.write_str(c),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Numeric(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Category(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Category(value)
    }
}

/// Attribute name to optional value.
///
/// Absence is explicit: an attribute that was never set and one set via
/// [`FeatureVector::with_missing`] both read back as `None`, never as zero or
/// an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    values: HashMap<String, Option<FeatureValue>>,
}

impl FeatureVector {
    /// Create an empty feature vector (every attribute absent).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a numeric attribute.
    #[must_use]
    pub fn with_numeric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, Some(FeatureValue::Numeric(value)));
        self
    }

    /// Set a categorical attribute.
    #[must_use]
    pub fn with_category(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, Some(FeatureValue::Category(value.into())));
        self
    }

    /// Mark an attribute as explicitly absent.
    #[must_use]
    pub fn with_missing(mut self, name: impl Into<String>) -> Self {
        self.insert(name, None);
        self
    }

    /// Set or clear an attribute, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<FeatureValue>) {
        self.values.insert(name.into(), value);
    }

    /// Return the present value of `name`, or `None` when it is absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Return the number of attributes with a present value.
    #[must_use]
    pub fn n_present(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for FeatureVector
where
    K: Into<String>,
    V: Into<FeatureValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.map(Into::into)))
            .collect();
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_attribute_is_absent() {
        let fv = FeatureVector::new().with_numeric("a", 0.5);
        assert!(fv.get("b").is_none());
    }

    #[test]
    fn explicit_missing_is_absent() {
        let fv = FeatureVector::new().with_numeric("a", 0.5).with_missing("a");
        assert!(fv.get("a").is_none());
        assert_eq!(fv.n_present(), 0);
    }

    #[test]
    fn zero_is_present() {
        let fv = FeatureVector::new().with_numeric("a", 0.0).with_category("p", "");
        assert_eq!(fv.get("a"), Some(&FeatureValue::Numeric(0.0)));
        assert_eq!(fv.get("p"), Some(&FeatureValue::Category(String::new())));
        assert_eq!(fv.n_present(), 2);
    }

    #[test]
    fn collect_from_pairs() {
        let fv: FeatureVector = vec![("a", Some(1.5)), ("b", None)].into_iter().collect();
        assert_eq!(fv.get("a"), Some(&FeatureValue::Numeric(1.5)));
        assert!(fv.get("b").is_none());
    }

    #[test]
    fn value_display() {
        assert_eq!(FeatureValue::Numeric(0.25).to_string(), "0.25");
        assert_eq!(FeatureValue::from("tram").to_string(), "tram");
    }
}
