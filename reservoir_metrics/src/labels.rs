use std::{collections::BTreeMap, fmt::Display};

/// Key/value strings describing a metric.
///
/// Every metric owns its own copy of its labels. Reading them with `labels()`
/// hands out a clone, so nothing a caller does to a `Labels` it holds can reach
/// back into a metric.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Labels {
    labels: BTreeMap<String, String>,
}

impl Labels {
    /// Create a set of labels
    ///
    /// ```
    /// # use reservoir_metrics::Labels;
    /// Labels::new([("host", "a"), ("region", "us-west-2")]);
    /// ```
    pub fn new(labels: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            labels: labels
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Add a key/value to the labels, replacing any previous value for the key.
    /// Can be chained for successive inserts.
    ///
    /// ```
    /// use reservoir_metrics::Labels;
    ///
    /// let mut labels = Labels::default();
    /// labels.insert("a", "label");
    /// labels.insert("another", "label");
    /// ```
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Look up the value of one label
    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Remove a label, returning its value if it was present
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.labels.remove(key)
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when there are no labels
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate the labels in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// A new set holding these labels overlaid with `other`. Keys in `other` win.
    pub fn merged(&self, other: &Labels) -> Labels {
        let mut labels = self.clone();
        labels.merge(other);
        labels
    }

    pub(crate) fn merge(&mut self, other: &Labels) {
        for (key, value) in &other.labels {
            self.labels.insert(key.clone(), value.clone());
        }
    }
}

impl Display for Labels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.labels.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Labels
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Labels
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(labels: [(K, V); N]) -> Self {
        Self::new(labels)
    }
}

impl From<BTreeMap<String, String>> for Labels {
    fn from(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }
}

impl From<Labels> for BTreeMap<String, String> {
    fn from(labels: Labels) -> Self {
        labels.labels
    }
}
