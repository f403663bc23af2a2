//! Raw query string parsing for captured requests.

/// Parsed query parameters in declaration order.
///
/// Values are kept exactly as sent (no percent-decoding). A key without `=`
/// has no value. A pair with several `=` keeps only the text between the
/// first and second one, so `a=b=c` gives `b`. When a key repeats, lookups
/// see the last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = query
            .unwrap_or("")
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let mut parts = pair.split('=');
                let key = parts.next().unwrap_or_default().to_string();
                (key, parts.next().map(str::to_string))
            })
            .collect();
        QueryParams { pairs }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Value for `key`; `None` when absent, `Some(None)` when present without a value.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
