/// Parameter bindings captured during a single `getValue` lookup.
///
/// An ordered sequence rather than a map: names are unique within one
/// registered pattern, so linear scan over the small, lookup-local
/// vector is cheaper than hashing for the handful of dynamic segments
/// a typical route has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(Box<str>, Box<str>)>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn with_capacity(cap: usize) -> Self {
        Self(Vec::with_capacity(cap))
    }

    pub(crate) fn push(&mut self, name: &str, value: &str) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| &**k == name).map(|(_, v)| &**v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Box<str>, Box<str>)> {
        self.0.iter()
    }

    /// Merge an outer request-context binding into this freshly captured
    /// one. Only names absent from `self` are pulled in from `outer` —
    /// a fresh capture always wins over stale context from an enclosing
    /// router. Not claimed to be the right policy for every nested-router
    /// shape, just the one implemented here (see DESIGN.md).
    pub fn merge_outer(&mut self, outer: &Params) {
        for (k, v) in &outer.0 {
            if self.get(k).is_none() {
                self.0.push((k.clone(), v.clone()));
            }
        }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a (Box<str>, Box<str>);
    type IntoIter = std::slice::Iter<'a, (Box<str>, Box<str>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_captured_value() {
        let mut p = Params::new();
        p.push("id", "42");
        assert_eq!(p.get("id"), Some("42"));
        assert_eq!(p.get("missing"), None);
    }

    #[test]
    fn merge_prefers_fresh_names() {
        let mut outer = Params::new();
        outer.push("id", "outer-id");
        outer.push("tenant", "acme");

        let mut fresh = Params::new();
        fresh.push("id", "fresh-id");
        fresh.merge_outer(&outer);

        assert_eq!(fresh.get("id"), Some("fresh-id"));
        assert_eq!(fresh.get("tenant"), Some("acme"));
    }

    #[test]
    fn empty_params_has_no_entries() {
        let p = Params::new();
        assert!(p.is_empty());
        assert_eq!(p.len(), 0);
    }
}
