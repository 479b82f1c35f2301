use util::HashMap;

/// Parsed key/value configuration used to drive a generator invocation.
///
/// Iteration and serialization preserve the order in which keys first
/// appeared; overwriting a key keeps its original position. Once a task
/// has finished applying overrides, the map is treated as read-only.
#[derive(Debug, Default, Clone)]
pub struct ConfigMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    /// Plain assignment: later values for the same key overwrite earlier ones.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.index.get(key) {
            Some(&i) => value.clone_into(&mut self.entries[i].1),
            None => self.push(key, value.to_owned()),
        }
    }

    /// Additive assignment: matching keys accumulate space-joined values.
    pub fn append(&mut self, key: &str, value: &str) {
        match self.index.get(key) {
            Some(&i) => {
                let existing = &mut self.entries[i].1;
                existing.push(' ');
                existing.push_str(value);
            }
            None => self.push(key, value.to_owned()),
        }
    }

    fn push(&mut self, key: &str, value: String) {
        self.index.insert(key.to_owned(), self.entries.len());
        self.entries.push((key.to_owned(), value));
    }

    /// Entries in the order their keys first appeared.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the map back out in the `KEY = VALUE` form the parser accepts,
    /// one line per key. This is the payload format the generator reads on
    /// its standard input.
    pub fn serialize_into(&self, buf: &mut String) {
        for (k, v) in self.iter() {
            buf.push_str(k);
            buf.push_str(" = ");
            buf.push_str(v);
            buf.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_in_place() {
        let mut map = ConfigMap::new();
        map.set("A", "1");
        map.set("B", "2");
        map.set("A", "3");
        assert_eq!(map.get("A"), Some("3"));
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["A", "B"], "overwrite keeps original position");
    }

    #[test]
    fn append_joins_with_space() {
        let mut map = ConfigMap::new();
        map.set("INPUT", "src");
        map.append("INPUT", "docs");
        assert_eq!(map.get("INPUT"), Some("src docs"));
    }

    #[test]
    fn append_establishes_missing_key() {
        let mut map = ConfigMap::new();
        map.append("EXTRA", "x");
        assert_eq!(map.get("EXTRA"), Some("x"));
    }

    #[test]
    fn serialize_preserves_order() {
        let mut map = ConfigMap::new();
        map.set("B", "2");
        map.set("A", "1");
        let mut buf = String::new();
        map.serialize_into(&mut buf);
        assert_eq!(buf, "B = 2\nA = 1\n");
    }
}
