//! Element attribute storage
//!
//! Every attribute except `class` lives here, in the order it was first set.
//! Names compare ASCII case-insensitively and are stored lowercased.

#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    entries: Vec<(String, String)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index_of(name).map(|i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Set a value in place; returns the previous one
    pub fn set(&mut self, name: &str, value: &str) -> Option<String> {
        match self.index_of(name) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value.to_string())),
            None => {
                self.entries.push((name.to_ascii_lowercase(), value.to_string()));
                None
            }
        }
    }

    /// Returns the removed value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let i = self.index_of(name)?;
        Some(self.entries.remove(i).1)
    }

    /// Boolean attribute: present (empty value) when `on`, absent otherwise
    pub fn set_flag(&mut self, name: &str, on: bool) {
        match (on, self.contains(name)) {
            (true, false) => {
                self.set(name, "");
            }
            (false, true) => {
                self.remove(name);
            }
            _ => {}
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}
