//! Class tokens backing the `class` attribute

/// Ordered set of class names
///
/// Parsing splits on ASCII whitespace and keeps the first occurrence of each
/// name, so `value()` is always the normalized attribute text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTokens(Vec<String>);

impl ClassTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(value: &str) -> Self {
        let mut tokens = Self::new();
        for token in value.split_ascii_whitespace() {
            tokens.insert(token);
        }
        tokens
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    /// Returns `false` for empty or already present tokens
    pub fn insert(&mut self, token: &str) -> bool {
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.0.push(token.to_string());
        true
    }

    pub fn add(&mut self, tokens: &[&str]) {
        for token in tokens {
            self.insert(token);
        }
    }

    pub fn remove(&mut self, tokens: &[&str]) {
        self.0.retain(|t| !tokens.contains(&t.as_str()));
    }

    /// Flip `token`, or force it on/off; returns whether it is present
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> bool {
        let on = force.unwrap_or_else(|| !self.contains(token));
        if on {
            self.insert(token);
        } else {
            self.remove(&[token]);
        }
        on
    }

    /// Swap `old` for `new` at the same position
    ///
    /// When `new` is already present, `old` is just dropped.
    pub fn replace(&mut self, old: &str, new: &str) -> bool {
        let Some(at) = self.0.iter().position(|t| t == old) else {
            return false;
        };
        if self.contains(new) {
            self.0.remove(at);
        } else {
            self.0[at] = new.to_string();
        }
        true
    }

    pub fn value(&self) -> String {
        self.0.join(" ")
    }

    pub fn assign(&mut self, value: &str) {
        *self = Self::parse(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl std::fmt::Display for ClassTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value())
    }
}
