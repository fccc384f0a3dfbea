// Board domain model

/// A sensing device and the history root it writes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    pub id: String,
    pub root: String,
}

impl Board {
    pub fn new(id: impl Into<String>, history_suffix: &str) -> Self {
        let id = id.into();
        let root = if history_suffix.is_empty() {
            id.clone()
        } else {
            format!("{}/{}", id, history_suffix)
        };
        Self { id, root }
    }

    /// Ids are restricted to ASCII letters, digits, `_` and `-`.
    pub fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}
