use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub key: String,
    pub label: String,
    pub visible: bool,
    pub sortable: bool,
}

/// Column settings of the applications table.
///
/// Built from the first non-empty column list the listing reports and kept
/// from then on, so a refetch never resets what the user toggled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<ColumnConfig>,
    default_visible: Vec<String>,
}

impl ColumnSet {
    pub fn new<I, S>(default_visible: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: Vec::new(),
            default_visible: default_visible.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates the configs for `names` unless they already exist. Returns `true` if it did.
    pub fn initialize(&mut self, names: &[String]) -> bool {
        if !self.columns.is_empty() || names.is_empty() {
            return false;
        }
        self.columns = names
            .iter()
            .map(|name| ColumnConfig {
                key: name.clone(),
                label: name.clone(),
                visible: self.default_visible.contains(name),
                sortable: true,
            })
            .collect();
        log::debug!("Initialized {} table columns", self.columns.len());
        true
    }

    pub fn is_initialized(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Shows a hidden column or hides a shown one. Unknown keys are ignored.
    pub fn toggle_visibility(&mut self, key: &str) -> Option<bool> {
        let column = self.columns.iter_mut().find(|c| c.key == key)?;
        column.visible = !column.visible;
        Some(column.visible)
    }

    pub fn get(&self, key: &str) -> Option<&ColumnConfig> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn all(&self) -> &[ColumnConfig] {
        &self.columns
    }

    pub fn visible(&self) -> impl Iterator<Item = &ColumnConfig> {
        self.columns.iter().filter(|c| c.visible)
    }

    pub fn is_sortable(&self, key: &str) -> bool {
        self.get(key).is_some_and(|c| c.sortable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn initializes_once_with_defaults() {
        let mut set = ColumnSet::new(["Full Name", "Status"]);
        assert!(!set.initialize(&[]));
        assert!(set.initialize(&names(&["Full Name", "City", "Status"])));

        let visible: Vec<_> = set.visible().map(|c| c.key.as_str()).collect();
        assert_eq!(visible, vec!["Full Name", "Status"]);

        set.toggle_visibility("City");
        assert!(!set.initialize(&names(&["Other"])));
        assert_eq!(set.all().len(), 3);
        assert!(set.get("City").unwrap().visible);
    }

    #[test]
    fn toggle_unknown_column_is_ignored() {
        let mut set = ColumnSet::new(["Status"]);
        set.initialize(&names(&["Status"]));
        assert_eq!(set.toggle_visibility("Nope"), None);
        assert_eq!(set.toggle_visibility("Status"), Some(false));
        assert!(set.is_sortable("Status"));
        assert!(!set.is_sortable("Nope"));
    }
}
