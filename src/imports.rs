//! Import declaration accumulation, deduplication, and rendering (C3).

use std::collections::BTreeMap;

/// One import binding. Equality is the full 4-tuple, matching the contract
/// in the data model: two entries differing only in `alias` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Import {
    pub from: String,
    pub name: String,
    pub is_type: bool,
    pub alias: Option<String>,
}

impl Import {
    pub fn value(from: impl Into<String>, name: impl Into<String>) -> Self {
        Self { from: from.into(), name: name.into(), is_type: false, alias: None }
    }

    pub fn type_import(from: impl Into<String>, name: impl Into<String>) -> Self {
        Self { from: from.into(), name: name.into(), is_type: true, alias: None }
    }

    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    fn render_binding(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {}", self.name, alias),
            None => self.name.clone(),
        }
    }
}

/// An accumulating, order-insensitive set of imports. Construction order
/// never affects `render`'s output; only `merge`'s dedup + sort do.
#[derive(Debug, Default, Clone)]
pub struct ImportSet {
    entries: Vec<Import>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, import: Import) {
        self.entries.push(import);
    }

    pub fn extend(&mut self, imports: impl IntoIterator<Item = Import>) {
        self.entries.extend(imports);
    }

    /// Deduplicates on the full 4-tuple, then sorts by `from` (lexicographic)
    /// then by `name`. Idempotent: `merge(merge(x).entries) == merge(x)`.
    pub fn merge(&self) -> Vec<Import> {
        let mut seen: Vec<Import> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(entry) {
                seen.push(entry.clone());
            }
        }
        seen.sort_by(|a, b| a.from.cmp(&b.from).then_with(|| a.name.cmp(&b.name)));
        seen
    }

    /// Groups the merged entries by source module and renders one `import
    /// type` line (if any type-only entries exist) followed by one `import`
    /// line (if any value entries exist) per module, in module order. Empty
    /// input renders to the empty string.
    pub fn render(&self) -> String {
        let merged = self.merge();
        if merged.is_empty() {
            return String::new();
        }

        let mut by_module: BTreeMap<&str, (Vec<&Import>, Vec<&Import>)> = BTreeMap::new();
        for entry in &merged {
            let bucket = by_module.entry(entry.from.as_str()).or_default();
            if entry.is_type {
                bucket.0.push(entry);
            } else {
                bucket.1.push(entry);
            }
        }

        let mut lines = Vec::new();
        for (module, (types, values)) in by_module {
            if !types.is_empty() {
                let names: Vec<String> = types.iter().map(|i| i.render_binding()).collect();
                lines.push(format!("import type {{ {} }} from '{}';", names.join(", "), module));
            }
            if !values.is_empty() {
                let names: Vec<String> = values.iter().map(|i| i.render_binding()).collect();
                lines.push(format!("import {{ {} }} from '{}';", names.join(", "), module));
            }
        }
        lines.join("\n")
    }
}
