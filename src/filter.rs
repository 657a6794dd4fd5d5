use serde::{Deserialize, Serialize};

/// Name-based include/exclude policy, applied to dotted class names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default = "default_include_inner_classes")]
    pub include_inner_classes: bool,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

fn default_include_inner_classes() -> bool {
    true
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            include_inner_classes: true,
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }
}

impl Filter {
    pub fn new(include_inner_classes: bool, includes: Vec<String>, excludes: Vec<String>) -> Self {
        Self {
            include_inner_classes,
            includes,
            excludes,
        }
    }

    pub fn accept(&self, class_name: &str) -> bool {
        self.accept_prefixes(class_name) && self.accept_inner_class(class_name)
    }

    /// Applied to file and archive-entry names before a decode is attempted.
    pub fn accept_inner_class(&self, name: &str) -> bool {
        self.include_inner_classes || !is_inner_class(name)
    }

    fn accept_prefixes(&self, class_name: &str) -> bool {
        let included =
            self.includes.is_empty() || self.includes.iter().any(|p| class_name.starts_with(p));
        included && !self.excludes.iter().any(|p| class_name.starts_with(p))
    }
}

fn is_inner_class(name: &str) -> bool {
    name.find('$').is_some_and(|pos| pos > 0)
}
