//! Canonical name resolution tables
//!
//! The engine treats app/site naming as pre-resolved lookup input: a mapping
//! from raw app name to canonical name, a mapping from site to canonical name,
//! exclusion sets whose members resolve to themselves, and the set of known
//! local apps (browser processes) used for `Private Links` detection.
//!
//! Mapping conventions carried over from the upstream tables:
//! - App mapping targets carry a `-Local` suffix; excluded apps keep their
//!   original name without it.
//! - Site mappings take precedence over app mappings: a mapped site replaces
//!   the app name before app resolution runs.
//! - Whitespace runs in the resolved name collapse to `_`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Raw mapping tables as loaded from configuration files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogTables {
    /// Raw app name → canonical name (before the `-Local` suffix)
    pub app_mappings: HashMap<String, String>,
    /// Site name → canonical name; entries with an empty site are ignored
    pub site_mappings: HashMap<String, String>,
    /// Apps that resolve to themselves
    pub excluded_apps: HashSet<String>,
    /// Sites that resolve to themselves
    pub excluded_sites: HashSet<String>,
    /// Known local app names (browsers), used for `Private Links` detection
    pub local_apps: HashSet<String>,
}

/// Resolved lookup tables used by the normalizer
#[derive(Debug, Clone, Default)]
pub struct NameCatalog {
    app_map: HashMap<String, String>,
    site_map: HashMap<String, String>,
    local_apps: HashSet<String>,
}

impl NameCatalog {
    /// Build the resolved catalog: suffix app mapping targets with `-Local`,
    /// drop empty site rows, and overlay the exclusion sets as self-mappings.
    pub fn from_tables(tables: CatalogTables) -> Self {
        let mut app_map: HashMap<String, String> = tables
            .app_mappings
            .into_iter()
            .map(|(app, canonical)| (app, format!("{canonical}-Local")))
            .collect();
        for app in tables.excluded_apps {
            app_map.insert(app.clone(), app);
        }

        let mut site_map: HashMap<String, String> = tables
            .site_mappings
            .into_iter()
            .filter(|(site, _)| !site.is_empty())
            .collect();
        for site in tables.excluded_sites {
            site_map.insert(site.clone(), site);
        }

        Self {
            app_map,
            site_map,
            local_apps: tables.local_apps,
        }
    }

    /// Whether `app` is a known local app (browser process)
    pub fn is_local_app(&self, app: &str) -> bool {
        self.local_apps.contains(app)
    }

    /// Whether `site` has a canonical mapping (exclusion self-mappings count)
    pub fn has_site_mapping(&self, site: &str) -> bool {
        self.site_map.contains_key(site)
    }

    /// Resolve an app/site pair to its canonical app name.
    ///
    /// A mapped site replaces the app name first, then the app mapping is
    /// applied to the result. Unmapped names pass through unchanged.
    pub fn resolve(&self, app: &str, site: Option<&str>) -> String {
        let after_site = site
            .and_then(|s| self.site_map.get(s))
            .map(String::as_str)
            .unwrap_or(app);

        let resolved = self
            .app_map
            .get(after_site)
            .map(String::as_str)
            .unwrap_or(after_site);

        collapse_whitespace(resolved)
    }
}

/// Collapse every whitespace run to a single underscore
fn collapse_whitespace(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push('_');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_test_catalog() -> NameCatalog {
        NameCatalog::from_tables(CatalogTables {
            app_mappings: HashMap::from([
                ("chrome.exe".to_string(), "Chrome".to_string()),
                ("EXCEL.EXE".to_string(), "Excel".to_string()),
            ]),
            site_mappings: HashMap::from([
                ("docs.internal.example".to_string(), "Internal Docs".to_string()),
                ("".to_string(), "Ignored".to_string()),
            ]),
            excluded_apps: HashSet::from(["EXCEL.EXE".to_string()]),
            excluded_sites: HashSet::from(["mail.example.com".to_string()]),
            local_apps: HashSet::from(["chrome.exe".to_string()]),
        })
    }

    #[test]
    fn test_app_mapping_gets_local_suffix() {
        let catalog = make_test_catalog();
        assert_eq!(catalog.resolve("chrome.exe", None), "Chrome-Local");
    }

    #[test]
    fn test_excluded_app_maps_to_itself() {
        let catalog = make_test_catalog();
        assert_eq!(catalog.resolve("EXCEL.EXE", None), "EXCEL.EXE");
    }

    #[test]
    fn test_site_mapping_overrides_app() {
        let catalog = make_test_catalog();
        assert_eq!(
            catalog.resolve("chrome.exe", Some("docs.internal.example")),
            "Internal_Docs"
        );
    }

    #[test]
    fn test_excluded_site_maps_to_itself() {
        let catalog = make_test_catalog();
        assert_eq!(
            catalog.resolve("chrome.exe", Some("mail.example.com")),
            "mail.example.com"
        );
    }

    #[test]
    fn test_unmapped_passes_through() {
        let catalog = make_test_catalog();
        assert_eq!(catalog.resolve("notepad.exe", None), "notepad.exe");
        assert_eq!(catalog.resolve("notepad.exe", Some("unknown.site")), "notepad.exe");
    }

    #[test]
    fn test_whitespace_collapses_to_underscore() {
        assert_eq!(collapse_whitespace("Visual  Studio Code"), "Visual_Studio_Code");
        assert_eq!(collapse_whitespace("Slack"), "Slack");
    }

    #[test]
    fn test_has_site_mapping() {
        let catalog = make_test_catalog();
        assert!(catalog.has_site_mapping("docs.internal.example"));
        assert!(catalog.has_site_mapping("mail.example.com"));
        assert!(!catalog.has_site_mapping("unknown.site"));
    }

    #[test]
    fn test_local_app_lookup() {
        let catalog = make_test_catalog();
        assert!(catalog.is_local_app("chrome.exe"));
        assert!(!catalog.is_local_app("notepad.exe"));
    }

    #[test]
    fn test_tables_deserialize_with_defaults() {
        let tables: CatalogTables =
            serde_json::from_str(r#"{"local_apps": ["chrome.exe"]}"#).unwrap();
        assert!(tables.app_mappings.is_empty());
        assert!(tables.local_apps.contains("chrome.exe"));
    }
}
