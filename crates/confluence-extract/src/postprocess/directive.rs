//! Post-processing directives as configuration data

use serde::{Deserialize, Serialize};

/// Pipeline stage; all copies run before all removals, removals before adds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Copy,
    Remove,
    Add,
}

/// Where a correction comes from; kept for auditing, never affects behavior
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Citation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confluence_issue_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_bug_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other_urls: Vec<String>,
}

impl Citation {
    pub fn is_empty(&self) -> bool {
        self.confluence_issue_url.is_none()
            && self.browser_bug_url.is_none()
            && self.spec_url.is_none()
            && self.other_urls.is_empty()
    }
}

/// Copy every member of one interface into another
///
/// Without `to_interface` the target is the interface of the prototype the
/// source global inherits from, resolved against the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyDirective {
    pub from_interface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_interface: Option<String>,
    #[serde(default, skip_serializing_if = "Citation::is_empty")]
    pub citation: Citation,
}

/// Delete whole interfaces by exact name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveInterfacesDirective {
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Citation::is_empty")]
    pub citation: Citation,
}

/// Delete the members of `interfaces` whose names match `api_pattern`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveApisDirective {
    pub interfaces: Vec<String>,
    /// Regular expression, unanchored
    pub api_pattern: String,
    #[serde(default, skip_serializing_if = "Citation::is_empty")]
    pub citation: Citation,
}

/// Insert a fixed list of members into an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDirective {
    pub interface: String,
    pub apis: Vec<String>,
    #[serde(default, skip_serializing_if = "Citation::is_empty")]
    pub citation: Citation,
}

/// One corrective transform, tagged by `kind` in JSON
///
/// ```json
/// {"kind": "remove-apis", "interfaces": ["CSSStyleDeclaration"], "apiPattern": "[-]"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Directive {
    Copy(CopyDirective),
    RemoveInterfaces(RemoveInterfacesDirective),
    RemoveApis(RemoveApisDirective),
    Add(AddDirective),
}

impl Directive {
    pub fn copy(from: &str, to: Option<&str>) -> Self {
        Directive::Copy(CopyDirective {
            from_interface: from.to_string(),
            to_interface: to.map(str::to_string),
            citation: Citation::default(),
        })
    }

    pub fn remove_interfaces<I, S>(interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Directive::RemoveInterfaces(RemoveInterfacesDirective {
            interfaces: interfaces.into_iter().map(Into::into).collect(),
            citation: Citation::default(),
        })
    }

    pub fn remove_apis<I, S>(interfaces: I, api_pattern: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Directive::RemoveApis(RemoveApisDirective {
            interfaces: interfaces.into_iter().map(Into::into).collect(),
            api_pattern: api_pattern.to_string(),
            citation: Citation::default(),
        })
    }

    pub fn add<I, S>(interface: &str, apis: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Directive::Add(AddDirective {
            interface: interface.to_string(),
            apis: apis.into_iter().map(Into::into).collect(),
            citation: Citation::default(),
        })
    }

    pub fn stage(&self) -> Stage {
        match self {
            Directive::Copy(_) => Stage::Copy,
            Directive::RemoveInterfaces(_) | Directive::RemoveApis(_) => Stage::Remove,
            Directive::Add(_) => Stage::Add,
        }
    }

    pub fn citation(&self) -> &Citation {
        match self {
            Directive::Copy(d) => &d.citation,
            Directive::RemoveInterfaces(d) => &d.citation,
            Directive::RemoveApis(d) => &d.citation,
            Directive::Add(d) => &d.citation,
        }
    }
}

/// The corrections shipped with the default configuration
///
/// The blacklist (`CSS2Properties`, `window`) removes both copy sources
/// afterwards.
pub fn default_directives() -> Vec<Directive> {
    vec![
        Directive::Copy(CopyDirective {
            from_interface: "CSS2Properties".to_string(),
            to_interface: None,
            citation: Citation {
                confluence_issue_url: Some(
                    "https://github.com/GoogleChrome/confluence/issues/78".to_string(),
                ),
                browser_bug_url: Some(
                    "https://bugzilla.mozilla.org/show_bug.cgi?id=1290786".to_string(),
                ),
                ..Citation::default()
            },
        }),
        Directive::copy("window", None),
        Directive::RemoveApis(RemoveApisDirective {
            interfaces: vec!["CSSStyleDeclaration".to_string()],
            api_pattern: "[-]".to_string(),
            citation: Citation {
                spec_url: Some(
                    "https://drafts.csswg.org/cssom/#dom-cssstyledeclaration-dashed-attribute"
                        .to_string(),
                ),
                other_urls: vec![
                    "https://github.com/GoogleChrome/confluence/issues/174".to_string(),
                    "https://github.com/w3c/csswg-drafts/issues/1089".to_string(),
                ],
                ..Citation::default()
            },
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_json_shape() {
        let json = serde_json::to_value(Directive::remove_apis(["CSSStyleDeclaration"], "[-]"))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "remove-apis",
                "interfaces": ["CSSStyleDeclaration"],
                "apiPattern": "[-]"
            })
        );
    }

    #[test]
    fn test_parse_all_kinds() {
        let directives: Vec<Directive> = serde_json::from_str(
            r#"[
                {"kind": "copy", "fromInterface": "window", "toInterface": "Window"},
                {"kind": "remove-interfaces", "interfaces": ["A"]},
                {"kind": "remove-apis", "interfaces": ["B"], "apiPattern": "^on"},
                {"kind": "add", "interface": "Object", "apis": ["toString"],
                 "citation": {"specUrl": "https://tc39.es/ecma262/"}}
            ]"#,
        )
        .unwrap();

        assert_eq!(directives[0], Directive::copy("window", Some("Window")));
        assert_eq!(directives[1], Directive::remove_interfaces(["A"]));
        let stages: Vec<Stage> = directives.iter().map(Directive::stage).collect();
        assert_eq!(stages, vec![Stage::Copy, Stage::Remove, Stage::Remove, Stage::Add]);
        assert_eq!(
            directives[3].citation().spec_url.as_deref(),
            Some("https://tc39.es/ecma262/")
        );
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: std::result::Result<Directive, _> =
            serde_json::from_str(r#"{"kind": "rename", "interfaces": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_directives_carry_citations() {
        let defaults = default_directives();
        assert_eq!(defaults.len(), 3);
        assert!(!defaults[0].citation().is_empty());
        assert!(defaults[1].citation().is_empty());
        assert_eq!(defaults[2].stage(), Stage::Remove);
    }
}
