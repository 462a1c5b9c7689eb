//! The interface -> members catalog

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from interface name to member (API) names
///
/// While extraction and post-processing run, member lists keep insertion
/// order and are deduplicated on insert. [`Catalog::normalize`] produces the
/// final form: sorted unique members, no empty interfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    interfaces: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Members of `interface`, if present
    pub fn get(&self, interface: &str) -> Option<&[String]> {
        self.interfaces.get(interface).map(Vec::as_slice)
    }

    pub fn contains_interface(&self, interface: &str) -> bool {
        self.interfaces.contains_key(interface)
    }

    pub fn contains_api(&self, interface: &str, api: &str) -> bool {
        self.get(interface)
            .map_or(false, |members| members.iter().any(|m| m == api))
    }

    /// Append members not already listed, creating the interface if needed
    ///
    /// Returns the number of members actually added.
    pub fn add_members<I, S>(&mut self, interface: &str, members: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = self.interfaces.entry(interface.to_string()).or_default();
        let before = list.len();
        for member in members {
            let member = member.into();
            if !list.contains(&member) {
                list.push(member);
            }
        }
        list.len() - before
    }

    /// Delete an interface entirely
    pub fn remove_interface(&mut self, interface: &str) -> Option<Vec<String>> {
        self.interfaces.remove(interface)
    }

    /// Keep only the members of `interface` for which `keep` returns true
    ///
    /// Returns the removed member names.
    pub fn retain_apis<F>(&mut self, interface: &str, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let Some(list) = self.interfaces.get_mut(interface) else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        list.retain(|member| {
            let retained = keep(member);
            if !retained {
                removed.push(member.clone());
            }
            retained
        });
        removed
    }

    /// Sort and deduplicate every member list and drop empty interfaces
    pub fn normalize(&mut self) {
        self.interfaces.retain(|_, members| {
            members.sort();
            members.dedup();
            !members.is_empty()
        });
    }

    /// Interface names, ascending
    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.interfaces.keys().map(String::as_str)
    }

    /// `(interface, members)` pairs, ascending by interface
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.interfaces
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    /// Number of interfaces
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Total number of `(interface, member)` pairs
    pub fn api_count(&self) -> usize {
        self.interfaces.values().map(Vec::len).sum()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.interfaces
    }
}

impl<N, I, S> FromIterator<(N, I)> for Catalog
where
    N: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
        let mut catalog = Catalog::new();
        for (interface, members) in iter {
            let interface = interface.into();
            catalog.add_members(&interface, members);
        }
        catalog
    }
}
