use confluence::extract::Catalog;

/// Assert an interface holds exactly `expected`, in order
pub fn assert_interface(catalog: &Catalog, interface: &str, expected: &[&str]) {
    let members = catalog
        .get(interface)
        .unwrap_or_else(|| panic!("Expected interface {} in catalog", interface));
    assert_eq!(members, expected, "members of {}", interface);
}

pub fn assert_no_interface(catalog: &Catalog, interface: &str) {
    assert!(
        !catalog.contains_interface(interface),
        "Expected {} to be absent, found {:?}",
        interface,
        catalog.get(interface)
    );
}

/// Assert every member list is sorted, unique and non-empty
pub fn assert_normalized(catalog: &Catalog) {
    for (interface, members) in catalog.iter() {
        assert!(!members.is_empty(), "{} has no members", interface);
        assert!(
            members.windows(2).all(|pair| pair[0] < pair[1]),
            "{} members are not sorted and unique: {:?}",
            interface,
            members
        );
    }
}
