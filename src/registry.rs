//! Registry construction: derives one case identifier per discovered type.

use std::collections::HashMap;

use crate::error::Error;
use crate::types::{ConformanceMatch, Registry, RegistryEntry};

/// Static member synthesized by `CaseIterable` on the generated enum.
const CASE_ITERABLE_MEMBER: &str = "allCases";

/// Lower-case the first character of a type name, keeping the rest verbatim.
///
/// `LoginFlow` becomes `loginFlow`, `A` becomes `a`, `URLCache` becomes `uRLCache`.
pub fn case_identifier(type_name: &str) -> String {
    let mut chars = type_name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut out = String::with_capacity(type_name.len());
    out.extend(first.to_lowercase());
    out.push_str(chars.as_str());
    return out;
}

/// Build the ordered registry from scanner matches.
///
/// Input order is kept. A type name repeated verbatim keeps its first
/// occurrence; two different names deriving the same case identifier are an error.
/// A case may not shadow `accessor` or `allCases`, which the enum also declares.
///
/// # Errors
///
/// Returns `Error::ReservedCaseIdentifier` when a case equals a generated member,
/// and `Error::DuplicateCaseIdentifier` on the first collision.
pub fn build(
    matches: &[ConformanceMatch],
    enum_name: &str,
    protocol: &str,
    accessor: &str,
) -> Result<Registry, Error> {
    let mut claimed: HashMap<String, &str> = HashMap::new();
    let mut entries = Vec::with_capacity(matches.len());

    for found in matches {
        let case = case_identifier(&found.type_name);
        if case == accessor || case == CASE_ITERABLE_MEMBER {
            return Err(Error::ReservedCaseIdentifier {
                case_identifier: case,
                type_name: found.type_name.clone(),
            });
        }

        if let Some(&first) = claimed.get(&case) {
            if first == found.type_name {
                continue;
            }
            return Err(Error::DuplicateCaseIdentifier {
                case_identifier: case,
                first: first.to_string(),
                second: found.type_name.clone(),
            });
        }

        claimed.insert(case.clone(), &found.type_name);
        entries.push(RegistryEntry {
            case_identifier: case,
            file: found.file.clone(),
            type_name: found.type_name.clone(),
        });
    }

    return Ok(Registry {
        enum_name: enum_name.to_string(),
        entries,
        protocol: protocol.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn found(names: &[&str]) -> Vec<ConformanceMatch> {
        return names
            .iter()
            .map(|n| ConformanceMatch {
                file: PathBuf::from(format!("{n}.swift")),
                type_name: (*n).to_string(),
            })
            .collect();
    }

    fn build_default(names: &[&str]) -> Result<Registry, Error> {
        return build(&found(names), "DebugTestGroup", "DebuggableTestGroup", "rawValue");
    }

    #[test]
    fn lowercases_only_the_first_character() {
        assert_eq!(case_identifier("LoginFlow"), "loginFlow");
        assert_eq!(case_identifier("A"), "a");
        assert_eq!(case_identifier("URLCache"), "uRLCache");
        assert_eq!(case_identifier("already"), "already");
        assert_eq!(case_identifier("Ärger"), "ärger");
        assert_eq!(case_identifier(""), "");
    }

    #[test]
    fn preserves_input_order() {
        let registry = build_default(&["Signup", "Login", "Checkout"]).unwrap();
        let cases: Vec<&str> = registry.cases().collect();
        assert_eq!(cases, vec!["signup", "login", "checkout"]);
        let types: Vec<&str> = registry.entries.iter().map(|e| e.type_name.as_str()).collect();
        assert_eq!(types, vec!["Signup", "Login", "Checkout"]);
    }

    #[test]
    fn colliding_names_fail() {
        let err = build_default(&["Foo", "foo"]).unwrap_err();
        match err {
            Error::DuplicateCaseIdentifier { case_identifier, first, second } => {
                assert_eq!(case_identifier, "foo");
                assert_eq!(first, "Foo");
                assert_eq!(second, "foo");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn repeated_identical_name_collapses() {
        let registry = build_default(&["Alpha", "Beta", "Alpha"]).unwrap();
        let cases: Vec<&str> = registry.cases().collect();
        assert_eq!(cases, vec!["alpha", "beta"]);
    }

    #[test]
    fn every_case_is_unique() {
        let registry = build_default(&["Login", "Signup", "LoginFlow", "A"]).unwrap();
        let mut cases: Vec<&str> = registry.cases().collect();
        let total = cases.len();
        cases.sort_unstable();
        cases.dedup();
        assert_eq!(cases.len(), total);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn empty_match_list_builds_empty_registry() {
        let registry = build_default(&[]).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.enum_name, "DebugTestGroup");
        assert_eq!(registry.protocol, "DebuggableTestGroup");
    }

    #[test]
    fn case_matching_the_accessor_is_rejected() {
        let err = build_default(&["Login", "RawValue"]).unwrap_err();
        match err {
            Error::ReservedCaseIdentifier { case_identifier, type_name } => {
                assert_eq!(case_identifier, "rawValue");
                assert_eq!(type_name, "RawValue");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn case_matching_all_cases_is_rejected() {
        let err = build_default(&["AllCases"]).unwrap_err();
        assert!(matches!(err, Error::ReservedCaseIdentifier { ref case_identifier, .. } if case_identifier == "allCases"));
    }

    #[test]
    fn reserved_name_follows_configured_accessor() {
        let registry = build(&found(&["RawValue"]), "DebugTestGroup", "DebuggableTestGroup", "groupType").unwrap();
        let cases: Vec<&str> = registry.cases().collect();
        assert_eq!(cases, vec!["rawValue"]);

        let err = build(&found(&["GroupType"]), "DebugTestGroup", "DebuggableTestGroup", "groupType").unwrap_err();
        assert!(matches!(err, Error::ReservedCaseIdentifier { .. }));
    }
}
