//! ---
//! irh_section: "05-scenario-harness"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Name and membership assertions over servo groups."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::fmt::Debug;

use irh_client::{ClientError, ServoGroup};

use crate::error::CaseFailure;

/// Owned copy of `items`, sorted.
pub fn sorted<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = items.into_iter().map(Into::into).collect();
    out.sort();
    out
}

pub fn expect_eq<T>(what: &str, actual: T, expected: T) -> Result<(), CaseFailure>
where
    T: PartialEq + Debug,
{
    if actual == expected {
        Ok(())
    } else {
        Err(CaseFailure::assertion(format!(
            "{what}: expected {expected:?}, got {actual:?}"
        )))
    }
}

/// Compare two name collections ignoring order. Duplicates still count.
pub fn expect_same_members<A, E>(what: &str, actual: A, expected: E) -> Result<(), CaseFailure>
where
    A: IntoIterator,
    A::Item: Into<String>,
    E: IntoIterator,
    E::Item: Into<String>,
{
    expect_eq(what, sorted(actual), sorted(expected))
}

/// Names of the servos in `group`, in the order the service reports them.
pub async fn servo_names(group: &ServoGroup) -> Result<Vec<String>, ClientError> {
    let mut names = Vec::new();
    for servo in group.servos().await? {
        names.push(servo.name().await?);
    }
    Ok(names)
}

/// Titles of the parts hosting `group`'s servos.
pub async fn part_titles(group: &ServoGroup) -> Result<Vec<String>, ClientError> {
    let mut titles = Vec::new();
    for part in group.parts().await? {
        titles.push(part.title().await?);
    }
    Ok(titles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_ignores_order() {
        assert!(expect_same_members("servos", ["Rail", "Hinge"], ["Hinge", "Rail"]).is_ok());
    }

    #[test]
    fn membership_respects_duplicates() {
        let err = expect_same_members("servos", ["Hinge", "Hinge"], ["Hinge"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"assertion failed: servos: expected ["Hinge"], got ["Hinge", "Hinge"]"#
        );
    }

    #[test]
    fn names_compare_exactly() {
        assert!(expect_eq("name", "Group1", "Group1").is_ok());
        assert!(expect_eq("name", "group1", "Group1").is_err());
    }
}
