//! ---
//! irh_section: "05-scenario-harness"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Expectation files describing servo-group cases as data."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assertions::{expect_eq, expect_same_members, part_titles, servo_names};
use crate::error::{CaseFailure, HarnessError};
use crate::fixture::HarnessFixture;
use crate::suite::{ScenarioCase, Suite};

/// Expected groupings of one vessel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectationSet {
    #[serde(default)]
    pub groups: Vec<GroupExpectation>,
    #[serde(default)]
    pub servo_lookups: Vec<ServoLookup>,
    /// Group names that must not resolve.
    #[serde(default)]
    pub missing_groups: Vec<String>,
    /// Group names looked up twice; both lookups must agree.
    #[serde(default)]
    pub idempotent_lookups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupExpectation {
    pub name: String,
    pub servos: Vec<String>,
    pub parts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServoLookup {
    pub group: String,
    pub servo: String,
    pub present: bool,
}

impl ExpectationSet {
    pub fn from_path(path: &Path) -> Result<Self, HarnessError> {
        let contents = fs::read_to_string(path).map_err(|source| HarnessError::ExpectationsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let set: Self =
            serde_yaml::from_str(&contents).map_err(|source| HarnessError::ExpectationsParse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), cases = set.case_count(), "loaded expectations");
        Ok(set)
    }

    pub fn case_count(&self) -> usize {
        self.groups.len()
            + self.servo_lookups.len()
            + self.missing_groups.len()
            + self.idempotent_lookups.len()
    }

    /// One case per expectation, groups first.
    pub fn cases(&self) -> Vec<Box<dyn ScenarioCase>> {
        let mut cases: Vec<Box<dyn ScenarioCase>> = Vec::with_capacity(self.case_count());
        for group in &self.groups {
            cases.push(Box::new(GroupMembershipCase::new(group.clone())));
        }
        for lookup in &self.servo_lookups {
            cases.push(Box::new(ServoLookupCase::new(lookup.clone())));
        }
        for name in &self.missing_groups {
            cases.push(Box::new(MissingGroupCase::new(name)));
        }
        for name in &self.idempotent_lookups {
            cases.push(Box::new(IdempotentLookupCase::new(name)));
        }
        cases
    }

    pub fn suite(&self, name: impl Into<String>) -> Suite {
        let mut suite = Suite::new(name);
        suite.extend(self.cases());
        suite
    }
}

async fn required_group(
    fixture: &HarnessFixture,
    name: &str,
) -> Result<irh_client::ServoGroup, CaseFailure> {
    fixture
        .infernal_robotics()
        .servo_group_with_name(fixture.vessel(), name)
        .await?
        .ok_or_else(|| CaseFailure::assertion(format!("group '{name}' not found")))
}

/// Group resolves by name with the expected servo names and part titles.
pub struct GroupMembershipCase {
    label: String,
    expected: GroupExpectation,
}

impl GroupMembershipCase {
    pub fn new(expected: GroupExpectation) -> Self {
        Self {
            label: format!("group {} membership", expected.name),
            expected,
        }
    }
}

#[async_trait]
impl ScenarioCase for GroupMembershipCase {
    fn name(&self) -> &str {
        &self.label
    }

    async fn run(&self, fixture: &HarnessFixture) -> Result<(), CaseFailure> {
        let group = required_group(fixture, &self.expected.name).await?;
        expect_eq("group name", group.name().await?, self.expected.name.clone())?;
        expect_same_members(
            "servo names",
            servo_names(&group).await?,
            self.expected.servos.iter().cloned(),
        )?;
        expect_same_members(
            "part titles",
            part_titles(&group).await?,
            self.expected.parts.iter().cloned(),
        )
    }
}

/// Servo lookup inside a group matches the expected presence.
pub struct ServoLookupCase {
    label: String,
    lookup: ServoLookup,
}

impl ServoLookupCase {
    pub fn new(lookup: ServoLookup) -> Self {
        let verb = if lookup.present { "finds" } else { "misses" };
        Self {
            label: format!("group {} {verb} servo {}", lookup.group, lookup.servo),
            lookup,
        }
    }
}

#[async_trait]
impl ScenarioCase for ServoLookupCase {
    fn name(&self) -> &str {
        &self.label
    }

    async fn run(&self, fixture: &HarnessFixture) -> Result<(), CaseFailure> {
        let group = required_group(fixture, &self.lookup.group).await?;
        match (group.servo_with_name(&self.lookup.servo).await?, self.lookup.present) {
            (Some(servo), true) => {
                expect_eq("servo name", servo.name().await?, self.lookup.servo.clone())
            }
            (None, false) => Ok(()),
            (Some(_), false) => Err(CaseFailure::assertion(format!(
                "servo '{}' unexpectedly found in '{}'",
                self.lookup.servo, self.lookup.group
            ))),
            (None, true) => Err(CaseFailure::assertion(format!(
                "servo '{}' not found in '{}'",
                self.lookup.servo, self.lookup.group
            ))),
        }
    }
}

/// Lookup of an unknown group name yields nothing.
pub struct MissingGroupCase {
    label: String,
    group: String,
}

impl MissingGroupCase {
    pub fn new(group: impl Into<String>) -> Self {
        let group = group.into();
        Self {
            label: format!("group {group} is absent"),
            group,
        }
    }
}

#[async_trait]
impl ScenarioCase for MissingGroupCase {
    fn name(&self) -> &str {
        &self.label
    }

    async fn run(&self, fixture: &HarnessFixture) -> Result<(), CaseFailure> {
        let found = fixture
            .infernal_robotics()
            .servo_group_with_name(fixture.vessel(), &self.group)
            .await?;
        match found {
            None => Ok(()),
            Some(group) => Err(CaseFailure::assertion(format!(
                "group '{}' unexpectedly resolved to {}",
                self.group,
                group.id()
            ))),
        }
    }
}

/// Two lookups of the same name return the same group.
pub struct IdempotentLookupCase {
    label: String,
    group: String,
}

impl IdempotentLookupCase {
    pub fn new(group: impl Into<String>) -> Self {
        let group = group.into();
        Self {
            label: format!("group {group} lookup is repeatable"),
            group,
        }
    }
}

#[async_trait]
impl ScenarioCase for IdempotentLookupCase {
    fn name(&self) -> &str {
        &self.label
    }

    async fn run(&self, fixture: &HarnessFixture) -> Result<(), CaseFailure> {
        let first = required_group(fixture, &self.group).await?;
        let second = required_group(fixture, &self.group).await?;
        expect_eq("group handle", first.id(), second.id())?;
        expect_eq("group name", first.name().await?, second.name().await?)?;
        expect_same_members(
            "servo names",
            servo_names(&first).await?,
            servo_names(&second).await?,
        )?;
        expect_same_members(
            "part titles",
            part_titles(&first).await?,
            part_titles(&second).await?,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use irh_client::Connection;
    use irh_common::ScenarioConfig;
    use irh_rpc::{InProcessTransport, ObjectId, ProcedureCall, ProcedureHandler, RemoteFault, Value};
    use irh_sim::FixtureSimulator;

    use super::*;
    use crate::suite::CaseOutcome;

    const ARM: &str = r#"
name: Arm
parts:
  - { key: base, name: IR.Rotatron.Basic, title: IR Rotatron }
  - { key: elbow, name: IR.Hinge.Basic, title: Powered Hinge }
servos:
  - { name: Shoulder, part: base }
  - { name: Elbow, part: elbow }
groups:
  - { name: Arm, servos: [Shoulder, Elbow] }
"#;

    const EXPECTATIONS: &str = r#"
groups:
  - name: Arm
    servos: [Elbow, Shoulder]
    parts: [IR Rotatron, Powered Hinge]
servo_lookups:
  - { group: Arm, servo: Elbow, present: true }
  - { group: Arm, servo: Foo, present: false }
missing_groups: [Leg]
idempotent_lookups: [Arm]
"#;

    async fn fixture(root: &Path) -> HarnessFixture {
        fs::write(root.join("Arm.craft.yaml"), ARM).expect("write craft");
        let sim = Arc::new(FixtureSimulator::with_root(root));
        let connection =
            Connection::with_transport(Arc::new(InProcessTransport::new(sim)), "expectations");
        let scenario = ScenarioConfig {
            vessel: "Arm".into(),
            ..ScenarioConfig::default()
        };
        HarnessFixture::setup(connection, &scenario)
            .await
            .expect("setup succeeds")
    }

    /// Serves one group whose hosting part changes on every read.
    struct ShiftingParts {
        reads: AtomicU64,
    }

    impl ProcedureHandler for ShiftingParts {
        fn handle(&self, call: &ProcedureCall) -> std::result::Result<Value, RemoteFault> {
            match (call.service.as_str(), call.procedure.as_str()) {
                ("InfernalRobotics", "get_Available") => Ok(true.into()),
                ("SpaceCenter", "get_ActiveVessel") => Ok(Value::object(ObjectId::new(1))),
                ("InfernalRobotics", "ServoGroupWithName") => {
                    Ok(Value::object(ObjectId::new(2)))
                }
                ("InfernalRobotics", "ServoGroup_get_Name") => Ok("Arm".into()),
                ("InfernalRobotics", "ServoGroup_get_Servos") => Ok(Value::List(Vec::new())),
                ("InfernalRobotics", "ServoGroup_get_Parts") => {
                    let read = self.reads.fetch_add(1, Ordering::SeqCst);
                    Ok(Value::objects([ObjectId::new(3 + read % 2)]))
                }
                ("SpaceCenter", "Part_get_Title") => match call.arguments.first() {
                    Some(Value::Object(id)) if id.get() == 3 => Ok("Powered Hinge".into()),
                    _ => Ok("Something Else".into()),
                },
                _ => Ok(Value::Null),
            }
        }
    }

    #[tokio::test]
    async fn repeated_lookup_compares_part_titles() {
        let handler = Arc::new(ShiftingParts {
            reads: AtomicU64::new(0),
        });
        let connection =
            Connection::with_transport(Arc::new(InProcessTransport::new(handler)), "shifting");
        let fixture = HarnessFixture::setup(connection, &ScenarioConfig::default())
            .await
            .expect("setup succeeds");

        let report = ExpectationSet {
            idempotent_lookups: vec!["Arm".into()],
            ..ExpectationSet::default()
        }
        .suite("shifting")
        .run(&fixture)
        .await;
        match report.outcome("group Arm lookup is repeatable") {
            Some(CaseOutcome::Failed(reason)) => {
                assert!(reason.contains("part titles"), "{reason}")
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn parses_all_sections() {
        let set: ExpectationSet = serde_yaml::from_str(EXPECTATIONS).expect("valid yaml");
        assert_eq!(set.case_count(), 5);
        assert_eq!(
            set.suite("arm").case_names(),
            vec![
                "group Arm membership",
                "group Arm finds servo Elbow",
                "group Arm misses servo Foo",
                "group Leg is absent",
                "group Arm lookup is repeatable",
            ]
        );
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let err = serde_yaml::from_str::<ExpectationSet>("vessels: []\n").unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let root = tempfile::tempdir().expect("tempdir");
        let err = ExpectationSet::from_path(&root.path().join("none.yaml")).unwrap_err();
        assert!(matches!(err, HarnessError::ExpectationsIo { .. }));
        assert_eq!(err.stage(), None);
    }

    #[tokio::test]
    async fn matching_expectations_pass() {
        let root = tempfile::tempdir().expect("tempdir");
        let path = root.path().join("arm.yaml");
        fs::write(&path, EXPECTATIONS).expect("write expectations");
        let fixture = fixture(root.path()).await;

        let report = ExpectationSet::from_path(&path)
            .expect("expectations load")
            .suite("arm")
            .run(&fixture)
            .await;
        assert!(report.all_passed(), "{report}");
    }

    #[tokio::test]
    async fn wrong_membership_fails_only_that_case() {
        let root = tempfile::tempdir().expect("tempdir");
        let fixture = fixture(root.path()).await;
        let set = ExpectationSet {
            groups: vec![GroupExpectation {
                name: "Arm".into(),
                servos: vec!["Elbow".into()],
                parts: vec![],
            }],
            missing_groups: vec!["Leg".into()],
            ..ExpectationSet::default()
        };

        let report = set.suite("arm").run(&fixture).await;
        match report.outcome("group Arm membership") {
            Some(CaseOutcome::Failed(reason)) => assert!(reason.contains("servo names")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(report.outcome("group Leg is absent"), Some(&CaseOutcome::Passed));
    }
}
