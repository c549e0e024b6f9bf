//! ---
//! irh_section: "05-scenario-harness"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Sequential case runner and suite report."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
//! Cases run one after another against a single [`HarnessFixture`].
//!
//! A failing case does not stop its siblings. Losing the service does: the
//! case that observed it and every case after it are reported as aborted.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::CaseFailure;
use crate::fixture::HarnessFixture;

/// One named check against a prepared fixture.
#[async_trait]
pub trait ScenarioCase: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, fixture: &HarnessFixture) -> Result<(), CaseFailure>;
}

type CaseFn =
    dyn for<'a> Fn(&'a HarnessFixture) -> BoxFuture<'a, Result<(), CaseFailure>> + Send + Sync;

/// A case backed by a closure returning a boxed future.
pub struct FnCase {
    name: String,
    body: Box<CaseFn>,
}

impl FnCase {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: for<'a> Fn(&'a HarnessFixture) -> BoxFuture<'a, Result<(), CaseFailure>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }
}

#[async_trait]
impl ScenarioCase for FnCase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, fixture: &HarnessFixture) -> Result<(), CaseFailure> {
        (self.body)(fixture).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    Failed(String),
    Aborted(String),
}

impl CaseOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CaseOutcome::Passed => "passed",
            CaseOutcome::Failed(_) => "failed",
            CaseOutcome::Aborted(_) => "aborted",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub outcome: CaseOutcome,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.cases
            .iter()
            .all(|case| case.outcome == CaseOutcome::Passed)
    }

    fn count(&self, label: &str) -> usize {
        self.cases
            .iter()
            .filter(|case| case.outcome.label() == label)
            .count()
    }

    pub fn passed(&self) -> usize {
        self.count("passed")
    }

    pub fn failed(&self) -> usize {
        self.count("failed")
    }

    pub fn aborted(&self) -> usize {
        self.count("aborted")
    }

    pub fn outcome(&self, case: &str) -> Option<&CaseOutcome> {
        self.cases
            .iter()
            .find(|report| report.name == case)
            .map(|report| &report.outcome)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for case in &self.cases {
            match &case.outcome {
                CaseOutcome::Passed => writeln!(f, "[passed]  {}", case.name)?,
                CaseOutcome::Failed(reason) => {
                    writeln!(f, "[failed]  {}: {reason}", case.name)?
                }
                CaseOutcome::Aborted(reason) => {
                    writeln!(f, "[aborted] {}: {reason}", case.name)?
                }
            }
        }
        write!(
            f,
            "{}: {} passed, {} failed, {} aborted",
            self.suite,
            self.passed(),
            self.failed(),
            self.aborted()
        )
    }
}

/// An ordered list of cases.
pub struct Suite {
    name: String,
    cases: Vec<Box<dyn ScenarioCase>>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push(&mut self, case: impl ScenarioCase + 'static) {
        self.cases.push(Box::new(case));
    }

    pub fn with_case(mut self, case: impl ScenarioCase + 'static) -> Self {
        self.push(case);
        self
    }

    pub fn extend(&mut self, cases: impl IntoIterator<Item = Box<dyn ScenarioCase>>) {
        self.cases.extend(cases);
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn case_names(&self) -> Vec<&str> {
        self.cases.iter().map(|case| case.name()).collect()
    }

    pub async fn run(&self, fixture: &HarnessFixture) -> SuiteReport {
        info!(suite = %self.name, cases = self.cases.len(), "running suite");
        let mut reports = Vec::with_capacity(self.cases.len());
        let mut abort_reason: Option<String> = None;

        for case in &self.cases {
            if let Some(reason) = &abort_reason {
                reports.push(CaseReport {
                    name: case.name().to_owned(),
                    outcome: CaseOutcome::Aborted(format!("not run: {reason}")),
                    elapsed: Duration::ZERO,
                });
                continue;
            }

            let started = Instant::now();
            let outcome = match case.run(fixture).await {
                Ok(()) => {
                    info!(case = case.name(), "case passed");
                    CaseOutcome::Passed
                }
                Err(failure) if failure.is_unreachable() => {
                    error!(case = case.name(), error = %failure, "service unreachable, aborting suite");
                    let reason = failure.to_string();
                    abort_reason = Some(reason.clone());
                    CaseOutcome::Aborted(reason)
                }
                Err(failure) => {
                    warn!(case = case.name(), error = %failure, "case failed");
                    CaseOutcome::Failed(failure.to_string())
                }
            };
            reports.push(CaseReport {
                name: case.name().to_owned(),
                outcome,
                elapsed: started.elapsed(),
            });
        }

        let report = SuiteReport {
            suite: self.name.clone(),
            cases: reports,
        };
        info!(
            suite = %self.name,
            passed = report.passed(),
            failed = report.failed(),
            aborted = report.aborted(),
            "suite finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use futures::FutureExt;
    use irh_client::Connection;
    use irh_common::ScenarioConfig;
    use irh_rpc::InProcessTransport;
    use irh_sim::FixtureSimulator;

    use super::*;

    const PROBE: &str = r#"
name: Probe
parts: [{ key: hinge, name: IR.Hinge.Basic, title: Powered Hinge }]
servos: [{ name: Hinge, part: hinge }]
groups: [{ name: Arm, servos: [Hinge] }]
"#;

    async fn fixture(root: &std::path::Path) -> HarnessFixture {
        fs::write(root.join("Probe.craft.yaml"), PROBE).expect("write craft");
        let sim = Arc::new(FixtureSimulator::with_root(root));
        let connection =
            Connection::with_transport(Arc::new(InProcessTransport::new(sim)), "suite-test");
        let scenario = ScenarioConfig {
            vessel: "Probe".into(),
            ..ScenarioConfig::default()
        };
        HarnessFixture::setup(connection, &scenario)
            .await
            .expect("setup succeeds")
    }

    fn passing(name: &str) -> FnCase {
        FnCase::new(name, |_| async { Ok(()) }.boxed())
    }

    #[test]
    fn outcomes_serialize_with_reason() {
        let report = SuiteReport {
            suite: "json".into(),
            cases: vec![CaseReport {
                name: "broken".into(),
                outcome: CaseOutcome::Failed("nope".into()),
                elapsed: Duration::ZERO,
            }],
        };
        let json = serde_json::to_value(&report).expect("serializes");
        assert_eq!(json["cases"][0]["outcome"]["outcome"], "failed");
        assert_eq!(json["cases"][0]["outcome"]["reason"], "nope");
        assert_eq!(
            serde_json::to_value(CaseOutcome::Passed).expect("serializes")["outcome"],
            "passed"
        );
    }

    #[tokio::test]
    async fn failures_do_not_stop_siblings() {
        let root = tempfile::tempdir().expect("tempdir");
        let fixture = fixture(root.path()).await;
        let suite = Suite::new("siblings")
            .with_case(passing("first"))
            .with_case(FnCase::new("broken", |_| {
                async { Err(CaseFailure::assertion("nope")) }.boxed()
            }))
            .with_case(passing("last"));

        let report = suite.run(&fixture).await;
        assert!(!report.all_passed());
        assert_eq!(report.outcome("first"), Some(&CaseOutcome::Passed));
        assert_eq!(
            report.outcome("broken"),
            Some(&CaseOutcome::Failed("assertion failed: nope".into()))
        );
        assert_eq!(report.outcome("last"), Some(&CaseOutcome::Passed));
        assert_eq!((report.passed(), report.failed(), report.aborted()), (2, 1, 0));
    }

    #[tokio::test]
    async fn lost_service_aborts_remaining_cases() {
        let root = tempfile::tempdir().expect("tempdir");
        let fixture = fixture(root.path()).await;
        let suite = Suite::new("outage")
            .with_case(passing("before"))
            .with_case(FnCase::new("disconnect", |fixture| {
                async move {
                    fixture.connection().close();
                    fixture.vessel().name().await?;
                    Ok::<(), CaseFailure>(())
                }
                .boxed()
            }))
            .with_case(passing("after"));

        let report = suite.run(&fixture).await;
        assert_eq!(report.outcome("before"), Some(&CaseOutcome::Passed));
        assert!(matches!(report.outcome("disconnect"), Some(CaseOutcome::Aborted(_))));
        match report.outcome("after") {
            Some(CaseOutcome::Aborted(reason)) => assert!(reason.starts_with("not run: ")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(report.aborted(), 2);
        assert!(report.to_string().ends_with("outage: 1 passed, 0 failed, 2 aborted"));
    }
}
