//! ---
//! irh_section: "06-binaries"
//! irh_subsection: "binary"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Expectation suite subcommand."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use irh_common::HarnessConfig;
use irh_testharness::{ExpectationSet, HarnessFixture};
use tracing::info;

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Expectation file (defaults to scenario.expectations)"
    )]
    expectations: Option<PathBuf>,

    #[arg(long, help = "Print the report as JSON")]
    json: bool,
}

pub async fn run(config: &HarnessConfig, args: CheckArgs) -> Result<()> {
    let path = args
        .expectations
        .or_else(|| config.scenario.expectations.clone())
        .ok_or_else(|| anyhow!("no expectation file given and scenario.expectations is unset"))?;
    let expectations = ExpectationSet::from_path(&path)?;

    let fixture = HarnessFixture::open(&config.endpoint, &config.scenario)
        .await
        .with_context(|| format!("scenario setup against {}", config.endpoint.address))?;
    let report = expectations
        .suite(config.scenario.vessel.clone())
        .run(&fixture)
        .await;
    fixture.teardown();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    info!(
        passed = report.passed(),
        failed = report.failed(),
        aborted = report.aborted(),
        "check complete"
    );
    if !report.all_passed() {
        bail!(
            "{} of {} cases did not pass",
            report.cases.len() - report.passed(),
            report.cases.len()
        );
    }
    Ok(())
}
