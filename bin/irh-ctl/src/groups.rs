//! ---
//! irh_section: "06-binaries"
//! irh_subsection: "binary"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Servo group listing subcommand."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use anyhow::{Context, Result};
use irh_client::Servo;
use irh_common::HarnessConfig;
use irh_testharness::HarnessFixture;

pub async fn run(config: &HarnessConfig) -> Result<()> {
    let fixture = HarnessFixture::open(&config.endpoint, &config.scenario)
        .await
        .with_context(|| format!("scenario setup against {}", config.endpoint.address))?;

    print!("{}", list(fixture).await?);
    Ok(())
}

/// Render the listing, then tear the fixture down whether or not it succeeded.
async fn list(fixture: HarnessFixture) -> Result<String> {
    let listing = render(&fixture).await;
    fixture.teardown();
    listing
}

async fn render(fixture: &HarnessFixture) -> Result<String> {
    let vessel = fixture.vessel();
    let mut out = format!("{} ({})\n", vessel.name().await?, vessel.id());
    for group in fixture.infernal_robotics().servo_groups(vessel).await? {
        out.push_str(&format!(
            "  {}  speed={} keys={}/{}\n",
            group.name().await?,
            group.speed().await?,
            group.forward_key().await?,
            group.reverse_key().await?
        ));
        for servo in group.servos().await? {
            out.push_str(&format!("    {}\n", describe(&servo).await?));
        }
    }
    Ok(out)
}

async fn describe(servo: &Servo) -> Result<String> {
    let part = servo.part().await?;
    Ok(format!(
        "{:<16} {:<40} pos={} range=[{}, {}]{}{}",
        servo.name().await?,
        part.title().await?,
        servo.position().await?,
        servo.min_position().await?,
        servo.max_position().await?,
        if servo.is_free_moving().await? { " free" } else { "" },
        if servo.is_locked().await? { " locked" } else { "" },
    ))
}
