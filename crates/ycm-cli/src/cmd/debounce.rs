use std::time::Duration;

use crate::output::print_json;
use anyhow::Context;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::time::Instant;
use ycm_core::{DeferredAction, Phase, TimerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Reset,
    Cancel,
}

#[derive(Serialize)]
struct Report {
    phase: &'static str,
    delay_ms: u64,
    resets_applied: usize,
    fired_after_ms: Option<u64>,
}

pub fn run(
    delay_ms: u64,
    reset_after_ms: &[u64],
    cancel_after_ms: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let report = rt.block_on(drive(delay_ms, reset_after_ms, cancel_after_ms))?;

    if json {
        print_json(&report)?;
    } else {
        match report.fired_after_ms {
            Some(ms) => println!(
                "{} after {ms}ms ({} resets)",
                report.phase, report.resets_applied
            ),
            None => println!("{} ({} resets)", report.phase, report.resets_applied),
        }
    }
    Ok(())
}

async fn drive(
    delay_ms: u64,
    reset_after_ms: &[u64],
    cancel_after_ms: Option<u64>,
) -> anyhow::Result<Report> {
    let mut steps: Vec<(u64, Step)> = reset_after_ms
        .iter()
        .map(|&ms| (ms, Step::Reset))
        .chain(cancel_after_ms.map(|ms| (ms, Step::Cancel)))
        .collect();
    steps.sort_by_key(|&(ms, _)| ms);

    let started = Instant::now();
    let (fired_tx, fired_rx) = oneshot::channel();
    let timer = DeferredAction::new(Duration::from_millis(delay_ms), move || {
        let _ = fired_tx.send(started.elapsed());
    });
    timer.start()?;

    let mut resets_applied = 0;
    for (offset, step) in steps {
        tokio::time::sleep_until(started + Duration::from_millis(offset)).await;
        match step {
            Step::Reset => match timer.reset(None) {
                Ok(()) => resets_applied += 1,
                Err(TimerError::Finished) => break,
                Err(e) => return Err(e.into()),
            },
            Step::Cancel => {
                timer.cancel();
                break;
            }
        }
    }

    let phase = timer.finished().await;
    let fired_after_ms = match phase {
        Phase::Fired => fired_rx
            .await
            .ok()
            .map(|elapsed| elapsed.as_millis() as u64),
        _ => None,
    };

    Ok(Report {
        phase: phase.as_str(),
        delay_ms,
        resets_applied,
        fired_after_ms,
    })
}
