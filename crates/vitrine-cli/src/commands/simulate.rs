use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::info;

use vitrine_core::ratelimit::FrameLoop;
use vitrine_core::{AppConfig, Profile, RotationState, Rotator};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    Rotation {
        rotator: String,
        index: usize,
        item: Option<String>,
        elapsed_ms: u64,
    },
    Summary {
        changes: usize,
        frames: u64,
        elapsed_ms: u64,
    },
}

pub async fn run(config: Arc<AppConfig>, seconds: u64, json: bool) -> Result<()> {
    let profile = Profile::load_or_sample(&config.profile_path())?;
    simulate(&config, &profile, Duration::from_secs(seconds), |event| {
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            match event {
                SimEvent::Rotation {
                    rotator,
                    index,
                    item,
                    elapsed_ms,
                } => println!(
                    "{:>8.3}s  {:<10} -> {} ({})",
                    elapsed_ms as f64 / 1000.0,
                    rotator,
                    index,
                    item.unwrap_or_default()
                ),
                SimEvent::Summary {
                    changes,
                    frames,
                    elapsed_ms,
                } => println!(
                    "\n{} changes, {} frames in {:.1}s",
                    changes,
                    frames,
                    elapsed_ms as f64 / 1000.0
                ),
            }
        }
        Ok(())
    })
    .await
}

/// Run both carousels and a frame loop for `duration`, reporting each
/// index change and a final summary.
pub async fn simulate(
    config: &AppConfig,
    profile: &Profile,
    duration: Duration,
    mut report: impl FnMut(SimEvent) -> Result<()>,
) -> Result<()> {
    let mut about = Rotator::new(
        "about",
        RotationState::new(profile.about_images.clone(), config.rotation.about_interval())?,
    );
    let mut background = Rotator::new(
        "background",
        RotationState::new(
            profile.background_images.clone(),
            config.rotation.background_interval(),
        )?,
    );
    let mut about_rx = about.subscribe();
    let mut background_rx = background.subscribe();

    let frames = Arc::new(FrameLoop::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let frame_task = tokio::spawn(frames.clone().drive(config.sampler.frame_rate, shutdown_rx));

    let started = Instant::now();
    about.start()?;
    background.start()?;
    info!(seconds = duration.as_secs_f64(), "Simulation started");

    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);
    let mut changes = 0;

    loop {
        let (rotator, index) = tokio::select! {
            _ = &mut deadline => break,
            result = about_rx.changed() => {
                if result.is_err() {
                    break;
                }
                (&about, *about_rx.borrow_and_update())
            }
            result = background_rx.changed() => {
                if result.is_err() {
                    break;
                }
                (&background, *background_rx.borrow_and_update())
            }
        };
        changes += 1;
        report(SimEvent::Rotation {
            rotator: rotator.name().to_string(),
            index,
            item: rotator.with_state(|s| s.items().get(index).cloned()),
            elapsed_ms: started.elapsed().as_millis() as u64,
        })?;
    }

    about.stop();
    background.stop();
    let _ = shutdown_tx.send(true);
    frame_task.await?;

    report(SimEvent::Summary {
        changes,
        frames: frames.frames_run(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_reports_every_change() {
        let config = AppConfig::default();
        let mut events = Vec::new();
        simulate(&config, &Profile::sample(), Duration::from_millis(7000), |event| {
            events.push(event);
            Ok(())
        })
        .await
        .unwrap();

        let rotations: Vec<(String, usize)> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Rotation { rotator, index, .. } => Some((rotator.clone(), *index)),
                _ => None,
            })
            .collect();
        assert_eq!(
            rotations,
            vec![
                ("about".to_string(), 1),
                ("background".to_string(), 1),
                ("about".to_string(), 2),
            ]
        );
        assert!(matches!(
            events.last(),
            Some(SimEvent::Summary { changes: 3, .. })
        ));
    }

    #[test]
    fn test_json_shape() {
        let event = SimEvent::Rotation {
            rotator: "about".to_string(),
            index: 2,
            item: Some("Team offsite".to_string()),
            elapsed_ms: 6000,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "rotation");
        assert_eq!(value["index"], 2);
        assert_eq!(value["item"], "Team offsite");
    }
}
