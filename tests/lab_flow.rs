//! End-to-end runs of the simulator through the public API

use cyberlab::lab::{self, FixedLatency, LabEvent, DEFAULT_PROMPT};
use cyberlab::{LabError, LabStatus};
use std::time::Duration;
use tokio::time;

fn reference() -> FixedLatency {
    FixedLatency::new(Duration::from_millis(3000), Duration::from_millis(800))
}

#[tokio::test(start_paused = true)]
async fn injection_lab_end_to_end() {
    let (handle, mut events) = lab::spawn("injection", DEFAULT_PROMPT, reference());
    time::sleep(Duration::from_millis(3001)).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.status, LabStatus::Running);
    let ids: Vec<&str> = snapshot.objectives.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["obj1", "obj2", "obj3", "obj4"]);

    for cmd in ["nmap", "sqlmap", "sqlmap", "SQLMap --DBS", "sqlmap --dump"] {
        handle.execute(cmd).await.unwrap();
    }
    time::sleep(Duration::from_millis(801)).await;

    assert!(handle.all_objectives_complete());
    handle.finish().await.unwrap();
    assert_eq!(handle.status(), LabStatus::Completed);
    assert_eq!(
        handle.execute("whoami").await,
        Err(LabError::NotRunning(LabStatus::Completed))
    );

    let mut completed = Vec::new();
    let mut saw_all = false;
    while let Ok(event) = events.try_recv() {
        match event {
            LabEvent::ObjectiveCompleted { id, .. } => completed.push(id),
            LabEvent::AllObjectivesComplete => saw_all = true,
            _ => {}
        }
    }
    assert_eq!(completed, ["obj1", "obj2", "obj3", "obj4"]);
    assert!(saw_all);
}

#[tokio::test(start_paused = true)]
async fn unmatched_commands_never_touch_objectives() {
    let (handle, _events) = lab::spawn("recon", DEFAULT_PROMPT, reference());
    time::sleep(Duration::from_millis(3001)).await;
    let before = handle.snapshot();

    for cmd in ["hydra", "msfconsole", "nmap -sV", "exit"] {
        handle.execute(cmd).await.unwrap();
    }
    time::sleep(Duration::from_millis(801)).await;

    let after = handle.snapshot();
    assert_eq!(after.objectives, before.objectives);
    let not_found = after
        .transcript
        .iter()
        .filter(|l| l.contains("command not found"))
        .count();
    assert_eq!(not_found, 4);
}

#[tokio::test(start_paused = true)]
async fn clones_keep_the_engine_alive() {
    let (handle, _events) = lab::spawn("injection", DEFAULT_PROMPT, reference());
    time::sleep(Duration::from_millis(10)).await;

    let observer = handle.clone();
    drop(handle);
    assert_eq!(observer.status(), LabStatus::Starting);
    assert!(observer.execute("clear").await.is_ok());
}
