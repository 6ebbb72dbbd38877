use application::{LaunchOrchestrator, StartupNotificationBridge};
use domain::ports::ApplicationLauncher;
use domain::system::OperatingSystem;
use parking_lot::Mutex;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

/// Records every argument as a separate event, yielding between arguments so
/// that two unserialised launches would interleave their events.
#[derive(Default)]
struct SlowRecorder {
    events: Mutex<Vec<String>>,
    launches: Mutex<Vec<Vec<String>>>,
}

impl ApplicationLauncher for SlowRecorder {
    fn launch(&self, _identity: &str, args: &[String]) -> anyhow::Result<()> {
        for arg in args {
            self.events.lock().push(arg.clone());
            thread::sleep(Duration::from_millis(2));
        }
        self.launches.lock().push(args.to_vec());
        Ok(())
    }
}

fn bridge(recorder: Arc<SlowRecorder>, os: OperatingSystem) -> Arc<StartupNotificationBridge> {
    let orchestrator = Arc::new(LaunchOrchestrator::new(recorder, Arc::new(os)));
    orchestrator
        .startup(vec!["-verbose".to_string()])
        .unwrap()
}

#[test]
fn test_concurrent_notifications_do_not_interleave() {
    let recorder = Arc::new(SlowRecorder::default());
    let bridge = bridge(recorder.clone(), OperatingSystem::MacOS);

    let barrier = Arc::new(Barrier::new(2));
    let payloads = ["a1 a2 a3 a4", "b1 b2 b3 b4"];
    let handles: Vec<_> = payloads
        .iter()
        .map(|payload| {
            let bridge = bridge.clone();
            let barrier = barrier.clone();
            let payload = payload.to_string();
            thread::spawn(move || {
                barrier.wait();
                bridge.on_notification(&payload).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let events = recorder.events.lock();
    assert_eq!(events.len(), 10);
    for chunk in events.chunks(5) {
        assert_eq!(chunk[0], "-verbose");
        let prefix = &chunk[1][..1];
        assert!(chunk[1..].iter().all(|arg| arg.starts_with(prefix)), "{:?}", events);
    }
}

#[test]
fn test_notifications_through_channel_each_launch_once() {
    let recorder = Arc::new(SlowRecorder::default());
    let bridge = bridge(recorder.clone(), OperatingSystem::MacOS);
    let (sender, handle) = bridge.listen(1).unwrap();

    let senders: Vec<_> = (0..4)
        .map(|i| {
            let sender = sender.clone();
            thread::spawn(move || sender.notify(format!("App{i}.jnlp")).unwrap())
        })
        .collect();
    for s in senders {
        s.join().unwrap();
    }
    drop(sender);
    handle.join().unwrap();

    let launches = recorder.launches.lock();
    assert_eq!(launches.len(), 4);
    assert!(launches.iter().all(|l| l.len() == 2 && l[0] == "-verbose"));
}

#[test]
fn test_non_macos_launches_at_startup_and_per_notification() {
    let recorder = Arc::new(SlowRecorder::default());
    let bridge = bridge(recorder.clone(), OperatingSystem::Linux);

    bridge.on_notification("Other.jnlp").unwrap();

    let launches = recorder.launches.lock();
    assert_eq!(launches.len(), 2);
    assert_eq!(launches[0], vec!["-verbose"]);
    assert_eq!(launches[1], vec!["-verbose", "Other.jnlp"]);
}
