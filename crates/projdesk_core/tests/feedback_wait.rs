use projdesk_core::db::open_db_in_memory;
use projdesk_core::{
    wait_until, DeskConfig, PanelPhase, ProjectDesk, ProjectRepository, ProjectSnapshot,
    SqliteProjectRepository, ToastChannel, ToastKind, WaitError,
};
use std::time::{Duration, Instant};
use tokio::sync::watch;

#[tokio::test]
async fn satisfied_condition_returns_immediately() {
    let (_tx, mut rx) = watch::channel(7_u32);
    let value = wait_until(&mut rx, Duration::from_millis(10), |value| *value == 7)
        .await
        .unwrap();
    assert_eq!(value, 7);
}

#[tokio::test]
async fn wait_times_out_with_its_bound() {
    let (_tx, mut rx) = watch::channel(false);
    let bound = Duration::from_millis(30);
    let err = wait_until(&mut rx, bound, |ready| *ready).await.unwrap_err();
    assert_eq!(err, WaitError::TimedOut(bound));
}

#[tokio::test]
async fn dropped_sender_reports_closed() {
    let (tx, mut rx) = watch::channel(0_u8);
    drop(tx);
    let err = wait_until(&mut rx, Duration::from_secs(1), |value| *value > 0)
        .await
        .unwrap_err();
    assert_eq!(err, WaitError::Closed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn toast_text_appears_after_reveal_delay() {
    let mut channel = ToastChannel::new(Duration::from_millis(40), Duration::from_secs(2));
    let mut rx = channel.subscribe();

    let driver = tokio::spawn(async move {
        let start = Instant::now();
        channel.push(ToastKind::Success, "Project created successfully", start);
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            channel.tick(Instant::now());
        }
        channel
    });

    let visible = wait_until(&mut rx, Duration::from_secs(2), |toasts| {
        toasts
            .iter()
            .any(|toast| toast.message == "Project created successfully")
    })
    .await
    .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].kind, ToastKind::Success);

    driver.await.unwrap();
}

#[tokio::test]
async fn panel_phase_is_observable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let id = repo
        .create_project(&ProjectSnapshot::new("Watched", None))
        .unwrap()
        .id;
    let config = DeskConfig::default();
    let bound = config.wait_timeout();
    let mut desk = ProjectDesk::new(repo, config);
    let mut phase = desk.subscribe_panel();

    let ticket = desk.select_row(id, Instant::now()).unwrap();
    assert_eq!(
        wait_until(&mut phase, bound, |p| *p == PanelPhase::Loading)
            .await
            .unwrap(),
        PanelPhase::Loading
    );

    desk.complete_fetch(ticket);
    assert_eq!(
        wait_until(&mut phase, bound, |p| *p == PanelPhase::Ready)
            .await
            .unwrap(),
        PanelPhase::Ready
    );
}
