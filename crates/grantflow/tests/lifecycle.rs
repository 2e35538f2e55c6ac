mod common;

use std::sync::Arc;

use common::{drain, env, orchestrator, orchestrator_with, Recorder, APP_NAME, PACKAGE};
use grantflow::capability::manifest;
use grantflow::event::{AbandonReason, GrantEvent};
use grantflow::platform::Interaction;
use grantflow::session::GrantStatus;
use grantflow::{
    Capability, CapabilityId, FileStorage, MemoryStorage, Outcome, SessionConfig, SessionStatus,
    SettingsTarget, SharedStorage,
};
use tempfile::tempdir;

fn single(capability: Capability) -> SessionConfig {
    SessionConfig::builder()
        .app_name(APP_NAME)
        .package_name(PACKAGE)
        .required([capability])
        .build()
        .expect("config")
}

fn abandon_reasons(events: &[GrantEvent], session_id: &str) -> Vec<AbandonReason> {
    events
        .iter()
        .filter_map(|event| match event {
            GrantEvent::SessionAbandoned(payload) if payload.session_id == session_id => {
                Some(payload.reason)
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn new_check_and_show_supersedes_pending_session() {
    let env = env();
    env.answer(&Capability::camera(), true);
    let orchestrator = orchestrator(&env);
    let mut events = orchestrator.bus().subscribe();

    let first = Recorder::shared();
    let status = orchestrator
        .check_and_show(single(Capability::usage_access()), first.clone())
        .await
        .expect("first session");
    let first_id = status.session_id().to_string();
    let first_suspension = status.suspension().expect("suspended");
    assert_eq!(orchestrator.active_session().await, Some(first_id.clone()));

    let second = Recorder::shared();
    let status = orchestrator
        .check_and_show(single(Capability::camera()), second.clone())
        .await
        .expect("second session");
    assert!(matches!(status, SessionStatus::Completed { .. }));
    assert_eq!(second.granted(), 1);

    env.enable_setting(manifest::ACTION_USAGE_ACCESS_SETTINGS);
    let stale = orchestrator
        .resume(&first_id, first_suspension)
        .await
        .expect("resume");
    assert_eq!(stale, SessionStatus::Stale { session_id: first_id.clone() });
    assert_eq!(first.total(), 0);

    let events = drain(&mut events);
    assert_eq!(abandon_reasons(&events, &first_id), vec![AbandonReason::Superseded]);
}

#[tokio::test]
async fn permanent_teardown_abandons_without_callback() {
    let env = env();
    let orchestrator = orchestrator(&env);
    let mut events = orchestrator.bus().subscribe();
    let recorder = Recorder::shared();

    let status = orchestrator
        .check_and_show(single(Capability::overlay_permission()), recorder.clone())
        .await
        .expect("session");
    let session_id = status.session_id().to_string();
    let suspension = status.suspension().expect("suspended");

    orchestrator
        .on_surface_destroyed(&session_id, false)
        .await
        .expect("recreate");
    assert!(orchestrator.session_state(&session_id).await.expect("state").is_some());

    orchestrator
        .on_surface_destroyed(&session_id, true)
        .await
        .expect("teardown");
    env.enable_setting(manifest::ACTION_MANAGE_OVERLAY_PERMISSION);
    let status = orchestrator
        .resume(&session_id, suspension)
        .await
        .expect("resume");
    assert!(matches!(status, SessionStatus::Stale { .. }));
    assert_eq!(recorder.total(), 0);

    let events = drain(&mut events);
    assert_eq!(
        abandon_reasons(&events, &session_id),
        vec![AbandonReason::SurfaceDestroyed]
    );
    assert!(!events
        .iter()
        .any(|event| matches!(event, GrantEvent::SessionCompleted(_))));
}

#[tokio::test]
async fn suspended_session_survives_a_new_orchestrator() {
    let dir = tempdir().expect("tempdir");
    let env = env();
    env.answer(&Capability::ignore_battery_optimizations(), true);
    env.answer(&Capability::camera(), true);

    let config = SessionConfig::builder()
        .app_name(APP_NAME)
        .package_name(PACKAGE)
        .required([Capability::ignore_battery_optimizations()])
        .optional([Capability::camera()])
        .build()
        .expect("config");

    let session_id = {
        let storage: SharedStorage = Arc::new(FileStorage::new(dir.path().to_path_buf()));
        let orchestrator = orchestrator_with(&env, storage);
        let status = orchestrator
            .check_and_show(config, Recorder::shared())
            .await
            .expect("session");
        assert!(matches!(status, SessionStatus::Suspended { .. }));
        status.session_id().to_string()
    };
    assert!(dir
        .path()
        .join("session")
        .join(format!("{session_id}.json"))
        .exists());

    let storage: SharedStorage = Arc::new(FileStorage::new(dir.path().to_path_buf()));
    let orchestrator = orchestrator_with(&env, storage);
    let snapshot = orchestrator
        .session_state(&session_id)
        .await
        .expect("state")
        .expect("restored");
    assert_eq!(
        snapshot.status(CapabilityId::IgnoreBatteryOptimizations),
        Some(GrantStatus::PendingExternalReturn)
    );
    assert_eq!(snapshot.status(CapabilityId::Camera), Some(GrantStatus::Unknown));

    let suspended = orchestrator.suspended_sessions().await.expect("lookup");
    assert_eq!(suspended, vec![snapshot.clone()]);

    let recorder = Recorder::shared();
    orchestrator.reattach(&session_id, recorder.clone());
    let status = orchestrator
        .resume(&session_id, snapshot.suspension)
        .await
        .expect("resume");
    assert!(matches!(
        status,
        SessionStatus::Completed { ref report, .. } if report.outcome == Outcome::AllRequiredGranted
    ));
    assert_eq!(recorder.granted(), 1);
    assert_eq!(env.navigation_count(), 1);
    assert_eq!(env.prompt_count(), 1);
    assert!(!dir
        .path()
        .join("session")
        .join(format!("{session_id}.json"))
        .exists());
}

#[tokio::test]
async fn permanently_denied_prompt_routes_to_app_details() {
    let env = env();
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let orchestrator = orchestrator_with(&env, storage.clone());

    // First refusal: the platform will ask for a rationale next time.
    env.answer(&Capability::record_audio(), false);
    let recorder = Recorder::shared();
    orchestrator
        .check_and_show(single(Capability::record_audio()), recorder.clone())
        .await
        .expect("first session");
    assert_eq!(recorder.denials().len(), 1);

    // Second refusal after the rationale: "don't ask again".
    env.answer(&Capability::record_audio(), false);
    let recorder = Recorder::shared();
    orchestrator
        .check_and_show(single(Capability::record_audio()), recorder.clone())
        .await
        .expect("second session");
    assert_eq!(recorder.denials().len(), 1);
    assert_eq!(env.prompt_count(), 2);
    assert!(storage
        .read(&grantflow::storage::RATIONALE_KEY)
        .await
        .expect("tracker")
        .is_some());

    // Third attempt can only go through application details.
    env.grant_on_app_details(manifest::RECORD_AUDIO);
    let recorder = Recorder::shared();
    let status = orchestrator
        .check_and_show(single(Capability::record_audio()), recorder.clone())
        .await
        .expect("third session");
    let SessionStatus::Suspended { target, .. } = &status else {
        panic!("expected app details navigation");
    };
    assert_eq!(target, &SettingsTarget::app_details(Some(PACKAGE)));
    assert_eq!(env.prompt_count(), 2);

    orchestrator
        .resume(status.session_id(), 1)
        .await
        .expect("resume");
    assert_eq!(recorder.granted(), 1);
}

#[tokio::test]
async fn failed_navigation_retries_with_toggled_data() {
    let env = env();
    let primary = SettingsTarget {
        action: manifest::ACTION_MANAGE_OVERLAY_PERMISSION.to_string(),
        data: Some(format!("package:{PACKAGE}")),
    };
    let fallback = SettingsTarget {
        action: manifest::ACTION_MANAGE_OVERLAY_PERMISSION.to_string(),
        data: None,
    };
    env.fail_navigation(primary.clone());
    env.answer(&Capability::overlay_permission(), true);
    let orchestrator = orchestrator(&env);
    let recorder = Recorder::shared();

    let status = orchestrator
        .check_and_show(single(Capability::overlay_permission()), recorder.clone())
        .await
        .expect("session");
    let SessionStatus::Suspended { target, .. } = &status else {
        panic!("expected suspension");
    };
    assert_eq!(target, &fallback);
    assert_eq!(
        env.interactions(),
        vec![
            Interaction::Navigate { target: primary },
            Interaction::Navigate { target: fallback }
        ]
    );

    orchestrator
        .resume(status.session_id(), 1)
        .await
        .expect("resume");
    assert_eq!(recorder.granted(), 1);
}

#[tokio::test]
async fn configuration_faults_never_start_a_session() {
    let env = env();
    let orchestrator = orchestrator(&env);
    let mut events = orchestrator.bus().subscribe();

    let err = SessionConfig::builder()
        .app_name(APP_NAME)
        .required([Capability::overlay_permission()])
        .build()
        .expect_err("overlay needs a package name");
    assert!(matches!(err, grantflow::ConfigError::MissingDeepLink { .. }));

    assert!(drain(&mut events).is_empty());
    assert!(env.interactions().is_empty());
    assert_eq!(orchestrator.active_session().await, None);
}
