//! Generation pass behaviour: fan-out, failure isolation, resubmission.

use std::sync::Arc;

use tokio::sync::Semaphore;

use ideaforge::documents::DocumentKind;
use ideaforge::orchestrator::GENERATE_BLOCKED_MESSAGE;
use ideaforge::session::DocumentStatus;

use crate::support::{
    expected_body, orchestrator, orchestrator_without_key, StubProvider, UPSTREAM_FAILURE,
};

#[tokio::test]
async fn successful_pass_fills_all_seven_kinds() {
    let provider = Arc::new(StubProvider::new());
    let orchestrator = orchestrator(&provider);

    let report = match orchestrator.submit_idea("  Drone-delivered coffee  ").await {
        Some(report) => report,
        None => panic!("a non-blank idea with a key should run a pass"),
    };
    assert_eq!(report.succeeded, DocumentKind::ALL.to_vec());
    assert!(report.failures.is_empty());
    assert_eq!(provider.call_count(), 7);

    let session = orchestrator.snapshot();
    assert_eq!(session.idea(), Some("Drone-delivered coffee"));
    assert_eq!(session.documents().len(), 7);
    for kind in DocumentKind::ALL {
        assert_eq!(session.document(kind), Some(expected_body(kind).as_str()));
        assert_eq!(session.status(kind), DocumentStatus::Ready);
    }
    assert_eq!(session.loading_flags().len(), 7);
    assert!(!session.any_loading());
    assert_eq!(session.active(), Some(DocumentKind::Proposal));
    assert!(session.error().is_none());
    assert!(session.consistency_reminder());
}

#[tokio::test]
async fn one_failing_kind_does_not_affect_the_others() {
    let provider = Arc::new(StubProvider::failing(&[DocumentKind::MarketResearch]));
    let orchestrator = orchestrator(&provider);

    let report = match orchestrator.submit_idea("Vertical farming kits").await {
        Some(report) => report,
        None => panic!("pass should run"),
    };
    assert_eq!(report.succeeded.len(), 6);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, DocumentKind::MarketResearch);
    assert!(!report.all_failed());

    let session = orchestrator.snapshot();
    assert_eq!(session.documents().len(), 7);
    let placeholder = session
        .document(DocumentKind::MarketResearch)
        .unwrap_or_default();
    assert!(placeholder.starts_with("Error generating Market Research."));
    assert!(placeholder.contains(UPSTREAM_FAILURE));
    assert_eq!(
        session.status(DocumentKind::MarketResearch),
        DocumentStatus::Failed
    );

    for kind in DocumentKind::ALL
        .into_iter()
        .filter(|kind| *kind != DocumentKind::MarketResearch)
    {
        assert_eq!(session.document(kind), Some(expected_body(kind).as_str()));
    }
    assert_eq!(session.error(), Some("Failed to generate Market Research"));
    assert!(!session.any_loading());
}

#[tokio::test]
async fn every_kind_failing_is_reported() {
    let provider = Arc::new(StubProvider::failing(&DocumentKind::ALL));
    let orchestrator = orchestrator(&provider);

    let report = match orchestrator.submit_idea("Doomed").await {
        Some(report) => report,
        None => panic!("pass should run"),
    };
    assert!(report.all_failed());
    let banner = orchestrator.snapshot().error().unwrap_or_default().to_owned();
    for kind in DocumentKind::ALL {
        assert!(banner.contains(kind.display_name()), "{banner}");
    }
}

#[tokio::test]
async fn missing_key_blocks_generation_without_calls() {
    let provider = Arc::new(StubProvider::new());
    let orchestrator = orchestrator_without_key(&provider);

    assert!(orchestrator.snapshot().configuration_error().is_some());
    assert!(orchestrator.submit_idea("Anything").await.is_none());
    assert_eq!(provider.call_count(), 0);

    let session = orchestrator.snapshot();
    assert_eq!(session.error(), Some(GENERATE_BLOCKED_MESSAGE));
    assert!(session.documents().is_empty());
    assert!(!session.any_loading());
    assert_eq!(session.pass(), 0);
}

#[tokio::test]
async fn blank_idea_is_ignored() {
    let provider = Arc::new(StubProvider::new());
    let orchestrator = orchestrator(&provider);

    assert!(orchestrator.submit_idea(" \n\t ").await.is_none());
    assert_eq!(provider.call_count(), 0);
    let session = orchestrator.snapshot();
    assert_eq!(session.pass(), 0);
    assert!(session.idea().is_none());
    assert!(session.error().is_none());
}

#[tokio::test]
async fn resubmission_clears_previous_documents_while_in_flight() {
    let gate = Arc::new(Semaphore::new(7));
    let provider = Arc::new(StubProvider::gated(Arc::clone(&gate)));
    let orchestrator = Arc::new(orchestrator(&provider));

    assert!(orchestrator.submit_idea("First idea").await.is_some());
    assert_eq!(orchestrator.snapshot().documents().len(), 7);

    let mut updates = orchestrator.subscribe();
    let running = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.submit_idea("Second idea").await })
    };

    let waited = updates
        .wait_for(|session| {
            session.idea() == Some("Second idea")
                && DocumentKind::ALL
                    .into_iter()
                    .all(|kind| session.is_loading(kind))
        })
        .await
        .map(|session| session.clone());
    let in_flight = match waited {
        Ok(session) => session,
        Err(err) => panic!("session channel closed: {err}"),
    };
    assert!(in_flight.documents().is_empty());
    assert!(in_flight.is_batch_in_flight());
    assert!(in_flight.error().is_none());
    assert!(in_flight.active().is_none());
    for kind in DocumentKind::ALL {
        assert_eq!(in_flight.status(kind), DocumentStatus::Generating);
    }

    gate.add_permits(7);
    let report = match running.await {
        Ok(Some(report)) => report,
        Ok(None) => panic!("second pass should run"),
        Err(err) => panic!("second pass panicked: {err}"),
    };
    assert_eq!(report.pass, 2);
    assert_eq!(provider.call_count(), 14);

    let session = orchestrator.snapshot();
    assert_eq!(session.idea(), Some("Second idea"));
    assert_eq!(session.documents().len(), 7);
    assert!(!session.any_loading());
}
