//! Races on the same PR (duplicate creates, parallel merges, parallel
//! reassignments) and calls cut short by a deadline must leave the store
//! consistent.

mod common;

use std::collections::HashSet;
use std::time::Duration;

use common::{members, setup_state};
use futures::future::join_all;
use reviewer_appointment::error::ErrorCode;
use reviewer_appointment::models::PrStatus;
use tokio::time::timeout;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_same_id_has_one_winner() {
    let (_dir, state) = setup_state().await;
    state
        .teams
        .create_team("backend", &members(&["A", "B", "C"]))
        .await
        .unwrap();

    let attempts = (0..8).map(|_| {
        let state = state.clone();
        tokio::spawn(async move { state.assignment.create_pr("pr-race", "Race", "A").await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.code(), Some(ErrorCode::PrExists));
    }

    let pr = state.assignment.get_pr("pr-race").await.unwrap();
    assert_eq!(pr.reviewers.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_merges_stamp_once() {
    let (_dir, state) = setup_state().await;
    state
        .teams
        .create_team("backend", &members(&["A", "B", "C"]))
        .await
        .unwrap();
    state.assignment.create_pr("pr-1", "Add X", "A").await.unwrap();

    let merges = (0..8).map(|_| {
        let state = state.clone();
        tokio::spawn(async move { state.assignment.merge_pr("pr-1").await })
    });
    let merged: Vec<_> = join_all(merges)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();

    let stamps: HashSet<Option<i64>> = merged.iter().map(|pr| pr.merged_at).collect();
    assert_eq!(stamps.len(), 1);
    assert!(merged.iter().all(|pr| pr.status == PrStatus::Merged));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reassign_same_reviewer_has_one_winner() {
    let (_dir, state) = setup_state().await;
    state
        .teams
        .create_team("backend", &members(&["A", "B", "C", "D", "E", "F"]))
        .await
        .unwrap();
    let pr = state.assignment.create_pr("pr-1", "Add X", "A").await.unwrap();
    let old = pr.reviewer_user_ids()[0].clone();

    let attempts = (0..2).map(|_| {
        let state = state.clone();
        let old = old.clone();
        tokio::spawn(async move { state.assignment.reassign_reviewer("pr-1", &old).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(loser.code(), Some(ErrorCode::NotAssigned));

    let pr = state.assignment.get_pr("pr-1").await.unwrap();
    let ids = pr.reviewer_user_ids();
    assert_eq!(ids.len(), 2);
    assert!(!ids.contains(&old));
    assert!(!ids.contains(&"A".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reassign_of_different_reviewers() {
    let (_dir, state) = setup_state().await;
    state
        .teams
        .create_team("backend", &members(&["A", "B", "C", "D", "E", "F"]))
        .await
        .unwrap();
    let pr = state.assignment.create_pr("pr-1", "Add X", "A").await.unwrap();
    let original = pr.reviewer_user_ids();

    let attempts = original.clone().into_iter().map(|old| {
        let state = state.clone();
        tokio::spawn(async move { state.assignment.reassign_reviewer("pr-1", &old).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    // A loser may only fail because the winner took the last candidate.
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.code(), Some(ErrorCode::NoCandidate));
    }
    assert!(results.iter().any(|r| r.is_ok()));

    let pr = state.assignment.get_pr("pr-1").await.unwrap();
    let ids = pr.reviewer_user_ids();
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(unique.len(), 2);
    assert!(!ids.contains(&"A".to_string()));
    for (old, result) in original.iter().zip(&results) {
        if let Ok(new_reviewer) = result {
            assert!(!ids.contains(old));
            assert!(ids.contains(new_reviewer));
        }
    }
}

/// Deadlines from 0 up to a few milliseconds, so some land inside the
/// store transaction.
fn deadlines() -> impl Iterator<Item = Duration> {
    (0..40u64).map(|n| Duration::from_micros(n * 150))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_create_pr_cut_by_deadline_is_all_or_nothing() {
    let (_dir, state) = setup_state().await;
    state
        .teams
        .create_team("backend", &members(&["A", "B", "C", "D"]))
        .await
        .unwrap();

    for (n, deadline) in deadlines().enumerate() {
        let pr_id = format!("pr-{}", n);
        let _ = timeout(deadline, state.assignment.create_pr(&pr_id, "Change", "A")).await;

        match state.assignment.get_pr(&pr_id).await {
            Ok(pr) => assert_eq!(pr.reviewers.len(), 2, "{} visible with a partial reviewer set", pr_id),
            Err(err) => assert!(err.is_not_found()),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_create_team_cut_by_deadline_is_all_or_nothing() {
    let (_dir, state) = setup_state().await;

    for (n, deadline) in deadlines().enumerate() {
        let name = format!("team-{}", n);
        let ids: Vec<String> = (0..3).map(|m| format!("{}-u{}", name, m)).collect();
        let roster: Vec<&str> = ids.iter().map(String::as_str).collect();
        let _ = timeout(deadline, state.teams.create_team(&name, &members(&roster))).await;

        match state.teams.get_team(&name).await {
            Ok(team) => assert_eq!(team.members.len(), 3, "{} visible with a partial roster", name),
            Err(err) => assert!(err.is_not_found()),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reassign_cut_by_deadline_never_splits_the_swap() {
    let (_dir, state) = setup_state().await;
    state
        .teams
        .create_team("backend", &members(&["A", "B", "C", "D", "E", "F"]))
        .await
        .unwrap();
    state.assignment.create_pr("pr-1", "Add X", "A").await.unwrap();

    for deadline in deadlines() {
        let before = state.assignment.get_pr("pr-1").await.unwrap().reviewer_user_ids();
        let old = before[0].clone();

        let outcome = timeout(deadline, state.assignment.reassign_reviewer("pr-1", &old)).await;

        let after = state.assignment.get_pr("pr-1").await.unwrap().reviewer_user_ids();
        let unique: HashSet<&String> = after.iter().collect();
        assert_eq!(after.len(), 2, "reviewer set split: {:?}", after);
        assert_eq!(unique.len(), 2);
        assert!(!after.contains(&"A".to_string()));
        if let Ok(Ok(new_reviewer)) = outcome {
            assert!(!after.contains(&old));
            assert!(after.contains(&new_reviewer));
        }
    }
}
