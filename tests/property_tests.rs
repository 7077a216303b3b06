//! Property-based tests for phases, cancellation and navigation.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use chrono::Utc;
use proptest::prelude::*;
use screenstack::{
    BoxError, CancelScope, CancelSignal, CompletionSignal, Entry, EntryKind, HookResult,
    LifecycleController, Navigator, Phase, PhaseContext, PhaseHistory, PhaseTransition, Screen,
};
use std::sync::Arc;

const PHASES: [Phase; 12] = [
    Phase::Created,
    Phase::Initialized,
    Phase::WillPushEnter,
    Phase::DidPushEnter,
    Phase::WillPushExit,
    Phase::DidPushExit,
    Phase::WillPopEnter,
    Phase::DidPopEnter,
    Phase::WillPopExit,
    Phase::DidPopExit,
    Phase::Cleanup,
    Phase::Disposed,
];

struct Blank;
impl Screen for Blank {}

struct Refusing;

#[async_trait::async_trait]
impl Screen for Refusing {
    async fn will_push_enter(&self, _ctx: PhaseContext) -> HookResult {
        Err(BoxError::from("refused"))
    }
}

prop_compose! {
    fn arbitrary_phase()(index in 0..PHASES.len()) -> Phase {
        PHASES[index]
    }
}

#[derive(Debug, Clone)]
enum Op {
    Push,
    PushRefused,
    Pop,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Push),
        1 => Just(Op::PushRefused),
        2 => Just(Op::Pop),
    ]
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #[test]
    fn phase_name_is_stable(phase in arbitrary_phase()) {
        prop_assert_eq!(phase.name(), phase.to_string());
    }

    #[test]
    fn nothing_follows_disposed(next in arbitrary_phase()) {
        prop_assert!(!Phase::Disposed.can_advance_to(next));
    }

    #[test]
    fn every_live_phase_can_be_disposed(phase in arbitrary_phase()) {
        prop_assert_eq!(phase.can_advance_to(Phase::Disposed), !phase.is_final());
    }

    #[test]
    fn controller_follows_legality_table(
        requests in prop::collection::vec(arbitrary_phase(), 1..20)
    ) {
        block_on(async {
            let controller = LifecycleController::new("entry", Arc::new(Blank));
            let mut expected = Phase::Created;

            for next in requests {
                let result = controller.advance(next, false).await;
                if expected.can_advance_to(next) {
                    prop_assert!(result.is_ok());
                    expected = next;
                } else {
                    prop_assert!(result.is_err());
                }
                prop_assert_eq!(controller.phase(), expected);
            }

            let path = controller.history().path();
            if let Some(last) = path.last() {
                prop_assert_eq!(*last, expected);
            }
            Ok(())
        })?;
    }

    #[test]
    fn history_preserves_order(
        phases in prop::collection::vec(arbitrary_phase(), 1..10)
    ) {
        let mut history = PhaseHistory::new();
        let mut from = Phase::Created;

        for to in &phases {
            history = history.record(PhaseTransition {
                from,
                to: *to,
                timestamp: Utc::now(),
            });
            from = *to;
        }

        let mut expected = vec![Phase::Created];
        expected.extend(phases.iter().copied());
        prop_assert_eq!(history.path(), expected);
    }

    #[test]
    fn history_record_is_pure(from in arbitrary_phase(), to in arbitrary_phase()) {
        let history = PhaseHistory::new();
        let recorded = history.record(PhaseTransition {
            from,
            to,
            timestamp: Utc::now(),
        });

        // Original history unchanged
        prop_assert_eq!(history.transitions().len(), 0);
        prop_assert_eq!(recorded.transitions().len(), 1);
    }

    #[test]
    fn history_roundtrip_serialization(
        phases in prop::collection::vec(arbitrary_phase(), 0..5)
    ) {
        let history = phases.iter().fold(PhaseHistory::new(), |history, to| {
            history.record(PhaseTransition {
                from: Phase::Created,
                to: *to,
                timestamp: Utc::now(),
            })
        });

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: PhaseHistory = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(history, deserialized);
    }

    #[test]
    fn completion_resolves_exactly_once(calls in 1..20usize) {
        let signal = CompletionSignal::new();
        let first_wins = (0..calls).map(|_| signal.resolve()).collect::<Vec<_>>();

        prop_assert!(first_wins[0]);
        prop_assert!(first_wins[1..].iter().all(|won| !won));
        prop_assert!(signal.is_resolved());
    }

    #[test]
    fn cancel_reaches_exactly_the_subtree(
        parents in prop::collection::vec(any::<prop::sample::Index>(), 1..16),
        target in any::<prop::sample::Index>(),
    ) {
        // Node 0 is the root; node i + 1 hangs off an earlier node.
        let mut scopes = vec![CancelScope::new()];
        let mut parent_of = vec![None];
        for (i, parent) in parents.iter().enumerate() {
            let parent = parent.index(i + 1);
            scopes.push(scopes[parent].child());
            parent_of.push(Some(parent));
        }

        let target = target.index(scopes.len());
        scopes[target].cancel();

        for (node, scope) in scopes.iter().enumerate() {
            let mut cursor = Some(node);
            let mut below_target = false;
            while let Some(current) = cursor {
                if current == target {
                    below_target = true;
                    break;
                }
                cursor = parent_of[current];
            }
            prop_assert_eq!(scope.is_cancelled(), below_target);
        }
    }

    #[test]
    fn navigator_matches_stack_model(
        ops in prop::collection::vec(arbitrary_op(), 1..24)
    ) {
        block_on(async {
            let navigator = Navigator::new();
            let cancel = CancelSignal::never();
            let mut model: Vec<Entry> = Vec::new();

            for (step, op) in ops.iter().enumerate() {
                let id = format!("entry-{step}");
                match op {
                    Op::Push => {
                        let entry = navigator
                            .push(Entry::new(id, EntryKind::Page, Blank), &cancel)
                            .await
                            .unwrap();
                        if let Some(previous) = model.last() {
                            prop_assert_eq!(previous.phase(), Phase::DidPushExit);
                        }
                        model.push(entry);
                    }
                    Op::PushRefused => {
                        let entry = Entry::new(id, EntryKind::Page, Refusing);
                        let result = navigator.push(entry.clone(), &cancel).await;
                        prop_assert!(result.is_err());
                        prop_assert!(entry.is_disposed());
                    }
                    Op::Pop => {
                        let popped = navigator.pop(false, &cancel).await.unwrap();
                        match (popped, model.pop()) {
                            (Some(popped), Some(expected)) => {
                                prop_assert!(popped.same_as(&expected));
                                prop_assert!(popped.is_disposed());
                            }
                            (None, None) => {}
                            (popped, expected) => {
                                prop_assert!(false, "popped {:?}, expected {:?}", popped, expected);
                            }
                        }
                    }
                }

                let expected_ids: Vec<String> =
                    model.iter().map(|entry| entry.id().to_string()).collect();
                prop_assert_eq!(navigator.ids(), expected_ids);
                if let Some(top) = model.last() {
                    prop_assert!(top.phase().is_active());
                }
                prop_assert!(!navigator.is_transition_in_progress());
            }
            Ok(())
        })?;
    }
}
