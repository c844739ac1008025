use super::*;
use crate::test_support::{chain, frame};
use proptest::prelude::*;

const ALL_EVENTS: [TraceEvent; 5] = [
    TraceEvent::None,
    TraceEvent::Enter,
    TraceEvent::Succeed,
    TraceEvent::MethodFail,
    TraceEvent::CallFail,
];

mod halting {
    use super::*;

    #[test]
    fn test_step_into_halts_on_every_event_but_none() {
        let gate = TraceGate::default();
        let f = chain(3);
        for event in ALL_EVENTS {
            assert_eq!(gate.should_halt(StepMode::StepInto, event, &f), event != TraceEvent::None);
        }
    }

    #[test]
    fn test_run_never_halts() {
        let gate = TraceGate::default();
        let f = chain(1);
        for event in ALL_EVENTS {
            assert!(!gate.should_halt(StepMode::Run, event, &f));
        }
    }

    #[test]
    fn test_step_until_only_halts_when_call_finishes() {
        let gate = TraceGate::default();
        let top = frame("Top", None);
        let mode = StepMode::StepUntil { level: 0 };
        assert!(!gate.should_halt(mode, TraceEvent::Enter, &top));
        assert!(!gate.should_halt(mode, TraceEvent::MethodFail, &top));
        assert!(gate.should_halt(mode, TraceEvent::Succeed, &top));
        assert!(gate.should_halt(mode, TraceEvent::CallFail, &top));
    }

    #[test]
    fn test_step_until_suppresses_subtree() {
        let gate = TraceGate::default();
        let a = frame("A", None);
        let child = frame("Child", Some(&a));
        let grandchild = frame("Grandchild", Some(&child));
        let mode = StepCommand::StepOver.next_mode(TraceEvent::Enter, Some(&a));

        assert!(!gate.should_halt(mode, TraceEvent::Succeed, &child));
        assert!(!gate.should_halt(mode, TraceEvent::CallFail, &grandchild));
        assert!(gate.should_halt(mode, TraceEvent::Succeed, &a));
    }

    #[test]
    fn test_exclusive_boundary_needs_strictly_higher_return() {
        let gate = TraceGate::new(DepthBoundary::Exclusive);
        let a = frame("A", None);
        let b = frame("B", Some(&a));
        let mode = StepCommand::StepOver.next_mode(TraceEvent::Enter, Some(&b));

        // B returns to A's level, which is the target itself.
        assert!(!gate.should_halt(mode, TraceEvent::Succeed, &b));
        assert!(gate.should_halt(mode, TraceEvent::Succeed, &a));
    }
}

mod commands {
    use super::*;

    #[test]
    fn test_continue_detaches() {
        let f = chain(2);
        assert_eq!(StepCommand::Continue.next_mode(TraceEvent::Enter, Some(&f)), StepMode::Run);
        assert!(!StepMode::Run.is_single_step());
    }

    #[test]
    fn test_step_over_targets_caller_level() {
        let f = chain(3);
        assert_eq!(
            StepCommand::StepOver.next_mode(TraceEvent::Enter, Some(&f)),
            StepMode::StepUntil { level: 2 }
        );
        assert_eq!(
            StepCommand::StepOver.next_mode(TraceEvent::MethodFail, Some(&f)),
            StepMode::StepUntil { level: 2 }
        );
    }

    #[test]
    fn test_step_over_after_call_finished_steps_into() {
        let f = chain(3);
        assert_eq!(StepCommand::StepOver.next_mode(TraceEvent::Succeed, Some(&f)), StepMode::StepInto);
        assert_eq!(StepCommand::StepOver.next_mode(TraceEvent::CallFail, Some(&f)), StepMode::StepInto);
    }

    #[test]
    fn test_step_out_skips_two_levels() {
        let f = chain(4);
        assert_eq!(
            StepCommand::StepOut.next_mode(TraceEvent::Enter, Some(&f)),
            StepMode::StepUntil { level: 2 }
        );
    }

    #[test]
    fn test_step_out_of_top_level_targets_root() {
        let top = frame("Top", None);
        assert_eq!(
            StepCommand::StepOut.next_mode(TraceEvent::Enter, Some(&top)),
            StepMode::StepUntil { level: 0 }
        );
    }

    #[test]
    fn test_without_frame_every_step_is_step_into() {
        for command in [StepCommand::StepInto, StepCommand::StepOver, StepCommand::StepOut] {
            assert_eq!(command.next_mode(TraceEvent::None, None), StepMode::StepInto);
        }
    }
}

fn event_strategy() -> impl Strategy<Value = TraceEvent> {
    prop::sample::select(ALL_EVENTS.to_vec())
}

proptest! {
    #[test]
    fn prop_step_into_never_skips(len in 1usize..16, event in event_strategy()) {
        let f = chain(len);
        let gate = TraceGate::default();
        prop_assert_eq!(gate.should_halt(StepMode::StepInto, event, &f), event != TraceEvent::None);
    }

    #[test]
    fn prop_step_until_matches_depth_rule(
        len in 1usize..16,
        target in 0usize..16,
        event in event_strategy(),
    ) {
        let f = chain(len);
        let gate = TraceGate::default();
        let caller_level = len - 1;
        let expected = matches!(event, TraceEvent::Succeed | TraceEvent::CallFail) && caller_level <= target;
        prop_assert_eq!(gate.should_halt(StepMode::StepUntil { level: target }, event, &f), expected);
    }

    #[test]
    fn prop_step_out_is_step_over_from_caller(len in 2usize..16, event in event_strategy()) {
        let f = chain(len);
        let caller = f.caller();
        let out = StepCommand::StepOut.next_mode(event, Some(&f));
        let over_caller = StepCommand::StepOver.next_mode(TraceEvent::Enter, caller.as_ref());
        prop_assert_eq!(out, over_caller);
    }
}
