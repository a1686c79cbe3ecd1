//! Integration tests for the action manager driven by a clock
//!
//! These tests verify that:
//! - Callbacks can add and remove registrations in the middle of a tick
//! - Pausing keeps progress and resuming continues from it
//! - Errors from actions surface from the clock tick
//! - Several owners run independent action sets

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use cadence_actions::{Action, ActionHandle, Clock, ClockConfig, PathOptions};
use cadence_core::{CadenceError, Capability, Path, Point};

use common::{approx_point, counter, init_tracing, marker, sprite};

/// Test that an action added from a callback waits for the next tick
#[test]
fn test_add_from_callback() {
    init_tracing();
    let (sprite, owner) = sprite();
    let mut clock = Clock::new();

    let follow_up = ActionHandle::new(Action::move_by(1.0, Point::new(2.0, 0.0)));
    let manager = clock.actions().clone();
    let target = owner.clone();
    let queued = follow_up.clone();
    let trigger = ActionHandle::new(Action::call(move || manager.add_action(&queued, &target, false)));

    clock.run_action(&trigger, &owner).unwrap();
    clock.advance(0.5).unwrap();

    // Started by add_action, not stepped by the tick that added it
    assert!(follow_up.borrow().is_running());
    assert_eq!(follow_up.borrow().elapsed(), 0.0);
    assert_eq!(clock.actions().len(), 1);

    clock.advance(0.5).unwrap();
    assert_eq!(sprite.borrow().position, Point::new(1.0, 0.0));
}

/// Test that a callback removing every action on its owner stops the tick
/// from stepping them
#[test]
fn test_remove_all_from_callback() {
    let (sprite, owner) = sprite();
    let mut clock = Clock::new();

    let manager = clock.actions().clone();
    let stop_all = ActionHandle::new(Action::call_with_owner(move |owner| {
        manager.remove_all_actions(owner);
        Ok(())
    }));
    let mover = ActionHandle::new(Action::move_by(1.0, Point::new(1.0, 0.0)));

    clock.run_action(&stop_all, &owner).unwrap();
    clock.run_action(&mover, &owner).unwrap();
    clock.advance(0.5).unwrap();

    assert!(clock.actions().is_empty());
    assert!(sprite.borrow().positions.is_empty());
    // Removal does not stop the action
    assert!(mover.borrow().is_running());
}

/// Test that pausing an owner keeps its progress
#[test]
fn test_pause_and_resume_keep_progress() {
    let (sprite, owner) = sprite();
    let mut clock = Clock::new();
    let action = ActionHandle::new(Action::move_by(1.0, Point::new(4.0, 0.0)));

    clock.run_action(&action, &owner).unwrap();
    clock.advance(0.25).unwrap();
    clock.actions().pause_all_actions(&owner);
    clock.advance(0.5).unwrap();
    assert_eq!(sprite.borrow().position, Point::new(1.0, 0.0));
    assert_eq!(action.borrow().elapsed(), 0.25);

    clock.actions().resume_all_actions(&owner);
    clock.advance(0.5).unwrap();
    assert_eq!(sprite.borrow().position, Point::new(3.0, 0.0));
    clock.advance(0.25).unwrap();
    assert_eq!(sprite.borrow().position, Point::new(4.0, 0.0));
    assert!(clock.actions().is_empty());
}

/// Test that a missing capability surfaces when the action first runs
#[test]
fn test_missing_capability_fails_tick() {
    let (_, owner) = marker();
    let mut clock = Clock::new();
    let action = ActionHandle::new(Action::fade_out(1.0));

    // Registration itself does not look at the owner
    clock.actions().add_action(&action, &owner, true).unwrap();
    clock.actions().resume_all_actions(&owner);

    assert_eq!(
        clock.advance(0.1),
        Err(CadenceError::MissingCapability {
            action: "FadeOut",
            capability: Capability::Opacity,
        })
    );

    // The failing action is dropped, so the next tick runs cleanly
    assert!(clock.actions().is_empty());
    assert_eq!(clock.advance(0.1), Ok(()));
}

/// Test that running an action on an owner without the capability fails
/// right away
#[test]
fn test_run_action_checks_capability_on_start() {
    let (_, owner) = marker();
    let clock = Clock::new();
    let action = ActionHandle::new(Action::rotate_by(1.0, 90.0));

    assert_eq!(
        clock.run_action(&action, &owner),
        Err(CadenceError::MissingCapability {
            action: "RotateBy",
            capability: Capability::Rotation,
        })
    );
    assert!(!clock.actions().is_registered(&action, &owner));
}

/// Test that an action that failed to start does not hold up later ones
#[test]
fn test_failed_start_leaves_other_actions_running() {
    let (_, bare) = marker();
    let (sprite, owner) = sprite();
    let mut clock = Clock::new();
    let spin = ActionHandle::new(Action::rotate_by(1.0, 90.0));
    let slide = ActionHandle::new(Action::move_by(1.0, Point::new(4.0, 0.0)));

    assert!(clock.run_action(&spin, &bare).is_err());
    clock.run_action(&slide, &owner).unwrap();
    for _ in 0..2 {
        clock.advance(0.5).unwrap();
    }

    assert_eq!(sprite.borrow().position, Point::new(4.0, 0.0));
    assert!(clock.actions().is_empty());
}

/// Test that stepping an action the application holds borrowed is reported
#[test]
fn test_borrowed_action_is_reported() {
    let (_, owner) = sprite();
    let mut clock = Clock::new();
    let action = ActionHandle::new(Action::delay(1.0));

    clock.run_action(&action, &owner).unwrap();
    let _guard = action.borrow();
    assert_eq!(clock.advance(0.1), Err(CadenceError::ActionBusy));
}

/// Test that one action handle can be registered on two owners
#[test]
fn test_independent_owners() {
    let (first, first_owner) = sprite();
    let (second, second_owner) = sprite();
    let mut clock = Clock::new();

    let shared = ActionHandle::new(Action::delay(10.0));
    let slide = ActionHandle::new(Action::move_by(1.0, Point::new(1.0, 1.0)));
    clock.actions().add_action(&shared, &first_owner, false).unwrap();
    clock.actions().add_action(&shared, &second_owner, false).unwrap();
    clock.run_action(&slide, &second_owner).unwrap();

    assert_eq!(clock.actions().running_action_count(&first_owner), 1);
    assert_eq!(clock.actions().running_action_count(&second_owner), 2);

    clock.advance(1.0).unwrap();
    assert_eq!(first.borrow().position, Point::ZERO);
    assert_eq!(second.borrow().position, Point::new(1.0, 1.0));
    assert_eq!(clock.actions().running_action_count(&second_owner), 1);
}

/// Test that tagged actions can be replaced by tag
#[test]
fn test_replace_by_tag() {
    let (_, owner) = sprite();
    let clock = Clock::new();

    let spin = ActionHandle::new(Action::rotate_by(1.0, 360.0).forever()).with_tag("spin");
    clock.run_action(&spin, &owner).unwrap();
    assert_eq!(clock.actions().action_by_tag("spin", &owner), Some(spin.clone()));

    clock.actions().remove_action_by_tag("spin", &owner);
    let faster = ActionHandle::new(Action::rotate_by(0.5, 360.0).forever()).with_tag("spin");
    clock.run_action(&faster, &owner).unwrap();

    assert_eq!(clock.actions().action_by_tag("spin", &owner), Some(faster));
}

/// Test that a fixed-step clock walks a path frame by frame
#[test]
fn test_path_walk_on_fixed_clock() {
    let (sprite, owner) = sprite();
    let mut clock = Clock::with_config(ClockConfig::fixed(10));
    let path = Path::new([
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
    ]);
    let walk = ActionHandle::new(Action::move_along_path(
        2.0,
        &path,
        &PathOptions::new().with_autorotate(true),
    ));

    clock.run_action(&walk, &owner).unwrap();
    let mut frames = 0;
    while !clock.actions().is_empty() {
        clock.tick().unwrap();
        frames += 1;
        assert!(frames <= 40, "path walk never finished");
    }

    assert!(approx_point(sprite.borrow().position, Point::new(10.0, 10.0)));
    assert!((sprite.borrow().rotation - 90.0).abs() < 1e-3);
}

/// Test that a call sequence keeps firing callbacks in order across ticks
#[test]
fn test_callbacks_fire_in_order() {
    let (_, owner) = sprite();
    let mut clock = Clock::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let steps: Vec<Action> = (0..3)
        .flat_map(|index| {
            let log = order.clone();
            [
                Action::call(move || {
                    log.borrow_mut().push(index);
                    Ok(())
                }),
                Action::delay(0.1),
            ]
        })
        .collect();
    let script = ActionHandle::new(Action::sequence(steps));

    clock.run_action(&script, &owner).unwrap();
    clock.advance(0.05).unwrap();
    assert_eq!(order.borrow().as_slice(), &[0]);
    clock.advance(0.1).unwrap();
    assert_eq!(order.borrow().as_slice(), &[0, 1]);
    clock.advance(0.1).unwrap();
    assert_eq!(order.borrow().as_slice(), &[0, 1, 2]);
}

/// Test that repeat-forever keeps its registration until removed
#[test]
fn test_repeat_forever_until_removed() {
    let (_, owner) = sprite();
    let mut clock = Clock::new();
    let (calls, call) = counter();
    let pulse = ActionHandle::new(Action::sequence([call, Action::delay(0.5)]).forever());

    clock.run_action(&pulse, &owner).unwrap();
    for _ in 0..8 {
        clock.advance(0.25).unwrap();
    }
    assert_eq!(calls.get(), 4);
    assert!(clock.actions().is_registered(&pulse, &owner));

    clock.actions().remove_action(&pulse);
    let seen = calls.get();
    clock.advance(1.0).unwrap();
    assert_eq!(calls.get(), seen);
}
