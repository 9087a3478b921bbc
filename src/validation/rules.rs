//! Structural rules for state tree definitions, using Validation.

use crate::builder::StateBuilder;
use crate::core::Flag;
use crate::validation::violations::TreeViolation;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<TreeViolation>>;

fn check(ok: bool, violation: impl FnOnce() -> TreeViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Validate a whole tree definition rooted at `root`.
///
/// Every rule is evaluated on every state so the caller sees ALL
/// violations at once instead of fixing them one build at a time.
pub fn validate_tree(root: &StateBuilder) -> Validation<(), NonEmptyVec<TreeViolation>> {
    let mut checks: Vec<Check> = Flag::ALL
        .into_iter()
        .map(|flag| {
            check(root.flag_overrides().get(flag).is_some(), || {
                TreeViolation::MissingFlagDefault { flag: flag.name() }
            })
        })
        .collect();

    collect_state_checks(root, &mut checks);

    Validation::all_vec(checks).map(|_| ())
}

fn collect_state_checks(state: &StateBuilder, checks: &mut Vec<Check>) {
    let name = state.state_name();
    checks.push(check(!name.is_empty() && !name.contains('.'), || {
        TreeViolation::InvalidName {
            name: name.to_string(),
        }
    }));

    let mut seen = HashSet::new();
    for child in state.child_states() {
        let child_name = child.state_name();
        checks.push(check(seen.insert(child_name), || {
            TreeViolation::DuplicateState {
                parent: name.to_string(),
                name: child_name.to_string(),
            }
        }));
    }

    match (state.initial_name(), state.child_states().is_empty()) {
        (None, false) => checks.push(Validation::fail(TreeViolation::MissingInitial {
            state: name.to_string(),
        })),
        (Some(initial), true) => checks.push(Validation::fail(TreeViolation::InitialOnLeaf {
            state: name.to_string(),
            initial: initial.to_string(),
        })),
        (Some(initial), false) => checks.push(check(seen.contains(initial), || {
            TreeViolation::UnknownInitial {
                state: name.to_string(),
                initial: initial.to_string(),
            }
        })),
        (None, true) => {}
    }

    for child in state.child_states() {
        collect_state_checks(child, checks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_root(name: &str) -> StateBuilder {
        Flag::ALL
            .into_iter()
            .fold(StateBuilder::new(name), |b, flag| b.flag(flag, false))
    }

    #[test]
    fn valid_tree_passes() {
        let root = complete_root("root")
            .initial("a")
            .child(StateBuilder::new("a"))
            .child(StateBuilder::new("b"));

        assert!(validate_tree(&root).is_success());
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let root = StateBuilder::new("root")
            .flag(Flag::IsLoaded, false)
            .initial("missing")
            .child(StateBuilder::new("dup"))
            .child(StateBuilder::new("dup"))
            .child(StateBuilder::new("bad.name").initial("x"));

        match validate_tree(&root) {
            Validation::Failure(errors) => {
                let missing_flags = errors
                    .iter()
                    .filter(|e| matches!(e, TreeViolation::MissingFlagDefault { .. }))
                    .count();
                assert_eq!(missing_flags, 7);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TreeViolation::DuplicateState { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TreeViolation::UnknownInitial { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TreeViolation::InvalidName { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, TreeViolation::InitialOnLeaf { .. })));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn composite_without_initial_is_rejected() {
        let root = complete_root("root").child(StateBuilder::new("only"));

        let result = validate_tree(&root);
        assert!(result.is_failure());
        if let Validation::Failure(errors) = result {
            assert!(errors
                .iter()
                .any(|e| *e == TreeViolation::MissingInitial {
                    state: "root".to_string()
                }));
        }
    }

    #[test]
    fn nested_violations_are_found() {
        let root = complete_root("root").initial("outer").child(
            StateBuilder::new("outer")
                .initial("inner")
                .child(StateBuilder::new("inner").child(StateBuilder::new(""))),
        );

        let result = validate_tree(&root);
        assert!(result.is_failure());
        if let Validation::Failure(errors) = result {
            assert_eq!(errors.len(), 2);
        }
    }
}
