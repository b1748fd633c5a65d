//! Property-based tests for the descriptor parser and reconciler.
//!
//! These tests use proptest to generate descriptor files and records and
//! verify that reading and writing them loses nothing.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeSet;

    use crate::descriptor::parse;
    use crate::reconcile::reconcile;
    use crate::record::{Record, Target};
    use proptest::prelude::*;

    // ============================================================================
    // Generators
    // ============================================================================

    fn indent() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just(""), Just(" "), Just("   "), Just("\t")]
    }

    fn key_line() -> impl Strategy<Value = String> {
        let entry = prop_oneof![
            "[a-z]{3,8}".prop_map(|host| format!("source = https://{}/repo.git", host)),
            "[a-z]{1,5}".prop_map(|name| format!("source.{} = https://{}/fork.git", name, name)),
            "[0-9a-f]{7,12}".prop_map(|hash| format!("commit = {}", hash)),
            prop_oneof![
                Just("enable = True"),
                Just("enable = yes"),
                Just("enable = N"),
                Just("enable = False"),
                Just("enable = 0"),
            ]
            .prop_map(str::to_string),
            prop_oneof![
                Just("target = commit"),
                Just("target = branch main"),
                Just("target = tag v1.0"),
            ]
            .prop_map(str::to_string),
            prop_oneof![
                Just("target_overrides_commit = False"),
                Just("target_overrides_commit = no"),
            ]
            .prop_map(str::to_string),
            Just("unknown_key = kept".to_string()),
            Just("# a comment".to_string()),
            Just(String::new()),
            Just("source =".to_string()),
        ];
        (indent(), entry).prop_map(|(indent, entry)| format!("{}{}", indent, entry))
    }

    fn header_line() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("lib/x"),
            Just("lib/y"),
            Just("./vendor/z/"),
            Just("deps/a"),
        ]
        .prop_map(|path| format!("[submodule \"{}\"]", path))
    }

    fn descriptor_text() -> impl Strategy<Value = String> {
        prop::collection::vec(prop_oneof![1 => header_line(), 4 => key_line()], 0..40)
            .prop_map(|lines| lines.iter().map(|line| format!("{}\n", line)).collect())
    }

    fn full_record() -> impl Strategy<Value = Record> {
        (
            "[a-z]{1,8}(/[a-z]{1,8}){0,2}",
            prop::collection::vec("[a-z]{3,10}", 0..4),
            prop::collection::btree_map("[a-z]{1,6}", "[a-z]{3,10}", 0..3),
            "[0-9a-f]{7,40}",
            0..3u8,
            "[a-z0-9._-]{1,10}",
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(
                |(path, sources, named, commit, kind, name, enabled, overrides)| {
                    let mut record = Record::new(path);
                    for host in sources {
                        record.add_source(format!("https://{}/r.git", host));
                    }
                    for (remote, host) in named {
                        record.set_named_source(remote, format!("git@{}:r.git", host));
                    }
                    record.set_commit(commit);
                    record.set_enabled(enabled);
                    let target = match kind {
                        0 => Target::Commit,
                        1 => Target::Branch(name),
                        _ => Target::Tag(name),
                    };
                    let overrides = overrides && target != Target::Commit;
                    record.set_target(target, overrides).unwrap();
                    record
                },
            )
    }

    // ============================================================================
    // Properties
    // ============================================================================

    proptest! {
        /// Property: writing a parsed descriptor back over itself changes nothing
        #[test]
        fn self_reconcile_is_identity(text in descriptor_text()) {
            let submodules = parse(&text).unwrap();
            let rewritten = reconcile(&text, &submodules, &BTreeSet::new());
            prop_assert_eq!(rewritten, text);
        }

        /// Property: a fully described record survives reconcile then parse
        #[test]
        fn reconcile_then_parse_round_trips(record in full_record()) {
            let desired = [record.clone()].into_iter().collect();
            let text = reconcile("", &desired, &BTreeSet::new());

            let parsed = parse(&text).unwrap();
            prop_assert_eq!(parsed.len(), 1);
            prop_assert_eq!(parsed.get(record.path()), Some(&record));
        }

        /// Property: removing a path leaves no header for it behind
        #[test]
        fn removed_paths_leave_no_header(text in descriptor_text()) {
            let submodules = parse(&text).unwrap();
            let remove: BTreeSet<String> = ["lib/x".to_string()].into_iter().collect();

            let rewritten = reconcile(&text, &submodules, &remove);
            let reparsed = parse(&rewritten).unwrap();

            prop_assert!(!reparsed.contains("lib/x"));
            for record in submodules.iter().filter(|r| r.path() != "lib/x") {
                prop_assert!(reparsed.contains(record.path()));
            }
        }
    }
}
