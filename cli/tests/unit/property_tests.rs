//! Property-based tests for parsing and merge invariants.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use slipway_cli::application::services::deploy::formation_from_bytes;
use slipway_cli::domain::constraints::{CpuShare, Memory, Nproc};
use slipway_cli::domain::process::default_quantity;
use slipway_cli::domain::{
    App, Command, Constraints, DEFAULT_CONSTRAINTS, Formation, Image, Process,
    validate_config_key,
};

// ============================================================================
// Command
// ============================================================================

proptest! {
    /// Plain words survive a join-then-split round trip.
    #[test]
    fn prop_command_splits_plain_words(words in prop::collection::vec("[a-zA-Z0-9_./=-]{1,12}", 1..8)) {
        let command = Command::parse(&words.join(" ")).expect("parse");
        prop_assert_eq!(command.args(), words.as_slice());
        prop_assert_eq!(command.to_string(), words.join(" "));
    }

    /// Whitespace-only input is never a command.
    #[test]
    fn prop_blank_command_rejected(blank in "[ \t]{0,10}") {
        prop_assert!(Command::parse(&blank).is_err());
    }
}

// ============================================================================
// Constraints
// ============================================================================

proptest! {
    /// Display output always parses back to the same constraints.
    #[test]
    fn prop_constraints_display_roundtrip(
        cpu in 2u16..=1024,
        memory in 0u64..(1 << 40),
        nproc in 0u64..100_000,
    ) {
        let constraints = Constraints {
            memory: Memory(memory),
            cpu_share: CpuShare(cpu),
            nproc: Nproc(nproc),
        };
        let parsed: Constraints = constraints.to_string().parse().expect("reparse");
        prop_assert_eq!(parsed, constraints);
    }

    /// CPU shares outside 2..=1024 are rejected.
    #[test]
    fn prop_out_of_range_cpu_share_rejected(cpu in prop_oneof![0u32..2, 1025u32..100_000]) {
        let raw = format!("{cpu}:512MB");
        prop_assert!(raw.parse::<Constraints>().is_err(), "accepted {}", raw);
    }
}

// ============================================================================
// Image references
// ============================================================================

proptest! {
    /// `repository:tag` parses into its parts and displays unchanged.
    #[test]
    fn prop_image_roundtrip(
        host in prop::option::of("[a-z]{1,8}\\.[a-z]{2,3}(:[0-9]{2,5})?"),
        path in "[a-z0-9]{1,10}(/[a-z0-9]{1,10}){0,2}",
        tag in "[a-zA-Z0-9_.-]{1,12}",
    ) {
        let repository = match host {
            Some(host) => format!("{host}/{path}"),
            None => path,
        };
        let reference = format!("{repository}:{tag}");
        let image: Image = reference.parse().expect("parse");
        prop_assert_eq!(&image.repository, &repository);
        prop_assert_eq!(&image.tag, &tag);
        prop_assert_eq!(image.to_string(), reference);
    }
}

// ============================================================================
// Merge
// ============================================================================

fn process(quantity: u32) -> Process {
    let mut p = Process::new(Command::parse("./bin/run").expect("cmd"));
    p.quantity = quantity;
    p
}

proptest! {
    /// Merge keeps exactly the incoming names; shared names keep previous
    /// quantity, new names get the default.
    #[test]
    fn prop_merge_preserves_previous_scale(
        incoming in prop::collection::btree_set("[a-z]{1,6}", 0..6),
        previous in prop::collection::btree_map("[a-z]{1,6}", 0u32..50, 0..6),
    ) {
        let incoming_f: Formation = incoming.iter().map(|n| (n.clone(), process(0))).collect();
        let previous_f: Formation = previous.iter().map(|(n, q)| (n.clone(), process(*q))).collect();

        let merged = incoming_f.merge(&previous_f);

        prop_assert_eq!(merged.len(), incoming.len());
        for name in &incoming {
            let p = merged.get(name).expect("present");
            let expected = previous.get(name).copied().unwrap_or_else(|| default_quantity(name));
            prop_assert_eq!(p.quantity, expected);
            prop_assert_eq!(p.constraints, DEFAULT_CONSTRAINTS);
        }
    }

    /// Every Standard Procfile of simple commands plans successfully and
    /// only `web` is exposed.
    #[test]
    fn prop_standard_procfile_only_web_exposed(
        names in prop::collection::btree_set("[a-z]{1,8}", 1..6),
    ) {
        prop_assume!(!names.iter().any(|n| ["null", "true", "false"].contains(&n.as_str())));
        let raw: String = names.iter().map(|n| format!("{n}: ./bin/{n}\n")).collect();
        let formation = formation_from_bytes(&App::default(), raw.as_bytes(), None).expect("plan");
        for (name, p) in formation.iter() {
            prop_assert_eq!(p.expose.is_some(), name == "web");
        }
    }
}

// ============================================================================
// Config keys
// ============================================================================

proptest! {
    /// Arbitrary keys (not in whitelist) are rejected.
    #[test]
    fn prop_arbitrary_keys_rejected(key in "[a-z]{1,20}\\.[a-z]{1,20}") {
        let known = ["docker.timeout_secs", "cache.ttl_secs", "cache.sweep_secs", "app.exposure", "app.cert"];
        if !known.contains(&key.as_str()) {
            prop_assert!(validate_config_key(&key).is_err(), "accepted invalid key: {key}");
        }
    }
}
