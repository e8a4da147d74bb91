//! Property tests for the settings patcher.

use std::path::Path;

use proptest::prelude::*;

use shipwright::settings::{patch, ProductionBlock, BLOCK_BEGIN, BLOCK_END};

fn settings_line() -> impl Strategy<Value = String> {
    // Printable python-ish lines. Short enough that no generated line can
    // carry the legacy banner prefix, and the sentinel lines contain
    // characters outside this class.
    proptest::string::string_regex("[A-Za-z0-9 _=#'\\.\\(\\)\\[\\]]{0,40}").unwrap()
}

fn host() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9]{0,12}\\.pythonanywhere\\.com").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: patching twice with the same block equals patching once.
    #[test]
    fn property_patch_is_idempotent(
        lines in proptest::collection::vec(settings_line(), 0..=20),
        host in host(),
    ) {
        let original = lines.join("\n");
        let block = ProductionBlock::new(host).render();
        let file = Path::new("settings.py");

        let once = patch(&original, &block, file).unwrap();
        let twice = patch(&once, &block, file).unwrap();
        prop_assert_eq!(&once, &twice);
    }

    /// PROPERTY: the result contains exactly one begin sentinel and one end
    /// sentinel, regardless of how many stale blocks the input held.
    #[test]
    fn property_patch_result_has_one_block(
        lines in proptest::collection::vec(settings_line(), 0..=12),
        stale_hosts in proptest::collection::vec(host(), 0..=3),
        host in host(),
    ) {
        let mut original = lines.join("\n");
        for stale in &stale_hosts {
            original.push('\n');
            original.push_str(&ProductionBlock::new(stale.clone()).render());
        }

        let block = ProductionBlock::new(host.clone()).render();
        let result = patch(&original, &block, Path::new("settings.py")).unwrap();

        prop_assert_eq!(result.matches(BLOCK_BEGIN).count(), 1);
        prop_assert_eq!(result.matches(BLOCK_END).count(), 1);
        for stale in &stale_hosts {
            if stale != &host {
                let needle = format!("'{stale}',");
                prop_assert!(!result.contains(&needle));
            }
        }
    }

    /// PROPERTY: patching a block-free file preserves its lines verbatim.
    #[test]
    fn property_patch_preserves_original_lines(
        lines in proptest::collection::vec(settings_line(), 1..=20),
        host in host(),
    ) {
        let original = lines.join("\n");
        let block = ProductionBlock::new(host).render();
        let result = patch(&original, &block, Path::new("settings.py")).unwrap();

        prop_assert!(result.starts_with(&original));
        for line in lines.iter().filter(|l| !l.trim().is_empty()) {
            prop_assert!(result.lines().any(|l| l == line.as_str()));
        }
    }
}
