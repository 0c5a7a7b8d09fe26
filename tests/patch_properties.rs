//! Property tests for the buffer-level patching primitive.

use pack_patcher::{Patcher, Signature, PACK_MAGIC, ZIP_MAGIC};
use proptest::collection::vec;
use proptest::prelude::*;

fn archive_patcher() -> Patcher {
    Patcher::new(
        Signature::new(PACK_MAGIC).unwrap(),
        Signature::new(ZIP_MAGIC).unwrap(),
    )
}

fn contains_magic(buf: &[u8]) -> bool {
    buf.windows(PACK_MAGIC.len()).any(|w| w == PACK_MAGIC)
}

/// Reference implementation: the plain left-to-right scan, one byte at a
/// time. The patcher must agree with it exactly.
fn naive_patch(input: &[u8], source: &[u8], target: &[u8]) -> (Vec<u8>, usize) {
    let mut out = Vec::new();
    let mut count = 0;
    let mut i = 0;
    while i < input.len() {
        if input[i..].starts_with(source) {
            out.extend_from_slice(target);
            i += source.len();
            count += 1;
        } else {
            out.push(input[i]);
            i += 1;
        }
    }
    (out, count)
}

proptest! {
    #[test]
    fn identity_when_signature_absent(input in vec(any::<u8>(), 0..4096)) {
        prop_assume!(!contains_magic(&input));

        let outcome = archive_patcher().patch(&input);
        prop_assert_eq!(outcome.replacements(), 0);
        prop_assert_eq!(outcome.data, input);
    }

    #[test]
    fn equal_length_signatures_preserve_length(input in vec(any::<u8>(), 0..4096)) {
        let outcome = archive_patcher().patch(&input);
        prop_assert_eq!(outcome.data.len(), input.len());
    }

    #[test]
    fn counts_every_separated_copy(
        k in 0usize..32,
        filler in vec(any::<u8>(), 1..16),
    ) {
        prop_assume!(!contains_magic(&filler));

        let mut input = Vec::new();
        for _ in 0..k {
            input.extend_from_slice(&filler);
            input.extend_from_slice(&PACK_MAGIC);
        }
        input.extend_from_slice(&filler);

        let outcome = archive_patcher().patch(&input);
        prop_assert_eq!(outcome.replacements(), k);
    }

    #[test]
    fn agrees_with_naive_scan(
        input in vec(any::<u8>(), 0..1024),
        source in vec(any::<u8>(), 1..5),
        target in vec(any::<u8>(), 1..5),
    ) {
        let patcher = Patcher::new(
            Signature::new(source.clone()).unwrap(),
            Signature::new(target.clone()).unwrap(),
        );

        let outcome = patcher.patch(&input);
        let (expected, count) = naive_patch(&input, &source, &target);

        prop_assert_eq!(outcome.replacements(), count);
        prop_assert_eq!(
            outcome.data.len(),
            input.len() + count * target.len() - count * source.len()
        );
        prop_assert_eq!(outcome.data, expected);
    }

    #[test]
    fn offsets_point_at_the_source_signature(input in vec(any::<u8>(), 0..2048)) {
        let patcher = archive_patcher();
        for offset in patcher.scan(&input) {
            prop_assert_eq!(&input[offset..offset + PACK_MAGIC.len()], &PACK_MAGIC);
        }
    }
}
