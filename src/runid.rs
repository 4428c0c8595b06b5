//! Run and execution identifier generation.

use rand::Rng;

/// Generate a fresh random identifier in hyphenated hex form.
///
/// Identifiers are not required to be globally unique, only overwhelmingly
/// unlikely to collide between runs of the same pipeline.
pub fn new_guid() -> String {
    let mut rng = rand::rng();
    format!(
        "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
        rng.random::<u32>(),
        rng.random::<u16>(),
        rng.random::<u16>(),
        rng.random::<u16>(),
        rng.random::<u64>() & 0xffff_ffff_ffff
    )
}
