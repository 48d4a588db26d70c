//! Cross-module scenario and invariant tests (spec §8), kept separate
//! from the inline per-module unit tests the way the teacher crate splits
//! its own `orderbook/tests/` directory out from per-file `#[cfg(test)]`
//! blocks.

mod invariants;
