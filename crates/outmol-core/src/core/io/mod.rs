//! Reading `.outmol` logs and writing the extracted results.
//!
//! The reader is built from small, independently testable pieces: the atom count
//! resolver, the numeric normalizer that repairs DMol3's fixed-width number quirks and
//! the step record builder in [`outmol`]. The [`export`] module turns a finished corpus
//! into a manifest, a JSON document or a CSV table.

pub mod atom_count;
pub mod export;
pub mod numeric;
pub mod outmol;
pub mod traits;
