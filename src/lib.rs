//! Pack Patcher: signature patching for GBMP pack archives
//!
//! Certain game pack archives are ZIP files whose local-file headers carry
//! the proprietary magic `GBMP` instead of the standard `PK\x03\x04`.
//! Rewriting every occurrence of the magic makes the archive readable by
//! ordinary ZIP tooling. The patcher attaches no meaning to the surrounding
//! container: signatures are opaque byte strings, and patching is a single
//! left-to-right scan-and-substitute pass over the whole file.
//!
//! # Architecture
//!
//! Everything compiles down to one primitive: [`Patcher`], a non-overlapping
//! scan that replaces every occurrence of a source [`Signature`] with a
//! target [`Signature`] in an in-memory buffer. File handling lives in
//! [`patch_file`], which reads the input whole, patches it, and writes the
//! result to a new file; the input is never modified.
//!
//! # Safety
//!
//! - Output writes are atomic (tempfile + fsync + rename)
//! - Signatures are non-empty by construction
//! - A matched region is never re-matched (non-overlapping scan)
//!
//! # Example
//!
//! ```
//! use pack_patcher::{Patcher, Signature, PACK_MAGIC, ZIP_MAGIC};
//!
//! let patcher = Patcher::new(
//!     Signature::new(PACK_MAGIC).unwrap(),
//!     Signature::new(ZIP_MAGIC).unwrap(),
//! );
//!
//! let outcome = patcher.patch(b"\x00GBMP\x00\x00GBMP");
//! assert_eq!(outcome.replacements(), 2);
//! assert_eq!(outcome.data, b"\x00PK\x03\x04\x00\x00PK\x03\x04");
//! ```

pub mod patch;
pub mod signature;

// Re-exports
pub use patch::{
    find_occurrences, fixed_output_path, patch_file, scan_file, FileReport, PatchError,
    PatchOutcome, Patcher,
};
pub use signature::{Signature, SignatureError, PACK_MAGIC, ZIP_MAGIC};
