//! Pipeline stages for p-value extraction.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested alone and swapped (e.g. a different text backend) without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ matcher ──▶ normalize ──▶ expand ──▶ filter
//! (pdfium)   (regex)     (rules)       (rand)     (≤ 0.05)
//! ```
//!
//! 1. [`source`]   : page text per document; any page failure makes the
//!    whole document unreadable
//! 2. [`matcher`]  : raw p-value mentions, in order of occurrence
//! 3. [`normalize`]: ordered cleanup rules, exact vs. bound classification,
//!    optional caller-supplied conversion
//! 4. [`expand`]   : threshold tokens become random draws below the
//!    threshold; everything else is parsed as a decimal
//! 5. [`filter`]   : optional removal of non-significant values

pub mod expand;
pub mod filter;
pub mod matcher;
pub mod normalize;
pub mod source;
