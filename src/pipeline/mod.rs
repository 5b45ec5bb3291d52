//! Pipeline stages for DOCX-to-Discord conversion.
//!
//! Each submodule implements exactly one transformation step and is tested
//! in isolation.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ docx ──▶ normalize ──▶ html ──▶ classify ──▶ transcribe ──▶ chunk
//! (URL/path) (XML→HTML) (regex)  (html5ever)             │
//!                                            inline / list / table
//! ```
//!
//! 1. [`input`]: resolve a path or URL to DOCX bytes
//! 2. [`docx`]: convert WordprocessingML to HTML, storing images via
//!    an [`images::ImageStore`]
//! 3. [`normalize`]: dash paragraphs to `<hr />`, table styling
//! 4. [`html`]: parse into a [`crate::model::DocumentNode`] tree
//! 5. [`classify`]: select the recognized top-level blocks
//! 6. [`transcribe`]: render blocks with [`inline`], [`list`] and [`table`],
//!    then promote the title
//! 7. [`chunk`]: pack blocks into message groups under the budget

pub mod chunk;
pub mod classify;
pub mod docx;
pub mod html;
pub mod images;
pub mod inline;
pub mod input;
pub mod list;
pub mod normalize;
pub mod table;
pub mod transcribe;
