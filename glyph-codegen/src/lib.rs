//! Code generator (C6): lowers a typed, analyzed [`glyph_syntax::ast::Program`]
//! to Python-flavored host code as text, plus a line-granular [`SourceMap`]
//! back to ML source. Pure string builder — no Python runtime dependency,
//! validated by the snapshot-style tests in [`generator`].

pub mod error;
pub mod generator;
pub mod names;
pub mod slice_semantics;
pub mod sourcemap;
pub mod value;

pub use error::CodegenError;
pub use generator::{generate, python_string_literal, GenerateOutput, GeneratorOptions, StdlibMode};
pub use slice_semantics::python_slice;
pub use sourcemap::{Mapping, SourceMap};
pub use value::Value;
