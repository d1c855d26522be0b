//! Security analyzer (C4): three phases run in a fixed order over the AST
//! — pattern detection, AST-structural analysis, and coarse intraprocedural
//! taint tracking — each emitting [`glyph_diagnostics::Issue`]s into one
//! shared accumulator.

pub mod analyzer;
pub mod detector;
pub mod phase_b;
pub mod phase_c;

pub use analyzer::{analyze, AnalysisResult, AnalyzerOptions, Mode};
pub use phase_b::ImportPolicy;
