//! Line-granular mapping from generated-code locations back to ML source
//! locations (§4.5, §6 wire format): `{version: 1, file, source, mappings,
//! issues}`. Every emitted generated line records one `Mapping`.

use glyph_diagnostics::Issue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub gen_line: u32,
    pub src_line: u32,
    pub src_col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMap {
    pub version: u32,
    pub file: String,
    pub source: String,
    pub mappings: Vec<Mapping>,
    pub issues: Vec<Issue>,
}

impl SourceMap {
    pub fn new(file: impl Into<String>, source: impl Into<String>) -> Self {
        Self { version: 1, file: file.into(), source: source.into(), mappings: Vec::new(), issues: Vec::new() }
    }

    pub fn record(&mut self, gen_line: u32, src_line: u32, src_col: u32) {
        self.mappings.push(Mapping { gen_line, src_line, src_col });
    }

    /// The ML source location for a generated line, if one was recorded —
    /// sufficient for a debugger to resolve generated-code breakpoints
    /// back to ML source (§4.5).
    pub fn resolve(&self, gen_line: u32) -> Option<&Mapping> {
        self.mappings.iter().find(|m| m.gen_line == gen_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_recorded_line() {
        let mut map = SourceMap::new("out.py", "x = 1;");
        map.record(1, 1, 1);
        assert_eq!(map.resolve(1), Some(&Mapping { gen_line: 1, src_line: 1, src_col: 1 }));
        assert_eq!(map.resolve(2), None);
    }
}
