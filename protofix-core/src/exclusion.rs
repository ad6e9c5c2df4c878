use crate::error::ToolError;
use glob::Pattern;

/// Glob patterns over logical paths. `*` also matches across `/`.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<Pattern>,
}

impl ExclusionSet {
    pub fn new<S: AsRef<str>>(globs: &[S]) -> Result<Self, ToolError> {
        let patterns = globs
            .iter()
            .map(|g| {
                Pattern::new(g.as_ref()).map_err(|e| ToolError::InvalidGlob {
                    pattern: g.as_ref().to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_excluded(&self, logical_path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(logical_path))
    }
}
