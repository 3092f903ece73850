//! Scene script inspection.
//!
//! The worker only needs [`find_scene_class`]. The remaining helpers are
//! client-side hygiene for scripts produced by a language model: they catch
//! scripts the engine would reject before a render slot is spent on them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Wildcard import every renderable script starts with
pub const MANIM_IMPORT: &str = "from manim import *";

/// Entry point the engine calls on a scene
pub const CONSTRUCT_SIGNATURE: &str = "def construct(self)";

// Only direct `Scene` subclasses qualify; `ThreeDScene` and friends do not.
static SCENE_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"class\s+(\w+)\s*\(\s*Scene\s*\):").expect("scene class pattern is valid")
});

static PYTHON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```python\n?").expect("python fence pattern is valid"));

static BARE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```\n?").expect("bare fence pattern is valid"));

/// Name of the first class deriving directly from `Scene`, if any.
#[must_use]
pub fn find_scene_class(code: &str) -> Option<&str> {
    SCENE_CLASS
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Remove markdown code fences around a generated script.
///
/// Leading prose is dropped when the import line appears later in the text.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    let code = PYTHON_FENCE.replace_all(text.trim(), "");
    let code = BARE_FENCE.replace_all(&code, "");
    let code = code.trim();

    if !code.starts_with(MANIM_IMPORT) {
        if let Some(idx) = code.find(MANIM_IMPORT) {
            return code[idx..].to_string();
        }
    }
    code.to_string()
}

/// A problem found by [`preflight`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreflightIssue {
    /// `from manim import *` is absent
    MissingImport,
    /// No class derives from `Scene`
    MissingSceneClass,
    /// No `construct(self)` method
    MissingConstruct,
}

impl PreflightIssue {
    /// Human-readable description
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::MissingImport => "missing required imports",
            Self::MissingSceneClass => "missing Scene class",
            Self::MissingConstruct => "missing construct method",
        }
    }
}

impl std::fmt::Display for PreflightIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Result of checking a script before submitting it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflightReport {
    /// Scene class that would be rendered
    pub scene: Option<String>,
    /// Problems found, in check order
    pub issues: Vec<PreflightIssue>,
}

impl PreflightReport {
    /// True when no issue was found
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check a script for the structure the engine needs.
#[must_use]
pub fn preflight(code: &str) -> PreflightReport {
    let mut report = PreflightReport::default();

    if !code.contains(MANIM_IMPORT) {
        report.issues.push(PreflightIssue::MissingImport);
    }
    match find_scene_class(code) {
        Some(scene) => report.scene = Some(scene.to_string()),
        None => report.issues.push(PreflightIssue::MissingSceneClass),
    }
    if !code.contains(CONSTRUCT_SIGNATURE) {
        report.issues.push(PreflightIssue::MissingConstruct);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = r#"
from manim import *

class ConceptScene(Scene):
    def construct(self):
        text = Text("Hello, World!", font_size=72)
        self.play(Write(text))
        self.wait(1)
"#;

    #[test]
    fn test_find_scene_class() {
        assert_eq!(find_scene_class(HELLO), Some("ConceptScene"));
    }

    #[test]
    fn test_find_scene_class_whitespace() {
        let code = "class   Spaced ( Scene ):\n    pass";
        assert_eq!(find_scene_class(code), Some("Spaced"));
    }

    #[test]
    fn test_find_scene_class_first_wins() {
        let code = "class Helper(Scene):\n    pass\nclass Main(Scene):\n    pass";
        assert_eq!(find_scene_class(code), Some("Helper"));
    }

    #[test]
    fn test_find_scene_class_ignores_other_bases() {
        assert_eq!(find_scene_class("class A(ThreeDScene):\n    pass"), None);
        assert_eq!(find_scene_class("class A(Scene, Mixin):\n    pass"), None);
        assert_eq!(find_scene_class("print('no classes')"), None);
    }

    #[test]
    fn test_strip_code_fences() {
        let raw = "```python\nfrom manim import *\n\nclass A(Scene):\n    pass\n```";
        assert_eq!(
            strip_code_fences(raw),
            "from manim import *\n\nclass A(Scene):\n    pass"
        );
    }

    #[test]
    fn test_strip_code_fences_drops_leading_prose() {
        let raw = "Here is your animation:\n```\nfrom manim import *\nclass A(Scene):\n    pass\n```\n";
        let cleaned = strip_code_fences(raw);
        assert!(cleaned.starts_with(MANIM_IMPORT));
        assert!(!cleaned.contains("```"));
    }

    #[test]
    fn test_strip_code_fences_passthrough() {
        let code = "from manim import *\nclass A(Scene):\n    pass";
        assert_eq!(strip_code_fences(code), code);
    }

    #[test]
    fn test_preflight_ok() {
        let report = preflight(HELLO);
        assert!(report.is_ok());
        assert_eq!(report.scene.as_deref(), Some("ConceptScene"));
    }

    #[test]
    fn test_preflight_reports_every_issue() {
        let report = preflight("print('hi')");
        assert_eq!(
            report.issues,
            vec![
                PreflightIssue::MissingImport,
                PreflightIssue::MissingSceneClass,
                PreflightIssue::MissingConstruct,
            ]
        );
        assert!(report.scene.is_none());
    }

    #[test]
    fn test_preflight_missing_construct() {
        let code = "from manim import *\nclass A(Scene):\n    pass";
        let report = preflight(code);
        assert_eq!(report.issues, vec![PreflightIssue::MissingConstruct]);
        assert_eq!(PreflightIssue::MissingConstruct.to_string(), "missing construct method");
    }
}
