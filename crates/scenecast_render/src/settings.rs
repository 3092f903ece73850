//! Engine invocation settings.

use scenecast_core::CoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Default engine deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Output quality preset, mapped to the engine's `-q` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// 480p15, fastest
    #[default]
    Low,
    /// 720p30
    Medium,
    /// 1080p60
    High,
    /// 1440p60
    Production,
    /// 2160p60
    #[serde(rename = "4k")]
    FourK,
}

impl Quality {
    /// Command-line flag for this preset
    #[must_use]
    pub const fn flag(&self) -> &'static str {
        match self {
            Self::Low => "-ql",
            Self::Medium => "-qm",
            Self::High => "-qh",
            Self::Production => "-qp",
            Self::FourK => "-qk",
        }
    }
}

impl FromStr for Quality {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "l" => Ok(Self::Low),
            "medium" | "m" => Ok(Self::Medium),
            "high" | "h" => Ok(Self::High),
            "production" | "p" => Ok(Self::Production),
            "4k" | "k" | "fourk" => Ok(Self::FourK),
            other => Err(CoreError::validation(
                "quality",
                format!("unknown quality preset: {other}"),
            )),
        }
    }
}

/// How the engine is launched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Program to execute
    pub program: String,
    /// Arguments placed before the engine flags (e.g. `-m manim` for a python launcher)
    pub program_args: Vec<String>,
    /// Quality preset
    pub quality: Quality,
    /// Deadline for a single render
    pub timeout: Duration,
    /// Extra engine flags placed before the script path
    pub extra_args: Vec<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            program: "manim".to_string(),
            program_args: Vec::new(),
            quality: Quality::default(),
            timeout: DEFAULT_TIMEOUT,
            extra_args: Vec::new(),
        }
    }
}

impl RenderSettings {
    /// Set the program
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set launcher arguments
    #[must_use]
    pub fn with_program_args(mut self, args: Vec<String>) -> Self {
        self.program_args = args;
        self
    }

    /// Set quality preset
    #[must_use]
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Set the deadline
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set extra engine flags
    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }
}
