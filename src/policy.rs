//! Versioned platform policy.
//!
//! Every platform-dependent decision the resolver makes is looked up here
//! rather than branched on at call sites. The built-in table can be replaced
//! wholesale with a JSON file (`POLICY_FILE`).

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    models::{Platform, TermId},
};

pub const POLICY_VERSION: u32 = 2;

/// Which course payload variant a platform receives.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourseShape {
    /// `online` format, bare SIS id, fixed default term.
    Online,
    /// `on_campus` format, suffixed SIS id, term taken from lookup when possible.
    Campus,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SettingsShape {
    /// No discussion-editing key, student groups disabled.
    Conservative,
    /// Discussion editing and student groups enabled.
    Permissive,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformPolicy {
    pub course_shape: CourseShape,
    pub settings_shape: SettingsShape,
    /// Resolve `term_name` against the account's enrollment terms.
    pub lookup_term: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CourseDefaults {
    pub license: String,
    pub locale: String,
    pub time_zone: String,
    pub grading_standard_id: i64,
    /// Term used when no lookup happens or the lookup yields nothing usable.
    pub default_term_id: TermId,
    pub sis_suffix: String,
    pub announcement_limit: u32,
}

impl Default for CourseDefaults {
    fn default() -> Self {
        Self {
            license: "private".into(),
            locale: "en".into(),
            time_zone: "America/Denver".into(),
            grading_standard_id: 1,
            default_term_id: 5,
            sis_suffix: "-InstructorLastName".into(),
            announcement_limit: 2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    pub version: u32,
    #[serde(default)]
    pub defaults: CourseDefaults,
    #[serde(default = "default_fallback_term")]
    pub fallback_term_name: String,
    #[serde(default = "default_feature_flag")]
    pub feature_flag: String,
    pub platforms: BTreeMap<Platform, PlatformPolicy>,
}

fn default_fallback_term() -> String {
    "Default Term".into()
}

fn default_feature_flag() -> String {
    "new_gradebook".into()
}

impl PolicyTable {
    pub fn builtin() -> Self {
        let conservative_online = PlatformPolicy {
            course_shape: CourseShape::Online,
            settings_shape: SettingsShape::Conservative,
            lookup_term: false,
        };
        let platforms = BTreeMap::from([
            (Platform::Online, conservative_online),
            (Platform::Pathway, conservative_online),
            (
                Platform::Campus,
                PlatformPolicy {
                    course_shape: CourseShape::Campus,
                    settings_shape: SettingsShape::Permissive,
                    lookup_term: true,
                },
            ),
        ]);
        Self {
            version: POLICY_VERSION,
            defaults: CourseDefaults::default(),
            fallback_term_name: default_fallback_term(),
            feature_flag: default_feature_flag(),
            platforms,
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::PolicyRead {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::PolicyParse {
            path: path.display().to_string(),
            source,
        })
    }

    /// `None` when the platform is unknown or has no entry in this table.
    pub fn rule_for(&self, raw_platform: &str) -> Option<(Platform, &PlatformPolicy)> {
        let platform = Platform::parse(raw_platform)?;
        self.platforms.get(&platform).map(|rule| (platform, rule))
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::builtin()
    }
}
