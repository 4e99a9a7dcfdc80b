use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Platforms this step knows how to configure.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Online,
    Campus,
    Pathway,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Online, Platform::Campus, Platform::Pathway];

    /// Exact, lowercase match; anything else is outside the recognized set.
    pub fn parse(raw: &str) -> Option<Platform> {
        match raw {
            "online" => Some(Platform::Online),
            "campus" => Some(Platform::Campus),
            "pathway" => Some(Platform::Pathway),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Online => "online",
            Platform::Campus => "campus",
            Platform::Pathway => "pathway",
        }
    }
}

/// The course as handed to this step by the provisioning pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CourseContext {
    // raw so that platforms we don't configure still deserialize
    pub platform: String,
    pub course_code: String,
    pub canvas_ou: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub term_name: Option<String>,
}

pub type TermId = i64;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: TermId,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourseFormat {
    Online,
    OnCampus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CoursePayload {
    pub license: String,
    pub is_public_to_auth_users: bool,
    pub is_public: bool,
    pub public_syllabus_to_auth: bool,
    pub course_format: CourseFormat,
    pub term_id: TermId,
    pub locale: String,
    pub time_zone: String,
    pub grading_standard_id: i64,
    pub sis_course_id: String,
}

impl CoursePayload {
    /// Canvas expects course attributes nested under a `course` key.
    pub fn request_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self).map(|course| serde_json::json!({ "course": course }))
    }
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SettingsPayload {
    pub lock_all_announcements: bool,
    pub allow_student_forum_attachments: bool,
    pub show_announcements_on_home_page: bool,
    // only sent by the permissive shape
    pub allow_student_discussion_editing: Option<bool>,
    pub allow_student_organized_groups: bool,
    pub home_page_announcement_limit: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeaturePayload {
    pub state: String,
}

impl FeaturePayload {
    pub fn on() -> Self {
        Self { state: "on".into() }
    }
}

/// Everything the step will PUT for one course.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPayloads {
    pub platform: Platform,
    pub course: CoursePayload,
    pub settings: SettingsPayload,
    pub features: FeaturePayload,
}
