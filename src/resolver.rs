//! Turns a course context into the three payloads the step writes.

use serde::Serialize;

use crate::{
    error::StepError,
    lms::LmsClient,
    models::{
        CourseContext, CourseFormat, CoursePayload, FeaturePayload, Platform, ResolvedPayloads,
        SettingsPayload, TermId,
    },
    policy::{CourseShape, PlatformPolicy, PolicyTable, SettingsShape},
    terms,
};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Resolution {
    pub payloads: ResolvedPayloads,
    /// Non-fatal problems met while resolving, already absorbed.
    pub warnings: Vec<String>,
}

/// `online` -> `Online`; the rest of the name is kept as is.
pub fn capitalize(platform: &str) -> String {
    let mut chars = platform.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn sis_id(platform: Platform, course_code: &str, shape: CourseShape, suffix: &str) -> String {
    let base = format!("{}.Master.{}", capitalize(platform.as_str()), course_code);
    match shape {
        CourseShape::Online => base,
        CourseShape::Campus => base + suffix,
    }
}

pub fn course_payload(
    policy: &PolicyTable,
    platform: Platform,
    rule: &PlatformPolicy,
    course_code: &str,
    term_id: TermId,
) -> CoursePayload {
    let d = &policy.defaults;
    let course_format = match rule.course_shape {
        CourseShape::Online => CourseFormat::Online,
        CourseShape::Campus => CourseFormat::OnCampus,
    };
    CoursePayload {
        license: d.license.clone(),
        is_public_to_auth_users: false,
        is_public: false,
        public_syllabus_to_auth: true,
        course_format,
        term_id,
        locale: d.locale.clone(),
        time_zone: d.time_zone.clone(),
        grading_standard_id: d.grading_standard_id,
        sis_course_id: sis_id(platform, course_code, rule.course_shape, &d.sis_suffix),
    }
}

pub fn settings_payload(shape: SettingsShape, announcement_limit: u32) -> SettingsPayload {
    let permissive = shape == SettingsShape::Permissive;
    SettingsPayload {
        lock_all_announcements: false,
        allow_student_forum_attachments: true,
        show_announcements_on_home_page: true,
        allow_student_discussion_editing: permissive.then_some(true),
        allow_student_organized_groups: permissive,
        home_page_announcement_limit: announcement_limit,
    }
}

pub struct Resolver {
    policy: PolicyTable,
    root_account_id: String,
}

impl Resolver {
    pub fn new(policy: PolicyTable, root_account_id: impl Into<String>) -> Self {
        Self {
            policy,
            root_account_id: root_account_id.into(),
        }
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    /// Gate the platform, settle the term, and build all three payloads.
    ///
    /// Only `StepError::PlatformNotApplicable` is ever returned. Term lookup
    /// failures become warnings and the default term is kept.
    pub async fn resolve(
        &self,
        lms: &dyn LmsClient,
        ctx: &CourseContext,
    ) -> Result<Resolution, StepError> {
        let (platform, rule) =
            self.policy
                .rule_for(&ctx.platform)
                .ok_or_else(|| StepError::PlatformNotApplicable {
                    platform: ctx.platform.clone(),
                })?;

        let mut warnings = Vec::new();
        let default_term = self.policy.defaults.default_term_id;
        let term_id = if rule.lookup_term {
            let account = ctx.account_id.as_deref().unwrap_or(&self.root_account_id);
            match terms::resolve_term_id(
                lms,
                account,
                ctx.term_name.as_deref(),
                &self.policy.fallback_term_name,
            )
            .await
            {
                Ok(Some(id)) => id,
                Ok(None) => default_term,
                Err(e) => {
                    warnings.push(format!(
                        "Term lookup failed, using default term {default_term}: {e}"
                    ));
                    default_term
                }
            }
        } else {
            default_term
        };

        Ok(Resolution {
            payloads: ResolvedPayloads {
                platform,
                course: course_payload(&self.policy, platform, rule, &ctx.course_code, term_id),
                settings: settings_payload(
                    rule.settings_shape,
                    self.policy.defaults.announcement_limit,
                ),
                features: FeaturePayload::on(),
            },
            warnings,
        })
    }
}
