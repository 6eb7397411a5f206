//! # Run Orchestrator
//! Maps a resolved [`RunPlan`] to the set of sections to collect, invokes the
//! adapters one after another, and assembles the final document. A failing
//! adapter marks its section unavailable; the run continues.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::ingest::providers::earnings::{EarningsAdapter, EarningsConfig};
use crate::ingest::providers::economic::{EconomicAdapter, EconomicConfig};
use crate::ingest::providers::forum::{
    ForumAdapter, ForumConfig, ForumCredentials, DEFAULT_SUBFORUM_LIMIT, DEFAULT_USER_LIMIT,
};
use crate::ingest::providers::social::{SocialAdapter, SocialConfig, DEFAULT_POSTS_PER_HANDLE};
use crate::ingest::types::{SourceAdapter, Window};
use crate::report::{ReportDocument, Section};

pub const ECONOMIC_SECTION: &str = "Economic Calendar";
pub const EARNINGS_SECTION: &str = "Earnings Calendar";
pub const SOCIAL_SECTION: &str = "Social Watchlist";
pub const FORUM_SECTION: &str = "Forum Highlights";

/// Everything one run needs, resolved up front. Watchlists are already
/// cleaned; credentials are `None` when unresolved.
#[derive(Debug)]
pub struct RunPlan {
    pub output: PathBuf,
    pub window: Window,
    pub handles: Vec<String>,
    pub social_mirror: String,
    pub forums: Vec<String>,
    pub forum_users: Vec<String>,
    pub forum_credentials: Option<ForumCredentials>,
    pub econ_api_key: String,
    pub countries: Vec<String>,
    pub importance: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// One planned section: either an adapter to invoke, or a section already
/// known to be unavailable (e.g. watchlist given but credentials missing).
pub struct SectionPlan {
    pub title: String,
    pub source: SectionSource,
}

pub enum SectionSource {
    Adapter(Box<dyn SourceAdapter>),
    Unavailable(String),
}

impl SectionPlan {
    pub fn adapter(title: &str, adapter: impl SourceAdapter + 'static) -> Self {
        Self {
            title: title.to_string(),
            source: SectionSource::Adapter(Box::new(adapter)),
        }
    }

    pub fn unavailable(title: &str, reason: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            source: SectionSource::Unavailable(reason.into()),
        }
    }
}

/// Decide which sections this run produces. Calendar sections always run;
/// social and forum run only when their watchlists are non-empty.
pub fn build_sections(plan: &RunPlan) -> Vec<SectionPlan> {
    let mut sections = Vec::new();

    sections.push(SectionPlan::adapter(
        ECONOMIC_SECTION,
        EconomicAdapter::from_config(EconomicConfig {
            window: plan.window,
            countries: plan.countries.clone(),
            importance: plan.importance.clone(),
            api_key: plan.econ_api_key.clone(),
        }),
    ));

    sections.push(SectionPlan::adapter(
        EARNINGS_SECTION,
        EarningsAdapter::from_config(EarningsConfig {
            window: plan.window,
        }),
    ));

    if !plan.handles.is_empty() {
        sections.push(SectionPlan::adapter(
            SOCIAL_SECTION,
            SocialAdapter::from_config(SocialConfig {
                mirror: plan.social_mirror.clone(),
                handles: plan.handles.clone(),
                limit: DEFAULT_POSTS_PER_HANDLE,
                since: None,
            }),
        ));
    }

    if !plan.forums.is_empty() || !plan.forum_users.is_empty() {
        match &plan.forum_credentials {
            Some(credentials) => sections.push(SectionPlan::adapter(
                FORUM_SECTION,
                ForumAdapter::from_config(ForumConfig {
                    credentials: credentials.clone(),
                    subforums: plan.forums.clone(),
                    users: plan.forum_users.clone(),
                    subforum_limit: DEFAULT_SUBFORUM_LIMIT,
                    user_limit: DEFAULT_USER_LIMIT,
                }),
            )),
            None => sections.push(SectionPlan::unavailable(
                FORUM_SECTION,
                "forum credentials are required; pass --forum-client-id/--forum-client-secret \
                 or set FORUM_CLIENT_ID/FORUM_CLIENT_SECRET",
            )),
        }
    }

    sections
}

/// Invoke each planned section in order. Adapter failures become
/// `Unavailable` sections, never a run abort.
pub async fn collect(plans: Vec<SectionPlan>) -> Vec<Section> {
    let mut sections = Vec::with_capacity(plans.len());
    for plan in plans {
        match plan.source {
            SectionSource::Adapter(adapter) => match adapter.fetch().await {
                Ok(records) => {
                    tracing::info!(
                        section = %plan.title,
                        provider = adapter.name(),
                        count = records.len(),
                        "section collected"
                    );
                    sections.push(Section::records(plan.title, records));
                }
                Err(e) => {
                    tracing::warn!(
                        section = %plan.title,
                        provider = adapter.name(),
                        error = ?e,
                        "provider error; marking section unavailable"
                    );
                    sections.push(Section::unavailable(plan.title, format!("{e:#}")));
                }
            },
            SectionSource::Unavailable(reason) => {
                tracing::warn!(section = %plan.title, reason = %reason, "section unavailable");
                sections.push(Section::unavailable(plan.title, reason));
            }
        }
    }
    sections
}

/// One full run: plan → sections → document. Writing is left to the caller
/// so exit status can reflect the write alone.
pub async fn run(plan: &RunPlan) -> ReportDocument {
    let sections = collect(build_sections(plan)).await;
    ReportDocument::new(plan.generated_at, sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn plan() -> RunPlan {
        RunPlan {
            output: PathBuf::from("market_report.md"),
            window: Window::days_ahead(NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(), 7),
            handles: vec![],
            social_mirror: crate::ingest::providers::social::DEFAULT_MIRROR.to_string(),
            forums: vec![],
            forum_users: vec![],
            forum_credentials: None,
            econ_api_key: crate::ingest::providers::economic::GUEST_KEY.to_string(),
            countries: vec![],
            importance: vec![],
            generated_at: DateTime::from_timestamp(1_770_000_000, 0).unwrap(),
        }
    }

    fn titles(sections: &[SectionPlan]) -> Vec<&str> {
        sections.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn calendars_only_without_watchlists() {
        let sections = build_sections(&plan());
        assert_eq!(titles(&sections), vec![ECONOMIC_SECTION, EARNINGS_SECTION]);
    }

    #[test]
    fn social_section_requires_handles() {
        let mut p = plan();
        p.handles = vec!["MarketWatch".to_string()];
        let sections = build_sections(&p);
        assert_eq!(
            titles(&sections),
            vec![ECONOMIC_SECTION, EARNINGS_SECTION, SOCIAL_SECTION]
        );
    }

    #[test]
    fn forum_watchlist_without_credentials_plans_unavailable_section() {
        let mut p = plan();
        p.forums = vec!["stocks".to_string()];
        let sections = build_sections(&p);
        assert_eq!(
            titles(&sections),
            vec![ECONOMIC_SECTION, EARNINGS_SECTION, FORUM_SECTION]
        );
        assert!(matches!(
            sections.last().unwrap().source,
            SectionSource::Unavailable(_)
        ));
    }
}
