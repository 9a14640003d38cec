//! Derived views over a [`LabSnapshot`](crate::context::LabSnapshot)
//!
//! Pure functions the pages render from: member groups, active/past
//! projects, publication filters and home page highlights.

use crate::api::types::{LabMember, Project, Publication};

/// Member categories, in the order the team page lists them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberType {
    Professor,
    Postdoc,
    Phd,
    Masters,
    ResearchAssistant,
    ResearchAssociate,
    Staff,
    Other,
}

impl MemberType {
    pub const DISPLAY_ORDER: [MemberType; 8] = [
        MemberType::Professor,
        MemberType::Postdoc,
        MemberType::Phd,
        MemberType::Masters,
        MemberType::ResearchAssistant,
        MemberType::ResearchAssociate,
        MemberType::Staff,
        MemberType::Other,
    ];

    pub fn code(self) -> &'static str {
        match self {
            MemberType::Professor => "PROF",
            MemberType::Postdoc => "POSTDOC",
            MemberType::Phd => "PHD",
            MemberType::Masters => "MASTERS",
            MemberType::ResearchAssistant => "RA",
            MemberType::ResearchAssociate => "ASSOC",
            MemberType::Staff => "STAFF",
            MemberType::Other => "OTHER",
        }
    }

    /// Plural heading used on the team page
    pub fn label(self) -> &'static str {
        match self {
            MemberType::Professor => "Professors",
            MemberType::Postdoc => "Postdoctoral Fellows",
            MemberType::Phd => "PhD Researchers",
            MemberType::Masters => "Masters Students",
            MemberType::ResearchAssistant => "Research Assistants",
            MemberType::ResearchAssociate => "Research Associates",
            MemberType::Staff => "Staff",
            MemberType::Other => "Others",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::DISPLAY_ORDER
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(code))
    }
}

/// Publication categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicationType {
    Journal,
    Conference,
    Book,
    Chapter,
    Thesis,
    Report,
    Other,
}

impl PublicationType {
    pub const ALL: [PublicationType; 7] = [
        PublicationType::Journal,
        PublicationType::Conference,
        PublicationType::Book,
        PublicationType::Chapter,
        PublicationType::Thesis,
        PublicationType::Report,
        PublicationType::Other,
    ];

    pub fn code(self) -> &'static str {
        match self {
            PublicationType::Journal => "JOURNAL",
            PublicationType::Conference => "CONF",
            PublicationType::Book => "BOOK",
            PublicationType::Chapter => "CHAPTER",
            PublicationType::Thesis => "THESIS",
            PublicationType::Report => "REPORT",
            PublicationType::Other => "OTHER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PublicationType::Journal => "Journal Articles",
            PublicationType::Conference => "Conference Papers",
            PublicationType::Book => "Books",
            PublicationType::Chapter => "Book Chapters",
            PublicationType::Thesis => "Theses",
            PublicationType::Report => "Technical Reports",
            PublicationType::Other => "Other Publications",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code().eq_ignore_ascii_case(code))
    }
}

/// Label for a collaboration type code (`LAB`, `PROV`, `NAT`, `INT`)
pub fn collaboration_type_label(code: &str) -> &str {
    match code {
        "LAB" => "Other Lab",
        "PROV" => "Provincial",
        "NAT" => "National",
        "INT" => "International",
        other => other,
    }
}

/// Active members grouped by type, in display order, empty groups omitted
pub fn members_by_type(members: &[LabMember]) -> Vec<(MemberType, Vec<&LabMember>)> {
    MemberType::DISPLAY_ORDER
        .into_iter()
        .map(|kind| {
            let group: Vec<&LabMember> = members
                .iter()
                .filter(|m| m.is_active && MemberType::from_code(&m.member_type) == Some(kind))
                .collect();
            (kind, group)
        })
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

/// Former members
pub fn alumni(members: &[LabMember]) -> Vec<&LabMember> {
    members.iter().filter(|m| !m.is_active).collect()
}

pub fn active_projects(projects: &[Project]) -> Vec<&Project> {
    projects.iter().filter(|p| p.is_active).collect()
}

pub fn past_projects(projects: &[Project]) -> Vec<&Project> {
    projects.iter().filter(|p| !p.is_active).collect()
}

/// Home page: first few active projects
pub fn featured_projects(projects: &[Project], limit: usize) -> Vec<&Project> {
    projects.iter().filter(|p| p.is_active).take(limit).collect()
}

/// Home page: first few publications as served
pub fn recent_publications(publications: &[Publication], limit: usize) -> Vec<&Publication> {
    publications.iter().take(limit).collect()
}

/// Publication filter selected on the publications page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublicationFilter {
    pub year: Option<i32>,
    pub kind: Option<PublicationType>,
}

impl PublicationFilter {
    pub fn matches(&self, publication: &Publication) -> bool {
        let kind = PublicationType::from_code(&publication.publication_type);
        self.year.map_or(true, |year| publication.year == year)
            && self.kind.map_or(true, |wanted| kind == Some(wanted))
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.kind.is_none()
    }

    /// Step the year filter through `years` (None -> first -> ... -> last -> None)
    pub fn cycle_year(&mut self, years: &[i32]) {
        self.year = cycle(self.year, years);
    }

    pub fn cycle_kind(&mut self) {
        self.kind = cycle(self.kind, &PublicationType::ALL);
    }
}

fn cycle<T: Copy + PartialEq>(current: Option<T>, options: &[T]) -> Option<T> {
    match current {
        None => options.first().copied(),
        Some(value) => options
            .iter()
            .position(|o| *o == value)
            .and_then(|i| options.get(i + 1))
            .copied(),
    }
}

/// Filtered publications, newest first (year, then month; missing month sorts last)
pub fn filter_publications<'a>(
    publications: &'a [Publication],
    filter: &PublicationFilter,
) -> Vec<&'a Publication> {
    let mut selected: Vec<&Publication> =
        publications.iter().filter(|p| filter.matches(p)).collect();
    selected.sort_by(|a, b| {
        b.year
            .cmp(&a.year)
            .then_with(|| b.month.unwrap_or(0).cmp(&a.month.unwrap_or(0)))
    });
    selected
}

/// Distinct publication years, newest first
pub fn publication_years(publications: &[Publication]) -> Vec<i32> {
    let mut years: Vec<i32> = publications.iter().map(|p| p.year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// Case-insensitive substring match over a set of fields
pub fn matches_text(fields: &[&str], needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}
