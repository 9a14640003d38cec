//! Application State
//!
//! Central state for the terminal UI: which page is shown, the selection,
//! filters, and the lab context the pages read from.

use crate::VERSION;
use labsite::api::types::{LabMember, Project, Publication, Record};
use labsite::config::Config;
use labsite::context::{LabContext, LabSnapshot, LoadState};
use labsite::views::{
    self, collaboration_type_label, MemberType, PublicationFilter, PublicationType,
};

/// Number of highlights per section on the home page
const HOME_HIGHLIGHTS: usize = 3;
const HOME_PUBLICATIONS: usize = 5;

/// Application modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Help,
}

/// Top level pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Members,
    Projects,
    Publications,
    Network,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::Members,
        Page::Projects,
        Page::Publications,
        Page::Network,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Members => "members",
            Page::Projects => "projects",
            Page::Publications => "publications",
            Page::Network => "network",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Members => "Our Team",
            Page::Projects => "Projects",
            Page::Publications => "Publications",
            Page::Network => "Grants & Partners",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// One row of a page, with the lines shown in the detail pane
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub section: String,
    pub title: String,
    pub subtitle: String,
    pub detail: Vec<String>,
}

impl Entry {
    fn new(section: &str, title: &str, subtitle: impl Into<String>) -> Self {
        Self {
            section: section.to_string(),
            title: title.to_string(),
            subtitle: subtitle.into(),
            detail: Vec::new(),
        }
    }

    fn line(mut self, label: &str, value: impl AsRef<str>) -> Self {
        let value = value.as_ref();
        if !value.is_empty() {
            self.detail.push(format!("{}: {}", label, value));
        }
        self
    }

    fn text(mut self, value: &str) -> Self {
        if !value.is_empty() {
            self.detail.push(String::new());
            self.detail.push(value.to_string());
        }
        self
    }

    fn media(mut self, record: &impl Record) -> Self {
        let media = record.media();
        for (label, url) in [
            ("Image", &media.image),
            ("Video", &media.video),
            ("Audio", &media.audio),
            ("Document", &media.document),
        ] {
            if let Some(url) = url {
                self.detail.push(format!("{}: {}", label, url));
            }
        }
        self
    }

    fn matches(&self, needle: &str) -> bool {
        views::matches_text(
            &[
                self.section.as_str(),
                self.title.as_str(),
                self.subtitle.as_str(),
            ],
            needle,
        )
    }
}

fn member_entry(section: &str, member: &LabMember) -> Entry {
    Entry::new(section, &member.name, member.position.as_str())
        .line("Email", &member.email)
        .line("Website", &member.website)
        .line(
            "Joined",
            member.joined_date.map(|d| d.to_string()).unwrap_or_default(),
        )
        .line(
            "Left",
            member.left_date.map(|d| d.to_string()).unwrap_or_default(),
        )
        .text(&member.bio)
        .media(member)
}

fn project_entry(section: &str, project: &Project, members: &[LabMember]) -> Entry {
    let period = match (project.start_date, project.end_date) {
        (Some(start), Some(end)) => format!("{} - {}", start, end),
        (Some(start), None) => format!("since {}", start),
        _ => String::new(),
    };
    Entry::new(section, &project.title, period)
        .line("Members", project.members.headings(members).join(", "))
        .line("Website", &project.website)
        .line("GitHub", &project.github_repo)
        .text(&project.description)
        .media(project)
}

fn publication_entry(section: &str, publication: &Publication, members: &[LabMember]) -> Entry {
    let date = match publication.month {
        Some(month) => format!("{}, {}", publication.year, month),
        None => publication.year.to_string(),
    };
    let lab_authors = publication.authors.headings(members).join(", ");
    let authors = if !publication.external_authors.is_empty() {
        publication.external_authors.clone()
    } else if !lab_authors.is_empty() {
        lab_authors
    } else {
        "Authors information unavailable".to_string()
    };
    Entry::new(section, &publication.title, date)
        .line("Authors", authors)
        .line("Venue", publication.venue_line())
        .line("Publisher", &publication.publisher)
        .line("DOI", publication.doi_url().unwrap_or_default())
        .line("URL", &publication.url)
        .text(&publication.abstract_text)
        .media(publication)
}

/// Build the rows of `page` from a loaded snapshot
pub fn page_entries(
    page: Page,
    snapshot: &LabSnapshot,
    publication_filter: &PublicationFilter,
) -> Vec<Entry> {
    let members = &snapshot.lab_members;
    match page {
        Page::Home => {
            let mut entries: Vec<Entry> = members
                .iter()
                .map(|m| member_entry("Lab Members", m))
                .collect();
            entries.extend(
                views::featured_projects(&snapshot.projects, HOME_HIGHLIGHTS)
                    .into_iter()
                    .map(|p| project_entry("Current Projects", p, members)),
            );
            entries.extend(
                views::recent_publications(&snapshot.publications, HOME_PUBLICATIONS)
                    .into_iter()
                    .map(|p| publication_entry("Recent Publications", p, members)),
            );
            entries
        }
        Page::Members => {
            let mut entries: Vec<Entry> = views::members_by_type(members)
                .into_iter()
                .flat_map(|(kind, group)| {
                    group
                        .into_iter()
                        .map(move |m| member_entry(MemberType::label(kind), m))
                })
                .collect();
            entries.extend(
                views::alumni(members)
                    .into_iter()
                    .map(|m| member_entry("Alumni", m)),
            );
            entries
        }
        Page::Projects => views::active_projects(&snapshot.projects)
            .into_iter()
            .map(|p| project_entry("Current Projects", p, members))
            .chain(
                views::past_projects(&snapshot.projects)
                    .into_iter()
                    .map(|p| project_entry("Past Projects", p, members)),
            )
            .collect(),
        Page::Publications => views::filter_publications(&snapshot.publications, publication_filter)
            .into_iter()
            .map(|p| {
                let section = PublicationType::from_code(&p.publication_type)
                    .map(PublicationType::label)
                    .unwrap_or("Publications");
                publication_entry(section, p, members)
            })
            .collect(),
        Page::Network => network_entries(snapshot),
    }
}

fn network_entries(snapshot: &LabSnapshot) -> Vec<Entry> {
    let members = &snapshot.lab_members;
    let projects = &snapshot.projects;
    let mut entries = Vec::new();

    for grant in &snapshot.grants {
        let amount = grant
            .amount
            .map(|a| format!("{:.0} {}", a, grant.currency))
            .unwrap_or_default();
        entries.push(
            Entry::new("Grants", &grant.title, grant.funding_agency.as_str())
                .line("Amount", amount)
                .line(
                    "Principal investigators",
                    grant.principal_investigators.headings(members).join(", "),
                )
                .line(
                    "Co-investigators",
                    grant.co_investigators.headings(members).join(", "),
                )
                .line("Projects", grant.projects.headings(projects).join(", "))
                .text(&grant.description)
                .media(grant),
        );
    }

    for award in &snapshot.awards {
        entries.push(
            Entry::new("Awards", &award.title, award.awarding_body.as_str())
                .line(
                    "Received",
                    award.date_received.map(|d| d.to_string()).unwrap_or_default(),
                )
                .line("Recipients", award.recipients.headings(members).join(", "))
                .line("Projects", award.projects.headings(projects).join(", "))
                .text(&award.description)
                .media(award),
        );
    }

    for collaboration in &snapshot.collaborations {
        entries.push(
            Entry::new(
                "Collaborations",
                &collaboration.name,
                collaboration.institution.as_str(),
            )
            .line(
                "Type",
                collaboration_type_label(&collaboration.collaboration_type),
            )
            .line("Website", &collaboration.website)
            .line(
                "Projects",
                collaboration.projects.headings(projects).join(", "),
            )
            .text(&collaboration.description)
            .media(collaboration),
        );
    }

    for partnership in &snapshot.partnerships {
        entries.push(
            Entry::new(
                "Partnerships",
                &partnership.name,
                partnership.organization.as_str(),
            )
            .line("Contact", &partnership.contact_name)
            .line("Contact email", &partnership.contact_email)
            .line("Website", &partnership.website)
            .line("Projects", partnership.projects.headings(projects).join(", "))
            .text(&partnership.description)
            .media(partnership),
        );
    }

    entries
}

/// Main application state
pub struct App {
    pub context: LabContext,
    pub api_url: String,
    pub page: Page,
    pub mode: Mode,
    pub selected: usize,
    pub filter_text: String,
    pub filter_active: bool,
    pub publication_filter: PublicationFilter,
    pub config: Config,
    /// Advances once per event-loop iteration; drives the loading spinner
    pub tick: usize,
}

impl App {
    pub fn new(context: LabContext, api_url: String, config: Config) -> Self {
        let page = config
            .last_page
            .as_deref()
            .and_then(Page::from_key)
            .unwrap_or(Page::Home);

        Self {
            context,
            api_url,
            page,
            mode: Mode::Normal,
            selected: 0,
            filter_text: String::new(),
            filter_active: false,
            publication_filter: PublicationFilter::default(),
            config,
            tick: 0,
        }
    }

    pub fn version(&self) -> &'static str {
        VERSION
    }

    pub fn state(&self) -> LoadState {
        self.context.state()
    }

    /// Rows of the current page after the text filter
    pub fn visible_entries(&self) -> Vec<Entry> {
        let state = self.state();
        page_entries(self.page, state.snapshot(), &self.publication_filter)
            .into_iter()
            .filter(|e| e.matches(&self.filter_text))
            .collect()
    }

    pub fn switch_page(&mut self, page: Page) {
        if self.page == page {
            return;
        }
        self.page = page;
        self.selected = 0;
        self.clear_filter();
        if let Err(e) = self.config.set_last_page(page.key()) {
            tracing::warn!("Failed to save last page: {}", e);
        }
    }

    pub fn next_page(&mut self) {
        self.switch_page(self.page.next());
    }

    pub fn previous_page(&mut self) {
        self.switch_page(self.page.previous());
    }

    pub fn next(&mut self) {
        let len = self.visible_entries().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn go_to_top(&mut self) {
        self.selected = 0;
    }

    pub fn go_to_bottom(&mut self) {
        self.selected = self.visible_entries().len().saturating_sub(1);
    }

    pub fn page_down(&mut self, amount: usize) {
        let len = self.visible_entries().len();
        if len > 0 {
            self.selected = (self.selected + amount).min(len - 1);
        }
    }

    pub fn page_up(&mut self, amount: usize) {
        self.selected = self.selected.saturating_sub(amount);
    }

    pub fn apply_filter(&mut self) {
        self.selected = 0;
    }

    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.selected = 0;
    }

    pub fn cycle_publication_year(&mut self) {
        let years = views::publication_years(&self.state().snapshot().publications);
        self.publication_filter.cycle_year(&years);
        self.selected = 0;
    }

    pub fn cycle_publication_type(&mut self) {
        self.publication_filter.cycle_kind();
        self.selected = 0;
    }

    pub fn reset_publication_filter(&mut self) {
        self.publication_filter = PublicationFilter::default();
        self.selected = 0;
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }
}
