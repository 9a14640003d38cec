//! Record types served by the lab API
//!
//! Every payload is decoded leniently: text fields the backend omits or
//! sends as `null` come back empty, nullable fields are `Option`, and dates that do not parse as
//! `YYYY-MM-DD` are treated as absent rather than failing the collection.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Common accessors shared by every record type
pub trait Record {
    fn id(&self) -> u64;
    fn slug(&self) -> &str;
    /// Human-facing heading: a name or a title depending on the type
    fn heading(&self) -> &str;
    fn media(&self) -> &Media;
}

/// Optional media URLs attached to any record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Media {
    pub image: Option<String>,
    pub video: Option<String>,
    pub audio: Option<String>,
    pub document: Option<String>,
}

impl Media {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.video.is_none() && self.audio.is_none() && self.document.is_none()
    }
}

/// A to-many relation: either embedded records or bare ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation<T> {
    Ids(Vec<u64>),
    Nested(Vec<T>),
}

impl<T> Default for Relation<T> {
    fn default() -> Self {
        Relation::Ids(Vec::new())
    }
}

impl<T: Record> Relation<T> {
    pub fn len(&self) -> usize {
        match self {
            Relation::Ids(ids) => ids.len(),
            Relation::Nested(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<u64> {
        match self {
            Relation::Ids(ids) => ids.clone(),
            Relation::Nested(items) => items.iter().map(Record::id).collect(),
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        match self {
            Relation::Ids(ids) => ids.contains(&id),
            Relation::Nested(items) => items.iter().any(|item| item.id() == id),
        }
    }

    /// Resolve the relation to headings, looking ids up in `pool`
    pub fn headings<'a>(&'a self, pool: &'a [T]) -> Vec<&'a str> {
        match self {
            Relation::Nested(items) => items.iter().map(Record::heading).collect(),
            Relation::Ids(ids) => ids
                .iter()
                .filter_map(|id| pool.iter().find(|item| item.id() == *id))
                .map(Record::heading)
                .collect(),
        }
    }
}

macro_rules! impl_record {
    ($ty:ty, $heading:ident) => {
        impl Record for $ty {
            fn id(&self) -> u64 {
                self.id
            }
            fn slug(&self) -> &str {
                &self.slug
            }
            fn heading(&self) -> &str {
                &self.$heading
            }
            fn media(&self) -> &Media {
                &self.media
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabMember {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub member_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub position: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(deserialize_with = "lenient_date")]
    pub joined_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_date")]
    pub left_date: Option<NaiveDate>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub order: i32,
    #[serde(flatten)]
    pub media: Media,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub members: Relation<LabMember>,
    #[serde(deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(deserialize_with = "null_as_default")]
    pub github_repo: String,
    #[serde(flatten)]
    pub media: Media,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collaboration {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub collaboration_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub institution: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Relation<Project>,
    #[serde(flatten)]
    pub media: Media,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grant {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub funding_agency: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    /// Decimal fields arrive as strings (`"125000.00"`) from some backends
    #[serde(deserialize_with = "number_or_string")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub principal_investigators: Relation<LabMember>,
    #[serde(deserialize_with = "null_as_default")]
    pub co_investigators: Relation<LabMember>,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Relation<Project>,
    #[serde(flatten)]
    pub media: Media,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Award {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub awarding_body: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "lenient_date")]
    pub date_received: Option<NaiveDate>,
    #[serde(deserialize_with = "null_as_default")]
    pub recipients: Relation<LabMember>,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Relation<Project>,
    #[serde(flatten)]
    pub media: Media,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Publication {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub publication_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub authors: Relation<LabMember>,
    #[serde(deserialize_with = "null_as_default")]
    pub external_authors: String,
    #[serde(rename = "abstract")]
    #[serde(deserialize_with = "null_as_default")]
    pub abstract_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub journal: String,
    #[serde(deserialize_with = "null_as_default")]
    pub conference: String,
    #[serde(deserialize_with = "null_as_default")]
    pub volume: String,
    #[serde(deserialize_with = "null_as_default")]
    pub issue: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pages: String,
    #[serde(deserialize_with = "null_as_default")]
    pub year: i32,
    pub month: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub publisher: String,
    #[serde(deserialize_with = "null_as_default")]
    pub doi: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub citation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Relation<Project>,
    #[serde(flatten)]
    pub media: Media,
}

impl Publication {
    /// Journal, else conference, else nothing
    pub fn venue(&self) -> Option<&str> {
        [self.journal.as_str(), self.conference.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
    }

    /// "Venue, Volume 3, Issue 2, Pages 10-20"
    pub fn venue_line(&self) -> String {
        let mut line = self
            .venue()
            .unwrap_or("Publication venue not specified")
            .to_string();
        if !self.volume.is_empty() {
            line.push_str(&format!(", Volume {}", self.volume));
        }
        if !self.issue.is_empty() {
            line.push_str(&format!(", Issue {}", self.issue));
        }
        if !self.pages.is_empty() {
            line.push_str(&format!(", Pages {}", self.pages));
        }
        line
    }

    pub fn doi_url(&self) -> Option<String> {
        (!self.doi.is_empty()).then(|| format!("https://doi.org/{}", self.doi))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Partnership {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub organization: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contact_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contact_email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Relation<Project>,
    #[serde(flatten)]
    pub media: Media,
}

impl_record!(LabMember, name);
impl_record!(Project, title);
impl_record!(Collaboration, name);
impl_record!(Grant, title);
impl_record!(Award, title);
impl_record!(Publication, title);
impl_record!(Partnership, name);

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok()))
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn member_decodes_with_missing_fields() {
        let member: LabMember =
            serde_json::from_value(json!({"id": 1, "slug": "a", "name": "Alice"})).unwrap();
        assert_eq!(member.name, "Alice");
        assert_eq!(member.bio, "");
        assert!(member.joined_date.is_none());
        assert!(member.media.is_empty());
    }

    #[test]
    fn null_fields_decode_as_defaults() {
        let member: LabMember = serde_json::from_value(json!({
            "id": 2,
            "slug": "b",
            "name": "Bob",
            "bio": null,
            "order": null,
            "is_active": null,
            "image": null
        }))
        .unwrap();
        assert_eq!(member.name, "Bob");
        assert_eq!(member.bio, "");
        assert_eq!(member.order, 0);
        assert!(!member.is_active);

        let publication: Publication = serde_json::from_value(json!({
            "id": 5,
            "title": "Null year",
            "year": null,
            "abstract": null,
            "authors": null
        }))
        .unwrap();
        assert_eq!(publication.year, 0);
        assert_eq!(publication.abstract_text, "");
        assert!(publication.authors.is_empty());
    }

    #[test]
    fn dates_parse_and_bad_dates_are_dropped() {
        let member: LabMember = serde_json::from_value(json!({
            "id": 2,
            "slug": "b",
            "joined_date": "2021-09-01",
            "left_date": "sometime"
        }))
        .unwrap();
        assert_eq!(member.joined_date, NaiveDate::from_ymd_opt(2021, 9, 1));
        assert!(member.left_date.is_none());
    }

    #[test]
    fn relation_accepts_ids_or_nested_records() {
        let by_id: Project =
            serde_json::from_value(json!({"id": 1, "slug": "p", "members": [3, 4]})).unwrap();
        assert_eq!(by_id.members, Relation::Ids(vec![3, 4]));

        let nested: Project = serde_json::from_value(json!({
            "id": 1,
            "slug": "p",
            "members": [{"id": 3, "slug": "c", "name": "Carol"}]
        }))
        .unwrap();
        assert_eq!(nested.members.ids(), vec![3]);
        assert!(nested.members.contains(3));
        assert_eq!(nested.members.headings(&[]), vec!["Carol"]);
    }

    #[test]
    fn id_relations_resolve_against_pool() {
        let pool = vec![
            LabMember {
                id: 7,
                name: "Dana".into(),
                ..Default::default()
            },
            LabMember {
                id: 8,
                name: "Eli".into(),
                ..Default::default()
            },
        ];
        let rel: Relation<LabMember> = Relation::Ids(vec![8, 99]);
        assert_eq!(rel.headings(&pool), vec!["Eli"]);
    }

    #[test]
    fn grant_amount_accepts_decimal_strings() {
        let grant: Grant =
            serde_json::from_value(json!({"id": 1, "slug": "g", "amount": "125000.50"})).unwrap();
        assert_eq!(grant.amount, Some(125000.5));

        let grant: Grant =
            serde_json::from_value(json!({"id": 1, "slug": "g", "amount": 10})).unwrap();
        assert_eq!(grant.amount, Some(10.0));

        let grant: Grant =
            serde_json::from_value(json!({"id": 1, "slug": "g", "amount": null})).unwrap();
        assert_eq!(grant.amount, None);
    }

    #[test]
    fn media_fields_flatten() {
        let award: Award = serde_json::from_value(json!({
            "id": 1,
            "slug": "best-paper",
            "title": "Best Paper",
            "image": "http://localhost:8000/media/images/a.png",
            "video": null
        }))
        .unwrap();
        assert_eq!(
            award.media.image.as_deref(),
            Some("http://localhost:8000/media/images/a.png")
        );
        assert!(award.media.video.is_none());
        assert_eq!(award.heading(), "Best Paper");
    }

    #[test]
    fn publication_venue_line() {
        let publication = Publication {
            conference: "SenSys".into(),
            volume: "3".into(),
            pages: "10-20".into(),
            doi: "10.1000/xyz".into(),
            ..Default::default()
        };
        assert_eq!(publication.venue(), Some("SenSys"));
        assert_eq!(publication.venue_line(), "SenSys, Volume 3, Pages 10-20");
        assert_eq!(
            publication.doi_url().as_deref(),
            Some("https://doi.org/10.1000/xyz")
        );
        assert_eq!(
            Publication::default().venue_line(),
            "Publication venue not specified"
        );
    }
}
