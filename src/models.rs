use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset};
use serde::{self, Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum RecordType {
    #[serde(rename = "contest")]
    Contest,
    #[serde(rename = "judgement-types")]
    JudgementTypes,
    #[serde(rename = "languages")]
    Languages,
    #[serde(rename = "problems")]
    Problems,
    #[serde(rename = "groups")]
    Groups,
    #[serde(rename = "organizations")]
    Organizations,
    #[serde(rename = "teams")]
    Teams,
    #[serde(rename = "state")]
    State,
    #[serde(rename = "submissions")]
    Submissions,
    #[serde(rename = "judgements")]
    Judgements,
    #[serde(rename = "runs")]
    Runs,
    #[serde(rename = "scoreboard")]
    Scoreboard,
    #[serde(rename = "awards")]
    Awards,
}

/// One line of the NDJSON snapshot export.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SnapshotRecord {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JudgementType {
    pub id: String,
    pub name: Option<String>,
    pub penalty: bool,
    pub solved: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub hidden: bool,
    pub icpc_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub sortorder: i32,
    pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Organization {
    pub id: String,
    pub icpc_id: Option<String>,
    pub name: String,
    pub formal_name: String,
    pub shortname: String,
    pub country: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Team {
    pub organization_id: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    pub group_ids: Vec<String>,
    pub affiliation: Option<String>,
    pub members: Option<String>,
    pub id: String,
    pub icpc_id: Option<String>,
    pub label: Option<String>,
    pub name: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Problem {
    pub ordinal: i32,
    pub id: String,
    pub rgb: Option<String>,
    pub color: Option<String>,
    pub label: String,
    #[serde(rename = "externalid")]
    pub external_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Submission {
    pub language_id: Option<String>,
    #[serde(default, deserialize_with = "from_opt_datetime")]
    pub time: Option<DateTime<FixedOffset>>,
    #[serde(deserialize_with = "from_duration_str")]
    pub contest_time: Duration,
    pub team_id: String,
    pub problem_id: String,
    pub id: String,
    pub external_id: Option<String>,

    /// Resolved during enrichment; every submission reaching the ranker
    /// carries its judgement type.
    #[serde(skip)]
    pub judgement_type: Option<JudgementType>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Judgement {
    #[serde(default, deserialize_with = "from_opt_duration_str")]
    pub start_contest_time: Option<Duration>,
    #[serde(default, deserialize_with = "from_opt_duration_str")]
    pub end_contest_time: Option<Duration>,
    pub submission_id: String,
    pub id: String,
    pub valid: bool,
    pub judgement_type_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Contest {
    #[serde(default, deserialize_with = "from_opt_datetime")]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "from_opt_datetime")]
    pub end_time: Option<DateTime<FixedOffset>>,

    #[serde(deserialize_with = "from_duration_str")]
    pub duration: Duration,
    #[serde(deserialize_with = "from_duration_str")]
    pub scoreboard_freeze_duration: Duration,
    pub id: String,
    pub name: String,
    pub shortname: Option<String>,
    pub formal_name: Option<String>,
    #[serde(default)]
    pub penalty_time: i32,
}

impl Contest {
    /// Contest-relative instant at which the scoreboard freezes. Submissions
    /// at or after this point never count for first-to-solve.
    pub fn freeze_cutoff(&self) -> Duration {
        self.duration - self.scoreboard_freeze_duration
    }
}

/// Scoring triple for one scoreboard row. `max_submission_id` starts at zero
/// and is filled in by the ranker; rank equality compares the full triple.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Score {
    pub num_solved: i32,
    pub total_time: i64,
    #[serde(skip_deserializing, default)]
    pub max_submission_id: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScoreboardRow {
    pub team_id: String,
    pub score: Score,
    #[serde(skip_deserializing, default)]
    pub rank: u32,
    #[serde(skip_deserializing, default)]
    pub real_rank: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScoreboardSnapshot {
    pub rows: Vec<ScoreboardRow>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AwardRecord {
    pub id: String,
    pub citation: String,
    pub team_ids: Vec<String>,
    pub show: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<String>,
}

/// One audit row of the award ledger; a team appears once per award won.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub team_id: String,
    pub team_name: String,
    pub group_names: String,
    pub affiliation: String,
    pub citation: String,
    pub members: String,
}

#[derive(Debug, Default)]
pub struct ContestState {
    pub contest: Option<Contest>,
    pub judgement_types: HashMap<String, JudgementType>,
    pub groups: HashMap<String, Group>,
    pub organizations: HashMap<String, Organization>,
    pub teams: HashMap<String, Team>,
    pub problems: HashMap<String, Problem>,
    pub judgements: HashMap<String, Judgement>,
    /// Kept as a sequence: category allocation depends on submission order.
    pub submissions: Vec<Submission>,
    pub scoreboard: Vec<ScoreboardRow>,
}

impl ContestState {
    pub fn new() -> Self {
        Self::default()
    }
}

fn from_opt_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    if let Some(s) = opt {
        let dt = DateTime::parse_from_rfc3339(&s).map_err(serde::de::Error::custom)?;
        Ok(Some(dt))
    } else {
        Ok(None)
    }
}

fn parse_clock_duration(s: &str) -> Result<Duration, String> {
    let negative = s.starts_with('-');
    let trimmed = s.trim_start_matches('-');
    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("invalid duration format: {}", s));
    }

    let hours: i64 = parts[0].parse::<i64>().map_err(|e| e.to_string())?;
    let minutes: i64 = parts[1].parse::<i64>().map_err(|e| e.to_string())?;
    let seconds: f64 = parts[2].parse::<f64>().map_err(|e| e.to_string())?;

    let total_secs = (hours * 3600 + minutes * 60) + seconds as i64;
    Ok(if negative {
        -Duration::seconds(total_secs)
    } else {
        Duration::seconds(total_secs)
    })
}

fn from_duration_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_clock_duration(&s).map_err(serde::de::Error::custom)
}

fn from_opt_duration_str<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        Some(s) => parse_clock_duration(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub trait HasId {
    fn id(&self) -> &str;
}

impl HasId for JudgementType {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for Group {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for Organization {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for Team {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for Problem {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for Judgement {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for Submission {
    fn id(&self) -> &str {
        &self.id
    }
}
