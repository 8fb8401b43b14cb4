use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct GalenaConfig {
    /// Group ids whose teams never occupy an award slot (professional or
    /// otherwise unofficial entries).
    #[serde(default)]
    pub no_occupy_categories: Vec<String>,

    /// How many placement ranks get an ordinal citation.
    #[serde(default = "default_top_placements")]
    pub top_placements: usize,

    #[serde(default = "default_medal_count")]
    pub gold: usize,
    #[serde(default = "default_medal_count")]
    pub silver: usize,
    #[serde(default = "default_medal_count")]
    pub bronze: usize,

    #[serde(default)]
    pub gold_show_list: bool,
    #[serde(default)]
    pub silver_show_list: bool,
    #[serde(default)]
    pub bronze_show_list: bool,
    #[serde(default)]
    pub honors_show_list: bool,

    /// Honorable mention gets no medal; emit its citation record anyway.
    #[serde(default)]
    pub honors_show_citation: bool,

    /// Group ids eligible for the single-winner special category. Empty
    /// disables the category.
    #[serde(default)]
    pub best_group_categories: Vec<String>,
    #[serde(default = "default_best_group_citation")]
    pub best_group_citation: String,

    /// This will indicate which submissions to filter out.
    /// Will fix issues like DOMjudge using a hard coded non-existing team to
    /// run problem validation.
    #[serde(default)]
    pub filter_team_submissions: Vec<String>,
}

impl Default for GalenaConfig {
    fn default() -> Self {
        Self {
            no_occupy_categories: Vec::new(),
            top_placements: default_top_placements(),
            gold: default_medal_count(),
            silver: default_medal_count(),
            bronze: default_medal_count(),
            gold_show_list: false,
            silver_show_list: false,
            bronze_show_list: false,
            honors_show_list: false,
            honors_show_citation: false,
            best_group_categories: Vec::new(),
            best_group_citation: default_best_group_citation(),
            filter_team_submissions: Vec::new(),
        }
    }
}

fn default_top_placements() -> usize {
    3
}

fn default_medal_count() -> usize {
    4
}

fn default_best_group_citation() -> String {
    "The Best Girls' Team".to_string()
}

pub fn load_galena_config(folder: &str) -> Result<GalenaConfig, String> {
    let config_path = Path::new(folder).join("galena.toml");
    if !config_path.exists() {
        info!(
            "galena.toml not found next to snapshot, using defaults: {}",
            config_path.display()
        );
        return Ok(GalenaConfig::default());
    }

    let raw = fs::read_to_string(&config_path).map_err(|err| {
        format!(
            "Failed to read galena.toml at {}: {}",
            config_path.display(),
            err
        )
    })?;

    toml::from_str::<GalenaConfig>(&raw).map_err(|err| {
        format!(
            "Failed to parse galena.toml at {}: {}",
            config_path.display(),
            err
        )
    })
}
