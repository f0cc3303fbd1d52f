//! Chapter and stage data
//!
//! A campaign is an ordered list of chapters, each an ordered list of stages.
//! Story mode walks a single global stage index across all chapters.

use serde::{Deserialize, Serialize};

use super::rotation::RotationConfig;

/// Errors raised while loading campaign data
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("JSON deserialization failed: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Campaign has no playable stages")]
    Empty,

    #[error("Chapter {0} has no stages")]
    EmptyChapter(String),
}

/// Per-stage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    #[serde(flatten)]
    pub rotation: RotationConfig,

    /// Knives that must stick to clear the stage
    pub required_knives: u32,
    /// Pre-stuck knives placed on the target (0-20)
    pub obstacle_count: u32,
    /// Target-points that must be hit before the stage can clear (0-10)
    pub target_point_count: u32,

    /// Minimum gap between an obstacle or point and any occupied slot
    pub min_angle_gap: f32,
    /// Minimum gap between two target-points
    pub target_point_gap: f32,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            rotation: RotationConfig::default(),
            required_knives: 10,
            obstacle_count: 0,
            target_point_count: 0,
            min_angle_gap: 30.0,
            target_point_gap: 30.0,
        }
    }
}

/// A themed run of stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterData {
    pub name: String,
    pub number: u32,
    pub stages: Vec<StageSettings>,
}

impl ChapterData {
    pub fn total_stages(&self) -> usize {
        self.stages.len()
    }

    /// Local stage lookup; an invalid index logs and falls back to stage 0.
    /// `None` only for a chapter without stages.
    pub fn stage(&self, index: usize) -> Option<&StageSettings> {
        self.stages.get(index).or_else(|| {
            log::error!("Invalid stage index {} in chapter {}", index, self.name);
            self.stages.first()
        })
    }
}

/// All chapters plus the endless-mode stage
///
/// Always holds at least one chapter and no empty chapter; deserializing
/// goes through the same validation as `Campaign::new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCampaign")]
pub struct Campaign {
    chapters: Vec<ChapterData>,
    infinite: StageSettings,
}

/// Campaign as written in JSON, before validation
#[derive(Deserialize)]
struct RawCampaign {
    chapters: Vec<ChapterData>,
    #[serde(default = "default_infinite_settings")]
    infinite: StageSettings,
}

impl TryFrom<RawCampaign> for Campaign {
    type Error = ConfigError;

    fn try_from(raw: RawCampaign) -> Result<Self, Self::Error> {
        Self::new(raw.chapters, raw.infinite)
    }
}

fn default_infinite_settings() -> StageSettings {
    StageSettings {
        obstacle_count: 2,
        required_knives: u32::MAX,
        ..StageSettings::default()
    }
}

impl Campaign {
    /// Build a campaign, rejecting empty chapters
    pub fn new(chapters: Vec<ChapterData>, infinite: StageSettings) -> Result<Self, ConfigError> {
        let campaign = Self { chapters, infinite };
        campaign.validate()?;
        Ok(campaign)
    }

    /// Parse a campaign from JSON; missing stage fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawCampaign = serde_json::from_str(json)?;
        let campaign = Self::try_from(raw)?;
        log::info!(
            "Loaded campaign: {} chapters, {} stages",
            campaign.chapters.len(),
            campaign.total_stages()
        );
        Ok(campaign)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.chapters.is_empty() {
            return Err(ConfigError::Empty);
        }
        if let Some(chapter) = self.chapters.iter().find(|c| c.stages.is_empty()) {
            return Err(ConfigError::EmptyChapter(chapter.name.clone()));
        }
        Ok(())
    }

    /// Two-chapter campaign bundled with the binary
    pub fn builtin() -> Self {
        let warmup = ChapterData {
            name: "Orchard".to_string(),
            number: 1,
            stages: (0..5u32)
                .map(|i| StageSettings {
                    rotation: RotationConfig {
                        min_max_speed: 60.0 + i as f32 * 15.0,
                        max_max_speed: 120.0 + i as f32 * 20.0,
                        reverse_direction: i >= 2,
                        ..RotationConfig::default()
                    },
                    required_knives: 6 + i,
                    obstacle_count: i / 2,
                    target_point_count: if i == 4 { 2 } else { 0 },
                    ..StageSettings::default()
                })
                .collect(),
        };

        let harder = ChapterData {
            name: "Foundry".to_string(),
            number: 2,
            stages: (0..5u32)
                .map(|i| StageSettings {
                    rotation: RotationConfig {
                        min_start_speed: 40.0,
                        max_start_speed: 100.0,
                        min_max_speed: 140.0 + i as f32 * 20.0,
                        max_max_speed: 220.0 + i as f32 * 25.0,
                        acceleration_ratio: 0.6,
                        min_hold_time: 0.6,
                        max_hold_time: 2.0,
                        reverse_deceleration: 160.0,
                        ..RotationConfig::default()
                    },
                    required_knives: 8 + i,
                    obstacle_count: 1 + i,
                    target_point_count: i / 2,
                    ..StageSettings::default()
                })
                .collect(),
        };

        Self {
            chapters: vec![warmup, harder],
            infinite: default_infinite_settings(),
        }
    }

    pub fn chapters(&self) -> &[ChapterData] {
        &self.chapters
    }

    pub fn infinite_settings(&self) -> &StageSettings {
        &self.infinite
    }

    pub fn total_stages(&self) -> usize {
        self.chapters.iter().map(ChapterData::total_stages).sum()
    }

    /// Chapter index and local stage index for a global stage index
    pub fn locate(&self, global: usize) -> Option<(usize, usize)> {
        let mut first = 0;
        for (chapter_index, chapter) in self.chapters.iter().enumerate() {
            if global < first + chapter.total_stages() {
                return Some((chapter_index, global - first));
            }
            first += chapter.total_stages();
        }
        None
    }

    /// Chapter containing a global stage index
    pub fn chapter_of(&self, global: usize) -> Option<&ChapterData> {
        self.locate(global).map(|(chapter, _)| &self.chapters[chapter])
    }

    /// Settings for a global stage index; out of range logs and falls back to
    /// the very first stage
    pub fn stage(&self, global: usize) -> &StageSettings {
        if let Some(stage) = self
            .locate(global)
            .and_then(|(chapter, local)| self.chapters[chapter].stages.get(local))
        {
            return stage;
        }
        log::error!("Invalid global stage index: {}", global);
        self.chapters
            .first()
            .and_then(|chapter| chapter.stage(0))
            .unwrap_or(&self.infinite)
    }
}

impl Default for Campaign {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layout() {
        let campaign = Campaign::builtin();
        assert_eq!(campaign.total_stages(), 10);
        assert_eq!(campaign.locate(0), Some((0, 0)));
        assert_eq!(campaign.locate(4), Some((0, 4)));
        assert_eq!(campaign.locate(5), Some((1, 0)));
        assert_eq!(campaign.locate(10), None);
        assert_eq!(campaign.chapter_of(7).map(|c| c.number), Some(2));
    }

    #[test]
    fn test_out_of_range_falls_back_to_first_stage() {
        let campaign = Campaign::builtin();
        assert_eq!(campaign.stage(99), campaign.stage(0));
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "chapters": [
                { "name": "One", "number": 1, "stages": [
                    { "required_knives": 4, "min_max_speed": 50.0, "obstacle_count": 3 },
                    {}
                ]}
            ]
        }"#;
        let campaign = Campaign::from_json(json).unwrap();
        let first = campaign.stage(0);
        assert_eq!(first.required_knives, 4);
        assert_eq!(first.obstacle_count, 3);
        assert_eq!(first.rotation.min_max_speed, 50.0);
        assert_eq!(first.rotation.max_max_speed, 200.0);
        assert!(first.rotation.rotate_clockwise);
        assert_eq!(campaign.stage(1), &StageSettings::default());
        assert_eq!(campaign.infinite_settings().obstacle_count, 2);
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            Campaign::from_json(r#"{ "chapters": [] }"#),
            Err(ConfigError::Empty)
        ));
        assert!(matches!(
            Campaign::from_json(r#"{ "chapters": [{ "name": "Hollow", "number": 1, "stages": [] }] }"#),
            Err(ConfigError::EmptyChapter(name)) if name == "Hollow"
        ));
        assert!(matches!(
            Campaign::from_json("not json"),
            Err(ConfigError::Deserialization(_))
        ));
    }

    #[test]
    fn test_new_validates() {
        assert!(Campaign::new(Vec::new(), StageSettings::default()).is_err());
    }

    #[test]
    fn test_direct_deserialize_validates() {
        assert!(serde_json::from_str::<Campaign>(r#"{ "chapters": [] }"#).is_err());
        assert!(
            serde_json::from_str::<Campaign>(
                r#"{ "chapters": [{ "name": "Hollow", "number": 1, "stages": [] }] }"#
            )
            .is_err()
        );

        let campaign: Campaign = serde_json::from_str(
            r#"{ "chapters": [{ "name": "One", "number": 1, "stages": [{}] }] }"#,
        )
        .unwrap();
        assert_eq!(campaign.total_stages(), 1);
        assert_eq!(campaign.infinite_settings().obstacle_count, 2);
    }

    #[test]
    fn test_serialized_campaign_loads_back() {
        let campaign = Campaign::builtin();
        let json = serde_json::to_string(&campaign).unwrap();
        assert_eq!(Campaign::from_json(&json).unwrap(), campaign);
    }

    #[test]
    fn test_empty_chapter_stage_lookup() {
        let chapter = ChapterData {
            name: "Hollow".to_string(),
            number: 1,
            stages: Vec::new(),
        };
        assert!(chapter.stage(0).is_none());

        let campaign = Campaign::builtin();
        let first = &campaign.chapters()[0];
        assert_eq!(first.stage(42), first.stage(0));
    }
}
