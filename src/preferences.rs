use std::{fs, path::Path};

use chrono::{Datelike, NaiveDate, Weekday};
use log::info;
use serde::Deserialize;

use crate::{
    slot::{SlotPreference, weekday_name},
    text_manipulators::hhmm_to_minutes,
};

#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("Duplicate weekday: {0}")]
    DuplicateWeekday(String),
    #[error("Unknown weekday: {0}")]
    UnknownWeekday(String),
    #[error("Invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("Invalid court number 0 for {0}")]
    InvalidCourt(String),
    #[error("failed to read preferences file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse preferences document: {0}")]
    Json(#[from] serde_json::Error),
}

/// `{"preferences": [{"weekdays": [...], "time": "HH:MM", "courts": [...]}]}`
#[derive(Debug, Deserialize)]
pub struct PreferencesDocument {
    pub preferences: Vec<PreferenceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PreferenceEntry {
    pub weekdays: Vec<String>,
    pub time: String,
    #[serde(default)]
    pub courts: Vec<u32>,
}

/// At most one [`SlotPreference`] per weekday, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    entries: Vec<SlotPreference>,
}

impl Preferences {
    pub fn from_document(document: PreferencesDocument) -> Result<Self, PreferencesError> {
        let mut entries: Vec<SlotPreference> = vec![];
        for entry in document.preferences {
            let start_time = hhmm_to_minutes(&entry.time)
                .ok_or_else(|| PreferencesError::InvalidTime(entry.time.clone()))?;
            for name in &entry.weekdays {
                let weekday = parse_weekday(name)?;
                if entries.iter().any(|pref| pref.weekday == weekday) {
                    return Err(PreferencesError::DuplicateWeekday(
                        weekday_name(weekday).to_string(),
                    ));
                }
                if entry.courts.contains(&0) {
                    return Err(PreferencesError::InvalidCourt(weekday_name(weekday).to_string()));
                }
                entries.push(SlotPreference {
                    weekday,
                    start_time,
                    preferred_courts: entry.courts.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn from_json(json: &str) -> Result<Self, PreferencesError> {
        Self::from_document(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref();
        info!("Loading preferences from {}", path.display());
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn for_weekday(&self, weekday: Weekday) -> Option<&SlotPreference> {
        self.entries.iter().find(|pref| pref.weekday == weekday)
    }

    pub fn for_date(&self, date: NaiveDate) -> Option<&SlotPreference> {
        self.for_weekday(date.weekday())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotPreference> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_weekday(name: &str) -> Result<Weekday, PreferencesError> {
    let lowercase = name.trim().to_lowercase();
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .find(|weekday| weekday_name(*weekday) == lowercase)
    .ok_or_else(|| PreferencesError::UnknownWeekday(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"{
        "preferences": [
            {"weekdays": ["tuesday"], "time": "16:00", "courts": [3, 4]},
            {"weekdays": ["saturday", "Sunday"], "time": "08:00", "courts": []}
        ]
    }"#;

    #[test]
    fn expands_one_preference_per_weekday() {
        let prefs = Preferences::from_json(EXAMPLE).unwrap();
        assert_eq!(prefs.len(), 3);
        assert_eq!(
            prefs.for_weekday(Weekday::Tue),
            Some(&SlotPreference {
                weekday: Weekday::Tue,
                start_time: 960,
                preferred_courts: vec![3, 4],
            })
        );
        let sunday = prefs.for_weekday(Weekday::Sun).unwrap();
        assert_eq!(sunday.start_time, 480);
        assert!(sunday.preferred_courts.is_empty());
        assert_eq!(prefs.for_weekday(Weekday::Mon), None);
    }

    #[test]
    fn keeps_document_order() {
        let prefs = Preferences::from_json(EXAMPLE).unwrap();
        let order: Vec<_> = prefs.iter().map(|pref| pref.weekday).collect();
        assert_eq!(order, vec![Weekday::Tue, Weekday::Sat, Weekday::Sun]);
    }

    #[test]
    fn lookup_by_date() {
        let prefs = Preferences::from_json(EXAMPLE).unwrap();
        // 2025-08-19 is a Tuesday.
        let date = NaiveDate::from_ymd_opt(2025, 8, 19).unwrap();
        assert_eq!(prefs.for_date(date).map(|p| p.start_time), Some(960));
        assert_eq!(prefs.for_date(date.succ_opt().unwrap()), None);
    }

    #[test]
    fn duplicate_weekday_is_rejected() {
        let json = r#"{"preferences": [
            {"weekdays": ["tuesday"], "time": "16:00", "courts": [3]},
            {"weekdays": ["friday", "tuesday"], "time": "18:00", "courts": [1]}
        ]}"#;
        let err = Preferences::from_json(json).unwrap_err();
        assert!(matches!(err, PreferencesError::DuplicateWeekday(ref d) if d == "tuesday"));
        assert_eq!(err.to_string(), "Duplicate weekday: tuesday");
    }

    #[test]
    fn invalid_documents() {
        let bad_time = r#"{"preferences": [{"weekdays": ["monday"], "time": "25:00", "courts": []}]}"#;
        assert!(matches!(
            Preferences::from_json(bad_time),
            Err(PreferencesError::InvalidTime(_))
        ));
        let bad_day = r#"{"preferences": [{"weekdays": ["funday"], "time": "10:00", "courts": []}]}"#;
        assert!(matches!(
            Preferences::from_json(bad_day),
            Err(PreferencesError::UnknownWeekday(_))
        ));
        let bad_court = r#"{"preferences": [{"weekdays": ["monday"], "time": "10:00", "courts": [0]}]}"#;
        assert!(matches!(
            Preferences::from_json(bad_court),
            Err(PreferencesError::InvalidCourt(_))
        ));
        assert!(matches!(
            Preferences::from_json(r#"{"prefs": []}"#),
            Err(PreferencesError::Json(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("booking_preferences.json");
        fs::write(&path, EXAMPLE).unwrap();
        assert_eq!(Preferences::load(&path).unwrap().len(), 3);
        assert!(matches!(
            Preferences::load(dir.path().join("missing.json")),
            Err(PreferencesError::Io(_))
        ));
    }
}
