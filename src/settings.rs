//! Singleton Gantt chart settings with a process-wide TTL cache.
//!
//! The host stores one settings record per deployment. Reads resolve every
//! absent field to a documented default and cache the result for an hour;
//! a successful update invalidates the cache slot so the next read reloads.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::GanttError;
use crate::models::de_checkbox_opt;
use crate::store::HostStore;

/// Default view preset for the widget timeline header.
pub const DEFAULT_VIEW_PRESET: &str = "weekAndDayLetter";
/// Default chart window offsets around "today", in days.
pub const DEFAULT_START_DATE_OFFSET: i64 = 30;
pub const DEFAULT_END_DATE_OFFSET: i64 = 90;
/// Settings cache time-to-live.
pub const SETTINGS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Raw singleton settings record as stored by the host. Every field is
/// optional; an absent record behaves like a record with all fields absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GanttSettingsRecord {
    #[serde(default)]
    pub default_view_preset: Option<String>,
    #[serde(default)]
    pub default_start_date_offset: Option<i64>,
    #[serde(default)]
    pub default_end_date_offset: Option<i64>,
    /// Seconds between widget auto-refreshes; 0 disables.
    #[serde(default)]
    pub auto_refresh_interval: Option<i64>,
    #[serde(default, deserialize_with = "de_checkbox_opt")]
    pub show_progress_line: Option<bool>,
    #[serde(default, deserialize_with = "de_checkbox_opt")]
    pub show_dependencies: Option<bool>,
    #[serde(default, deserialize_with = "de_checkbox_opt")]
    pub enable_task_editing: Option<bool>,
    #[serde(default, deserialize_with = "de_checkbox_opt")]
    pub enable_drag_drop: Option<bool>,
    #[serde(default, deserialize_with = "de_checkbox_opt")]
    pub sync_with_project_updates: Option<bool>,
    #[serde(default, deserialize_with = "de_checkbox_opt")]
    pub update_task_dates_on_drag: Option<bool>,
    #[serde(default, deserialize_with = "de_checkbox_opt")]
    pub create_dependencies_on_link: Option<bool>,
    #[serde(default, deserialize_with = "de_checkbox_opt")]
    pub send_email_on_task_update: Option<bool>,
    #[serde(default)]
    pub bryntum_license_key: Option<String>,
    #[serde(default)]
    pub custom_css: Option<String>,
    #[serde(default)]
    pub custom_js: Option<String>,
}

impl GanttSettingsRecord {
    /// Reject negative offsets and intervals. Called before any settings
    /// change is persisted.
    pub fn validate(&self) -> Result<(), GanttError> {
        if self.default_start_date_offset.is_some_and(|v| v < 0) {
            return Err(GanttError::Validation(
                "Start date offset cannot be negative".into(),
            ));
        }
        if self.default_end_date_offset.is_some_and(|v| v < 0) {
            return Err(GanttError::Validation(
                "End date offset cannot be negative".into(),
            ));
        }
        if self.auto_refresh_interval.is_some_and(|v| v < 0) {
            return Err(GanttError::Validation(
                "Auto refresh interval cannot be negative".into(),
            ));
        }
        Ok(())
    }

    /// Coalesce every absent field to its documented default.
    #[must_use]
    pub fn resolve(&self) -> GanttSettings {
        GanttSettings {
            default_view_preset: self
                .default_view_preset
                .clone()
                .unwrap_or_else(|| DEFAULT_VIEW_PRESET.to_string()),
            default_start_date_offset: self
                .default_start_date_offset
                .unwrap_or(DEFAULT_START_DATE_OFFSET),
            default_end_date_offset: self
                .default_end_date_offset
                .unwrap_or(DEFAULT_END_DATE_OFFSET),
            auto_refresh_interval: self.auto_refresh_interval.unwrap_or(0),
            show_progress_line: self.show_progress_line.unwrap_or(true),
            show_dependencies: self.show_dependencies.unwrap_or(true),
            enable_task_editing: self.enable_task_editing.unwrap_or(true),
            enable_drag_drop: self.enable_drag_drop.unwrap_or(true),
            sync_with_project_updates: self.sync_with_project_updates.unwrap_or(true),
            update_task_dates_on_drag: self.update_task_dates_on_drag.unwrap_or(true),
            create_dependencies_on_link: self.create_dependencies_on_link.unwrap_or(true),
            send_email_on_task_update: self.send_email_on_task_update.unwrap_or(false),
            bryntum_license_key: self.bryntum_license_key.clone().unwrap_or_default(),
            custom_css: self.custom_css.clone().unwrap_or_default(),
            custom_js: self.custom_js.clone().unwrap_or_default(),
        }
    }
}

/// Fully resolved settings served to the widget page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct GanttSettings {
    pub default_view_preset: String,
    pub default_start_date_offset: i64,
    pub default_end_date_offset: i64,
    pub auto_refresh_interval: i64,
    pub show_progress_line: bool,
    pub show_dependencies: bool,
    pub enable_task_editing: bool,
    pub enable_drag_drop: bool,
    pub sync_with_project_updates: bool,
    pub update_task_dates_on_drag: bool,
    pub create_dependencies_on_link: bool,
    pub send_email_on_task_update: bool,
    pub bryntum_license_key: String,
    pub custom_css: String,
    pub custom_js: String,
}

impl Default for GanttSettings {
    fn default() -> Self {
        GanttSettingsRecord::default().resolve()
    }
}

struct CachedSettings {
    settings: GanttSettings,
    loaded_at: Instant,
}

impl CachedSettings {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.loaded_at.elapsed() > ttl
    }
}

/// Settings access with a process-wide cache slot.
///
/// The slot is shared across all request handlers; readers may see a value
/// up to the TTL stale, which is an accepted trade-off. [`Self::update`]
/// invalidates the slot immediately after a successful save.
pub struct SettingsProvider {
    store: Arc<dyn HostStore>,
    slot: RwLock<Option<CachedSettings>>,
    ttl: Duration,
}

impl SettingsProvider {
    /// Create a provider with the default 1-hour TTL.
    #[must_use]
    pub fn new(store: Arc<dyn HostStore>) -> Self {
        Self::with_ttl(store, SETTINGS_CACHE_TTL)
    }

    /// Create a provider with a custom TTL.
    #[must_use]
    pub fn with_ttl(store: Arc<dyn HostStore>, ttl: Duration) -> Self {
        Self {
            store,
            slot: RwLock::new(None),
            ttl,
        }
    }

    /// Return the cached settings if unexpired, otherwise reload from the
    /// store. A missing singleton record resolves to all defaults without
    /// raising; store failures propagate.
    pub async fn get(&self) -> Result<GanttSettings, GanttError> {
        {
            let slot = self.slot.read().await;
            if let Some(cached) = slot.as_ref() {
                if !cached.is_expired(self.ttl) {
                    return Ok(cached.settings.clone());
                }
            }
        }

        let record = self.store.load_settings().await?;
        if record.is_none() {
            debug!("settings record absent, using defaults");
        }
        let settings = record.unwrap_or_default().resolve();

        let mut slot = self.slot.write().await;
        *slot = Some(CachedSettings {
            settings: settings.clone(),
            loaded_at: Instant::now(),
        });
        Ok(settings)
    }

    /// Validate and persist a settings change, then invalidate the cache so
    /// the next [`Self::get`] reloads from the store.
    pub async fn update(&self, record: &GanttSettingsRecord) -> Result<(), GanttError> {
        record.validate()?;
        self.store.save_settings(record).await?;
        self.invalidate().await;
        Ok(())
    }

    /// Drop the cached entry.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        *slot = None;
    }
}
