//! Browser shell service
//!
//! One `Shell` owns the profile directories, the config file, both
//! databases and every manager built over them. It is constructed once at
//! startup and handed to each view explicitly; views never open their own
//! store handles.

use std::path::{Path, PathBuf};

use kestrel_navigation::{
    DownloadRecord, DownloadStatus, HistoryRecorder, InputResolver, Resolution, Suggestion,
    VisitRecord,
};
use kestrel_privacy::{Decision, Permission, PermissionPolicy, PermissionRule, Verdict};
use kestrel_settings::{
    default_language_settings, BasicSettings, Catalog, SearchEngine, SearchEngines, SettingItem,
    WindowGeometry, WindowSettings,
};
use kestrel_storage::{
    Database, ProfileDirs, SettingsDefaults, HISTORY_DB_NAME, SETTINGS_DB_NAME,
};

use crate::events::{EventBus, ShellEvent};
use crate::Result;

pub struct Shell {
    dirs: ProfileDirs,
    basic: BasicSettings,
    engines: SearchEngines,
    window: WindowSettings,
    policy: PermissionPolicy,
    recorder: HistoryRecorder,
    events: EventBus,
}

impl Shell {
    /// Open the shell over the OS-default profile root.
    pub fn new() -> Result<Self> {
        Self::with_dirs(ProfileDirs::resolve()?)
    }

    /// Open the shell over an explicit profile root.
    pub fn with_profile_root<P: Into<PathBuf>>(root: P) -> Result<Self> {
        Self::with_dirs(ProfileDirs::with_root(root)?)
    }

    fn with_dirs(dirs: ProfileDirs) -> Result<Self> {
        let profile_dir = dirs.profile_dir()?;

        let (ui_translation, preferred_language) = default_language_settings();
        let defaults = SettingsDefaults {
            download_folder: ProfileDirs::default_downloads_dir()
                .to_string_lossy()
                .into_owned(),
            ui_translation,
            preferred_language,
        };

        let settings_db = Database::open_settings(profile_dir.join(SETTINGS_DB_NAME), &defaults)?;
        let history_db = Database::open_history(profile_dir.join(HISTORY_DB_NAME))?;

        let shell = Self {
            basic: BasicSettings::new(settings_db.clone()),
            engines: SearchEngines::new(settings_db.clone()),
            window: WindowSettings::new(dirs.config().clone()),
            policy: PermissionPolicy::new(settings_db),
            recorder: HistoryRecorder::new(history_db),
            events: EventBus::new(),
            dirs,
        };
        tracing::info!(profile = %profile_dir.display(), "shell initialized");
        Ok(shell)
    }

    // === Profile & engine wiring ===

    pub fn profile_dirs(&self) -> &ProfileDirs {
        &self.dirs
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        Ok(self.dirs.cache_dir()?)
    }

    pub fn storage_dir(&self) -> Result<PathBuf> {
        Ok(self.dirs.storage_dir()?)
    }

    // === Events ===

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // === Basic settings ===

    pub fn read_setting(&self, item: SettingItem) -> Result<String> {
        Ok(self.basic.read(item)?)
    }

    pub fn write_setting(&self, item: SettingItem, value: &str) -> Result<()> {
        self.basic.write(item, value)?;
        self.events.publish(ShellEvent::SettingChanged {
            item: item.as_str().to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    pub fn private_browsing(&self) -> Result<bool> {
        Ok(self.basic.private_browsing()?)
    }

    pub fn set_private_browsing(&self, enabled: bool) -> Result<()> {
        self.write_setting(SettingItem::PrivateBrowsing, if enabled { "1" } else { "0" })
    }

    pub fn https_mode(&self) -> Result<bool> {
        Ok(self.basic.https_mode()?)
    }

    pub fn set_https_mode(&self, enabled: bool) -> Result<()> {
        self.write_setting(SettingItem::HttpsMode, if enabled { "1" } else { "0" })
    }

    pub fn download_folder(&self) -> Result<PathBuf> {
        Ok(self.basic.download_folder()?)
    }

    pub fn set_download_folder(&self, path: &Path) -> Result<()> {
        self.write_setting(SettingItem::DownloadFolder, &path.to_string_lossy())
    }

    pub fn ui_translation(&self) -> Result<String> {
        Ok(self.basic.ui_translation()?)
    }

    pub fn set_ui_translation(&self, locale_code: &str) -> Result<()> {
        self.write_setting(SettingItem::UiTranslation, locale_code)
    }

    pub fn preferred_language(&self) -> Result<String> {
        Ok(self.basic.preferred_language()?)
    }

    pub fn set_preferred_language(&self, http_language_code: &str) -> Result<()> {
        self.write_setting(SettingItem::PreferredLanguage, http_language_code)
    }

    /// Message catalog for the active UI translation.
    pub fn catalog(&self) -> Result<Catalog> {
        Ok(Catalog::load(&self.ui_translation()?)?)
    }

    // === Search engines ===

    pub fn search_engines(&self) -> Result<Vec<SearchEngine>> {
        Ok(self.engines.list()?)
    }

    pub fn enabled_search_engine(&self) -> Result<SearchEngine> {
        Ok(self.engines.enabled()?)
    }

    pub fn set_search_engine(&self, provider: &str) -> Result<()> {
        self.engines.set_enabled(provider)?;
        self.events.publish(ShellEvent::SearchEnginesChanged);
        Ok(())
    }

    pub fn add_search_engine(&self, provider: &str, url: &str) -> Result<()> {
        self.engines.add(provider, url)?;
        self.events.publish(ShellEvent::SearchEnginesChanged);
        Ok(())
    }

    pub fn remove_search_engine(&self, provider: &str) -> Result<()> {
        self.engines.remove(provider)?;
        self.events.publish(ShellEvent::SearchEnginesChanged);
        Ok(())
    }

    // === Address bar ===

    /// Resolve address-bar input against the current settings. The enabled
    /// engine and https mode are re-read from the store on every call, so
    /// a settings change takes effect on the next keystroke.
    pub fn resolve_input(&self, input: &str) -> Result<Resolution> {
        let engine = self.engines.enabled()?;
        let https_mode = self.basic.https_mode()?;
        Ok(InputResolver::new(engine.url, https_mode).resolve(input))
    }

    // === Permissions ===

    pub fn decide_permission(&self, permission: Permission, origin: &str) -> Result<Decision> {
        Ok(self.policy.decide(permission, origin)?)
    }

    pub fn remember_permission(
        &self,
        permission: Permission,
        origin: &str,
        verdict: Verdict,
    ) -> Result<()> {
        self.policy.remember(permission, origin, verdict)?;
        self.publish_permission(permission);
        Ok(())
    }

    pub fn forget_permission(&self, permission: Permission, origin: &str) -> Result<()> {
        self.policy.forget(permission, origin)?;
        self.publish_permission(permission);
        Ok(())
    }

    pub fn set_permission_ask(&self, permission: Permission, ask: bool) -> Result<()> {
        self.policy.set_ask(permission, ask)?;
        self.publish_permission(permission);
        Ok(())
    }

    pub fn permission_rule(&self, permission: Permission) -> Result<PermissionRule> {
        Ok(self.policy.rule(permission)?)
    }

    pub fn permission_rules(&self) -> Result<Vec<PermissionRule>> {
        Ok(self.policy.rules()?)
    }

    fn publish_permission(&self, permission: Permission) {
        self.events.publish(ShellEvent::PermissionRuleChanged {
            permission: permission.as_str().to_string(),
        });
    }

    // === History ===

    /// Record a page visit unless private browsing is on.
    pub fn record_visit(&self, url: &str, page_title: &str) -> Result<()> {
        if self.basic.private_browsing()? {
            return Ok(());
        }
        Ok(self.recorder.record_visit(url, page_title)?)
    }

    /// Record a download unless private browsing is on.
    pub fn record_download(
        &self,
        url: &str,
        file_name: &str,
        status: DownloadStatus,
        reference_url: &str,
    ) -> Result<()> {
        if self.basic.private_browsing()? {
            return Ok(());
        }
        Ok(self
            .recorder
            .record_download(url, file_name, status, reference_url)?)
    }

    pub fn visits(&self) -> Result<Vec<VisitRecord>> {
        Ok(self.recorder.visits()?)
    }

    pub fn downloads(&self) -> Result<Vec<DownloadRecord>> {
        Ok(self.recorder.downloads()?)
    }

    pub fn suggestions(&self) -> Result<Vec<Suggestion>> {
        Ok(self.recorder.suggestions()?)
    }

    pub fn clear_visits(&self) -> Result<()> {
        self.recorder.clear_visits()?;
        self.events.publish(ShellEvent::HistoryCleared {
            table: "visits".to_string(),
        });
        Ok(())
    }

    pub fn clear_downloads(&self) -> Result<()> {
        self.recorder.clear_downloads()?;
        self.events.publish(ShellEvent::HistoryCleared {
            table: "downloads".to_string(),
        });
        Ok(())
    }

    // === Window geometry ===

    pub fn save_window_size(&self, width: u32, height: u32) -> Result<()> {
        Ok(self.window.save(width, height)?)
    }

    pub fn window_size(&self, available_width: u32, available_height: u32) -> Result<WindowGeometry> {
        Ok(self.window.read(available_width, available_height)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn shell() -> (TempDir, Shell) {
        let dir = TempDir::new().unwrap();
        let shell = Shell::with_profile_root(dir.path()).unwrap();
        (dir, shell)
    }

    #[test]
    fn test_profile_layout_created() {
        let (dir, shell) = shell();
        let profile = shell.profile_dirs().profile_dir().unwrap();
        assert!(profile.starts_with(dir.path()));
        assert!(profile.join(SETTINGS_DB_NAME).is_file());
        assert!(profile.join(HISTORY_DB_NAME).is_file());
    }

    #[test]
    fn test_setting_round_trip_with_event() {
        let (_dir, shell) = shell();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_cb = Arc::clone(&seen);
        let subscription = shell.events().subscribe(move |event| {
            if matches!(event, ShellEvent::SettingChanged { item, .. } if item == "https_mode") {
                seen_cb.fetch_add(1, Ordering::SeqCst);
            }
        });

        shell.set_https_mode(false).unwrap();
        assert!(!shell.https_mode().unwrap());
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        shell.events().unsubscribe(subscription);
        shell.set_https_mode(true).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_input_follows_settings() {
        let (_dir, shell) = shell();

        // Default engine is Bing, https mode on
        assert_eq!(
            shell.resolve_input("weather today").unwrap(),
            Resolution::Search("https://www.bing.com/search?q=weather today".to_string())
        );
        assert_eq!(
            shell.resolve_input("example.com").unwrap(),
            Resolution::Navigate("https://example.com".to_string())
        );
        assert_eq!(
            shell.resolve_input("http://example.com").unwrap(),
            Resolution::Navigate("https://example.com".to_string())
        );

        shell.set_https_mode(false).unwrap();
        assert_eq!(
            shell.resolve_input("example.com").unwrap(),
            Resolution::Navigate("http://example.com".to_string())
        );

        shell.set_search_engine("Google").unwrap();
        assert_eq!(
            shell.resolve_input("weather today").unwrap(),
            Resolution::Search("https://www.google.com/search?q=weather today".to_string())
        );
    }

    #[test]
    fn test_private_browsing_gates_recording() {
        let (_dir, shell) = shell();

        shell.set_private_browsing(true).unwrap();
        shell.record_visit("https://secret.example", "Secret").unwrap();
        shell
            .record_download("https://f.example/x", "x", DownloadStatus::Completed, "")
            .unwrap();
        assert!(shell.visits().unwrap().is_empty());
        assert!(shell.downloads().unwrap().is_empty());

        shell.set_private_browsing(false).unwrap();
        shell.record_visit("https://public.example", "Public").unwrap();
        assert_eq!(shell.visits().unwrap().len(), 1);
    }

    #[test]
    fn test_permission_flow() {
        let (_dir, shell) = shell();
        let origin = "https://meet.example";

        assert_eq!(
            shell
                .decide_permission(Permission::MediaAudioVideoCapture, origin)
                .unwrap(),
            Decision::Ask
        );
        shell
            .remember_permission(Permission::MediaAudioVideoCapture, origin, Verdict::Accept)
            .unwrap();
        assert_eq!(
            shell
                .decide_permission(Permission::MediaAudioVideoCapture, origin)
                .unwrap(),
            Decision::Accept
        );
        shell
            .forget_permission(Permission::MediaAudioVideoCapture, origin)
            .unwrap();
        assert_eq!(
            shell
                .decide_permission(Permission::MediaAudioVideoCapture, origin)
                .unwrap(),
            Decision::Ask
        );
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let shell = Shell::with_profile_root(dir.path()).unwrap();
            shell.set_search_engine("Baidu").unwrap();
            shell.record_visit("https://example.com", "Example").unwrap();
            shell.save_window_size(1280, 800).unwrap();
        }

        let shell = Shell::with_profile_root(dir.path()).unwrap();
        assert_eq!(shell.enabled_search_engine().unwrap().provider, "Baidu");
        assert_eq!(shell.visits().unwrap().len(), 1);
        let geometry = shell.window_size(1920, 1080).unwrap();
        assert_eq!((geometry.width, geometry.height), (1280, 800));
    }

    #[test]
    fn test_catalog_follows_ui_translation() {
        let (_dir, shell) = shell();
        shell.set_ui_translation("zh_CN").unwrap();
        let catalog = shell.catalog().unwrap();
        assert_eq!(catalog.get("yes"), "是");
    }
}
