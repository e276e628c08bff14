use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::model::{RawCandidate, SourceRef, SubItem};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("owner {pid} is not accessible: {reason}")]
    Inaccessible { pid: u32, reason: String },
    #[error("application '{0}' is not running")]
    NotRunning(String),
    #[error("enumeration failed: {0}")]
    Enumeration(String),
    #[error("fixture error: {0}")]
    Fixture(String),
}

/// A running process that may own windows; one unit of primary enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnerProcess {
    pub pid: u32,
    pub name: String,
    #[serde(default)]
    pub app_id: String,
}

impl OwnerProcess {
    pub fn new(pid: u32, name: &str, app_id: &str) -> Self {
        Self {
            pid,
            name: name.to_string(),
            app_id: app_id.to_string(),
        }
    }
}

/// Enumerates top-level windows, one owner process at a time.
pub trait WindowSource: Send + Sync {
    fn source_name(&self) -> &str;
    fn owners(&self) -> Result<Vec<OwnerProcess>, SourceError>;
    fn enumerate_owner(&self, owner: &OwnerProcess) -> Result<Vec<RawCandidate>, SourceError>;

    /// Serial view over every owner. Failed owners contribute nothing.
    fn enumerate(&self) -> Result<Vec<RawCandidate>, SourceError> {
        let mut out = Vec::new();
        for owner in self.owners()? {
            match self.enumerate_owner(&owner) {
                Ok(windows) => out.extend(windows),
                Err(error) => warn!(source = self.source_name(), pid = owner.pid, %error, "owner enumeration failed"),
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TabEntry {
    pub window_index: u64,
    pub tab_index: usize,
    pub title: String,
}

/// Enumerates tab-like sub-items of one application.
pub trait TabSource: Send + Sync {
    fn app_id(&self) -> &str;
    fn app_name(&self) -> &str;
    fn enumerate_tabs(&self) -> Result<Vec<TabEntry>, SourceError>;
}

/// Tab sources keyed by application identity.
#[derive(Default)]
pub struct AuxiliaryRegistry {
    sources: BTreeMap<String, Box<dyn TabSource>>,
}

impl AuxiliaryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Box<dyn TabSource>) -> Self {
        self.register(source);
        self
    }

    /// Registers a source, replacing any earlier one for the same app.
    pub fn register(&mut self, source: Box<dyn TabSource>) {
        self.sources.insert(source.app_id().to_string(), source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Registered sources whose application currently has an owner process.
    pub fn active_for<'a>(&'a self, owners: &'a [OwnerProcess]) -> impl Iterator<Item = (&'a dyn TabSource, &'a OwnerProcess)> + 'a {
        self.sources.iter().filter_map(move |(app_id, source)| {
            owners
                .iter()
                .find(|owner| &owner.app_id == app_id)
                .map(|owner| (source.as_ref(), owner))
        })
    }

    pub fn enumerate_sub_items(&self, owners: &[OwnerProcess]) -> Vec<RawCandidate> {
        let mut out = Vec::new();
        for (source, owner) in self.active_for(owners) {
            let tabs = match source.enumerate_tabs() {
                Ok(tabs) => tabs,
                Err(error) => {
                    warn!(app_id = source.app_id(), %error, "tab enumeration failed");
                    continue;
                }
            };

            out.extend(tabs.into_iter().map(|tab| RawCandidate {
                title: tab.title,
                owner_name: source.app_name().to_string(),
                native_key: None,
                source_ref: SourceRef::Tab {
                    app_id: source.app_id().to_string(),
                    pid: owner.pid,
                },
                sub_item: Some(SubItem {
                    parent_ref: tab.window_index,
                    sub_index: tab.tab_index,
                }),
            }));
        }
        out
    }
}

/// Fixed owner/window table.
#[derive(Debug, Clone, Default)]
pub struct StaticWindowSource {
    owners: Vec<(OwnerProcess, Vec<RawCandidate>)>,
}

impl StaticWindowSource {
    pub fn from_owners(owners: Vec<(OwnerProcess, Vec<RawCandidate>)>) -> Self {
        Self { owners }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn deterministic_fixture() -> Self {
        let safari = OwnerProcess::new(101, "Safari", "com.apple.Safari");
        let terminal = OwnerProcess::new(202, "Terminal", "com.apple.Terminal");
        let mail = OwnerProcess::new(303, "Mail", "com.apple.mail");
        Self::from_owners(vec![
            (
                safari,
                vec![RawCandidate::window("Apple Developer Documentation", "Safari", 101, 11)],
            ),
            (
                terminal,
                vec![
                    RawCandidate::window("zsh - 80x24", "Terminal", 202, 21),
                    RawCandidate::window("cargo build", "Terminal", 202, 22),
                ],
            ),
            (mail, vec![RawCandidate::window("Inbox", "Mail", 303, 31)]),
        ])
    }
}

impl WindowSource for StaticWindowSource {
    fn source_name(&self) -> &str {
        "static"
    }

    fn owners(&self) -> Result<Vec<OwnerProcess>, SourceError> {
        Ok(self.owners.iter().map(|(owner, _)| owner.clone()).collect())
    }

    fn enumerate_owner(&self, owner: &OwnerProcess) -> Result<Vec<RawCandidate>, SourceError> {
        self.owners
            .iter()
            .find(|(known, _)| known.pid == owner.pid)
            .map(|(_, windows)| windows.clone())
            .ok_or_else(|| SourceError::Inaccessible {
                pid: owner.pid,
                reason: "unknown process".to_string(),
            })
    }
}

#[derive(Debug, Clone)]
pub struct StaticTabSource {
    app_id: String,
    app_name: String,
    tabs: Vec<TabEntry>,
}

impl StaticTabSource {
    pub fn new(app_id: &str, app_name: &str, tabs: Vec<TabEntry>) -> Self {
        Self {
            app_id: app_id.to_string(),
            app_name: app_name.to_string(),
            tabs,
        }
    }

    pub fn deterministic_fixture() -> Self {
        Self::new(
            "com.apple.Safari",
            "Safari",
            vec![
                TabEntry {
                    window_index: 1,
                    tab_index: 1,
                    title: "Rust Programming Language".to_string(),
                },
                TabEntry {
                    window_index: 1,
                    tab_index: 2,
                    title: "crates.io: Rust Package Registry".to_string(),
                },
            ],
        )
    }
}

impl TabSource for StaticTabSource {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn enumerate_tabs(&self) -> Result<Vec<TabEntry>, SourceError> {
        Ok(self.tabs.clone())
    }
}

/// On-disk description of owners, windows and tabs, used by the CLI runtime.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixtureFile {
    pub owners: Vec<FixtureOwner>,
    pub tab_apps: Vec<FixtureTabApp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureOwner {
    #[serde(flatten)]
    pub process: OwnerProcess,
    #[serde(default)]
    pub windows: Vec<FixtureWindow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureWindow {
    #[serde(default)]
    pub title: String,
    pub handle: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureTabApp {
    pub app_id: String,
    pub app_name: String,
    #[serde(default)]
    pub tabs: Vec<TabEntry>,
}

impl FixtureFile {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Fixture(format!("read failed for '{}': {e}", path.display())))?;
        Self::parse(&raw)
            .map_err(|e| SourceError::Fixture(format!("invalid fixture '{}': {e}", path.display())))
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn window_source(&self) -> StaticWindowSource {
        StaticWindowSource::from_owners(
            self.owners
                .iter()
                .map(|owner| {
                    let windows = owner
                        .windows
                        .iter()
                        .map(|window| {
                            RawCandidate::window(&window.title, &owner.process.name, owner.process.pid, window.handle)
                        })
                        .collect();
                    (owner.process.clone(), windows)
                })
                .collect(),
        )
    }

    pub fn auxiliary_registry(&self) -> AuxiliaryRegistry {
        let mut registry = AuxiliaryRegistry::new();
        for app in &self.tab_apps {
            registry.register(Box::new(StaticTabSource::new(&app.app_id, &app.app_name, app.tabs.clone())));
        }
        registry
    }
}

/// Shares one source between the aggregator and the test or caller that built it.
impl<T: WindowSource + ?Sized> WindowSource for Arc<T> {
    fn source_name(&self) -> &str {
        (**self).source_name()
    }

    fn owners(&self) -> Result<Vec<OwnerProcess>, SourceError> {
        (**self).owners()
    }

    fn enumerate_owner(&self, owner: &OwnerProcess) -> Result<Vec<RawCandidate>, SourceError> {
        (**self).enumerate_owner(owner)
    }
}
