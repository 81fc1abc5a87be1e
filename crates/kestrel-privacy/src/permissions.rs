//! Permission decision policy
//!
//! Each permission kind carries an ask flag and a set of remembered
//! origins, each with a single verdict. The verdict is one column of a
//! `(permission, origin)`-unique row, so an origin can never be both
//! accepted and rejected for the same permission.

use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use kestrel_storage::Database;

use crate::error::PrivacyError;
use crate::Result;

/// The fixed capability categories a site can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    Certificates,
    Notifications,
    Geolocation,
    MediaAudioCapture,
    MediaVideoCapture,
    MediaAudioVideoCapture,
    MouseLock,
    DesktopVideoCapture,
    DesktopAudioVideoCapture,
}

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::Certificates,
        Permission::Notifications,
        Permission::Geolocation,
        Permission::MediaAudioCapture,
        Permission::MediaVideoCapture,
        Permission::MediaAudioVideoCapture,
        Permission::MouseLock,
        Permission::DesktopVideoCapture,
        Permission::DesktopAudioVideoCapture,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Certificates => "Certificates",
            Permission::Notifications => "Notifications",
            Permission::Geolocation => "Geolocation",
            Permission::MediaAudioCapture => "MediaAudioCapture",
            Permission::MediaVideoCapture => "MediaVideoCapture",
            Permission::MediaAudioVideoCapture => "MediaAudioVideoCapture",
            Permission::MouseLock => "MouseLock",
            Permission::DesktopVideoCapture => "DesktopVideoCapture",
            Permission::DesktopAudioVideoCapture => "DesktopAudioVideoCapture",
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown permission: {s}"))
    }
}

/// A remembered outcome for one origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accept,
    Reject,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Accept => "accept",
            Verdict::Reject => "reject",
        }
    }
}

impl std::str::FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Verdict::Accept),
            "reject" => Ok(Verdict::Reject),
            _ => Err(format!("Unknown verdict: {s}")),
        }
    }
}

/// Outcome of a permission check for one origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Origin was remembered as accepted.
    Accept,
    /// Origin was remembered as rejected.
    Reject,
    /// Undecided; the caller must prompt the user.
    Ask,
    /// The ask flag is off; the caller falls through to the engine default.
    Abstain,
}

/// Snapshot of one permission's rule: the ask flag plus both origin lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRule {
    pub permission: Permission,
    pub ask: bool,
    pub accept: Vec<String>,
    pub reject: Vec<String>,
}

pub struct PermissionPolicy {
    db: Database,
}

impl PermissionPolicy {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn ask_flag(&self, permission: Permission) -> Result<bool> {
        let ask: Option<i64> = self.db.with_connection(|conn| {
            Ok(conn
                .query_row(
                    "SELECT ask FROM permission_rules WHERE permission = ?1",
                    [permission.as_str()],
                    |row| row.get(0),
                )
                .optional()?)
        })?;
        ask.map(|v| v != 0)
            .ok_or_else(|| PrivacyError::NotFound(format!("rule for {}", permission.as_str())))
    }

    /// Whether to ask the user when no verdict is remembered for an origin.
    pub fn set_ask(&self, permission: Permission, ask: bool) -> Result<()> {
        let changed = self.db.with_connection(|conn| {
            Ok(conn.execute(
                "UPDATE permission_rules SET ask = ?1 WHERE permission = ?2",
                rusqlite::params![ask as i64, permission.as_str()],
            )?)
        })?;
        if changed == 0 {
            return Err(PrivacyError::NotFound(format!(
                "rule for {}",
                permission.as_str()
            )));
        }
        tracing::info!(permission = permission.as_str(), ask, "ask flag updated");
        Ok(())
    }

    /// Remembered verdict for `origin`, if any.
    pub fn verdict_of(&self, permission: Permission, origin: &str) -> Result<Option<Verdict>> {
        let stored: Option<String> = self.db.with_connection(|conn| {
            Ok(conn
                .query_row(
                    "SELECT verdict FROM permission_origins
                     WHERE permission = ?1 AND origin = ?2",
                    [permission.as_str(), origin],
                    |row| row.get(0),
                )
                .optional()?)
        })?;
        Ok(stored.and_then(|s| s.parse().ok()))
    }

    /// Decide what to do when `origin` requests `permission`. Reads the
    /// store on every call; same stored state, same decision.
    pub fn decide(&self, permission: Permission, origin: &str) -> Result<Decision> {
        if !self.ask_flag(permission)? {
            return Ok(Decision::Abstain);
        }
        let decision = match self.verdict_of(permission, origin)? {
            Some(Verdict::Accept) => Decision::Accept,
            Some(Verdict::Reject) => Decision::Reject,
            None => Decision::Ask,
        };
        tracing::debug!(
            permission = permission.as_str(),
            origin,
            ?decision,
            "permission decided"
        );
        Ok(decision)
    }

    /// Persist a verdict for `origin`. Idempotent; remembering the opposite
    /// verdict moves the origin rather than duplicating it.
    pub fn remember(&self, permission: Permission, origin: &str, verdict: Verdict) -> Result<()> {
        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO permission_origins (permission, origin, verdict)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (permission, origin) DO UPDATE SET verdict = excluded.verdict",
                [permission.as_str(), origin, verdict.as_str()],
            )?;
            Ok(())
        })?;
        tracing::info!(
            permission = permission.as_str(),
            origin,
            verdict = verdict.as_str(),
            "verdict remembered"
        );
        Ok(())
    }

    /// Drop the remembered verdict for `origin`. Forgetting an origin that
    /// was never remembered is an error, not a no-op: the settings UI only
    /// offers removal for entries it just listed, so absence means the
    /// caller's view is stale.
    pub fn forget(&self, permission: Permission, origin: &str) -> Result<()> {
        let deleted = self.db.with_connection(|conn| {
            Ok(conn.execute(
                "DELETE FROM permission_origins WHERE permission = ?1 AND origin = ?2",
                [permission.as_str(), origin],
            )?)
        })?;
        if deleted == 0 {
            return Err(PrivacyError::NotFound(format!(
                "{} verdict for {origin}",
                permission.as_str()
            )));
        }
        tracing::info!(permission = permission.as_str(), origin, "verdict forgotten");
        Ok(())
    }

    /// Origins remembered with `verdict`, in the order they were added.
    pub fn origins(&self, permission: Permission, verdict: Verdict) -> Result<Vec<String>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT origin FROM permission_origins
                 WHERE permission = ?1 AND verdict = ?2 ORDER BY id",
            )?;
            let origins = stmt
                .query_map([permission.as_str(), verdict.as_str()], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(origins)
        })?)
    }

    /// Full rule snapshot for one permission.
    pub fn rule(&self, permission: Permission) -> Result<PermissionRule> {
        Ok(PermissionRule {
            permission,
            ask: self.ask_flag(permission)?,
            accept: self.origins(permission, Verdict::Accept)?,
            reject: self.origins(permission, Verdict::Reject)?,
        })
    }

    /// Rule snapshots for every permission kind.
    pub fn rules(&self) -> Result<Vec<PermissionRule>> {
        Permission::ALL.into_iter().map(|p| self.rule(p)).collect()
    }
}
