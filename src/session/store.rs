use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LinkError;

const COOKIE_FILE_VERSION: u32 = 1;

/// Read-only access to persisted cookies.
pub trait CookieSource: Send + Sync {
    fn read(&self, name: &str) -> Result<Option<String>, LinkError>;
}

/// Cookie jar persisted as a TOML file.
///
/// Survives process restarts, which is what lets a long-lived session be
/// picked up before anything has been stored in memory.
///
/// # Example
/// ```no_run
/// use extlink::session::{CookieSource, FileCookieStore};
///
/// let store = FileCookieStore::new_default();
/// store.save("sessionToken", "abc.def.ghi")?;
/// assert_eq!(store.read("sessionToken")?.as_deref(), Some("abc.def.ghi"));
/// # Ok::<(), extlink::error::LinkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCookieStore {
    path: PathBuf,
}

impl FileCookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn new_default() -> Self {
        Self {
            path: default_cookie_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_file(&self) -> Result<Option<CookieFile>, LinkError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(LinkError::Io(err)),
        };
        let file: CookieFile = toml::from_str(&raw).map_err(|e| {
            LinkError::Configuration(format!(
                "Invalid cookie file {}: {e}",
                self.path.display()
            ))
        })?;
        if file.version != COOKIE_FILE_VERSION {
            return Err(LinkError::Configuration(format!(
                "Unsupported cookie file version {} at {}",
                file.version,
                self.path.display()
            )));
        }
        Ok(Some(file))
    }

    fn write_file(&self, file: &CookieFile) -> Result<(), LinkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = toml::to_string(file)
            .map_err(|e| LinkError::Configuration(format!("Cannot serialize cookies: {e}")))?;
        fs::write(&self.path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Store (or replace) a cookie.
    pub fn save(&self, name: &str, value: &str) -> Result<(), LinkError> {
        let mut file = self.load_file()?.unwrap_or_default();
        file.cookies.insert(name.to_string(), value.to_string());
        file.saved_at = Some(Utc::now());
        self.write_file(&file)
    }

    /// Remove a cookie. Missing cookies and files are not an error.
    pub fn clear(&self, name: &str) -> Result<(), LinkError> {
        let Some(mut file) = self.load_file()? else {
            return Ok(());
        };
        if file.cookies.remove(name).is_none() {
            return Ok(());
        }
        file.saved_at = Some(Utc::now());
        self.write_file(&file)
    }
}

impl CookieSource for FileCookieStore {
    fn read(&self, name: &str) -> Result<Option<String>, LinkError> {
        Ok(self
            .load_file()?
            .and_then(|mut file| file.cookies.remove(name))
            .filter(|v| !v.is_empty()))
    }
}

/// Cookies taken from a raw `Cookie:` request header.
#[derive(Debug, Clone, Default)]
pub struct CookieHeader {
    cookies: BTreeMap<String, String>,
}

impl CookieHeader {
    /// Parse `name=value; other=value` pairs. Malformed pairs are dropped.
    pub fn parse(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let value = value.trim().trim_matches('"');
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Self { cookies }
    }
}

impl CookieSource for CookieHeader {
    fn read(&self, name: &str) -> Result<Option<String>, LinkError> {
        Ok(self.cookies.get(name).filter(|v| !v.is_empty()).cloned())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CookieFile {
    version: u32,
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    cookies: BTreeMap<String, String>,
}

impl Default for CookieFile {
    fn default() -> Self {
        Self {
            version: COOKIE_FILE_VERSION,
            saved_at: None,
            cookies: BTreeMap::new(),
        }
    }
}

/// `~/.extlink/cookies.toml`, or a relative `.extlink` when no home exists.
pub fn default_cookie_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".extlink"))
        .unwrap_or_else(|| PathBuf::from(".extlink"))
        .join("cookies.toml")
}
