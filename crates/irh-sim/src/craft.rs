//! ---
//! irh_section: "04-stand-in-service"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Craft fixture format, validation and fixture library."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
//! Craft fixtures describe a vessel's parts, servos and servo groups.
//!
//! Fixtures live at `<root>/<directory>/<name>.craft.yaml`. Parsing yields a
//! [`CraftFile`]; validation resolves every reference into indices and yields
//! a [`Craft`] the save state can serve without further checks.

use std::fs;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const CRAFT_EXTENSION: &str = "craft.yaml";

pub type Result<T> = std::result::Result<T, FixtureError>;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("craft fixture {0} not found")]
    NotFound(PathBuf),
    #[error("fixture path {0} escapes the fixture root")]
    OutsideRoot(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("craft '{craft}' is invalid: {reason}")]
    Invalid { craft: String, reason: String },
}

fn default_min_position() -> f64 {
    -180.0
}

fn default_max_position() -> f64 {
    180.0
}

fn default_speed() -> f64 {
    1.0
}

/// On-disk craft description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CraftFile {
    pub name: String,
    #[serde(default)]
    pub parts: Vec<PartSpec>,
    #[serde(default)]
    pub servos: Vec<ServoSpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartSpec {
    /// Fixture-local key referenced by servos.
    pub key: String,
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServoSpec {
    pub name: String,
    /// Key of the hosting part.
    pub part: String,
    #[serde(default)]
    pub position: f64,
    #[serde(default = "default_min_position")]
    pub min_position: f64,
    #[serde(default = "default_max_position")]
    pub max_position: f64,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub free_moving: bool,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    pub name: String,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub forward_key: String,
    #[serde(default)]
    pub reverse_key: String,
    /// Names of member servos.
    pub servos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CraftPart {
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CraftServo {
    pub name: String,
    pub part: usize,
    pub position: f64,
    pub min_position: f64,
    pub max_position: f64,
    pub speed: f64,
    pub free_moving: bool,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CraftGroup {
    pub name: String,
    pub speed: f64,
    pub expanded: bool,
    pub forward_key: String,
    pub reverse_key: String,
    /// Indices into [`Craft::servos`], in fixture order.
    pub servos: Vec<usize>,
    /// Distinct indices into [`Craft::parts`] hosting the member servos.
    pub parts: Vec<usize>,
}

/// A validated craft with every reference resolved to an index.
#[derive(Debug, Clone, PartialEq)]
pub struct Craft {
    pub name: String,
    pub parts: Vec<CraftPart>,
    pub servos: Vec<CraftServo>,
    pub groups: Vec<CraftGroup>,
}

impl Craft {
    /// Parse and validate YAML read from `origin`.
    pub fn parse(contents: &str, origin: &Path) -> Result<Self> {
        let file: CraftFile =
            serde_yaml::from_str(contents).map_err(|source| FixtureError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        Craft::try_from(file)
    }
}

impl TryFrom<CraftFile> for Craft {
    type Error = FixtureError;

    fn try_from(file: CraftFile) -> Result<Self> {
        let invalid = |reason: String| FixtureError::Invalid {
            craft: file.name.clone(),
            reason,
        };

        if file.name.trim().is_empty() {
            return Err(invalid("craft name must not be empty".into()));
        }

        let mut part_keys: IndexMap<&str, usize> = IndexMap::new();
        for (index, part) in file.parts.iter().enumerate() {
            if part_keys.insert(part.key.as_str(), index).is_some() {
                return Err(invalid(format!("duplicate part key '{}'", part.key)));
            }
        }

        let mut servo_names: IndexMap<&str, usize> = IndexMap::new();
        let mut servos = Vec::with_capacity(file.servos.len());
        for (index, servo) in file.servos.iter().enumerate() {
            if servo_names.insert(servo.name.as_str(), index).is_some() {
                return Err(invalid(format!("duplicate servo name '{}'", servo.name)));
            }
            let part = *part_keys.get(servo.part.as_str()).ok_or_else(|| {
                invalid(format!(
                    "servo '{}' references unknown part '{}'",
                    servo.name, servo.part
                ))
            })?;
            if servo.min_position > servo.max_position {
                return Err(invalid(format!(
                    "servo '{}' has min_position above max_position",
                    servo.name
                )));
            }
            if servo.position < servo.min_position || servo.position > servo.max_position {
                return Err(invalid(format!(
                    "servo '{}' position {} lies outside [{}, {}]",
                    servo.name, servo.position, servo.min_position, servo.max_position
                )));
            }
            servos.push(CraftServo {
                name: servo.name.clone(),
                part,
                position: servo.position,
                min_position: servo.min_position,
                max_position: servo.max_position,
                speed: servo.speed,
                free_moving: servo.free_moving,
                locked: servo.locked,
            });
        }

        let mut owner: Vec<Option<&str>> = vec![None; servos.len()];
        let mut groups = Vec::with_capacity(file.groups.len());
        for group in &file.groups {
            let mut members = Vec::with_capacity(group.servos.len());
            let mut parts = Vec::new();
            for servo_name in &group.servos {
                let index = *servo_names.get(servo_name.as_str()).ok_or_else(|| {
                    invalid(format!(
                        "group '{}' references unknown servo '{}'",
                        group.name, servo_name
                    ))
                })?;
                if let Some(previous) = owner[index] {
                    return Err(invalid(format!(
                        "servo '{}' belongs to both '{}' and '{}'",
                        servo_name, previous, group.name
                    )));
                }
                owner[index] = Some(group.name.as_str());
                members.push(index);
                let part = servos[index].part;
                if !parts.contains(&part) {
                    parts.push(part);
                }
            }
            groups.push(CraftGroup {
                name: group.name.clone(),
                speed: group.speed,
                expanded: group.expanded,
                forward_key: group.forward_key.clone(),
                reverse_key: group.reverse_key.clone(),
                servos: members,
                parts,
            });
        }

        if let Some(index) = owner.iter().position(Option::is_none) {
            return Err(invalid(format!(
                "servo '{}' is not a member of any group",
                servos[index].name
            )));
        }

        Ok(Craft {
            parts: file
                .parts
                .iter()
                .map(|part| CraftPart {
                    name: part.name.clone(),
                    title: part.title.clone(),
                })
                .collect(),
            name: file.name,
            servos,
            groups,
        })
    }
}

/// Resolves craft fixtures below a root directory.
#[derive(Debug, Clone)]
pub struct FixtureLibrary {
    root: PathBuf,
}

impl FixtureLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of craft `name` in `directory`, which must stay below the root.
    pub fn resolve(&self, directory: &Path, name: &str) -> Result<PathBuf> {
        let escapes = directory.components().any(|component| {
            !matches!(component, Component::Normal(_) | Component::CurDir)
        });
        let mut name_components = Path::new(name).components();
        let plain_name = matches!(
            (name_components.next(), name_components.next()),
            (Some(Component::Normal(_)), None)
        );
        if escapes || !plain_name {
            return Err(FixtureError::OutsideRoot(directory.join(name)));
        }
        Ok(self
            .root
            .join(directory)
            .join(format!("{name}.{CRAFT_EXTENSION}")))
    }

    /// Load and validate craft `name` from `directory`.
    pub fn load(&self, directory: &Path, name: &str) -> Result<Craft> {
        let path = self.resolve(directory, name)?;
        if !path.is_file() {
            return Err(FixtureError::NotFound(path));
        }
        debug!(path = %path.display(), "loading craft fixture");
        let contents = fs::read_to_string(&path).map_err(|source| FixtureError::Io {
            path: path.clone(),
            source,
        })?;
        Craft::parse(&contents, &path)
    }
}
