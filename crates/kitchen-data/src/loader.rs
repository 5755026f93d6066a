//! Level pipeline: reads a level file, resolves food names, builds a kitchen.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers used by [`load_level`].

use crate::schema::{ItemData, LevelData, StationKindData};
use kitchen_core::catalog::Catalog;
use kitchen_core::config::ConfigError;
use kitchen_core::data_loader::{self, build_foods};
use kitchen_core::fixed::Fixed64;
use kitchen_core::id::{BeltId, FoodId, StationId};
use kitchen_core::item::KitchenItem;
use kitchen_core::kitchen::{Kitchen, KitchenError};
use kitchen_core::station::StationKind;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Base name looked up when a level is loaded from a directory.
pub const LEVEL_FILE: &str = "level";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading a level.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A directory was given but holds no level file.
    #[error("no level file found in {dir}")]
    MissingLevel { dir: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// Two stations share a label.
    #[error("duplicate station label '{name}' in {file}")]
    DuplicateLabel { file: PathBuf, name: String },

    #[error("catalog in {file}: {source}")]
    Catalog {
        file: PathBuf,
        source: data_loader::DataLoadError,
    },

    #[error("kitchen in {file}: {source}")]
    Kitchen { file: PathBuf, source: KitchenError },

    #[error("station in {file}: {source}")]
    Station { file: PathBuf, source: ConfigError },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for `{base_name}.ron`, `.toml` or `.json`.
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` in the given format. `file` is only used for
/// error reporting.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

// ===========================================================================
// Level building
// ===========================================================================

/// A loaded level: the kitchen plus handles to what was placed in it.
#[derive(Debug)]
pub struct Level {
    pub name: String,
    pub kitchen: Kitchen,
    /// Stations in file order.
    pub stations: Vec<StationId>,
    /// Belts in file order.
    pub belts: Vec<BeltId>,
    labels: HashMap<String, StationId>,
}

impl Level {
    /// Look up a station by its label.
    pub fn station(&self, label: &str) -> Option<StationId> {
        self.labels.get(label).copied()
    }
}

/// Load a level from a file, or from the `level.*` file in a directory.
pub fn load_level(path: &Path) -> Result<Level, DataLoadError> {
    let file = if path.is_dir() {
        find_data_file(path, LEVEL_FILE)?.ok_or_else(|| DataLoadError::MissingLevel {
            dir: path.to_path_buf(),
        })?
    } else {
        path.to_path_buf()
    };
    let data: LevelData = deserialize_file(&file)?;
    build_level(&data, &file)
}

/// Resolve a parsed level into a running kitchen.
pub fn build_level(data: &LevelData, file: &Path) -> Result<Level, DataLoadError> {
    let catalog = build_foods(&data.foods)
        .and_then(|builder| builder.build().map_err(Into::into))
        .map_err(|source| DataLoadError::Catalog {
            file: file.to_path_buf(),
            source,
        })?;

    // Resolve the layout against the catalog before handing it over.
    let mut stations = Vec::with_capacity(data.stations.len());
    for station in &data.stations {
        let kind = resolve_kind(&station.kind, &catalog, file)?;
        let item = station
            .item
            .as_ref()
            .map(|item| resolve_item(item, &catalog, file))
            .transpose()?;
        stations.push((station.label.as_deref(), kind, item));
    }

    let mut kitchen =
        Kitchen::new(catalog, data.config.clone()).map_err(|source| DataLoadError::Kitchen {
            file: file.to_path_buf(),
            source,
        })?;

    let station_err = |source| DataLoadError::Station {
        file: file.to_path_buf(),
        source,
    };
    let mut labels = HashMap::new();
    let mut ids = Vec::with_capacity(stations.len());
    for (label, kind, item) in stations {
        let id = match item {
            Some(item) => kitchen.add_station_with_item(kind, item),
            None => kitchen.add_station(kind),
        }
        .map_err(station_err)?;
        if let Some(label) = label
            && labels.insert(label.to_string(), id).is_some()
        {
            return Err(DataLoadError::DuplicateLabel {
                file: file.to_path_buf(),
                name: label.to_string(),
            });
        }
        ids.push(id);
    }

    let belts = data
        .belts
        .iter()
        .map(|&direction| kitchen.add_belt(direction))
        .collect();

    log::info!(
        "loaded level '{}' from {}: {} foods, {} stations",
        data.name,
        file.display(),
        data.foods.len(),
        ids.len()
    );

    Ok(Level {
        name: data.name.clone(),
        kitchen,
        stations: ids,
        belts,
        labels,
    })
}

fn resolve_food(catalog: &Catalog, name: &str, file: &Path) -> Result<FoodId, DataLoadError> {
    catalog
        .food_id(name)
        .ok_or_else(|| DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
            expected_kind: "food",
        })
}

fn resolve_rate(rate: f64, file: &Path) -> Result<Fixed64, DataLoadError> {
    Fixed64::checked_from_num(rate)
        .filter(|r| *r > Fixed64::ZERO)
        .ok_or_else(|| DataLoadError::Station {
            file: file.to_path_buf(),
            source: ConfigError::NotPositive {
                name: "station rate",
                value: rate,
            },
        })
}

fn resolve_kind(
    kind: &StationKindData,
    catalog: &Catalog,
    file: &Path,
) -> Result<StationKind, DataLoadError> {
    Ok(match kind {
        StationKindData::Counter => StationKind::Counter,
        StationKindData::AutomaticPrep { method, rate } => StationKind::AutomaticPrep {
            method: *method,
            rate: resolve_rate(*rate, file)?,
        },
        StationKindData::ManualPrep { method, rate } => StationKind::ManualPrep {
            method: *method,
            rate: resolve_rate(*rate, file)?,
        },
        StationKindData::Spawner { food } => StationKind::Spawner {
            food: food
                .as_deref()
                .map(|name| resolve_food(catalog, name, file))
                .transpose()?,
        },
        StationKindData::Garbage { destroy_plates } => StationKind::Garbage {
            destroy_plates: *destroy_plates,
        },
    })
}

fn resolve_item(item: &ItemData, catalog: &Catalog, file: &Path) -> Result<KitchenItem, DataLoadError> {
    let food = item
        .food
        .as_deref()
        .map(|name| resolve_food(catalog, name, file))
        .transpose()?;
    let toppings = item
        .toppings
        .iter()
        .map(|name| resolve_food(catalog, name, file))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(KitchenItem {
        food,
        plate: item.plate,
        toppings: Vec::new(),
    }
    .with_toppings(toppings))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kitchen_core::conveyor::BeltDirection;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "kitchen_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const DINER_RON: &str = r#"(
        name: "diner",
        config: (seed: 3, orders: (menu: ["burger"])),
        foods: [
            (name: "bun", combinations: [(partner: "patty_cooked", result: "burger")]),
            (name: "patty_raw", method: fry, result: Some("patty_cooked"), tags: (raw: true)),
            (name: "patty_cooked", method: fry, result: Some("patty_burnt")),
            (name: "patty_burnt", tags: (burnt: true)),
            (name: "burger"),
        ],
        stations: [
            (label: Some("grill"), kind: AutomaticPrep(method: fry, rate: 5.0),
             item: Some((food: Some("patty_raw")))),
            (label: Some("buns"), kind: Spawner(food: Some("bun"))),
            (kind: Counter),
        ],
        belts: [SendOff, Return],
    )"#;

    fn parse(content: &str, format: Format) -> Result<Level, DataLoadError> {
        let file = Path::new("inline");
        let data: LevelData = deserialize_str(content, format, file)?;
        build_level(&data, file)
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("a.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("a.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("a.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        for name in ["level.yaml", "level"] {
            assert!(matches!(
                detect_format(Path::new(name)),
                Err(DataLoadError::UnsupportedFormat { .. })
            ));
        }
    }

    // -----------------------------------------------------------------------
    // build_level
    // -----------------------------------------------------------------------

    #[test]
    fn builds_layout_and_seeds_items() {
        let level = parse(DINER_RON, Format::Ron).unwrap();
        assert_eq!(level.name, "diner");
        assert_eq!(level.stations.len(), 3);
        assert_eq!(level.belts.len(), 2);

        let k = &level.kitchen;
        let grill = level.station("grill").unwrap();
        let raw = k.food_id("patty_raw").unwrap();
        assert_eq!(k.station(grill).unwrap().item().unwrap().food, Some(raw));
        assert!(k.station(grill).unwrap().is_preparing());

        let buns = level.station("buns").unwrap();
        assert_eq!(
            k.station(buns).unwrap().kind(),
            &StationKind::Spawner {
                food: k.food_id("bun")
            }
        );
        assert!(level.station("nope").is_none());

        let back = level.belts[1];
        assert_eq!(
            k.conveyor().belt(back).unwrap().direction,
            BeltDirection::Return
        );
    }

    #[test]
    fn loaded_kitchen_runs() {
        let mut level = parse(DINER_RON, Format::Ron).unwrap();
        let grill = level.station("grill").unwrap();
        level.kitchen.advance(20);
        let cooked = level.kitchen.food_id("patty_cooked");
        assert_eq!(
            level.kitchen.station(grill).unwrap().item().unwrap().food,
            cooked
        );
    }

    #[test]
    fn unresolved_station_food() {
        let json = r#"{
            "foods": [ { "name": "bun" } ],
            "stations": [ { "kind": { "Spawner": { "food": "brioche" } } } ]
        }"#;
        match parse(json, Format::Json) {
            Err(DataLoadError::UnresolvedRef {
                name,
                expected_kind: "food",
                ..
            }) => assert_eq!(name, "brioche"),
            other => panic!("expected UnresolvedRef, got {other:?}"),
        }
    }

    #[test]
    fn unresolved_topping() {
        let json = r#"{
            "foods": [ { "name": "pizza_raw", "kind": "pizza" } ],
            "stations": [ { "kind": "Counter", "item": { "food": "pizza_raw", "toppings": ["anchovy"] } } ]
        }"#;
        assert!(matches!(
            parse(json, Format::Json),
            Err(DataLoadError::UnresolvedRef { .. })
        ));
    }

    #[test]
    fn duplicate_label() {
        let toml_str = r#"
            [[foods]]
            name = "bun"

            [[stations]]
            label = "a"
            kind = "Counter"

            [[stations]]
            label = "a"
            kind = "Counter"
        "#;
        assert!(matches!(
            parse(toml_str, Format::Toml),
            Err(DataLoadError::DuplicateLabel { name, .. }) if name == "a"
        ));
    }

    #[test]
    fn non_positive_rate() {
        let json = r#"{
            "foods": [ { "name": "bun" } ],
            "stations": [ { "kind": { "AutomaticPrep": { "method": "fry", "rate": 0.0 } } } ]
        }"#;
        assert!(matches!(
            parse(json, Format::Json),
            Err(DataLoadError::Station {
                source: ConfigError::NotPositive { .. },
                ..
            })
        ));
    }

    #[test]
    fn menu_food_missing_from_catalog() {
        let json = r#"{
            "config": { "orders": { "menu": ["caviar"] } },
            "foods": [ { "name": "bun" } ]
        }"#;
        assert!(matches!(
            parse(json, Format::Json),
            Err(DataLoadError::Kitchen {
                source: KitchenError::Config(ConfigError::UnknownMenuFood(_)),
                ..
            })
        ));
    }

    #[test]
    fn empty_catalog() {
        assert!(matches!(
            parse(r#"{ "foods": [] }"#, Format::Json),
            Err(DataLoadError::Catalog { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Files and directories
    // -----------------------------------------------------------------------

    #[test]
    fn load_level_from_file_and_dir() {
        let dir = make_test_dir("load");
        let path = dir.join("level.ron");
        fs::write(&path, DINER_RON).unwrap();

        assert_eq!(load_level(&path).unwrap().name, "diner");
        assert_eq!(load_level(&dir).unwrap().name, "diner");

        cleanup(&dir);
    }

    #[test]
    fn load_level_from_empty_dir() {
        let dir = make_test_dir("empty");
        assert!(matches!(
            load_level(&dir),
            Err(DataLoadError::MissingLevel { .. })
        ));
        cleanup(&dir);
    }

    #[test]
    fn conflicting_level_formats() {
        let dir = make_test_dir("conflict");
        fs::write(dir.join("level.ron"), DINER_RON).unwrap();
        fs::write(dir.join("level.json"), "{}").unwrap();
        assert!(matches!(
            find_data_file(&dir, LEVEL_FILE),
            Err(DataLoadError::ConflictingFormats { .. })
        ));
        cleanup(&dir);
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = make_test_dir("parse_err");
        let path = dir.join("broken.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();
        let err = load_level(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { .. }));
        assert!(err.to_string().contains("broken.ron"));
        cleanup(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_level(Path::new("/definitely/not/here.ron")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io(_)));
    }
}
