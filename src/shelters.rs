//! Shelter list loading and nearest-shelter search.
//!
//! The shelter list is a small static asset bundled with the app and read
//! once at startup. Lookups are a single linear scan: the list is short and
//! never changes, so there is nothing to index.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use crate::geo_utils::haversine_distance;
use crate::{Error, GpsPoint, NearestShelter, Result, Shelter};

/// Raw asset entry. Coordinates are validated before becoming a [`Shelter`].
#[derive(Debug, Deserialize)]
struct ShelterRecord {
    name: String,
    #[serde(alias = "latitude")]
    lat: f64,
    #[serde(alias = "longitude", alias = "lng")]
    lon: f64,
}

/// The asset is either a bare array or wrapped in `{ "shelters": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ShelterAsset {
    List(Vec<ShelterRecord>),
    Wrapped { shelters: Vec<ShelterRecord> },
}

impl ShelterAsset {
    fn into_records(self) -> Vec<ShelterRecord> {
        match self {
            ShelterAsset::List(records) => records,
            ShelterAsset::Wrapped { shelters } => shelters,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Parse a shelter list from JSON text.
///
/// ```rust
/// use shelter_router::load_shelters_from_str;
///
/// let shelters = load_shelters_from_str(r#"[
///     {"name": "Dizengoff Center", "lat": 32.0754, "lon": 34.7746},
///     {"name": "Habima Square", "lat": 32.0727, "lon": 34.7794}
/// ]"#).unwrap();
/// assert_eq!(shelters.len(), 2);
/// ```
pub fn load_shelters_from_str(json: &str) -> Result<Vec<Shelter>> {
    let asset: ShelterAsset = serde_json::from_str(json)?;
    validate(asset.into_records())
}

/// Parse a shelter list from any reader.
pub fn load_shelters_from_reader<R: Read>(reader: R) -> Result<Vec<Shelter>> {
    let asset: ShelterAsset = serde_json::from_reader(reader)?;
    validate(asset.into_records())
}

/// Read and parse a bundled shelter asset file.
pub fn load_shelters_from_path(path: impl AsRef<Path>) -> Result<Vec<Shelter>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let shelters = load_shelters_from_reader(BufReader::new(file))?;
    info!("[ShelterRouter] Loaded {} shelters from {}", shelters.len(), path.display());
    Ok(shelters)
}

fn validate(records: Vec<ShelterRecord>) -> Result<Vec<Shelter>> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if record.name.trim().is_empty() {
                return Err(Error::InvalidShelter { index, reason: "name is empty".to_string() });
            }
            let shelter = Shelter::new(record.name, record.lat, record.lon);
            if !shelter.position().is_valid() {
                return Err(Error::InvalidShelter {
                    index,
                    reason: format!(
                        "coordinate ({}, {}) is not a valid WGS84 position",
                        shelter.latitude, shelter.longitude
                    ),
                });
            }
            Ok(shelter)
        })
        .collect()
}

// ============================================================================
// Nearest-shelter search
// ============================================================================

/// Find the shelter closest to `user` by great-circle distance.
///
/// Ties keep the shelter that appears first in the list. Returns `None` for
/// an empty list.
///
/// ```rust
/// use shelter_router::{find_nearest_shelter, GpsPoint, Shelter};
///
/// let shelters = vec![
///     Shelter::new("Far", 32.10, 34.80),
///     Shelter::new("Near", 32.086, 34.782),
/// ];
/// let nearest = find_nearest_shelter(&GpsPoint::new(32.0853, 34.7818), &shelters).unwrap();
/// assert_eq!(nearest.shelter.name, "Near");
/// assert_eq!(nearest.index, 1);
/// ```
pub fn find_nearest_shelter(user: &GpsPoint, shelters: &[Shelter]) -> Option<NearestShelter> {
    debug!(
        "[ShelterRouter] Finding nearest of {} shelters to ({}, {})",
        shelters.len(), user.latitude, user.longitude
    );

    let mut best: Option<(usize, f64)> = None;

    for (index, shelter) in shelters.iter().enumerate() {
        let distance = haversine_distance(user, &shelter.position());
        debug!("[ShelterRouter] Distance to shelter {}: {:.1}m", shelter.name, distance);

        // NaN never compares less, so unusable distances drop out here
        let closer = match best {
            Some((_, min)) => distance < min,
            None => distance.is_finite(),
        };
        if closer {
            best = Some((index, distance));
        }
    }

    let result = best.map(|(index, distance_meters)| NearestShelter {
        shelter: shelters[index].clone(),
        index: index as u32,
        distance_meters,
    });

    match &result {
        Some(nearest) => debug!(
            "[ShelterRouter] Nearest shelter: {} at {:.1}m",
            nearest.shelter.name, nearest.distance_meters
        ),
        None => debug!("[ShelterRouter] No nearest shelter found"),
    }

    result
}

/// Parallel variant of [`find_nearest_shelter`] with identical results,
/// including first-wins tie breaking.
#[cfg(feature = "parallel")]
pub fn find_nearest_shelter_parallel(user: &GpsPoint, shelters: &[Shelter]) -> Option<NearestShelter> {
    use rayon::prelude::*;

    let best = shelters
        .par_iter()
        .enumerate()
        .map(|(index, shelter)| (index, haversine_distance(user, &shelter.position())))
        .filter(|(_, distance)| distance.is_finite())
        .reduce_with(|a, b| {
            if b.1 < a.1 || (b.1 == a.1 && b.0 < a.0) {
                b
            } else {
                a
            }
        });

    best.map(|(index, distance_meters)| NearestShelter {
        shelter: shelters[index].clone(),
        index: index as u32,
        distance_meters,
    })
}

// ============================================================================
// Tests
// ============================================================================
