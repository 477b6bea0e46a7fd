use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::engine::SlamEngine;
use crate::error::{Error, Result};
use crate::types::{Landmark, LandmarkId, MapSnapshot};

pub const POINT_CLOUD_HEADER: &str = "pos_x, pos_y, pos_z";
const REFERENCE_PREFIX: &str = "ref_";

/// What a point cloud export did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// The engine had no active map, nothing was written.
    NoActiveMap,
    /// The active map had no landmarks, nothing was written.
    EmptyMap,
    Written {
        primary: PathBuf,
        reference: PathBuf,
        primary_rows: usize,
        reference_rows: usize,
    },
}

/// Path of the reference point file: the primary file name prefixed with `ref_`,
/// in the same directory.
pub fn reference_path(output_path: &Path) -> PathBuf {
    let file_name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_path.with_file_name(format!("{}{}", REFERENCE_PREFIX, file_name))
}

/// Landmarks that can be written as a row: not bad and with a finite position.
pub fn is_exportable(p: &Landmark) -> bool {
    !p.is_bad() && p.world_pos().iter().all(|v| v.is_finite())
}

/// Splits the exportable landmarks into map points and reference points.
///
/// Map points keep the full set's order and exclude anything referenced.
/// Reference points are looked up in the full set by id, deduplicated and
/// come out in ascending id order. Ids missing from the full set are dropped.
pub fn partition_landmarks(snapshot: &MapSnapshot) -> (Vec<&Landmark>, Vec<&Landmark>) {
    let by_id: HashMap<LandmarkId, &Landmark> = snapshot
        .all_map_points()
        .iter()
        .rev() // first occurrence of an id wins
        .map(|p| (p.id, p))
        .collect();
    let reference_set: BTreeSet<LandmarkId> = snapshot
        .reference_ids()
        .iter()
        .copied()
        .filter(|id| by_id.contains_key(id))
        .collect();

    let map_points = snapshot
        .all_map_points()
        .iter()
        .filter(|p| is_exportable(p) && !reference_set.contains(&p.id))
        .collect();
    let reference_points = reference_set
        .iter()
        .filter_map(|id| by_id.get(id).copied())
        .filter(|p| is_exportable(p))
        .collect();
    (map_points, reference_points)
}

fn format_row(p: &Landmark) -> String {
    let pos = p.world_pos();
    format!("{:.6}, {:.6}, {:.6}", pos.x, pos.y, pos.z)
}

fn write_csv(path: &Path, points: &[&Landmark]) -> Result<()> {
    let export_err = |source| Error::Export {
        path: path.to_path_buf(),
        source,
    };
    let mut file = BufWriter::new(File::create(path).map_err(export_err)?);
    writeln!(file, "{}", POINT_CLOUD_HEADER).map_err(export_err)?;
    for p in points {
        writeln!(file, "{}", format_row(p)).map_err(export_err)?;
    }
    file.flush().map_err(export_err)?;
    Ok(())
}

/// Writes the two point cloud files for an already captured snapshot.
pub fn write_point_cloud(snapshot: &MapSnapshot, output_path: &Path) -> Result<ExportOutcome> {
    if snapshot.is_empty() {
        info!("active map has no map points, skipping point cloud export");
        return Ok(ExportOutcome::EmptyMap);
    }
    let dangling = snapshot.dangling_reference_ids();
    if !dangling.is_empty() {
        warn!(
            "{} reference ids are not in the active map and are skipped",
            dangling.len()
        );
    }
    let non_finite = snapshot
        .all_map_points()
        .iter()
        .filter(|p| !p.is_bad() && !is_exportable(p))
        .count();
    if non_finite > 0 {
        warn!("{} map points with non-finite positions are skipped", non_finite);
    }

    let (map_points, reference_points) = partition_landmarks(snapshot);
    let reference = reference_path(output_path);

    info!("saving map point coordinates to {}", output_path.display());
    write_csv(output_path, &map_points)?;
    info!("saving reference map point coordinates to {}", reference.display());
    write_csv(&reference, &reference_points)?;

    Ok(ExportOutcome::Written {
        primary: output_path.to_path_buf(),
        reference,
        primary_rows: map_points.len(),
        reference_rows: reference_points.len(),
    })
}

/// Exports the engine's active map as two CSV files, `output_path` and its
/// `ref_` sibling. Writes nothing when there is no active map or it is empty.
pub fn export_point_cloud<E: SlamEngine + ?Sized>(
    engine: &E,
    output_path: &Path,
) -> Result<ExportOutcome> {
    let Some(snapshot) = engine.current_map() else {
        info!("there is no active map, skipping point cloud export");
        return Ok(ExportOutcome::NoActiveMap);
    };
    write_point_cloud(&snapshot, output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra as na;

    #[test]
    fn reference_path_prefixes_file_name_only() {
        assert_eq!(
            reference_path(Path::new("/tmp/out/PointCloud.txt")),
            PathBuf::from("/tmp/out/ref_PointCloud.txt")
        );
        assert_eq!(
            reference_path(Path::new("cloud.csv")),
            PathBuf::from("ref_cloud.csv")
        );
    }

    #[test]
    fn rows_are_fixed_point() {
        let p = Landmark::new(0, na::Vector3::new(1.0, -0.5, 1e-7));
        assert_eq!(format_row(&p), "1.000000, -0.500000, 0.000000");
    }

    #[test]
    fn duplicate_references_collapse() {
        let a = Landmark::new(7, na::Vector3::zeros());
        let snapshot = MapSnapshot::new(vec![a], vec![a.id, a.id]);
        let (map_points, reference_points) = partition_landmarks(&snapshot);
        assert!(map_points.is_empty());
        assert_eq!(reference_points.len(), 1);
    }

    #[test]
    fn non_finite_positions_are_not_exportable() {
        assert!(is_exportable(&Landmark::new(1, na::Vector3::new(0.0, 1.0, 2.0))));
        assert!(!is_exportable(&Landmark::new(2, na::Vector3::new(f32::NAN, 1.0, 2.0))));
        assert!(!is_exportable(&Landmark::new(3, na::Vector3::new(0.0, f32::INFINITY, 2.0))));
        assert!(!is_exportable(&Landmark::bad(4, na::Vector3::zeros())));
    }
}
