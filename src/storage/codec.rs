//! Encoding of a single target's delta record.
//!
//! ```text
//! delta       := rootCount:int32 rootRecord* deletedCount:int32 path*
//! rootRecord  := rootId:string fileCount:int32 path*
//! ```
//!
//! Roots and paths are written in sorted order so equal states produce equal
//! bytes.

use super::delta::DeltaSets;
use crate::target::{BuildTarget, TargetCatalog};
use crate::utils::serialization::{
    read_count, read_path, read_string, skip_string, write_count, write_path, write_string,
};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::info;

/// Write one delta record
///
/// # Errors
///
/// Returns an error if a path is not valid UTF-8 or the writer fails
pub(crate) fn write_delta<W: Write>(out: &mut W, sets: &DeltaSets) -> Result<()> {
    let mut roots: Vec<_> = sets.dirty.iter().collect();
    roots.sort_by(|a, b| a.0.root_id().cmp(b.0.root_id()));

    write_count(out, roots.len())?;
    for (root, files) in roots {
        write_string(out, root.root_id())?;
        write_paths(out, files)?;
    }
    write_paths(out, &sets.deleted)
}

fn write_paths<W: Write>(out: &mut W, paths: &HashSet<PathBuf>) -> Result<()> {
    let mut sorted: Vec<_> = paths.iter().collect();
    sorted.sort();

    write_count(out, sorted.len())?;
    for path in sorted {
        write_path(out, path)?;
    }
    Ok(())
}

/// Decoded delta together with the number of roots that could not be resolved
pub(crate) struct DecodedDelta {
    pub(crate) sets: DeltaSets,
    pub(crate) skipped_roots: usize,
}

/// Read one delta record for a resolved target.
///
/// Roots the catalog no longer knows are consumed and dropped.
///
/// # Errors
///
/// Returns an error if the record is truncated or malformed
pub(crate) fn read_delta<R: Read>(
    input: &mut R,
    target: &BuildTarget,
    catalog: &dyn TargetCatalog,
) -> Result<DecodedDelta> {
    let mut sets = DeltaSets::default();
    let mut skipped_roots = 0;

    let root_count = read_count(input).context("Failed to read root count")?;
    for _ in 0..root_count {
        let root_id = read_string(input).context("Failed to read root id")?;
        match catalog.resolve_root(target, &root_id) {
            Some(root) => {
                let files = read_paths(input)?;
                if !files.is_empty() {
                    sets.dirty.entry(root).or_default().extend(files);
                }
            }
            None => {
                info!(build_target = %target, root = %root_id, "Skipping unknown root");
                skip_paths(input)?;
                skipped_roots += 1;
            }
        }
    }

    sets.deleted = read_paths(input)?;

    Ok(DecodedDelta {
        sets,
        skipped_roots,
    })
}

fn read_paths<R: Read>(input: &mut R) -> Result<HashSet<PathBuf>> {
    let count = read_count(input).context("Failed to read path count")?;
    let mut paths = HashSet::new();
    for _ in 0..count {
        paths.insert(read_path(input)?);
    }
    Ok(paths)
}

/// Consume one delta record without decoding it
///
/// # Errors
///
/// Returns an error if the record is truncated or malformed
pub(crate) fn skip_delta<R: Read>(input: &mut R) -> Result<()> {
    let root_count = read_count(input).context("Failed to read root count")?;
    for _ in 0..root_count {
        skip_string(input)?;
        skip_paths(input)?;
    }
    skip_paths(input)
}

fn skip_paths<R: Read>(input: &mut R) -> Result<()> {
    let count = read_count(input).context("Failed to read path count")?;
    for _ in 0..count {
        skip_string(input)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{BuildRoot, PermissiveCatalog, TargetRegistry};
    use crate::utils::serialization::read_int;
    use std::io::Cursor;

    fn sample() -> (BuildTarget, DeltaSets) {
        let target = BuildTarget::new("java-production", "core");
        let mut sets = DeltaSets::default();
        sets.dirty.insert(
            BuildRoot::new(target.clone(), "src"),
            HashSet::from([PathBuf::from("/p/src/B.java"), PathBuf::from("/p/src/A.java")]),
        );
        sets.dirty.insert(
            BuildRoot::new(target.clone(), "gen"),
            HashSet::from([PathBuf::from("/p/gen/C.java")]),
        );
        sets.deleted.insert(PathBuf::from("/p/src/Old.java"));
        (target, sets)
    }

    #[test]
    fn test_delta_layout() -> Result<()> {
        let (_, sets) = sample();
        let mut buf = Vec::new();
        write_delta(&mut buf, &sets)?;

        let mut cursor = Cursor::new(buf);
        assert_eq!(read_int(&mut cursor)?, 2);
        // Roots are sorted by id
        assert_eq!(read_string(&mut cursor)?, "gen");
        assert_eq!(read_int(&mut cursor)?, 1);
        assert_eq!(read_string(&mut cursor)?, "/p/gen/C.java");
        assert_eq!(read_string(&mut cursor)?, "src");
        assert_eq!(read_int(&mut cursor)?, 2);
        assert_eq!(read_string(&mut cursor)?, "/p/src/A.java");
        assert_eq!(read_string(&mut cursor)?, "/p/src/B.java");
        assert_eq!(read_int(&mut cursor)?, 1);
        assert_eq!(read_string(&mut cursor)?, "/p/src/Old.java");
        Ok(())
    }

    #[test]
    fn test_read_delta_restores_sets() -> Result<()> {
        let (target, sets) = sample();
        let mut buf = Vec::new();
        write_delta(&mut buf, &sets)?;

        let decoded = read_delta(&mut Cursor::new(buf), &target, &PermissiveCatalog)?;
        assert_eq!(decoded.sets, sets);
        assert_eq!(decoded.skipped_roots, 0);
        Ok(())
    }

    #[test]
    fn test_unknown_root_is_dropped() -> Result<()> {
        let (target, sets) = sample();
        let mut buf = Vec::new();
        write_delta(&mut buf, &sets)?;

        let mut registry = TargetRegistry::new();
        registry.register_root(&BuildRoot::new(target.clone(), "src"));

        let decoded = read_delta(&mut Cursor::new(buf), &target, &registry)?;
        assert_eq!(decoded.skipped_roots, 1);
        assert_eq!(decoded.sets.dirty.len(), 1);
        assert_eq!(decoded.sets.deleted, sets.deleted);
        Ok(())
    }

    #[test]
    fn test_skip_consumes_whole_record() -> Result<()> {
        let (_, sets) = sample();
        let mut buf = Vec::new();
        write_delta(&mut buf, &sets)?;
        let record_len = buf.len() as u64;
        write_string(&mut buf, "next")?;

        let mut cursor = Cursor::new(buf);
        skip_delta(&mut cursor)?;
        assert_eq!(cursor.position(), record_len);
        assert_eq!(read_string(&mut cursor)?, "next");
        Ok(())
    }

    #[test]
    fn test_truncated_record_fails() -> Result<()> {
        let (target, sets) = sample();
        let mut buf = Vec::new();
        write_delta(&mut buf, &sets)?;
        buf.truncate(buf.len() - 1);

        assert!(read_delta(&mut Cursor::new(buf.clone()), &target, &PermissiveCatalog).is_err());
        assert!(skip_delta(&mut Cursor::new(buf)).is_err());
        Ok(())
    }
}
