//! Post-generation adjustments.
//!
//! The base tree always carries the object-mapper schema and adapter so that
//! feature trees can extend them; projects without the mapper lose both once
//! every tree has been rendered.

use crate::context::Flags;
use crate::error::Result;
use crate::processor::OutputSink;
use log::debug;
use std::path::{Path, PathBuf};

/// Subtrees owned by the object-mapper provider, relative to the project root.
pub const MAPPER_SUBTREES: [&str; 2] = ["prisma", "src/infrastructure/persistence/prisma"];

/// Removes subtrees inconsistent with the final selection and returns them.
///
/// In a dry run the sink only forgets the planned files.
pub fn adjust(destination: &Path, flags: &Flags, sink: &mut dyn OutputSink) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    if !flags.has_prisma {
        for subtree in MAPPER_SUBTREES {
            let dir = destination.join(subtree);
            if sink.remove_dir(&dir)? {
                debug!("Object mapper not selected, dropped {}", dir.display());
                removed.push(dir);
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{DiskSink, DryRunSink, WriteMode};
    use tempfile::TempDir;

    #[test]
    fn test_mapper_subtrees_removed_without_prisma() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let mut sink = DiskSink::new();
        sink.write(&root.join("prisma/schema.prisma"), b"model", WriteMode::Replace).unwrap();
        sink.write(&root.join("src/infrastructure/persistence/prisma/client.ts"), b"x", WriteMode::Replace).unwrap();
        sink.write(&root.join("src/infrastructure/logger.ts"), b"x", WriteMode::Replace).unwrap();

        let removed = adjust(root, &Flags::default(), &mut sink).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(!root.join("prisma").exists());
        assert!(!root.join("src/infrastructure/persistence/prisma").exists());
        assert!(root.join("src/infrastructure/logger.ts").exists());
        assert_eq!(sink.paths(), vec![root.join("src/infrastructure/logger.ts")]);
    }

    #[test]
    fn test_mapper_subtrees_kept_with_prisma() {
        let mut sink = DryRunSink::new();
        let root = Path::new("/project");
        sink.write(&root.join("prisma/schema.prisma"), b"model", WriteMode::Replace).unwrap();

        let flags = Flags { has_prisma: true, ..Flags::default() };
        assert!(adjust(root, &flags, &mut sink).unwrap().is_empty());
        assert_eq!(sink.paths().len(), 1);
    }

    #[test]
    fn test_dry_run_only_prunes_the_plan() {
        let mut sink = DryRunSink::new();
        let root = Path::new("/project");
        sink.write(&root.join("prisma/seed.ts"), b"seed", WriteMode::Replace).unwrap();
        sink.write(&root.join("package.json"), b"{}", WriteMode::Replace).unwrap();

        let removed = adjust(root, &Flags::default(), &mut sink).unwrap();
        assert_eq!(removed, vec![root.join("prisma")]);
        assert_eq!(sink.paths(), vec![root.join("package.json")]);
    }

    #[test]
    fn test_nothing_reported_when_nothing_was_written() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = DiskSink::new();
        sink.write(&temp_dir.path().join("package.json"), b"{}", WriteMode::Replace).unwrap();

        assert!(adjust(temp_dir.path(), &Flags::default(), &mut sink).unwrap().is_empty());
        assert!(!DryRunSink::new().remove_dir(Path::new("/project/prisma")).unwrap());
    }
}
