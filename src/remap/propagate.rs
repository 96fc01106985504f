//! Bulk remap propagation across a run's results

use super::{LocationRecord, Region, RegionPopulator, ResultRecord};
use crate::paths::paths_equal_ignore_case;
use std::path::Path;
use tracing::debug;

/// Refreshes UI decorations anchored to file positions
pub trait DecorationRefresher: Send + Sync {
    fn refresh(&self, resolved_path: &Path);
}

/// For hosts without position-bound decorations
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDecorations;

impl DecorationRefresher for NoopDecorations {
    fn refresh(&self, _resolved_path: &Path) {}
}

/// Rewrite every reference to `original_path` in `results` to `resolved_path`.
///
/// Regions of rewritten locations are re-derived from the resolved file.
/// Nodes without a region keep their new path and are otherwise skipped.
/// Returns the number of rewritten references.
pub fn remap_file_paths(
    results: &mut [ResultRecord],
    original_path: &str,
    resolved_path: &Path,
    regions: &dyn RegionPopulator,
    decorations: &dyn DecorationRefresher,
) -> usize {
    let remapped = resolved_path.to_string_lossy().into_owned();
    let remapper = Remapper {
        original_path,
        remapped: &remapped,
        resolved_path,
        regions,
    };

    let mut rewritten = 0;
    for result in results.iter_mut() {
        rewritten += remapper.remap_result(result);
    }

    decorations.refresh(resolved_path);
    rewritten
}

struct Remapper<'a> {
    original_path: &'a str,
    remapped: &'a str,
    resolved_path: &'a Path,
    regions: &'a dyn RegionPopulator,
}

impl Remapper<'_> {
    fn matches(&self, path: &str) -> bool {
        paths_equal_ignore_case(path, self.original_path)
    }

    fn remap_result(&self, result: &mut ResultRecord) -> usize {
        let mut rewritten = 0;

        if self.matches(&result.file_path) {
            result.file_path = self.remapped.to_string();
            rewritten += 1;
        }

        for location in result
            .locations
            .iter_mut()
            .chain(result.related_locations.iter_mut())
            .chain(result.stacks.iter_mut().flat_map(|s| s.frames.iter_mut()))
        {
            rewritten += self.remap_location(location);
        }

        for step in &mut result.analysis_steps {
            let mut pending: Vec<_> = step.top_level_nodes.iter_mut().collect();
            while let Some(node) = pending.pop() {
                if node.file_path.as_deref().is_some_and(|p| self.matches(p)) {
                    node.file_path = Some(self.remapped.to_string());
                    node.region = self.repopulate(node.region.take());
                    rewritten += 1;
                }
                pending.extend(node.children.iter_mut());
            }
        }

        for change in result
            .fixes
            .iter_mut()
            .flat_map(|fix| fix.artifact_changes.iter_mut())
        {
            if self.matches(&change.file_path) {
                change.file_path = self.remapped.to_string();
                rewritten += 1;
            }
        }

        rewritten
    }

    fn remap_location(&self, location: &mut LocationRecord) -> usize {
        if !self.matches(&location.file_path) {
            return 0;
        }
        location.file_path = self.remapped.to_string();
        location.region = self.repopulate(location.region.take());
        1
    }

    /// Keeps the old region when it cannot be re-derived
    fn repopulate(&self, region: Option<Region>) -> Option<Region> {
        let region = region?;
        match self.regions.populate(&region, self.resolved_path, true) {
            Ok(populated) => Some(populated),
            Err(e) => {
                debug!("Keeping region for {}: {e}", self.resolved_path.display());
                Some(region)
            }
        }
    }
}
