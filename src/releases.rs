//! Collation of a build's flat release list into named version histories.
//!
//! Releases are grouped by name. Each group lists its candidates newest
//! version first, and groups are ordered by the latest `created` time of any
//! of their members, most recent first.

use std::cmp::Reverse;

use serde::Serialize;

use crate::{entity::release, prelude::*};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Releases {
  /// Release name -> candidates, highest `number` first.
  pub groups: BTreeMap<String, Vec<release::Model>>,
  /// Release names, most recently created group first.
  pub order: Vec<String>,
}

/// One named release with its candidates, as handed to the presentation
/// layer.
#[derive(Debug, Serialize)]
pub struct Group {
  pub name: String,
  pub created: DateTime,
  pub candidates: Vec<release::Model>,
}

pub fn aggregate(
  releases: impl IntoIterator<Item = release::Model>,
) -> Releases {
  let mut groups: BTreeMap<String, Vec<release::Model>> = BTreeMap::new();
  for release in releases {
    groups.entry(release.name.clone()).or_default().push(release);
  }

  // equal numbers fall back to the newer record
  for candidates in groups.values_mut() {
    candidates.sort_by_key(|r| Reverse((r.number, r.id)));
  }

  let mut recency: Vec<(DateTime, &String)> = groups
    .iter()
    .filter_map(|(name, candidates)| {
      candidates.iter().map(|r| r.created).max().map(|max| (max, name))
    })
    .collect();
  recency.sort_by(|a, b| b.cmp(a));

  let order = recency.into_iter().map(|(_, name)| name.clone()).collect();

  Releases { groups, order }
}

impl Releases {
  /// Groups in display order.
  pub fn into_groups(mut self) -> Vec<Group> {
    self
      .order
      .into_iter()
      .filter_map(|name| {
        let candidates = self.groups.remove(&name)?;
        let created = candidates.iter().map(|r| r.created).max()?;
        Some(Group { name, created, candidates })
      })
      .collect()
  }
}
