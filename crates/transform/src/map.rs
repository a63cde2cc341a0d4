//! Position mappings.
//!
//! Every step produces a `StepMap` describing which ranges of the old
//! document were replaced, and by how much content. A `Mapping` strings
//! step maps together so a position can be carried across a whole
//! sequence of edits.
//!
//! # Bias
//!
//! A position sitting exactly where content was inserted is ambiguous: it
//! could end up before or after the new content. `Bias::Left` keeps it
//! before, `Bias::Right` moves it after.
//!
//! # Mirrors
//!
//! When a mapping contains a map and, later on, its inverse (the edit was
//! undone and then redone against a different base), the pair is recorded
//! as mirrors. A position that the first map deleted can then be restored
//! exactly by the second, instead of collapsing onto the edge of the
//! deleted range. Rebasing depends on this.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

const DEL_BEFORE: u8 = 0x01;
const DEL_AFTER: u8 = 0x02;
const DEL_ACROSS: u8 = 0x04;
const DEL_SIDE: u8 = 0x08;

/// Which side of an insertion a position sticks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bias {
    Left,
    Right,
}

/// Where a position sat inside a replaced range, so a mirror map can
/// restore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recover {
    index: usize,
    offset: usize,
}

/// The result of mapping a position, with information about deletions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapResult {
    /// The mapped position.
    pub pos: usize,
    del_info: u8,
    recover: Option<Recover>,
}

impl MapResult {
    /// The content on the biased side of the position was deleted.
    pub fn deleted(&self) -> bool {
        return (self.del_info & DEL_SIDE) != 0;
    }

    /// The content directly before the position was deleted.
    pub fn deleted_before(&self) -> bool {
        return (self.del_info & (DEL_BEFORE | DEL_ACROSS)) != 0;
    }

    /// The content directly after the position was deleted.
    pub fn deleted_after(&self) -> bool {
        return (self.del_info & (DEL_AFTER | DEL_ACROSS)) != 0;
    }

    /// The position was strictly inside a deleted range.
    pub fn deleted_across(&self) -> bool {
        return (self.del_info & DEL_ACROSS) != 0;
    }
}

/// Anything that can translate positions.
pub trait Mappable {
    /// Map a position, reporting deletion information.
    fn map_result(&self, pos: usize, bias: Bias) -> MapResult;

    /// Map a position.
    fn map(&self, pos: usize, bias: Bias) -> usize {
        return self.map_result(pos, bias).pos;
    }
}

/// One replaced range: `old_size` characters at `start` became `new_size`
/// characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MapRange {
    start: usize,
    old_size: usize,
    new_size: usize,
}

/// A single replaced range, expressed in both coordinate spaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Change {
    pub old_start: usize,
    pub old_end: usize,
    pub new_start: usize,
    pub new_end: usize,
}

/// The position map produced by a single step.
///
/// Ranges are sorted and expressed in the coordinates of the document the
/// step applies to. Replace steps only ever need one range, so the ranges
/// live inline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMap {
    ranges: SmallVec<[MapRange; 1]>,
}

impl StepMap {
    /// A map that changes nothing.
    pub fn empty() -> StepMap {
        return StepMap { ranges: SmallVec::new() };
    }

    /// A map replacing `old_size` characters at `start` with `new_size`.
    pub fn replace(start: usize, old_size: usize, new_size: usize) -> StepMap {
        let mut ranges = SmallVec::new();
        if old_size != 0 || new_size != 0 {
            ranges.push(MapRange { start, old_size, new_size });
        }
        return StepMap { ranges };
    }

    /// Build a map from `(start, old_size, new_size)` triples, which must be
    /// sorted and non-overlapping.
    pub fn from_ranges(ranges: impl IntoIterator<Item = (usize, usize, usize)>) -> StepMap {
        let ranges = ranges
            .into_iter()
            .filter(|&(_, old_size, new_size)| old_size != 0 || new_size != 0)
            .map(|(start, old_size, new_size)| MapRange { start, old_size, new_size })
            .collect();
        return StepMap { ranges };
    }

    /// Return true if this map leaves every position unchanged.
    pub fn is_empty(&self) -> bool {
        return self.ranges.is_empty();
    }

    /// The map going the other way: from this map's output back to its input.
    pub fn invert(&self) -> StepMap {
        let mut diff: isize = 0;
        let mut ranges = SmallVec::new();
        for range in &self.ranges {
            ranges.push(MapRange {
                start: (range.start as isize + diff) as usize,
                old_size: range.new_size,
                new_size: range.old_size,
            });
            diff += range.new_size as isize - range.old_size as isize;
        }
        return StepMap { ranges };
    }

    /// Restore a position recorded while mapping through this map's inverse.
    pub fn recover(&self, recover: Recover) -> usize {
        let diff: isize = self.ranges[..recover.index]
            .iter()
            .map(|r| r.new_size as isize - r.old_size as isize)
            .sum();
        let start = self.ranges[recover.index].start as isize + diff;
        return start as usize + recover.offset;
    }

    /// Iterate over the replaced ranges in both coordinate spaces.
    pub fn changes(&self) -> impl Iterator<Item = Change> + '_ {
        let mut diff: isize = 0;
        return self.ranges.iter().map(move |range| {
            let new_start = (range.start as isize + diff) as usize;
            diff += range.new_size as isize - range.old_size as isize;
            return Change {
                old_start: range.start,
                old_end: range.start + range.old_size,
                new_start,
                new_end: new_start + range.new_size,
            };
        });
    }
}

impl Mappable for StepMap {
    fn map_result(&self, pos: usize, bias: Bias) -> MapResult {
        let mut diff: isize = 0;
        for (index, range) in self.ranges.iter().enumerate() {
            if range.start > pos {
                break;
            }
            let end = range.start + range.old_size;
            if pos <= end {
                let side = if range.old_size == 0 {
                    bias
                } else if pos == range.start {
                    Bias::Left
                } else if pos == end {
                    Bias::Right
                } else {
                    bias
                };
                let base = (range.start as isize + diff) as usize;
                let result = match side {
                    Bias::Left => base,
                    Bias::Right => base + range.new_size,
                };

                // The edge the bias points at survives; anything else was
                // swallowed by the replacement.
                let edge = match bias {
                    Bias::Left => range.start,
                    Bias::Right => end,
                };
                let recover = if pos == edge {
                    None
                } else {
                    Some(Recover { index, offset: pos - range.start })
                };
                let mut del_info = if pos == range.start {
                    DEL_AFTER
                } else if pos == end {
                    DEL_BEFORE
                } else {
                    DEL_ACROSS
                };
                if pos != edge {
                    del_info |= DEL_SIDE;
                }
                return MapResult { pos: result, del_info, recover };
            }
            diff += range.new_size as isize - range.old_size as isize;
        }
        return MapResult {
            pos: (pos as isize + diff) as usize,
            del_info: 0,
            recover: None,
        };
    }
}

/// An ordered composition of step maps.
#[derive(Clone, Debug, Default)]
pub struct Mapping {
    maps: Vec<StepMap>,
    /// Index of each map's inverse, recorded in both directions.
    mirror: FxHashMap<usize, usize>,
}

impl Mapping {
    /// Create an empty (identity) mapping.
    pub fn new() -> Mapping {
        return Mapping::default();
    }

    /// Create a mapping from a sequence of maps, without mirrors.
    pub fn from_maps(maps: impl IntoIterator<Item = StepMap>) -> Mapping {
        return Mapping {
            maps: maps.into_iter().collect(),
            mirror: FxHashMap::default(),
        };
    }

    /// The component maps, in application order.
    pub fn maps(&self) -> &[StepMap] {
        return &self.maps;
    }

    /// Number of component maps.
    pub fn len(&self) -> usize {
        return self.maps.len();
    }

    /// Return true if the mapping has no component maps.
    pub fn is_empty(&self) -> bool {
        return self.maps.is_empty();
    }

    /// Append a map. If `mirrors` is given, the new map is recorded as the
    /// inverse of the map at that index.
    pub fn append_map(&mut self, map: StepMap, mirrors: Option<usize>) {
        self.maps.push(map);
        if let Some(mirror) = mirrors {
            self.set_mirror(self.maps.len() - 1, mirror);
        }
    }

    /// Append all maps of another mapping, keeping its internal mirrors.
    pub fn append_mapping(&mut self, other: &Mapping) {
        let start = self.maps.len();
        for (i, map) in other.maps.iter().enumerate() {
            let mirror = other.get_mirror(i).filter(|&m| m < i).map(|m| start + m);
            self.append_map(map.clone(), mirror);
        }
    }

    /// Record that the maps at `n` and `m` are inverses of each other.
    pub fn set_mirror(&mut self, n: usize, m: usize) {
        if self.mirror.contains_key(&n) {
            return;
        }
        self.mirror.insert(n, m);
        self.mirror.entry(m).or_insert(n);
    }

    /// The index of the map mirroring the one at `n`, if any.
    pub fn get_mirror(&self, n: usize) -> Option<usize> {
        return self.mirror.get(&n).copied();
    }

    /// A view of this mapping that starts at component `from`.
    pub fn slice(&self, from: usize) -> MappingSlice<'_> {
        return MappingSlice {
            mapping: self,
            from: from.min(self.maps.len()),
        };
    }

    fn map_from(&self, from: usize, pos: usize, bias: Bias) -> MapResult {
        let mut pos = pos;
        let mut del_info = 0;
        let mut i = from;
        while i < self.maps.len() {
            let result = self.maps[i].map_result(pos, bias);
            if let Some(recover) = result.recover {
                if let Some(corr) = self.get_mirror(i).filter(|&c| c > i) {
                    // Skip straight to the mirror, which restores the
                    // position inside the content it re-creates.
                    pos = self.maps[corr].recover(recover);
                    i = corr + 1;
                    continue;
                }
            }
            del_info |= result.del_info;
            pos = result.pos;
            i += 1;
        }
        return MapResult { pos, del_info, recover: None };
    }
}

impl Mappable for Mapping {
    fn map_result(&self, pos: usize, bias: Bias) -> MapResult {
        return self.map_from(0, pos, bias);
    }
}

/// A borrowed tail of a `Mapping`. Mirror indices stay absolute, so no
/// copying is needed.
#[derive(Clone, Copy, Debug)]
pub struct MappingSlice<'a> {
    mapping: &'a Mapping,
    from: usize,
}

impl MappingSlice<'_> {
    /// Number of component maps in the view.
    pub fn len(&self) -> usize {
        return self.mapping.maps.len() - self.from;
    }

    /// Return true if the view covers no maps.
    pub fn is_empty(&self) -> bool {
        return self.len() == 0;
    }
}

impl Mappable for MappingSlice<'_> {
    fn map_result(&self, pos: usize, bias: Bias) -> MapResult {
        return self.mapping.map_from(self.from, pos, bias);
    }
}
