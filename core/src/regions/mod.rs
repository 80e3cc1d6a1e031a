use std::fmt;

use geo::{BoundingRect, MultiPolygon, Rect};

use crate::util::bounds::union_of;

pub use self::builder::{DatasetRegionBuilder, RegionSetBuilder};
pub use self::error::BuildError;

pub mod builder;
pub mod error;

/// A named, immutable set of regions. Numbers, geometries, names, and
/// abbreviations are parallel sequences of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Regions {
    numbers: Vec<u32>,
    geometries: Vec<MultiPolygon>,
    names: Vec<String>,
    abbrevs: Vec<String>,
    name: String,
    source: String,
    overlap: bool,
}

/// A single region borrowed from [`Regions`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region<'a> {
    pub number: u32,
    pub name: &'a str,
    pub abbrev: &'a str,
    pub geometry: &'a MultiPolygon,
}

/// Identifies a region inside [`Regions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKey<'a> {
    Number(u32),
    Name(&'a str),
    Abbrev(&'a str),
}

impl Regions {
    /// Creates a new region set. Fails if the parallel sequences differ in
    /// length.
    pub fn new(
        numbers: Vec<u32>,
        geometries: Vec<MultiPolygon>,
        names: Vec<String>,
        abbrevs: Vec<String>,
        name: impl Into<String>,
        source: impl Into<String>,
        overlap: bool,
    ) -> Result<Self, BuildError> {
        let n = numbers.len();
        if geometries.len() != n || names.len() != n || abbrevs.len() != n {
            return Err(BuildError::ShapeMismatch {
                numbers: n,
                geometries: geometries.len(),
                names: names.len(),
                abbrevs: abbrevs.len(),
            });
        }

        Ok(Self {
            numbers,
            geometries,
            names,
            abbrevs,
            name: name.into(),
            source: source.into(),
            overlap,
        })
    }

    /// The display name of this region set
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the region definitions come from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether member regions may overlap each other
    pub fn overlap(&self) -> bool {
        self.overlap
    }

    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    pub fn geometries(&self) -> &[MultiPolygon] {
        &self.geometries
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn abbrevs(&self) -> &[String] {
        &self.abbrevs
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    fn region_at(&self, i: usize) -> Region<'_> {
        Region {
            number: self.numbers[i],
            name: &self.names[i],
            abbrev: &self.abbrevs[i],
            geometry: &self.geometries[i],
        }
    }

    /// Iterates over all regions in order
    pub fn iter(&self) -> impl Iterator<Item = Region<'_>> + '_ {
        (0..self.len()).map(|i| self.region_at(i))
    }

    /// Looks up a region by number, name, or abbreviation
    pub fn get(&self, key: RegionKey<'_>) -> Option<Region<'_>> {
        let pos = match key {
            RegionKey::Number(n) => self.numbers.iter().position(|&x| x == n),
            RegionKey::Name(s) => self.names.iter().position(|x| x == s),
            RegionKey::Abbrev(s) => self.abbrevs.iter().position(|x| x == s),
        }?;
        Some(self.region_at(pos))
    }

    /// Maps a region name or abbreviation to the region's number.
    /// Abbreviations take precedence.
    pub fn number_of(&self, key: &str) -> Option<u32> {
        self.get(RegionKey::Abbrev(key))
            .or_else(|| self.get(RegionKey::Name(key)))
            .map(|r| r.number)
    }

    /// Returns the rectangle that covers all regions or [`None`] if there
    /// are no (non-empty) geometries
    pub fn bounds(&self) -> Option<Rect> {
        union_of(self.geometries.iter().filter_map(|g| g.bounding_rect()))
    }
}

impl<'a> IntoIterator for &'a Regions {
    type Item = Region<'a>;
    type IntoIter = Box<dyn Iterator<Item = Region<'a>> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl fmt::Display for Regions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Regions '{}'", self.name)?;
        writeln!(f, "Source:   {}", self.source)?;
        writeln!(f, "Overlap:  {}", self.overlap)?;
        writeln!(f)?;

        let abbrev_width = self.abbrevs.iter().map(|a| a.len()).max().unwrap_or(0);
        let number_width = self
            .numbers
            .iter()
            .map(|n| n.to_string().len())
            .max()
            .unwrap_or(0);
        for r in self {
            writeln!(
                f,
                "  {:>nw$}  {:<aw$}  {}",
                r.number,
                r.abbrev,
                r.name,
                nw = number_width,
                aw = abbrev_width
            )?;
        }

        write!(f, "[{} regions]", self.len())
    }
}
