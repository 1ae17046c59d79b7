//! Core domain types for Parallels.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, MapAccess, Unexpected, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{ParallelsError, Result};

// ---------------------------------------------------------------------------
// CitationKey / TextIndex
// ---------------------------------------------------------------------------

/// `<book-numeral>.<chapter>.<paragraph>`, e.g. `I.1.2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CitationKey(String);

impl CitationKey {
    /// Wrap a marker string as found in the source text (whitespace trimmed).
    pub fn from_marker(marker: &str) -> Self {
        Self(marker.trim().to_string())
    }

    /// Build the key for a resolved reference.
    pub fn new(book: BookNumeral, chapter: &str, paragraph: &str) -> Self {
        Self(format!("{book}.{chapter}.{paragraph}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CitationKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CitationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Citation key → single-line passage text. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextIndex {
    passages: HashMap<CitationKey, String>,
}

impl TextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a passage. A later passage with the same key replaces the
    /// earlier one; the replaced text is returned.
    pub fn insert(&mut self, key: CitationKey, text: String) -> Option<String> {
        self.passages.insert(key, text)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.passages.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

impl FromIterator<(CitationKey, String)> for TextIndex {
    fn from_iter<I: IntoIterator<Item = (CitationKey, String)>>(iter: I) -> Self {
        Self {
            passages: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// BookNumeral
// ---------------------------------------------------------------------------

/// Book numbers of the *Jewish Wars*. Closed set: anything outside I–VII has
/// no passages to resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookNumeral {
    I,
    II,
    III,
    IV,
    V,
    VI,
    VII,
}

impl BookNumeral {
    pub const ALL: [BookNumeral; 7] = [
        Self::I,
        Self::II,
        Self::III,
        Self::IV,
        Self::V,
        Self::VI,
        Self::VII,
    ];

    /// Map an Arabic book number (1–7).
    pub fn from_number(n: u32) -> Option<Self> {
        let idx = usize::try_from(n).ok()?.checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    /// Map a numeral that is already written in Roman form (`"IV"`).
    pub fn from_roman(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_str() == s)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
            Self::V => "V",
            Self::VI => "VI",
            Self::VII => "VII",
        }
    }
}

impl fmt::Display for BookNumeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SourceWork / RelationEntry
// ---------------------------------------------------------------------------

/// The work a cross-reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceWork {
    Wars,
    Antiquities,
}

impl SourceWork {
    /// Wars rows carry a purely numeric reference number; everything else is
    /// Antiquities.
    pub fn classify(source_ref_num: &str) -> Self {
        if !source_ref_num.is_empty() && source_ref_num.bytes().all(|b| b.is_ascii_digit()) {
            Self::Wars
        } else {
            Self::Antiquities
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Wars => "Wars",
            Self::Antiquities => "Antiquities",
        }
    }
}

impl fmt::Display for SourceWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One cross-reference from a verse into a source work, e.g. `Wars 1.1.2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationEntry {
    pub source: SourceWork,
    /// Location within the source work, as written in the table.
    pub location: String,
}

impl RelationEntry {
    pub fn new(source: SourceWork, location: impl Into<String>) -> Self {
        Self {
            source,
            location: location.into(),
        }
    }

    /// The `"<source> <location>"` form used as the record's `ref`.
    pub fn reference(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RelationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.source, self.location)
    }
}

// ---------------------------------------------------------------------------
// VerseRef
// ---------------------------------------------------------------------------

/// A `chapter:verse` location in the target work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerseRef {
    pub chapter: u32,
    pub verse: u32,
}

impl std::str::FromStr for VerseRef {
    type Err = ParallelsError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let (Some(chapter), Some(verse), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParallelsError::parse(format!(
                "expected CHAPTER:VERSE, got '{s}'"
            )));
        };
        let number = |part: &str| {
            part.parse::<u32>().map_err(|e| {
                ParallelsError::parse(format!("invalid number '{part}' in '{s}': {e}"))
            })
        };
        Ok(Self {
            chapter: number(chapter)?,
            verse: number(verse)?,
        })
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

// ---------------------------------------------------------------------------
// ParallelRecord
// ---------------------------------------------------------------------------

/// One resolved parallel as served to the website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelRecord {
    /// The relation entry this record was resolved from (`"Wars 1.2.3"`).
    #[serde(rename = "ref")]
    pub reference: String,
    /// Passage text, or the not-found sentinel.
    pub text: String,
}

// ---------------------------------------------------------------------------
// VerseMap
// ---------------------------------------------------------------------------

/// Chapter → verse → items, kept in first-insertion order.
///
/// Chapters and verses are created only through [`VerseMap::verse_mut`], so
/// a key never exists without having been asked for. Serializes as a JSON
/// object with stringified keys, preserving insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseMap<T> {
    chapters: Vec<ChapterEntry<T>>,
}

/// All verses recorded for one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterEntry<T> {
    pub chapter: u32,
    pub verses: Vec<VerseEntry<T>>,
}

/// Items recorded for one verse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseEntry<T> {
    pub verse: u32,
    pub items: Vec<T>,
}

/// Chapter → verse → relation entries parsed from the table.
pub type RelationTable = VerseMap<RelationEntry>;

/// Chapter → verse → resolved records; the generated artifact.
pub type ParallelMap = VerseMap<ParallelRecord>;

impl<T> Default for VerseMap<T> {
    fn default() -> Self {
        Self {
            chapters: Vec::new(),
        }
    }
}

impl<T> VerseMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the item list for `chapter:verse`, inserting empty chapter and
    /// verse entries at the end if absent.
    pub fn verse_mut(&mut self, chapter: u32, verse: u32) -> &mut Vec<T> {
        let ci = match self.chapters.iter().position(|c| c.chapter == chapter) {
            Some(i) => i,
            None => {
                self.chapters.push(ChapterEntry {
                    chapter,
                    verses: Vec::new(),
                });
                self.chapters.len() - 1
            }
        };

        let verses = &mut self.chapters[ci].verses;
        let vi = match verses.iter().position(|v| v.verse == verse) {
            Some(i) => i,
            None => {
                verses.push(VerseEntry {
                    verse,
                    items: Vec::new(),
                });
                verses.len() - 1
            }
        };

        &mut verses[vi].items
    }

    /// Append an item to `chapter:verse`.
    pub fn push(&mut self, chapter: u32, verse: u32, item: T) {
        self.verse_mut(chapter, verse).push(item);
    }

    pub fn get(&self, chapter: u32, verse: u32) -> Option<&[T]> {
        self.chapters
            .iter()
            .find(|c| c.chapter == chapter)?
            .verses
            .iter()
            .find(|v| v.verse == verse)
            .map(|v| v.items.as_slice())
    }

    pub fn chapters(&self) -> &[ChapterEntry<T>] {
        &self.chapters
    }

    /// Every `(chapter, verse, item)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &T)> {
        self.chapters.iter().flat_map(|c| {
            c.verses
                .iter()
                .flat_map(move |v| v.items.iter().map(move |item| (c.chapter, v.verse, item)))
        })
    }

    /// Total number of items across all verses.
    pub fn len(&self) -> usize {
        self.chapters
            .iter()
            .flat_map(|c| &c.verses)
            .map(|v| v.items.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct `chapter:verse` keys.
    pub fn verse_count(&self) -> usize {
        self.chapters.iter().map(|c| c.verses.len()).sum()
    }
}

impl<T: PartialEq> VerseMap<T> {
    /// Append `item` unless an equal item is already recorded for
    /// `chapter:verse`. Returns whether it was inserted.
    pub fn insert_unique(&mut self, chapter: u32, verse: u32, item: T) -> bool {
        let items = self.verse_mut(chapter, verse);
        if items.contains(&item) {
            return false;
        }
        items.push(item);
        true
    }
}

// --- serde ---

impl<T: Serialize> Serialize for VerseMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.chapters.len()))?;
        for chapter in &self.chapters {
            map.serialize_entry(&chapter.chapter.to_string(), &VersesOut(&chapter.verses))?;
        }
        map.end()
    }
}

struct VersesOut<'a, T>(&'a [VerseEntry<T>]);

impl<T: Serialize> Serialize for VersesOut<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for verse in self.0 {
            map.serialize_entry(&verse.verse.to_string(), &verse.items)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for VerseMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ChaptersVisitor(PhantomData))
    }
}

fn numeric_key<E: de::Error>(key: &str) -> std::result::Result<u32, E> {
    key.parse()
        .map_err(|_| E::invalid_value(Unexpected::Str(key), &"a non-negative integer key"))
}

struct ChaptersVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ChaptersVisitor<T> {
    type Value = VerseMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of chapter numbers to verse maps")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut map = VerseMap::new();
        while let Some(key) = access.next_key::<String>()? {
            let chapter = numeric_key(&key)?;
            let VersesIn(verses) = access.next_value::<VersesIn<T>>()?;
            for (verse, items) in verses {
                map.verse_mut(chapter, verse).extend(items);
            }
        }
        Ok(map)
    }
}

struct VersesIn<T>(Vec<(u32, Vec<T>)>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for VersesIn<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(VersesVisitor(PhantomData))
    }
}

struct VersesVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for VersesVisitor<T> {
    type Value = VersesIn<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of verse numbers to item lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut verses = Vec::new();
        while let Some(key) = access.next_key::<String>()? {
            let verse = numeric_key(&key)?;
            verses.push((verse, access.next_value::<Vec<T>>()?));
        }
        Ok(VersesIn(verses))
    }
}
