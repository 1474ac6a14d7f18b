use std::convert::TryFrom;
use std::fmt;
use std::num::{NonZeroU32, TryFromIntError};
use std::ops::RangeInclusive;
use std::str::FromStr;

use nom::{
    branch::alt,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_opt, opt, value},
    multi::separated_list1,
    sequence::preceded,
    IResult,
};

use crate::error::ParseError;

/// One end of a [`Sequence`]: either a concrete message number or UID, or `*`, the largest
/// number in use in the mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeqNo {
    /// A concrete, non-zero message sequence number or UID.
    Value(NonZeroU32),
    /// `*`, the largest number in use.
    Largest,
}

impl SeqNo {
    /// Resolve `*` against the given largest value.
    pub fn expand(self, largest: NonZeroU32) -> NonZeroU32 {
        match self {
            SeqNo::Value(value) => value,
            SeqNo::Largest => largest,
        }
    }
}

impl fmt::Display for SeqNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeqNo::Value(value) => write!(f, "{}", value),
            SeqNo::Largest => f.write_str("*"),
        }
    }
}

impl TryFrom<u32> for SeqNo {
    type Error = TryFromIntError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        NonZeroU32::try_from(value).map(SeqNo::Value)
    }
}

/// A single member of a [`SequenceSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sequence {
    /// A single number, e.g. `4` or `*`.
    Single(SeqNo),
    /// An inclusive range, e.g. `2:4` or `7:*`.
    Range(SeqNo, SeqNo),
}

impl Sequence {
    // the (low, high) end points of this member
    fn bounds(&self) -> (SeqNo, SeqNo) {
        match *self {
            Sequence::Single(n) => (n, n),
            Sequence::Range(a, b) if a <= b => (a, b),
            Sequence::Range(a, b) => (b, a),
        }
    }

    fn from_bounds(start: SeqNo, end: SeqNo) -> Self {
        if start == end {
            Sequence::Single(start)
        } else {
            Sequence::Range(start, end)
        }
    }

    /// Check whether `n` falls within this member. `*` is treated as unbounded.
    pub fn contains(&self, n: u32) -> bool {
        let (start, end) = self.bounds();
        let above_start = match start {
            SeqNo::Value(start) => n >= start.get(),
            SeqNo::Largest => true,
        };
        let below_end = match end {
            SeqNo::Value(end) => n <= end.get(),
            SeqNo::Largest => true,
        };
        n != 0 && above_start && below_end
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sequence::Single(n) => write!(f, "{}", n),
            Sequence::Range(a, b) => write!(f, "{}:{}", a, b),
        }
    }
}

impl TryFrom<u32> for Sequence {
    type Error = TryFromIntError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        SeqNo::try_from(value).map(Sequence::Single)
    }
}

impl TryFrom<RangeInclusive<u32>> for Sequence {
    type Error = TryFromIntError;

    fn try_from(range: RangeInclusive<u32>) -> Result<Self, Self::Error> {
        let start = SeqNo::try_from(*range.start())?;
        let end = SeqNo::try_from(*range.end())?;
        Ok(Sequence::from_bounds(start, end))
    }
}

/// A set of message sequence numbers or UIDs, as described by the `sequence-set` rule of [RFC
/// 3501](https://tools.ietf.org/html/rfc3501#section-9).
///
/// The set is kept in canonical form: members are ordered, ranges run from low to high, and
/// overlapping or adjacent members are merged. Its [`Display`](fmt::Display) output is
/// therefore the canonical text of the set, and parsing that text yields an equal set.
///
/// ```
/// # use imap_uidplus::types::SequenceSet;
/// let set: SequenceSet = "5,1:3,4,9:*".parse().unwrap();
/// assert_eq!(set.to_string(), "1:5,9:*");
/// assert!(set.contains(2));
/// assert!(!set.contains(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceSet(Vec<Sequence>);

impl SequenceSet {
    /// The members of this set, in canonical order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sequence> {
        self.0.iter()
    }

    /// Number of disjoint members in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no members. Sets parsed from text are never empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check whether `n` is in the set. A `*` end point is treated as unbounded.
    pub fn contains(&self, n: u32) -> bool {
        self.0.iter().any(|seq| seq.contains(n))
    }

    /// Enumerate every number in the set, member by member, resolving `*` to `largest`.
    ///
    /// A member ending in `*` never yields anything above `largest`: with `largest = 5`, `9:*`
    /// yields just 5. Members without `*` are enumerated as written.
    pub fn values(&self, largest: NonZeroU32) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().flat_map(move |seq| {
            let (start, end) = seq.bounds();
            let start = start.expand(largest).get();
            match end {
                SeqNo::Largest => start.min(largest.get())..=largest.get(),
                SeqNo::Value(end) => start..=end.get(),
            }
        })
    }

    /// Add a member to the set, keeping it in canonical form.
    pub fn insert(&mut self, seq: Sequence) {
        let members = std::mem::take(&mut self.0);
        self.0 = normalize(members.into_iter().chain(Some(seq)));
    }
}

fn adjoins(end: SeqNo, start: SeqNo) -> bool {
    match (end, start) {
        (SeqNo::Largest, _) => true,
        (SeqNo::Value(_), SeqNo::Largest) => false,
        (SeqNo::Value(end), SeqNo::Value(start)) => start.get() <= end.get().saturating_add(1),
    }
}

fn normalize(seqs: impl IntoIterator<Item = Sequence>) -> Vec<Sequence> {
    let mut bounds: Vec<(SeqNo, SeqNo)> = seqs.into_iter().map(|s| s.bounds()).collect();
    bounds.sort();

    let mut merged: Vec<(SeqNo, SeqNo)> = Vec::with_capacity(bounds.len());
    for (start, end) in bounds {
        if let Some(last) = merged.last_mut() {
            if adjoins(last.1, start) {
                if end > last.1 {
                    last.1 = end;
                }
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
        .into_iter()
        .map(|(start, end)| Sequence::from_bounds(start, end))
        .collect()
}

impl FromIterator<Sequence> for SequenceSet {
    fn from_iter<I: IntoIterator<Item = Sequence>>(iter: I) -> Self {
        SequenceSet(normalize(iter))
    }
}

impl From<Sequence> for SequenceSet {
    fn from(seq: Sequence) -> Self {
        SequenceSet(vec![seq])
    }
}

impl TryFrom<u32> for SequenceSet {
    type Error = TryFromIntError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Sequence::try_from(value).map(SequenceSet::from)
    }
}

impl TryFrom<RangeInclusive<u32>> for SequenceSet {
    type Error = TryFromIntError;

    fn try_from(range: RangeInclusive<u32>) -> Result<Self, Self::Error> {
        Sequence::try_from(range).map(|seq| std::iter::once(seq).collect())
    }
}

impl<'a> IntoIterator for &'a SequenceSet {
    type Item = &'a Sequence;
    type IntoIter = std::slice::Iter<'a, Sequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut members = self.0.iter();
        if let Some(first) = members.next() {
            write!(f, "{}", first)?;
        }
        for seq in members {
            write!(f, ",{}", seq)?;
        }
        Ok(())
    }
}

fn seq_number(i: &str) -> IResult<&str, SeqNo> {
    alt((
        value(SeqNo::Largest, char('*')),
        // RFC 3501 forbids leading zeroes, which `str::parse` would happily accept
        map_opt(digit1, |digits: &str| {
            if digits.starts_with('0') {
                None
            } else {
                digits.parse::<NonZeroU32>().ok().map(SeqNo::Value)
            }
        }),
    ))(i)
}

fn sequence(i: &str) -> IResult<&str, Sequence> {
    let (i, start) = seq_number(i)?;
    let (i, end) = opt(preceded(char(':'), seq_number))(i)?;
    let seq = match end {
        Some(end) => Sequence::Range(start, end),
        None => Sequence::Single(start),
    };
    Ok((i, seq))
}

fn sequence_set(i: &str) -> IResult<&str, Vec<Sequence>> {
    separated_list1(char(','), sequence)(i)
}

impl FromStr for SequenceSet {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match all_consuming(sequence_set)(s) {
            Ok((_, seqs)) => Ok(seqs.into_iter().collect()),
            Err(_) => Err(ParseError::SequenceSet(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(s: &str) -> SequenceSet {
        s.parse().unwrap()
    }

    #[test]
    fn canonical_text() {
        assert_eq!(set("1").to_string(), "1");
        assert_eq!(set("1:3").to_string(), "1:3");
        assert_eq!(set("3:1").to_string(), "1:3");
        assert_eq!(set("4,1:3").to_string(), "1:4");
        assert_eq!(set("1:3,2:6,10").to_string(), "1:6,10");
        assert_eq!(set("7,7,7").to_string(), "7");
        assert_eq!(set("*").to_string(), "*");
        assert_eq!(set("*:4").to_string(), "4:*");
        assert_eq!(set("9:*,3,10").to_string(), "3,9:*");
        assert_eq!(set("5,*").to_string(), "5,*");
        assert_eq!(set("2:2").to_string(), "2");
    }

    #[test]
    fn canonical_text_reparses() {
        for text in ["1", "1:3,5", "2,4:7,9:*", "*", "1:4294967295"] {
            let parsed = set(text);
            assert_eq!(set(&parsed.to_string()), parsed);
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn rejects_malformed() {
        for text in ["", "0", "1:0", "01", "a", "1,", ",1", "1::2", "1 2", "1:3:5", "4294967296"] {
            match text.parse::<SequenceSet>() {
                Err(ParseError::SequenceSet(t)) => assert_eq!(t, text),
                other => panic!("{:?} parsed as {:?}", text, other),
            }
        }
    }

    #[test]
    fn membership() {
        let s = set("1:3,7,10:*");
        assert!(s.contains(1));
        assert!(s.contains(3));
        assert!(!s.contains(4));
        assert!(s.contains(7));
        assert!(s.contains(1000));
        assert!(!s.contains(0));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn values() {
        let largest = NonZeroU32::new(12).unwrap();
        let v: Vec<u32> = set("1:3,10:*").values(largest).collect();
        assert_eq!(v, vec![1, 2, 3, 10, 11, 12]);
    }

    #[test]
    fn values_stop_at_largest() {
        let largest = NonZeroU32::new(5).unwrap();
        let v: Vec<u32> = set("9:*").values(largest).collect();
        assert_eq!(v, vec![5]);
        let v: Vec<u32> = set("2,4:*").values(largest).collect();
        assert_eq!(v, vec![2, 4, 5]);
        let v: Vec<u32> = set("*").values(largest).collect();
        assert_eq!(v, vec![5]);
    }

    #[test]
    fn from_numbers() {
        assert_eq!(SequenceSet::try_from(4).unwrap().to_string(), "4");
        assert_eq!(SequenceSet::try_from(4..=9).unwrap().to_string(), "4:9");
        assert!(SequenceSet::try_from(0).is_err());

        let mut s = SequenceSet::try_from(1..=2).unwrap();
        s.insert(Sequence::try_from(3).unwrap());
        s.insert(Sequence::try_from(8).unwrap());
        assert_eq!(s.to_string(), "1:3,8");
    }
}
