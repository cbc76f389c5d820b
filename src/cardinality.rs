use std::fmt;

use winnow::prelude::*;
use winnow::ascii::{digit1, space0};
use winnow::combinator::{alt, opt, preceded};
use winnow::token::one_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact(u32),
    Many,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Exact(n) => write!(f, "{n}"),
            Bound::Many => f.write_str("*"),
        }
    }
}

impl Bound {
    fn word(self) -> String {
        match self {
            Bound::Exact(0) => "zero".to_string(),
            Bound::Exact(1) => "one".to_string(),
            Bound::Exact(n) => n.to_string(),
            Bound::Many => "many".to_string(),
        }
    }
}

/// Relationship cardinality as written in ontology documents.
///
/// Descriptors are free-form; whatever does not parse is kept verbatim as
/// [`Cardinality::Unparsed`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cardinality {
    /// `1:*`, `n:m`
    Ratio(Bound, Bound),
    /// `0..1`, `1..*`
    Range(Bound, Bound),
    /// `1`, `*`
    Single(Bound),
    Unparsed(String),
}

impl Cardinality {
    pub fn parse(raw: &str) -> Self {
        cardinality
            .parse(raw.trim())
            .unwrap_or_else(|_| Cardinality::Unparsed(raw.to_string()))
    }

    pub fn marker(&self) -> &'static str {
        let (min, max) = match self {
            Cardinality::Ratio(_, b) | Cardinality::Single(b) => (*b, *b),
            Cardinality::Range(a, b) => (*a, *b),
            Cardinality::Unparsed(_) => return "??",
        };
        let optional = min == Bound::Exact(0);
        let many = matches!(max, Bound::Many | Bound::Exact(2..));
        match (optional, many) {
            (false, false) => "||",
            (true, false) => "o|",
            (false, true) => "|{",
            (true, true) => "o{",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Cardinality::Ratio(a, b) => format!("{}-to-{}", a.word(), b.word()),
            Cardinality::Range(Bound::Exact(0), Bound::Exact(1)) => "zero or one".to_string(),
            Cardinality::Range(a, Bound::Many) => format!("{} or more", a.word()),
            Cardinality::Range(a, b) => format!("{} to {}", a.word(), b.word()),
            Cardinality::Single(Bound::Many) => "many".to_string(),
            Cardinality::Single(b) => format!("exactly {}", b.word()),
            Cardinality::Unparsed(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Ratio(a, b) => write!(f, "{a}:{b}"),
            Cardinality::Range(a, b) => write!(f, "{a}..{b}"),
            Cardinality::Single(b) => write!(f, "{b}"),
            Cardinality::Unparsed(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Separator {
    Ratio,
    Range,
}

fn cardinality(input: &mut &str) -> winnow::Result<Cardinality> {
    let first = bound.parse_next(input)?;
    let second = opt(alt((
        preceded((space0, ":", space0), bound).map(|b| (Separator::Ratio, b)),
        preceded((space0, "..", space0), bound).map(|b| (Separator::Range, b)),
    )))
    .parse_next(input)?;

    Ok(match second {
        Some((Separator::Ratio, b)) => Cardinality::Ratio(first, b),
        Some((Separator::Range, b)) => Cardinality::Range(first, b),
        None => Cardinality::Single(first),
    })
}

fn bound(input: &mut &str) -> winnow::Result<Bound> {
    alt((
        digit1.try_map(str::parse::<u32>).map(Bound::Exact),
        one_of(['*', 'n', 'm', 'N', 'M']).value(Bound::Many),
    ))
    .parse_next(input)
}
