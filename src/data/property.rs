//! Typed, row-aligned property arrays.
//!
//! A [`PropertyArray`] holds one value (or one fixed-width vector) per pore or
//! per throat. Growth pads new rows according to the kind of the array:
//!
//! | kind            | padding                                   |
//! |-----------------|-------------------------------------------|
//! | `Bool`          | `false`                                   |
//! | `Int`           | promoted to `Real`, padded with NaN       |
//! | `Real`          | NaN                                       |
//! | `Vector{width}` | `width` NaN values per row                |
//!
//! Growing by zero rows never changes the kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag for a property array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Bool,
    Int,
    Real,
    /// Row-major `f64` storage with `width` components per row.
    Vector(usize),
}

impl PropertyKind {
    /// Returns a stable string label for the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKind::Bool => "bool",
            PropertyKind::Int => "int",
            PropertyKind::Real => "real",
            PropertyKind::Vector(_) => "vector",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Vector(width) => write!(f, "vector[{width}]"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Tagged storage for one named property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyArray {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Real(Vec<f64>),
    Vector { width: usize, data: Vec<f64> },
}

impl PropertyArray {
    /// An array of `rows` padding values of the given kind.
    ///
    /// `Int` padding is NaN, so the result is `Real`.
    pub fn padding(kind: PropertyKind, rows: usize) -> Self {
        match kind {
            PropertyKind::Bool => PropertyArray::Bool(vec![false; rows]),
            PropertyKind::Int | PropertyKind::Real => PropertyArray::Real(vec![f64::NAN; rows]),
            PropertyKind::Vector(width) => PropertyArray::Vector {
                width,
                data: vec![f64::NAN; rows * width],
            },
        }
    }

    /// Build a vector-valued array from fixed-size rows.
    pub fn from_rows<const W: usize>(rows: &[[f64; W]]) -> Self {
        PropertyArray::Vector {
            width: W,
            data: rows.iter().flatten().copied().collect(),
        }
    }

    /// Kind tag of this array.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyArray::Bool(_) => PropertyKind::Bool,
            PropertyArray::Int(_) => PropertyKind::Int,
            PropertyArray::Real(_) => PropertyKind::Real,
            PropertyArray::Vector { width, .. } => PropertyKind::Vector(*width),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            PropertyArray::Bool(v) => v.len(),
            PropertyArray::Int(v) => v.len(),
            PropertyArray::Real(v) => v.len(),
            PropertyArray::Vector { width, data } => {
                if *width == 0 {
                    0
                } else {
                    data.len() / width
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A vector array whose width is zero or does not divide its data.
    pub fn is_ragged(&self) -> bool {
        match self {
            PropertyArray::Vector { width, data } => *width == 0 || data.len() % width != 0,
            _ => false,
        }
    }

    /// Borrow one row of a vector array.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        match self {
            PropertyArray::Vector { width, data } => data.get(i * width..(i + 1) * width),
            _ => None,
        }
    }

    /// Convert `Int` storage to `Real`; other kinds are left alone.
    pub fn promote_to_real(&mut self) {
        if let PropertyArray::Int(v) = self {
            let promoted = v.iter().map(|&x| x as f64).collect();
            *self = PropertyArray::Real(promoted);
        }
    }

    /// Append `extra` padded rows.
    pub fn grow(&mut self, extra: usize) {
        if extra == 0 {
            return;
        }
        self.promote_to_real();
        match self {
            PropertyArray::Bool(v) => v.resize(v.len() + extra, false),
            PropertyArray::Real(v) => v.resize(v.len() + extra, f64::NAN),
            PropertyArray::Vector { width, data } => {
                data.resize(data.len() + extra * *width, f64::NAN)
            }
            PropertyArray::Int(_) => {}
        }
    }

    /// Copy the listed rows, in order, into a new array of the same kind.
    ///
    /// Every index must be `< self.len()`.
    pub fn gather(&self, rows: &[usize]) -> Self {
        match self {
            PropertyArray::Bool(v) => PropertyArray::Bool(rows.iter().map(|&r| v[r]).collect()),
            PropertyArray::Int(v) => PropertyArray::Int(rows.iter().map(|&r| v[r]).collect()),
            PropertyArray::Real(v) => PropertyArray::Real(rows.iter().map(|&r| v[r]).collect()),
            PropertyArray::Vector { width, data } => {
                let w = *width;
                let mut out = Vec::with_capacity(rows.len() * w);
                for &r in rows {
                    out.extend_from_slice(&data[r * w..(r + 1) * w]);
                }
                PropertyArray::Vector {
                    width: w,
                    data: out,
                }
            }
        }
    }

    /// Keep the rows whose mask entry is true, preserving order.
    pub fn retain(&mut self, keep: &[bool]) {
        fn keep_rows<T: Copy>(v: &[T], keep: &[bool]) -> Vec<T> {
            v.iter()
                .zip(keep)
                .filter_map(|(x, &k)| k.then_some(*x))
                .collect()
        }
        match self {
            PropertyArray::Bool(v) => *v = keep_rows(v, keep),
            PropertyArray::Int(v) => *v = keep_rows(v, keep),
            PropertyArray::Real(v) => *v = keep_rows(v, keep),
            PropertyArray::Vector { width, data } => {
                let w = *width;
                let mut out = Vec::with_capacity(data.len());
                for (row, &k) in data.chunks_exact(w.max(1)).zip(keep) {
                    if k {
                        out.extend_from_slice(row);
                    }
                }
                *data = out;
            }
        }
    }

    /// Concatenate `other` below `self`.
    ///
    /// `Int` and `Real` combine into `Real`. Any other kind difference, or a
    /// vector width difference, is reported as `(self kind, other kind)`.
    pub fn append(&mut self, mut other: PropertyArray) -> Result<(), (PropertyKind, PropertyKind)> {
        let conflict = (self.kind(), other.kind());
        match (self.kind(), other.kind()) {
            (PropertyKind::Int, PropertyKind::Real) => self.promote_to_real(),
            (PropertyKind::Real, PropertyKind::Int) => other.promote_to_real(),
            (a, b) if a == b => {}
            _ => return Err(conflict),
        }
        match (self, other) {
            (PropertyArray::Bool(a), PropertyArray::Bool(b)) => a.extend(b),
            (PropertyArray::Int(a), PropertyArray::Int(b)) => a.extend(b),
            (PropertyArray::Real(a), PropertyArray::Real(b)) => a.extend(b),
            (PropertyArray::Vector { data: a, .. }, PropertyArray::Vector { data: b, .. }) => {
                a.extend(b)
            }
            _ => return Err(conflict),
        }
        Ok(())
    }
}

impl From<Vec<bool>> for PropertyArray {
    fn from(v: Vec<bool>) -> Self {
        PropertyArray::Bool(v)
    }
}

impl From<Vec<i64>> for PropertyArray {
    fn from(v: Vec<i64>) -> Self {
        PropertyArray::Int(v)
    }
}

impl From<Vec<f64>> for PropertyArray {
    fn from(v: Vec<f64>) -> Self {
        PropertyArray::Real(v)
    }
}

/// Maps a scalar type to its property array variant for typed accessors.
pub trait PropertyScalar: Copy + Sized + 'static {
    /// Kind tag for this concrete type.
    const KIND: PropertyKind;

    /// Borrow the values if the tag matches.
    fn slice(array: &PropertyArray) -> Option<&[Self]>;
    /// Mutably borrow the values if the tag matches.
    fn slice_mut(array: &mut PropertyArray) -> Option<&mut [Self]>;
}

impl PropertyScalar for bool {
    const KIND: PropertyKind = PropertyKind::Bool;

    fn slice(array: &PropertyArray) -> Option<&[Self]> {
        if let PropertyArray::Bool(v) = array {
            Some(v)
        } else {
            None
        }
    }

    fn slice_mut(array: &mut PropertyArray) -> Option<&mut [Self]> {
        if let PropertyArray::Bool(v) = array {
            Some(v)
        } else {
            None
        }
    }
}

impl PropertyScalar for i64 {
    const KIND: PropertyKind = PropertyKind::Int;

    fn slice(array: &PropertyArray) -> Option<&[Self]> {
        if let PropertyArray::Int(v) = array {
            Some(v)
        } else {
            None
        }
    }

    fn slice_mut(array: &mut PropertyArray) -> Option<&mut [Self]> {
        if let PropertyArray::Int(v) = array {
            Some(v)
        } else {
            None
        }
    }
}

impl PropertyScalar for f64 {
    const KIND: PropertyKind = PropertyKind::Real;

    fn slice(array: &PropertyArray) -> Option<&[Self]> {
        if let PropertyArray::Real(v) = array {
            Some(v)
        } else {
            None
        }
    }

    fn slice_mut(array: &mut PropertyArray) -> Option<&mut [Self]> {
        if let PropertyArray::Real(v) = array {
            Some(v)
        } else {
            None
        }
    }
}
