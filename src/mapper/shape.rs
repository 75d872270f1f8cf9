//! Destination shapes

use crate::schema::Record;

/// How a destination holds its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A single record.
    One,
    /// A single heap-allocated record.
    Boxed,
    /// A collection of records.
    Many,
    /// A collection of heap-allocated records.
    ManyBoxed,
}

impl Shape {
    pub fn is_collection(&self) -> bool {
        matches!(self, Shape::Many | Shape::ManyBoxed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::One => "a record",
            Shape::Boxed => "a boxed record",
            Shape::Many => "a vec of records",
            Shape::ManyBoxed => "a vec of boxed records",
        }
    }
}

/// A destination for selected rows, or a source of records for bulk operations.
#[derive(Debug)]
pub enum Dest<'a, R: Record> {
    One(&'a mut R),
    Boxed(&'a mut Box<R>),
    Many(&'a mut Vec<R>),
    ManyBoxed(&'a mut Vec<Box<R>>),
}

impl<R: Record> Dest<'_, R> {
    pub fn shape(&self) -> Shape {
        match self {
            Dest::One(_) => Shape::One,
            Dest::Boxed(_) => Shape::Boxed,
            Dest::Many(_) => Shape::Many,
            Dest::ManyBoxed(_) => Shape::ManyBoxed,
        }
    }
}
