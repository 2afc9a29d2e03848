//! Parameter descriptor: one field traversal shared by every consumer.
//!
//! An action lists its fields once, in [`GameAction::accept_parameters`]. The
//! codec writer and reader, the checksum hasher, and the inspection collector
//! are all [`ParameterVisitor`]s over that same traversal, so field order can
//! never drift between encode, decode and validation.
//!
//! [`GameAction::accept_parameters`]: crate::action::GameAction::accept_parameters

use core::convert::Infallible;
use std::fmt;

use crate::state::{CoordsXYZD, GroupId, PlayerId};

/// Mutable view of one primitive parameter field.
///
/// Reading visitors copy the value out; the decoder writes into it.
#[derive(Debug)]
pub enum ParamSlot<'a> {
    Bool(&'a mut bool),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    I32(&'a mut i32),
}

impl ParamSlot<'_> {
    /// Current value held by the slot.
    pub fn value(&self) -> ParamValue {
        match self {
            ParamSlot::Bool(v) => ParamValue::Bool(**v),
            ParamSlot::U8(v) => ParamValue::U8(**v),
            ParamSlot::U16(v) => ParamValue::U16(**v),
            ParamSlot::U32(v) => ParamValue::U32(**v),
            ParamSlot::I32(v) => ParamValue::I32(**v),
        }
    }
}

/// Owned parameter value (closed set of primitive variants).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    I32(i32),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::U8(v) => write!(f, "{v}"),
            ParamValue::U16(v) => write!(f, "{v}"),
            ParamValue::U32(v) => write!(f, "{v}"),
            ParamValue::I32(v) => write!(f, "{v}"),
        }
    }
}

/// Generic consumer of an action's named parameters.
///
/// Visitors that only read (writer, hasher, collector) use
/// [`Infallible`](core::convert::Infallible) as their error; only the decoder
/// can fail.
pub trait ParameterVisitor {
    type Error;

    /// Called once per field, in the action's fixed traversal order.
    fn visit(&mut self, name: &'static str, slot: ParamSlot<'_>) -> Result<(), Self::Error>;

    /// Visits an oriented location as `x`, `y`, `z`, `direction`.
    fn visit_location(&mut self, location: &mut CoordsXYZD) -> Result<(), Self::Error> {
        self.visit("x", ParamSlot::I32(&mut location.x))?;
        self.visit("y", ParamSlot::I32(&mut location.y))?;
        self.visit("z", ParamSlot::I32(&mut location.z))?;
        self.visit("direction", ParamSlot::U8(&mut location.direction))
    }

    fn visit_player(
        &mut self,
        name: &'static str,
        player: &mut PlayerId,
    ) -> Result<(), Self::Error> {
        self.visit(name, ParamSlot::U32(&mut player.0))
    }

    fn visit_group(&mut self, name: &'static str, group: &mut GroupId) -> Result<(), Self::Error> {
        self.visit(name, ParamSlot::U8(&mut group.0))
    }
}

/// Ordered name/value listing of an action's parameters.
///
/// Used for permission inspection, logging, and scripting views.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ParameterSet {
    entries: Vec<(&'static str, ParamValue)>,
}

impl ParameterSet {
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ParamValue)> + '_ {
        self.entries.iter().copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

/// Serializes as a map in descriptor order, e.g. for JSON inspection views.
#[cfg(feature = "serde")]
impl serde::Serialize for ParameterSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Visitor that copies every parameter into a [`ParameterSet`].
#[derive(Debug, Default)]
pub struct ParameterCollector {
    set: ParameterSet,
}

impl ParameterCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> ParameterSet {
        self.set
    }
}

impl ParameterVisitor for ParameterCollector {
    type Error = Infallible;

    fn visit(&mut self, name: &'static str, slot: ParamSlot<'_>) -> Result<(), Infallible> {
        self.set.entries.push((name, slot.value()));
        Ok(())
    }
}
