use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single fact value.
///
/// Only integers and booleans are stored. Floats are truncated toward zero on entry so that every
/// comparison the planner makes is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn normalize_float(value: f64) -> Self {
        // `as` saturates and maps NaN to 0.
        Value::Int(value.trunc() as i64)
    }

    pub fn as_int(self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(v),
            Value::Bool(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(v),
            Value::Int(_) => None,
        }
    }

    /// The zero of this value's variant (`0` or `false`).
    pub fn zeroed(self) -> Self {
        match self {
            Value::Int(_) => Value::Int(0),
            Value::Bool(_) => Value::Bool(false),
        }
    }

    pub fn apply(self, effect: &Effect) -> Result<Value, ValueError> {
        apply_effect(&self, effect)
    }

    pub fn satisfies(self, condition: &Condition) -> bool {
        check_condition(&self, condition)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::normalize_float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::normalize_float(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CompareType {
    Equal,
    NotEqual,
    MoreThan,
    MoreThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl CompareType {
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CompareType::Equal => lhs == rhs,
            CompareType::NotEqual => lhs != rhs,
            CompareType::MoreThan => lhs > rhs,
            CompareType::MoreThanOrEqual => lhs >= rhs,
            CompareType::LessThan => lhs < rhs,
            CompareType::LessThanOrEqual => lhs <= rhs,
        }
    }

    pub fn is_ordered(self) -> bool {
        !matches!(self, CompareType::Equal | CompareType::NotEqual)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ModificationType {
    Set,
    /// Integers only.
    Add,
    /// Integers only.
    Subtract,
    Truncate,
}

/// A condition that a fact value can meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Condition {
    pub comparison: CompareType,
    pub value: Value,
}

impl Condition {
    pub fn new(comparison: CompareType, value: impl Into<Value>) -> Self {
        Self {
            comparison,
            value: value.into(),
        }
    }

    pub fn equal(value: impl Into<Value>) -> Self {
        Self::new(CompareType::Equal, value)
    }

    pub fn not_equal(value: impl Into<Value>) -> Self {
        Self::new(CompareType::NotEqual, value)
    }

    pub fn more_than(value: impl Into<Value>) -> Self {
        Self::new(CompareType::MoreThan, value)
    }

    pub fn at_least(value: impl Into<Value>) -> Self {
        Self::new(CompareType::MoreThanOrEqual, value)
    }

    pub fn less_than(value: impl Into<Value>) -> Self {
        Self::new(CompareType::LessThan, value)
    }

    pub fn at_most(value: impl Into<Value>) -> Self {
        Self::new(CompareType::LessThanOrEqual, value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.comparison, self.value)
    }
}

/// Changes a fact value when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Effect {
    pub modifier: ModificationType,
    pub value: Value,
}

impl Effect {
    pub fn new(modifier: ModificationType, value: impl Into<Value>) -> Self {
        Self {
            modifier,
            value: value.into(),
        }
    }

    pub fn set(value: impl Into<Value>) -> Self {
        Self::new(ModificationType::Set, value)
    }

    pub fn add(value: impl Into<Value>) -> Self {
        Self::new(ModificationType::Add, value)
    }

    pub fn subtract(value: impl Into<Value>) -> Self {
        Self::new(ModificationType::Subtract, value)
    }

    /// Resets an `Int` fact to `0`.
    pub fn truncate() -> Self {
        Self::new(ModificationType::Truncate, 0)
    }

    /// Value produced when the effect lands on a fact that does not exist yet.
    pub fn apply_to_missing(&self) -> Result<Value, ValueError> {
        apply_effect(&self.value.zeroed(), self)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.modifier, self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("{modifier:?} {effect} cannot be applied to {current}: arithmetic needs two Ints")]
    IncompatibleVariants {
        modifier: ModificationType,
        current: Value,
        effect: Value,
    },
}

/// Evaluate `condition` against `value`.
///
/// `Equal`/`NotEqual` compare variant-aware (an `Int` never equals a `Bool`). Ordered comparisons
/// need `Int` on both sides; any `Bool` operand leaves the condition unsatisfied.
pub fn check_condition(value: &Value, condition: &Condition) -> bool {
    match condition.comparison {
        CompareType::Equal => *value == condition.value,
        CompareType::NotEqual => *value != condition.value,
        ordered => match (value.as_int(), condition.value.as_int()) {
            (Some(lhs), Some(rhs)) => ordered.holds(lhs, rhs),
            _ => false,
        },
    }
}

pub fn apply_effect(value: &Value, effect: &Effect) -> Result<Value, ValueError> {
    let incompatible = || ValueError::IncompatibleVariants {
        modifier: effect.modifier,
        current: *value,
        effect: effect.value,
    };

    match effect.modifier {
        ModificationType::Set => Ok(effect.value),
        ModificationType::Add => match (value.as_int(), effect.value.as_int()) {
            (Some(current), Some(delta)) => Ok(Value::Int(current.saturating_add(delta))),
            _ => Err(incompatible()),
        },
        ModificationType::Subtract => match (value.as_int(), effect.value.as_int()) {
            (Some(current), Some(delta)) => Ok(Value::Int(current.saturating_sub(delta))),
            _ => Err(incompatible()),
        },
        ModificationType::Truncate => Ok(value.zeroed()),
    }
}
