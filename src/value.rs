use crate::error::{LayervalError, LayervalResult};

/// An attribute value as read from the scene graph.
///
/// Compound attributes (vectors, frame ranges, resolutions) are represented
/// as `Compound` with one slot per child plug, in child order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Compound(Vec<Value>),
}

impl Value {
    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Compound(_))
    }

    pub fn component(&self, index: usize) -> LayervalResult<&Value> {
        match self {
            Self::Compound(items) => items.get(index).ok_or_else(|| {
                LayervalError::invariant(format!(
                    "component {index} out of range for compound of {}",
                    items.len()
                ))
            }),
            other => Err(LayervalError::invariant(format!(
                "component {index} requested on non-compound value {other:?}"
            ))),
        }
    }

    pub fn set_component(&mut self, index: usize, value: Value) -> LayervalResult<()> {
        match self {
            Self::Compound(items) => {
                let len = items.len();
                let slot = items.get_mut(index).ok_or_else(|| {
                    LayervalError::invariant(format!(
                        "component {index} out of range for compound of {len}"
                    ))
                })?;
                *slot = value;
                Ok(())
            }
            other => Err(LayervalError::invariant(format!(
                "component {index} assigned on non-compound value {other:?}"
            ))),
        }
    }

    /// Relative composition: `self * multiply + offset`.
    ///
    /// Component-wise over compounds; a scalar `multiply`/`offset` broadcasts
    /// across every slot. Only numeric values compose.
    pub fn mul_add(&self, multiply: &Value, offset: &Value) -> LayervalResult<Value> {
        match self {
            Self::Compound(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let m = multiply.broadcast(i)?;
                    let o = offset.broadcast(i)?;
                    out.push(item.mul_add(m, o)?);
                }
                Ok(Self::Compound(out))
            }
            _ => scalar_mul_add(self, multiply, offset),
        }
    }

    /// Slot `index` of a compound, or the value itself when scalar.
    fn broadcast(&self, index: usize) -> LayervalResult<&Value> {
        match self {
            Self::Compound(_) => self.component(index),
            other => Ok(other),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

fn scalar_mul_add(value: &Value, multiply: &Value, offset: &Value) -> LayervalResult<Value> {
    if let (Value::Int(v), Value::Int(m), Value::Int(o)) = (value, multiply, offset) {
        return Ok(Value::Int(v * m + o));
    }

    match (value.as_f64(), multiply.as_f64(), offset.as_f64()) {
        (Some(v), Some(m), Some(o)) => Ok(Value::Float(v * m + o)),
        _ => Err(LayervalError::invariant(format!(
            "relative composition over non-numeric operands: {value:?} * {multiply:?} + {offset:?}"
        ))),
    }
}
