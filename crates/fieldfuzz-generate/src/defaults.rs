use rand::{Rng, RngCore};

use fieldfuzz_core::{FieldType, FieldValue, RecordValue};

/// Sequence and string length cap used when no other limit is configured.
pub const DEFAULT_MAX_LEN: usize = 50;

/// Produces an arbitrary value for a field type, or `None` when the type
/// cannot be fabricated from random bits.
pub trait DefaultValues: Send + Sync {
    fn value(&self, ty: &FieldType, rng: &mut dyn RngCore) -> Option<FieldValue>;
}

/// Uniform random values, bounded only by `max_len` for sequences.
#[derive(Debug, Clone, Copy)]
pub struct RandomDefaults {
    pub max_len: usize,
}

impl Default for RandomDefaults {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl RandomDefaults {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    fn len(&self, rng: &mut dyn RngCore) -> usize {
        if self.max_len == 0 {
            0
        } else {
            rng.random_range(0..self.max_len)
        }
    }
}

impl DefaultValues for RandomDefaults {
    fn value(&self, ty: &FieldType, rng: &mut dyn RngCore) -> Option<FieldValue> {
        if !fabricable(ty) {
            return None;
        }
        let value = match ty {
            FieldType::Bool => FieldValue::Bool(rng.random_bool(0.5)),
            FieldType::Int { bits } => FieldValue::Int(random_int(*bits, rng)),
            FieldType::UInt { bits } => FieldValue::UInt(random_uint(*bits, rng)),
            FieldType::Float => {
                let magnitude = rng.random::<f64>() * f64::MAX;
                if rng.random_bool(0.5) {
                    FieldValue::Float(-magnitude)
                } else {
                    FieldValue::Float(magnitude)
                }
            }
            FieldType::Text => {
                let len = self.len(rng);
                FieldValue::Text((0..len).map(|_| rng.random::<char>()).collect())
            }
            FieldType::Bytes => {
                let len = self.len(rng);
                FieldValue::Bytes((0..len).map(|_| rng.random::<u8>()).collect())
            }
            FieldType::List { element } => {
                let len = self.len(rng);
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.value(element, rng)?);
                }
                FieldValue::List(items)
            }
            FieldType::Optional { inner } => {
                if rng.random_bool(0.5) {
                    FieldValue::Null
                } else {
                    self.value(inner, rng)?
                }
            }
            FieldType::Record(record) => {
                let mut value = RecordValue::zeroed(record);
                for field in &record.fields {
                    let item = self.value(&field.ty, rng)?;
                    value.set(&field.name, item).ok()?;
                }
                FieldValue::Record(value)
            }
            FieldType::Opaque { .. } => return None,
        };
        Some(value)
    }
}

/// Whether a value of `ty` can be built without an explicit generator.
fn fabricable(ty: &FieldType) -> bool {
    match ty {
        FieldType::Opaque { .. } => false,
        FieldType::List { element } => fabricable(element),
        FieldType::Optional { inner } => fabricable(inner),
        FieldType::Record(record) => record.fields.iter().all(|field| fabricable(&field.ty)),
        _ => true,
    }
}

fn random_int(bits: u8, rng: &mut dyn RngCore) -> i64 {
    match bits {
        0 => return 0,
        64.. => return rng.random::<i64>(),
        _ => {}
    }
    let max = (1_i64 << (bits - 1)) - 1;
    let min = -(1_i64 << (bits - 1));
    rng.random_range(min..=max)
}

fn random_uint(bits: u8, rng: &mut dyn RngCore) -> u64 {
    if bits >= 64 {
        return rng.random::<u64>();
    }
    rng.random_range(0..(1_u64 << bits))
}
