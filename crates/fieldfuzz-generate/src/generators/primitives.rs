use rand::{Rng, RngCore};

use fieldfuzz_core::FieldValue;

use crate::generators::{Generator, GeneratorError};

const DEFAULT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Always yields the same value.
#[derive(Debug, Clone)]
pub struct Constant(pub FieldValue);

impl Generator for Constant {
    fn id(&self) -> &str {
        "primitive.constant"
    }

    fn generate(&self, _rng: &mut dyn RngCore, _size: usize) -> Result<FieldValue, GeneratorError> {
        Ok(self.0.clone())
    }
}

/// Uniform integer in `min..=max`.
#[derive(Debug, Clone, Copy)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl Generator for IntRange {
    fn id(&self) -> &str {
        "primitive.int.range"
    }

    fn generate(&self, rng: &mut dyn RngCore, _size: usize) -> Result<FieldValue, GeneratorError> {
        if self.min > self.max {
            return Err(GeneratorError::new(format!(
                "{} min must be <= max",
                self.id()
            )));
        }
        Ok(FieldValue::Int(rng.random_range(self.min..=self.max)))
    }
}

/// Uniform float in `min..max`.
#[derive(Debug, Clone, Copy)]
pub struct FloatRange {
    pub min: f64,
    pub max: f64,
}

impl FloatRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Generator for FloatRange {
    fn id(&self) -> &str {
        "primitive.float.range"
    }

    fn generate(&self, rng: &mut dyn RngCore, _size: usize) -> Result<FieldValue, GeneratorError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(GeneratorError::new(format!(
                "{} requires finite min < max",
                self.id()
            )));
        }
        Ok(FieldValue::Float(rng.random_range(self.min..self.max)))
    }
}

/// Picks one of a fixed set of values.
#[derive(Debug, Clone)]
pub struct OneOf(pub Vec<FieldValue>);

impl Generator for OneOf {
    fn id(&self) -> &str {
        "primitive.one_of"
    }

    fn generate(&self, rng: &mut dyn RngCore, _size: usize) -> Result<FieldValue, GeneratorError> {
        if self.0.is_empty() {
            return Err(GeneratorError::new("primitive.one_of has no choices"));
        }
        let index = rng.random_range(0..self.0.len());
        Ok(self.0[index].clone())
    }
}

/// Text drawn from a charset, with length bounded by the size hint.
///
/// The length is uniform in `0..=min(size, max_len)`.
#[derive(Debug, Clone)]
pub struct TextOf {
    pub charset: String,
    pub max_len: usize,
}

impl TextOf {
    pub fn new(charset: impl Into<String>, max_len: usize) -> Self {
        Self {
            charset: charset.into(),
            max_len,
        }
    }
}

impl Default for TextOf {
    fn default() -> Self {
        Self::new(DEFAULT_CHARSET, 32)
    }
}

impl Generator for TextOf {
    fn id(&self) -> &str {
        "primitive.text"
    }

    fn generate(&self, rng: &mut dyn RngCore, size: usize) -> Result<FieldValue, GeneratorError> {
        let chars: Vec<char> = self.charset.chars().collect();
        if chars.is_empty() {
            return Err(GeneratorError::new("primitive.text charset is empty"));
        }
        let len = rng.random_range(0..=size.min(self.max_len));
        let value = (0..len)
            .map(|_| chars[rng.random_range(0..chars.len())])
            .collect();
        Ok(FieldValue::Text(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn int_range_rejects_invalid_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = IntRange::new(10, 1).generate(&mut rng, 0);
        assert!(result.is_err());
    }

    #[test]
    fn int_range_stays_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let generator = IntRange::new(-3, 3);
        for _ in 0..200 {
            let value = generator
                .generate(&mut rng, 0)
                .ok()
                .and_then(|value| value.as_i64())
                .unwrap_or(i64::MAX);
            assert!((-3..=3).contains(&value));
        }
    }

    #[test]
    fn text_length_follows_size_hint() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let generator = TextOf::new("ab", 100);
        for _ in 0..50 {
            let value = generator.generate(&mut rng, 4).expect("text");
            let text = value.as_str().unwrap_or_default();
            assert!(text.chars().count() <= 4);
            assert!(text.chars().all(|c| c == 'a' || c == 'b'));
        }
    }

    #[test]
    fn one_of_without_choices_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(OneOf(Vec::new()).generate(&mut rng, 0).is_err());
    }
}
