/// Rounding applied when a ranged float is quantized for the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundMode {
    #[default]
    Nearest,
    Down,
    Up,
}

/// Map `value` into `bits`-bit step space over `[min, max]`.
/// Out-of-range input is clamped; the caller decides whether that was a
/// simulation logic error worth logging.
pub fn quantize(value: f32, min: f32, max: f32, bits: u8, mode: RoundMode) -> u64 {
    debug_assert!(bits > 0 && bits < 32);
    if max <= min {
        return 0;
    }
    let steps = (1u64 << bits) - 1;
    let normalized = (value.clamp(min, max) - min) / (max - min);
    let scaled = normalized * steps as f32;
    let step = match mode {
        RoundMode::Nearest => scaled.round(),
        RoundMode::Down => scaled.floor(),
        RoundMode::Up => scaled.ceil(),
    };
    (step as u64).min(steps)
}

/// Inverse of `quantize`.
pub fn dequantize(step: u64, min: f32, max: f32, bits: u8) -> f32 {
    debug_assert!(bits > 0 && bits < 32);
    if max <= min {
        return min;
    }
    let steps = (1u64 << bits) - 1;
    min + (max - min) * (step.min(steps) as f32 / steps as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_stays_within_one_step() {
        let (min, max, bits) = (0.0f32, 100.0f32, 10u8);
        let step_size = (max - min) / ((1u64 << bits) - 1) as f32;
        for value in [0.0, 0.05, 12.34, 50.0, 99.9, 100.0] {
            let recovered = dequantize(quantize(value, min, max, bits, RoundMode::Nearest), min, max, bits);
            assert!(
                (recovered - value).abs() <= step_size,
                "{} came back as {}",
                value,
                recovered
            );
        }
    }

    #[test]
    fn out_of_range_input_clamps() {
        let (min, max, bits) = (0.0f32, 1.0f32, 8u8);
        assert_eq!(quantize(-5.0, min, max, bits, RoundMode::Nearest), 0);
        assert_eq!(
            quantize(42.0, min, max, bits, RoundMode::Nearest),
            (1u64 << bits) - 1
        );
    }

    #[test]
    fn round_down_never_exceeds_input() {
        let (min, max, bits) = (0.0f32, 10.0f32, 6u8);
        for value in [0.1, 3.33, 7.77, 9.99] {
            let recovered = dequantize(quantize(value, min, max, bits, RoundMode::Down), min, max, bits);
            assert!(recovered <= value + f32::EPSILON);
        }
    }
}
