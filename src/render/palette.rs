//! Label → color assignment
//!
//! One [`ColorPalette`] lives as long as the kernel so a label keeps the
//! color it was first given across executions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a label's first color is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPolicy {
    /// Random `#rrggbb` per new label
    #[default]
    Random,
    /// Label hashed into a fixed palette, stable across processes
    Deterministic,
}

const FIXED_PALETTE: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac", "#86bcb6", "#d37295",
];

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a(input: &str) -> u64 {
    input.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug, Clone, Default)]
pub struct ColorPalette {
    policy: ColorPolicy,
    assigned: HashMap<String, String>,
}

impl ColorPalette {
    pub fn new(policy: ColorPolicy) -> Self {
        Self {
            policy,
            assigned: HashMap::new(),
        }
    }

    pub fn policy(&self) -> ColorPolicy {
        self.policy
    }

    /// Color for `label`, assigning one on first sight
    pub fn color_for(&mut self, label: &str) -> &str {
        let policy = self.policy;
        self.assigned
            .entry(label.to_string())
            .or_insert_with(|| match policy {
                ColorPolicy::Random => format!("#{:06x}", rand::random::<u32>() & 0x00ff_ffff),
                ColorPolicy::Deterministic => {
                    let index = (fnv1a(label) % FIXED_PALETTE.len() as u64) as usize;
                    FIXED_PALETTE[index].to_string()
                }
            })
    }

    /// Number of labels seen so far
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_known_vectors() {
        assert_eq!(fnv1a(""), 0xcbf29ce484222325);
        assert_eq!(fnv1a("a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_label_keeps_first_color() {
        let mut palette = ColorPalette::new(ColorPolicy::Random);
        let first = palette.color_for("Bike").to_string();
        let again = palette.color_for("Bike").to_string();
        assert_eq!(first, again);
        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn test_random_color_format() {
        let mut palette = ColorPalette::new(ColorPolicy::Random);
        let color = palette.color_for("Wheel");
        assert_eq!(color.len(), 7);
        assert!(color.starts_with('#'));
        assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_deterministic_is_stable_across_palettes() {
        let mut a = ColorPalette::new(ColorPolicy::Deterministic);
        let mut b = ColorPalette::new(ColorPolicy::Deterministic);
        b.color_for("Other");
        assert_eq!(a.color_for("Bike"), b.color_for("Bike"));
        assert!(FIXED_PALETTE.contains(&a.color_for("Wheel")));
    }

    #[test]
    fn test_policy_yaml() {
        let policy: ColorPolicy = serde_yaml::from_str("deterministic").unwrap();
        assert_eq!(policy, ColorPolicy::Deterministic);
        assert_eq!(ColorPalette::default().policy(), ColorPolicy::Random);
    }
}
