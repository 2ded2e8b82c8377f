//! Fixed-size skin weight records
//!
//! A record holds `N` (bone index, weight byte) slots. Driver meshes carry up
//! to [`MAX_TOTAL_INFLUENCES`] slots per vertex; the texture format stores
//! exactly four, produced by [`reduce_skin_weights`].

/// Maximum number of bone influences a driver vertex may carry
pub const MAX_TOTAL_INFLUENCES: usize = 12;

/// Sum every normalized record's weights add up to
pub const WEIGHT_SUM: u32 = u8::MAX as u32;

/// Per-vertex skin weights with `N` influence slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfluenceRecord<const N: usize> {
    pub bone_indices: [u16; N],
    pub weights: [u8; N],
}

/// Record as reported by the driver mesh, unreduced
pub type MaxInfluenceRecord = InfluenceRecord<MAX_TOTAL_INFLUENCES>;

/// Record stored in the bone weight texture
pub type FourInfluenceRecord = InfluenceRecord<4>;

impl<const N: usize> Default for InfluenceRecord<N> {
    fn default() -> Self {
        Self {
            bone_indices: [0; N],
            weights: [0; N],
        }
    }
}

impl<const N: usize> InfluenceRecord<N> {
    /// Record fully bound to a single bone
    pub fn rigid(bone: u16) -> Self {
        let mut record = Self {
            bone_indices: [bone; N],
            weights: [0; N],
        };
        if N > 0 {
            record.weights[0] = u8::MAX;
        }
        record
    }

    /// Build a record from (bone, weight) pairs; extra pairs are dropped,
    /// missing slots are zero.
    pub fn from_pairs(pairs: &[(u16, u8)]) -> Self {
        let mut record = Self::default();
        for (slot, &(bone, weight)) in pairs.iter().take(N).enumerate() {
            record.bone_indices[slot] = bone;
            record.weights[slot] = weight;
        }
        record
    }

    /// Non-zero (bone, weight) pairs in slot order
    pub fn influences(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        self.bone_indices
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
            .filter(|&(_, w)| w > 0)
    }

    /// Sum of all weight bytes
    pub fn total_weight(&self) -> u32 {
        self.weights.iter().map(|&w| w as u32).sum()
    }

    /// Build a record from per-bone float contributions.
    ///
    /// Keeps the `N` largest contributions (ties broken by lower bone index),
    /// pads with bone 0 / weight 0 and quantizes so the bytes sum to exactly
    /// 255. Rounding remainder goes to the largest slot. Without any positive
    /// contribution the vertex is bound rigidly to bone 0.
    pub fn from_contributions(contributions: &[(u16, f32)]) -> Self {
        let mut sorted: Vec<(u16, f32)> = contributions
            .iter()
            .copied()
            .filter(|&(_, w)| w > 0.0 && w.is_finite())
            .collect();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        sorted.truncate(N);

        let total: f32 = sorted.iter().map(|&(_, w)| w).sum();
        if sorted.is_empty() || total <= 0.0 {
            return Self::rigid(0);
        }

        let mut record = Self::default();
        let mut assigned = 0u32;
        for (slot, &(bone, weight)) in sorted.iter().enumerate() {
            let quantized = ((weight / total) * WEIGHT_SUM as f32).floor().min(WEIGHT_SUM as f32) as u32;
            record.bone_indices[slot] = bone;
            record.weights[slot] = quantized as u8;
            assigned += quantized;
        }

        // Floor never over-assigns, so the remainder is non-negative
        let remainder = WEIGHT_SUM.saturating_sub(assigned);
        record.weights[0] = (record.weights[0] as u32 + remainder).min(WEIGHT_SUM) as u8;
        record
    }

    /// Reduce to `M` influences, keeping the highest weights and
    /// renormalizing to a 255 sum.
    pub fn reduce<const M: usize>(&self) -> InfluenceRecord<M> {
        let contributions: Vec<(u16, f32)> = self
            .influences()
            .map(|(bone, weight)| (bone, weight as f32))
            .collect();
        InfluenceRecord::<M>::from_contributions(&contributions)
    }
}

/// Reduce driver-resolution skin weights to four influences per vertex
pub fn reduce_skin_weights(records: &[MaxInfluenceRecord]) -> Vec<FourInfluenceRecord> {
    records.iter().map(|r| r.reduce::<4>()).collect()
}
