//! Seeded simplex noise with fractal (octave) summation.
//!
//! Results of `simplex2`/`simplex3` are normalized to `[0, 1]`.

const F2: f32 = 0.366_025_42; // (sqrt(3) - 1) / 2
const G2: f32 = 0.211_324_87; // (3 - sqrt(3)) / 6
const F3: f32 = 1.0 / 3.0;
const G3: f32 = 1.0 / 6.0;

const GRAD3: [[f32; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// Octave settings for fractal noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParams {
    pub octaves:     u32,
    pub persistence: f32,
    pub lacunarity:  f32,
}

impl FractalParams {
    pub const fn new(octaves: u32, persistence: f32, lacunarity: f32) -> Self {
        Self {
            octaves,
            persistence,
            lacunarity,
        }
    }
}

impl Default for FractalParams {
    fn default() -> Self {
        Self::new(1, 0.5, 2.0)
    }
}

/// Permutation table derived from a seed. Same seed, same field.
#[derive(Clone)]
pub struct NoiseField {
    perm: [u8; 512],
    seed: u32,
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(0)
    }
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // splitmix64 so that seed 0 still gets a non-zero xorshift state
        let mut state = u64::from(seed).wrapping_add(0x9E37_79B9_7F4A_7C15);
        state = (state ^ (state >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        state = (state ^ (state >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        state ^= state >> 31;
        if state == 0 {
            state = 0x2545_F491_4F6C_DD1D;
        }

        // Fisher-Yates
        for i in (1..256).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        let (low, high) = perm.split_at_mut(256);
        high.copy_from_slice(low);

        Self { perm, seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    #[inline]
    fn p(&self, index: usize) -> usize {
        self.perm[index & 511] as usize
    }

    /// Single-octave 2D simplex noise in roughly `[-1, 1]`.
    pub fn noise2(&self, x: f32, y: f32) -> f32 {
        let s = (x + y) * F2;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = y - (j - t);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f32 + G2;
        let y1 = y0 - j1 as f32 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;

        let gi0 = self.p(ii + self.p(jj)) % 12;
        let gi1 = self.p(ii + i1 + self.p(jj + j1)) % 12;
        let gi2 = self.p(ii + 1 + self.p(jj + 1)) % 12;

        let corner = |gi: usize, x: f32, y: f32| {
            let t = 0.5 - x * x - y * y;
            if t < 0.0 {
                0.0
            } else {
                let t = t * t;
                t * t * (GRAD3[gi][0] * x + GRAD3[gi][1] * y)
            }
        };

        70.0 * (corner(gi0, x0, y0) + corner(gi1, x1, y1) + corner(gi2, x2, y2))
    }

    /// Single-octave 3D simplex noise in roughly `[-1, 1]`.
    pub fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        let s = (x + y + z) * F3;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let k = (z + s).floor();
        let t = (i + j + k) * G3;
        let x0 = x - (i - t);
        let y0 = y - (j - t);
        let z0 = z - (k - t);

        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - i1 as f32 + G3;
        let y1 = y0 - j1 as f32 + G3;
        let z1 = z0 - k1 as f32 + G3;
        let x2 = x0 - i2 as f32 + 2.0 * G3;
        let y2 = y0 - j2 as f32 + 2.0 * G3;
        let z2 = z0 - k2 as f32 + 2.0 * G3;
        let x3 = x0 - 1.0 + 3.0 * G3;
        let y3 = y0 - 1.0 + 3.0 * G3;
        let z3 = z0 - 1.0 + 3.0 * G3;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let kk = (k as i64 & 255) as usize;

        let gi0 = self.p(ii + self.p(jj + self.p(kk))) % 12;
        let gi1 = self.p(ii + i1 + self.p(jj + j1 + self.p(kk + k1))) % 12;
        let gi2 = self.p(ii + i2 + self.p(jj + j2 + self.p(kk + k2))) % 12;
        let gi3 = self.p(ii + 1 + self.p(jj + 1 + self.p(kk + 1))) % 12;

        let corner = |gi: usize, x: f32, y: f32, z: f32| {
            let t = 0.6 - x * x - y * y - z * z;
            if t < 0.0 {
                0.0
            } else {
                let t = t * t;
                t * t * (GRAD3[gi][0] * x + GRAD3[gi][1] * y + GRAD3[gi][2] * z)
            }
        };

        32.0 * (corner(gi0, x0, y0, z0)
            + corner(gi1, x1, y1, z1)
            + corner(gi2, x2, y2, z2)
            + corner(gi3, x3, y3, z3))
    }

    pub fn simplex2(&self, x: f32, y: f32, params: FractalParams) -> f32 {
        fractal(params, |freq| self.noise2(x * freq, y * freq))
    }

    pub fn simplex3(&self, x: f32, y: f32, z: f32, params: FractalParams) -> f32 {
        fractal(params, |freq| self.noise3(x * freq, y * freq, z * freq))
    }
}

/// Sums octaves of `sample(frequency)` and maps the result into `[0, 1]`.
fn fractal<F>(params: FractalParams, sample: F) -> f32
where
    F: Fn(f32) -> f32,
{
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut max = 1.0;
    let mut total = sample(frequency);

    for _ in 1..params.octaves {
        frequency *= params.lacunarity;
        amplitude *= params.persistence;
        max += amplitude;
        total += sample(frequency) * amplitude;
    }

    (1.0 + total / max) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutation_is_a_shuffle() {
        let field = NoiseField::new(1234);
        let mut seen = [false; 256];
        for &v in &field.perm[..256] {
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(field.perm[..256], field.perm[256..]);
    }

    #[test]
    fn test_deterministic() {
        let a = NoiseField::new(42);
        let b = NoiseField::new(42);
        let params = FractalParams::new(4, 0.5, 2.0);
        for i in 0..64 {
            let x = i as f32 * 0.37 - 10.0;
            let z = i as f32 * -0.21 + 3.0;
            assert_eq!(a.simplex2(x, z, params), b.simplex2(x, z, params));
            assert_eq!(a.simplex3(x, 0.5, z, params), b.simplex3(x, 0.5, z, params));
        }
    }

    #[test]
    fn test_seeds_differ() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);
        let differs = (0..64).any(|i| {
            let x = i as f32 * 0.73 + 0.1;
            a.noise2(x, x * 0.5) != b.noise2(x, x * 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn test_range() {
        let field = NoiseField::default();
        let params = FractalParams::new(8, 0.5, 2.0);
        for i in -100..100 {
            let x = i as f32 * 0.173;
            let v2 = field.simplex2(x, -x * 0.9, params);
            let v3 = field.simplex3(x, x * 0.3, -x, params);
            assert!((0.0..=1.0).contains(&v2), "simplex2 out of range: {v2}");
            // 3D kernel can overshoot a little at single points
            assert!((-0.05..=1.05).contains(&v3), "simplex3 out of range: {v3}");
        }
    }

    #[test]
    fn test_lattice_points_are_zero() {
        let field = NoiseField::new(9);
        assert_eq!(field.noise2(0.0, 0.0), 0.0);
        assert_eq!(field.simplex2(0.0, 0.0, FractalParams::default()), 0.5);
    }
}
