use glam::Vec3;

/// Seed for position-keyed hashing. Changing it reshuffles every per-point random choice.
pub(crate) const POSITION_SEED: u64 = 0x5eed_5a1a_7e11_0001;

pub(crate) fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

pub(crate) fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite step. Reversed edges (`e0 > e1`) produce a falling step; equal edges degrade to a
/// hard threshold instead of dividing by zero.
pub(crate) fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let span = e1 - e0;
    if span.abs() <= f32::EPSILON {
        return if x < e0 { 0.0 } else { 1.0 };
    }
    let t = clamp01((x - e0) / span);
    t * t * (3.0 - 2.0 * t)
}

pub(crate) fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn unit_from_bits(h: u64) -> f32 {
    // top 24 bits fit an f32 mantissa exactly, so the result stays in [0, 1)
    (h >> 40) as f32 / (1u64 << 24) as f32
}

fn canonical_bits(v: f32) -> u32 {
    if v == 0.0 { 0 } else { v.to_bits() }
}

/// Stable pseudo-random value in `[0, 1)` keyed by a position and a salt.
pub(crate) fn position_hash(p: Vec3, salt: u64) -> f32 {
    let mut bytes = [0u8; 12];
    bytes[0..4].copy_from_slice(&canonical_bits(p.x).to_le_bytes());
    bytes[4..8].copy_from_slice(&canonical_bits(p.y).to_le_bytes());
    bytes[8..12].copy_from_slice(&canonical_bits(p.z).to_le_bytes());
    let h = xxhash_rust::xxh3::xxh3_64_with_seed(&bytes, POSITION_SEED ^ mix64(salt));
    unit_from_bits(h)
}

fn lattice_hash(x: i32, y: i32, z: i32) -> f32 {
    let mut h = mix64(POSITION_SEED ^ u64::from(x as u32));
    h = mix64(h ^ u64::from(y as u32));
    h = mix64(h ^ u64::from(z as u32));
    unit_from_bits(h)
}

/// Trilinear value noise in `[0, 1]` with smooth interpolation between integer lattice cells.
pub(crate) fn value_noise(p: Vec3) -> f32 {
    let cell = p.floor();
    let f = p - cell;
    let u = f * f * (Vec3::splat(3.0) - 2.0 * f);
    let (ix, iy, iz) = (cell.x as i32, cell.y as i32, cell.z as i32);

    let c = |dx: i32, dy: i32, dz: i32| {
        lattice_hash(ix.wrapping_add(dx), iy.wrapping_add(dy), iz.wrapping_add(dz))
    };

    let x00 = mix(c(0, 0, 0), c(1, 0, 0), u.x);
    let x10 = mix(c(0, 1, 0), c(1, 1, 0), u.x);
    let x01 = mix(c(0, 0, 1), c(1, 0, 1), u.x);
    let x11 = mix(c(0, 1, 1), c(1, 1, 1), u.x);
    let y0 = mix(x00, x10, u.y);
    let y1 = mix(x01, x11, u.y);
    mix(y0, y1, u.z)
}

/// Three decorrelated noise channels re-centred to `[-1, 1]`.
pub(crate) fn centered_noise3(p: Vec3) -> Vec3 {
    let n = Vec3::new(
        value_noise(p),
        value_noise(p + Vec3::new(31.7, 0.0, 0.0)),
        value_noise(p + Vec3::new(0.0, 0.0, 47.3)),
    );
    (n - Vec3::splat(0.5)) * 2.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
