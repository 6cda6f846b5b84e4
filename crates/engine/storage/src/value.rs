//! Typed values layered over string storage
//!
//! Every value lives on disk as text. [`StorageValue`] gives each supported
//! type a canonical encoding and a tolerant decoder; decoding failures are
//! reported as `None` so callers can fall back to [`StorageValue::zero`].

use glam::{Quat, Vec3};

/// An angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Radian(pub f32);

/// An angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Degree(pub f32);

impl Radian {
    pub fn to_degrees(self) -> Degree {
        Degree(self.0.to_degrees())
    }
}

impl Degree {
    pub fn to_radians(self) -> Radian {
        Radian(self.0.to_radians())
    }
}

impl From<Degree> for Radian {
    fn from(d: Degree) -> Self {
        d.to_radians()
    }
}

impl From<Radian> for Degree {
    fn from(r: Radian) -> Self {
        r.to_degrees()
    }
}

/// A type that can be stored as a string value
pub trait StorageValue: Sized {
    /// Canonical text form written to the store
    fn encode(&self) -> String;

    /// Parse stored text, `None` if it is malformed
    fn decode(raw: &str) -> Option<Self>;

    /// Value returned by getters for missing or malformed entries
    fn zero() -> Self;
}

impl StorageValue for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn zero() -> Self {
        String::new()
    }
}

impl StorageValue for i32 {
    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        raw.parse::<i32>().ok().or_else(|| {
            // "2.0" written by hand or by an older float setter
            raw.parse::<f64>()
                .ok()
                .filter(|f| (i32::MIN as f64..=i32::MAX as f64).contains(f))
                .map(|f| f as i32)
        })
    }

    fn zero() -> Self {
        0
    }
}

impl StorageValue for f32 {
    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn zero() -> Self {
        0.0
    }
}

impl StorageValue for bool {
    fn encode(&self) -> String {
        String::from(if *self { "true" } else { "false" })
    }

    fn decode(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    fn zero() -> Self {
        false
    }
}

impl StorageValue for Vec3 {
    fn encode(&self) -> String {
        format!("{} {} {}", self.x, self.y, self.z)
    }

    fn decode(raw: &str) -> Option<Self> {
        let [x, y, z] = parse_floats::<3>(raw)?;
        Some(Vec3::new(x, y, z))
    }

    fn zero() -> Self {
        Vec3::ZERO
    }
}

/// Quaternions are written `w x y z`
impl StorageValue for Quat {
    fn encode(&self) -> String {
        format!("{} {} {} {}", self.w, self.x, self.y, self.z)
    }

    fn decode(raw: &str) -> Option<Self> {
        let [w, x, y, z] = parse_floats::<4>(raw)?;
        Some(Quat::from_xyzw(x, y, z, w))
    }

    fn zero() -> Self {
        Quat::IDENTITY
    }
}

impl StorageValue for Radian {
    fn encode(&self) -> String {
        self.0.encode()
    }

    fn decode(raw: &str) -> Option<Self> {
        f32::decode(raw).map(Radian)
    }

    fn zero() -> Self {
        Radian(0.0)
    }
}

/// Degrees share the radian encoding so either getter reads either setter
impl StorageValue for Degree {
    fn encode(&self) -> String {
        self.to_radians().encode()
    }

    fn decode(raw: &str) -> Option<Self> {
        Radian::decode(raw).map(Radian::to_degrees)
    }

    fn zero() -> Self {
        Degree(0.0)
    }
}

/// Parse exactly `N` whitespace-separated floats
fn parse_floats<const N: usize>(raw: &str) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    let mut parts = raw.split_whitespace();
    for slot in out.iter_mut() {
        *slot = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}
