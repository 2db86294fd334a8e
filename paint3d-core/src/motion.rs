/// Per-axis rates that input handlers can replace while a frame is running
use std::sync::atomic::Ordering;

use atomic_float::AtomicF32;

use crate::math::Vec3;

/// Three independent scalar rates, one per world axis.
///
/// Each axis is its own atomic, so a writer replaces one axis in a single
/// store and a reader never sees a half-written value. The axes are not
/// updated together; a reader may observe a new x alongside an old y.
#[derive(Debug, Default)]
pub struct AxisRates {
    x: AtomicF32,
    y: AtomicF32,
    z: AtomicF32,
}

impl AxisRates {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: AtomicF32::new(x),
            y: AtomicF32::new(y),
            z: AtomicF32::new(z),
        }
    }

    pub fn set_x(&self, rate: f32) {
        self.x.store(rate, Ordering::Relaxed);
    }

    pub fn set_y(&self, rate: f32) {
        self.y.store(rate, Ordering::Relaxed);
    }

    pub fn set_z(&self, rate: f32) {
        self.z.store(rate, Ordering::Relaxed);
    }

    pub fn set(&self, rates: &Vec3) {
        self.set_x(rates.x);
        self.set_y(rates.y);
        self.set_z(rates.z);
    }

    pub fn clear(&self) {
        self.set(&Vec3::zeros());
    }

    /// Snapshot of all three rates
    pub fn load(&self) -> Vec3 {
        Vec3::new(
            self.x.load(Ordering::Relaxed),
            self.y.load(Ordering::Relaxed),
            self.z.load(Ordering::Relaxed),
        )
    }
}
