use crate::session::Face;
use rand::Rng;

/// Source of the binary draw that decides a coin toss and a random seat
/// assignment. A seam so resolution stays deterministic under test.
pub trait Toss: Send + Sync {
    fn toss(&self) -> Face;
}

/// Production source: the thread-local CSPRNG, reseeded from the OS.
/// The draw must not be predictable; money rides on it.
pub struct Entropy;

impl Toss for Entropy {
    fn toss(&self) -> Face {
        if rand::rng().random() {
            Face::Heads
        } else {
            Face::Tails
        }
    }
}

/// Always lands the same way. Test seam.
#[cfg(test)]
pub struct Fixed(pub Face);

#[cfg(test)]
impl Toss for Fixed {
    fn toss(&self) -> Face {
        self.0
    }
}
