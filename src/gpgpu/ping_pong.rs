/// Two buffers of the same kind: one is read this frame, the other written.
///
/// A pass reads [`front`](Self::front), renders into [`back`](Self::back) and
/// then calls [`swap`](Self::swap), so no pass ever samples its own target.
#[derive(Debug)]
pub struct PingPong<T> {
    front: T,
    back: T,
    swaps: u64,
}

impl<T> PingPong<T> {
    pub fn new(front: T, back: T) -> Self {
        Self {
            front,
            back,
            swaps: 0,
        }
    }

    /// The current state.
    pub fn front(&self) -> &T {
        &self.front
    }

    /// The write target of the next pass.
    pub fn back(&self) -> &T {
        &self.back
    }

    pub fn back_mut(&mut self) -> &mut T {
        &mut self.back
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
        self.swaps += 1;
    }

    /// How often the buffers were swapped since creation.
    pub fn generation(&self) -> u64 {
        self.swaps
    }
}
